// Author: Dustin Pilgrim
// License: MIT

use eventline::info;
use wayback_core::options::{self, filter_args, lookup};
use wayback_core::{OptKind, OptSpec};

const HOMEPAGE: &str = "Wayback <https://wayback.freedesktop.org/> X.Org compatibility layer";
const BUG_REPORTS: &str = "Report bugs to <https://gitlab.freedesktop.org/wayback/wayback/-/issues>.";

/// Options xwayback understands. Ignored ones are accepted for drop-in
/// compatibility with Xorg/Xwayland command lines and never forwarded.
pub const OPTIONS: &[OptSpec] = &[
    OptSpec::handled("-help", "show help page"),
    OptSpec::handled("-showconfig", "alias to -version"),
    OptSpec::handled("-version", "show Xwayback version"),
    // Xwayland options we set ourselves or that make no sense here
    OptSpec::ignored("-decorate", false),
    OptSpec::ignored("-enable-ei-portal", false),
    OptSpec::ignored("-fullscreen", false),
    OptSpec::ignored("-geometry", true),
    OptSpec::ignored("-glamor", true),
    OptSpec::ignored("-hidpi", false),
    OptSpec::ignored("-host-grab", false),
    OptSpec::ignored("-noTouchPointerEmulation", false),
    OptSpec::ignored("-force-xrandr-emulation", false),
    OptSpec::ignored("-nokeymap", false),
    OptSpec::ignored("-rootless", false),
    OptSpec::ignored("-shm", false),
    OptSpec::ignored("-wm", true),
    // Xorg(1)
    OptSpec::ignored("-allowMouseOpenFail", false),
    OptSpec::ignored("-allowNonLocalXvidtune", false),
    OptSpec::ignored("-bgamma", true),
    OptSpec::ignored("-bpp", true),
    OptSpec::ignored("-config", true),
    OptSpec::ignored("-configdir", true),
    OptSpec::ignored("-configure", true),
    OptSpec::ignored("-crt", true),
    OptSpec::ignored("-depth", true),
    OptSpec::ignored("-disableVidMode", false),
    OptSpec::ignored("-fbbbp", true),
    OptSpec::ignored("-gamma", true),
    OptSpec::ignored("-ggamma", true),
    OptSpec::ignored("-ignoreABI", false),
    OptSpec::ignored("-isolateDevice", true),
    OptSpec::ignored("-keeptty", false),
    OptSpec::ignored("-keyboard", true),
    OptSpec::ignored("-layout", true),
    OptSpec::ignored("-logverbose", true),
    OptSpec::ignored("-modulepath", true),
    OptSpec::ignored("-noautoBindCPU", false),
    OptSpec::ignored("-nosilk", false),
    OptSpec::ignored("-novtswitch", false),
    OptSpec::ignored("-pointer", true),
    OptSpec::ignored("-quiet", false),
    OptSpec::ignored("-rgamma", true),
    OptSpec::ignored("-sharevts", false),
    OptSpec::ignored("-screen", true),
    OptSpec::ignored("-showDefaultModulePath", false),
    OptSpec::ignored("-showDefaultLibPath", false),
    OptSpec::ignored("-showopts", false),
    OptSpec::ignored("-weight", true),
    OptSpec::ignored("-verbose", true),
];

#[derive(Debug, PartialEq, Eq)]
pub enum Invocation {
    Help,
    Version,
    Run {
        /// `-verbose N`, re-added to the Xwayland command line.
        verbosity: Option<u32>,
        /// Arguments passed through to Xwayland.
        forwarded: Vec<String>,
    },
}

impl Invocation {
    pub fn verbose(&self) -> bool {
        matches!(self, Invocation::Run { verbosity: Some(v), .. } if *v > 0)
    }
}

/// Parses everything after argv[0]. The first handled option wins.
pub fn parse(args: &[String]) -> Invocation {
    let mut it = args.iter();
    while let Some(arg) = it.next() {
        let Some(opt) = lookup(OPTIONS, arg) else {
            continue;
        };
        match (opt.kind, opt.name) {
            (OptKind::Handled, "-help") => return Invocation::Help,
            (OptKind::Handled, "-version" | "-showconfig") => return Invocation::Version,
            _ => {
                if opt.operand {
                    it.next();
                }
            }
        }
    }

    let verbosity = options::operand_of(OPTIONS, args, "-verbose").and_then(|v| v.parse().ok());

    Invocation::Run {
        verbosity,
        forwarded: filter_args(OPTIONS, args),
    }
}

pub fn print_help(argv0: &str) {
    info!("{}", HOMEPAGE);
    info!("{}", BUG_REPORTS);
    info!("Usage: {} [:<display>] [option]", argv0);
    for opt in OPTIONS.iter().filter(|o| o.kind == OptKind::Handled) {
        info!(
            "\t{}{}\t\t {}",
            opt.name,
            if opt.operand { " opt" } else { "" },
            opt.description
        );
    }
}

pub fn print_version() {
    info!("{}", HOMEPAGE);
    info!("Version {}", env!("CARGO_PKG_VERSION"));
}
