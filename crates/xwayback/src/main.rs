// Author: Dustin Pilgrim
// License: MIT

mod cli;
mod config;
mod crash;
mod display;
mod logging;
mod paths;
mod session;

use cli::Invocation;
use session::SessionConfig;
use wayback_launch::exit_code;

fn main() {
    let mut argv = std::env::args();
    let argv0 = argv.next().unwrap_or_else(|| "xwayback".to_string());
    let args: Vec<String> = argv.collect();

    let invocation = cli::parse(&args);

    let log_path = paths::default_log_path("xwayback.log");
    if let Err(e) = logging::init_logging(&log_path, invocation.verbose()) {
        // Console output is already up; only the file sink is missing.
        eventline::warn!("log file {} unavailable: {e}", log_path.display());
    }

    if let Err(e) = crash::install() {
        eventline::warn!("failed to install SIGSEGV handler: {e}");
    }

    let (verbosity, forwarded) = match invocation {
        Invocation::Help => {
            cli::print_help(&argv0);
            std::process::exit(0);
        }
        Invocation::Version => {
            cli::print_version();
            std::process::exit(0);
        }
        Invocation::Run {
            verbosity,
            forwarded,
        } => (verbosity, forwarded),
    };

    let file_cfg = config::load().unwrap_or_else(|e| {
        eventline::warn!("{e}; using defaults");
        config::XwaybackConfig::default()
    });
    let settings = config::resolve(&file_cfg, |key| std::env::var_os(key));

    eventline::debug!("compositor: {}", settings.compositor_path.display());
    eventline::debug!("Xwayland: {}", settings.xwayland_path.display());
    if let Some(output) = &settings.output {
        eventline::debug!("preferred output: {output}");
    }

    let cfg = SessionConfig {
        compositor_path: settings.compositor_path,
        xwayland_path: settings.xwayland_path,
        output: settings.output,
        output_match: settings.output_match,
        verbosity,
        forwarded,
    };

    match session::run(&cfg) {
        Ok(status) => std::process::exit(exit_code(status)),
        Err(e) => {
            eventline::error!("{e}");
            std::process::exit(1);
        }
    }
}
