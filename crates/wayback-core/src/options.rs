// Author: Dustin Pilgrim
// License: MIT
//
// X server style options ("-name [operand]") and the forwarding filter.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptKind {
    /// Acted on by xwayback itself and listed in the help text.
    Handled,
    /// Accepted for compatibility and dropped.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptSpec {
    pub name: &'static str,
    pub description: &'static str,
    /// Consumes the following argument.
    pub operand: bool,
    pub kind: OptKind,
}

impl OptSpec {
    pub const fn handled(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            operand: false,
            kind: OptKind::Handled,
        }
    }

    pub const fn ignored(name: &'static str, operand: bool) -> Self {
        Self {
            name,
            description: "",
            operand,
            kind: OptKind::Ignored,
        }
    }
}

pub fn lookup<'t>(table: &'t [OptSpec], arg: &str) -> Option<&'t OptSpec> {
    table.iter().find(|o| o.name == arg)
}

/// Arguments that are not in `table`, in their original order.
///
/// A recognized option is dropped together with its operand when it takes
/// one; a trailing operand option without a value is dropped alone.
pub fn filter_args<S: AsRef<str>>(table: &[OptSpec], args: &[S]) -> Vec<String> {
    let mut out = Vec::new();
    let mut it = args.iter();

    while let Some(arg) = it.next() {
        match lookup(table, arg.as_ref()) {
            Some(opt) => {
                if opt.operand {
                    it.next();
                }
            }
            None => out.push(arg.as_ref().to_string()),
        }
    }

    out
}

/// Operand of the last occurrence of `name`, skipping operands of other
/// table options so a value is never mistaken for a flag.
pub fn operand_of<'a, S: AsRef<str>>(
    table: &[OptSpec],
    args: &'a [S],
    name: &str,
) -> Option<&'a str> {
    let mut found = None;
    let mut i = 0;

    while i < args.len() {
        let arg = args[i].as_ref();
        if let Some(opt) = lookup(table, arg) {
            if opt.operand {
                if arg == name {
                    if let Some(value) = args.get(i + 1) {
                        found = Some(value.as_ref());
                    }
                }
                i += 1;
            }
        }
        i += 1;
    }

    found
}
