use alloc::string::String;
use core::fmt::{Display, Formatter, Result, Write};

use crate::schedule::types::Operation;

impl<Variable> Display for Operation<Variable>
where
    Variable: Display,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Self::Read {
                transaction,
                variable,
            } => write!(f, "r{transaction}({variable})"),
            Self::Write {
                transaction,
                variable,
                compensating,
            } => {
                let undo = if *compensating { "^-1" } else { "" };
                write!(f, "w{transaction}{undo}({variable})")
            }
            Self::Commit { transaction } => write!(f, "c{transaction}"),
            Self::Abort { transaction } => write!(f, "a{transaction}"),
        }
    }
}

/// Format a schedule in the textual operation grammar, space separated.
///
/// Compensating writes carry the `^-1` suffix, so the output of an expanded
/// schedule parses back with `sercop_parser::parse_schedule`.
#[must_use]
pub fn format_schedule<Variable>(schedule: &[Operation<Variable>]) -> String
where
    Variable: Display,
{
    let mut output = String::new();
    for (i, op) in schedule.iter().enumerate() {
        if i > 0 {
            output.push(' ');
        }
        let _ = write!(output, "{op}");
    }
    output
}
