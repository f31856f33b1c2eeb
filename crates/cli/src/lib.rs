//! sercop CLI -- classify transaction schedules by serializability.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::{fmt, fs, io};

use clap::{Parser, Subcommand, ValueEnum};
use sercop_core::schedule::format_schedule;
use sercop_core::{AnalysisOptions, Class, Report, Schedule, TransactionId};
use sercop_parser::ParseError;

#[derive(Debug, Parser)]
#[command(
    name = "sercop",
    about = "Conflict-serializability analysis of transaction schedules"
)]
pub struct App {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Classify a schedule given on the command line, e.g. `r1(x) w2(x) c1 c2`
    Check(CheckArgs),
    /// Classify every schedule in the given files, in parallel
    Batch(BatchArgs),
    /// Print the JSON Schema for the JSON schedule input format to stdout
    Schema,
}

#[derive(Debug, Parser)]
pub struct CheckArgs {
    /// Schedule operations; several arguments are joined with spaces
    #[arg(required = true)]
    pub schedule: Vec<String>,
    /// Classes to decide (repeatable, default: all)
    #[arg(long = "class", value_enum)]
    pub classes: Vec<ClassArg>,
    /// Print every equivalent serial order
    #[arg(long)]
    pub orders: bool,
    /// Print conflict edges, the cycle witness and the expanded schedule
    #[arg(long)]
    pub verbose: bool,
    /// Stop enumerating serial orders after this many
    #[arg(long)]
    pub limit: Option<usize>,
    /// Output the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct BatchArgs {
    /// Schedule files: `.json` files hold an array of operations, any other
    /// file holds one textual schedule per line
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
    /// Classes to decide (repeatable, default: all)
    #[arg(long = "class", value_enum)]
    pub classes: Vec<ClassArg>,
    /// Stop enumerating serial orders after this many
    #[arg(long)]
    pub limit: Option<usize>,
    /// Output results as JSON (one object per schedule)
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ClassArg {
    Csr,
    Xcsr,
    Ocsr,
    Cocsr,
}

impl From<ClassArg> for Class {
    fn from(class: ClassArg) -> Self {
        match class {
            ClassArg::Csr => Self::Csr,
            ClassArg::Xcsr => Self::Xcsr,
            ClassArg::Ocsr => Self::Ocsr,
            ClassArg::Cocsr => Self::Cocsr,
        }
    }
}

/// Analysis options for the requested classes; all classes if none are given.
#[must_use]
pub fn analysis_options(
    classes: &[ClassArg],
    limit: Option<usize>,
    collect_orders: bool,
) -> AnalysisOptions {
    let classes: Vec<Class> = if classes.is_empty() {
        Class::ALL.to_vec()
    } else {
        let mut classes: Vec<Class> = classes.iter().copied().map(Class::from).collect();
        classes.sort_unstable();
        classes.dedup();
        classes
    };
    AnalysisOptions {
        classes,
        enumeration_limit: limit,
        collect_orders,
    }
}

/// Failure to read a schedule file.
#[derive(Debug)]
pub enum LoadError {
    Io(io::Error),
    Json(serde_json::Error),
    Parse(ParseError),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "{e}"),
            Self::Json(e) => write!(f, "invalid JSON schedule: {e}"),
            Self::Parse(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for LoadError {}

/// Read the schedules held by `path`.
///
/// # Errors
///
/// Returns a [`LoadError`] if the file cannot be read or parsed.
pub fn load_schedules(path: &Path) -> Result<Vec<Schedule<String>>, LoadError> {
    let text = fs::read_to_string(path).map_err(LoadError::Io)?;
    if path.extension().is_some_and(|ext| ext == "json") {
        let schedule = serde_json::from_str(&text).map_err(LoadError::Json)?;
        Ok(vec![schedule])
    } else {
        sercop_parser::parse_schedules(&text).map_err(LoadError::Parse)
    }
}

/// One-line verdict summary, e.g. `CSR holds, OCSR violated`.
#[must_use]
pub fn summary<Variable>(report: &Report<Variable>) -> String {
    Class::ALL
        .iter()
        .filter_map(|&class| {
            report
                .verdict(class)
                .map(|verdict| format!("{class} {verdict}"))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render a serial order as `[1, 2, 3]`.
#[must_use]
pub fn format_order(order: &[TransactionId]) -> String {
    let ids: Vec<String> = order.iter().map(ToString::to_string).collect();
    format!("[{}]", ids.join(", "))
}

/// Multi-line human-readable report of a single schedule.
#[must_use]
pub fn render_report(report: &Report<String>, orders: bool, verbose: bool) -> String {
    let mut output = String::new();
    for class in Class::ALL {
        if let Some(verdict) = report.verdict(class) {
            let _ = writeln!(output, "{:<6} {verdict}", format!("{class}:"));
        }
    }

    if verbose {
        let _ = writeln!(output, "conflicts:");
        for edge in &report.conflicts {
            let _ = writeln!(output, "  {} -> {}: {edge}", edge.source, edge.target);
        }
        if let Some((a, b)) = report.cycle {
            let _ = writeln!(output, "cycle through {a} -> {b}");
        }
        if let Some(expanded) = &report.expanded {
            let _ = writeln!(output, "expanded: {}", format_schedule(expanded));
        }
    }

    if orders {
        match &report.serial_orders {
            Some(serial_orders) => {
                let _ = writeln!(output, "serial orders ({}):", serial_orders.len());
                for order in serial_orders {
                    let _ = writeln!(output, "  {}", format_order(order));
                }
                if report.orders_truncated {
                    let _ = writeln!(output, "  ... truncated at enumeration limit");
                }
            }
            None => {
                let _ = writeln!(output, "serial orders: none");
            }
        }
    }
    output
}
