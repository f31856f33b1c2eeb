use core::fmt::{Display, Formatter, Result};

use derive_more::From;

use crate::consistency::Class;
use crate::schedule::error::Error as ScheduleError;
use crate::schedule::types::TransactionId;

/// Error returned when a schedule is not in the requested class.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, From)]
pub enum Error {
    /// The schedule is structurally invalid and was not analysed.
    Malformed(ScheduleError),
    /// No serial order satisfies the class.
    Invalid(Class),
    /// The conflict graph used for the class has a cycle.
    /// `a -> b` is an edge on that cycle.
    Cycle {
        class: Class,
        a: TransactionId,
        b: TransactionId,
    },
    /// The enumeration cap was reached before the class could be decided.
    EnumerationLimitExceeded { class: Class, limit: usize },
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Self::Malformed(error) => write!(f, "malformed schedule: {error}"),
            Self::Invalid(class) => write!(f, "not in {class}: no serial order qualifies"),
            Self::Cycle { class, a, b } => {
                write!(f, "not in {class}: conflict cycle through {a}->{b}")
            }
            Self::EnumerationLimitExceeded { class, limit } => {
                write!(f, "{class} undetermined after {limit} serial orders")
            }
        }
    }
}

impl core::error::Error for Error {}
