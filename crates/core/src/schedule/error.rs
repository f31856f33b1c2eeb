use core::fmt::{Display, Formatter, Result};

use crate::schedule::types::TransactionId;

/// A schedule that the analysis refuses to classify.
///
/// Positions are 0-based indices into the schedule.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A transaction commits or aborts more than once.
    DuplicateTerminator {
        transaction: TransactionId,
        first: usize,
        second: usize,
    },
    /// A transaction issues an operation after its commit or abort.
    OperationAfterTerminator {
        transaction: TransactionId,
        terminator: usize,
        position: usize,
    },
    /// A raw schedule contains a compensating write.
    CompensatingWrite { position: usize },
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Self::DuplicateTerminator {
                transaction,
                first,
                second,
            } => write!(
                f,
                "transaction {transaction} terminates twice (positions {first} and {second})"
            ),
            Self::OperationAfterTerminator {
                transaction,
                terminator,
                position,
            } => write!(
                f,
                "transaction {transaction} issues an operation at position {position} after terminating at position {terminator}"
            ),
            Self::CompensatingWrite { position } => {
                write!(f, "compensating write at position {position} in a raw schedule")
            }
        }
    }
}

impl core::error::Error for Error {}
