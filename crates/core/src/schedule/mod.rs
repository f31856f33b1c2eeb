//! Schedules: interleaved operations of several transactions.

use alloc::vec::Vec;

use hashbrown::{HashMap, HashSet};

use self::error::Error;
use self::types::{Operation, TransactionId};

pub mod display;
pub mod error;
pub mod expansion;
pub mod types;

pub use display::format_schedule;
pub use expansion::expand;
pub use types::{OpKind, Schedule};

/// Distinct transactions of `schedule`, in order of first appearance.
#[must_use]
pub fn transactions<Variable>(schedule: &[Operation<Variable>]) -> Vec<TransactionId> {
    let mut seen = HashSet::new();
    schedule
        .iter()
        .map(Operation::transaction)
        .filter(|transaction| seen.insert(*transaction))
        .collect()
}

/// Check that every transaction terminates at most once and issues nothing
/// after its commit or abort.
///
/// Transactions without a terminator are accepted.
///
/// # Errors
///
/// Returns [`Error::DuplicateTerminator`] or
/// [`Error::OperationAfterTerminator`] for the first offending operation.
pub fn validate<Variable>(schedule: &[Operation<Variable>]) -> Result<(), Error> {
    let mut terminated: HashMap<TransactionId, usize> = HashMap::new();
    for (position, op) in schedule.iter().enumerate() {
        let transaction = op.transaction();
        if let Some(&first) = terminated.get(&transaction) {
            return Err(if op.is_terminator() {
                Error::DuplicateTerminator {
                    transaction,
                    first,
                    second: position,
                }
            } else {
                Error::OperationAfterTerminator {
                    transaction,
                    terminator: first,
                    position,
                }
            });
        }
        if op.is_terminator() {
            terminated.insert(transaction, position);
        }
    }
    Ok(())
}

/// [`validate`], additionally rejecting compensating writes, which only the
/// expansion may introduce.
///
/// # Errors
///
/// See [`validate`]; also returns [`Error::CompensatingWrite`].
pub fn validate_raw<Variable>(schedule: &[Operation<Variable>]) -> Result<(), Error> {
    if let Some(position) = schedule.iter().position(Operation::is_compensating) {
        return Err(Error::CompensatingWrite { position });
    }
    validate(schedule)
}
