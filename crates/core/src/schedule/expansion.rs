//! Abort expansion.
//!
//! An aborted transaction is modelled by explicitly undoing its writes: every
//! abort `a_t` at position `k` is replaced by one compensating write per write
//! of `t` in `schedule[..k]`, newest first, followed by a commit `c_t`. The
//! conflict graph of the expanded schedule then accounts for the undo steps,
//! which is what the XCSR class is defined on.

use alloc::vec::Vec;

use crate::schedule::types::{Operation, Schedule};

/// Expand every abort into compensating writes followed by a commit.
///
/// Operations other than aborts are copied through in their original order.
/// A schedule without aborts is returned unchanged.
#[must_use]
pub fn expand<Variable>(schedule: &[Operation<Variable>]) -> Schedule<Variable>
where
    Variable: Clone,
{
    let mut expanded = Vec::with_capacity(schedule.len());
    for (position, op) in schedule.iter().enumerate() {
        let Operation::Abort { transaction } = op else {
            expanded.push(op.clone());
            continue;
        };
        let undo = schedule[..position]
            .iter()
            .rev()
            .filter_map(|prev| match prev {
                Operation::Write {
                    transaction: writer,
                    variable,
                    ..
                } if writer == transaction => {
                    Some(Operation::compensating_write(*transaction, variable.clone()))
                }
                _ => None,
            });
        expanded.extend(undo);
        expanded.push(Operation::commit(*transaction));
    }
    tracing::trace!(
        original = schedule.len(),
        expanded = expanded.len(),
        "expanded aborts"
    );
    expanded
}
