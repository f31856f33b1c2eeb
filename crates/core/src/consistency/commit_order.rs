//! Commit-order-preserving conflict serializability (COCSR).
//!
//! A schedule is COCSR if its literal commit order is itself one of the
//! equivalent serial orders. Transactions that abort or never terminate do
//! not appear in the commit order, so such a schedule is never COCSR.

use alloc::vec::Vec;

use crate::schedule::types::{Operation, TransactionId};

/// Transactions in the order their commits appear in `schedule`.
#[must_use]
pub fn commit_order<Variable>(schedule: &[Operation<Variable>]) -> Vec<TransactionId> {
    schedule
        .iter()
        .filter_map(|op| match op {
            Operation::Commit { transaction } => Some(*transaction),
            _ => None,
        })
        .collect()
}

/// Returns `true` if the commit order of `schedule` equals one of `orders`.
#[must_use]
pub fn is_commit_order_preserving<Variable>(
    schedule: &[Operation<Variable>],
    orders: &[Vec<TransactionId>],
) -> bool {
    let committed = commit_order(schedule);
    orders.iter().any(|order| *order == committed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(id: u64) -> TransactionId {
        TransactionId(id)
    }

    #[test]
    fn test_commit_order_skips_aborts() {
        let schedule = vec![
            Operation::write(t(2), "x"),
            Operation::write(t(1), "x"),
            Operation::commit(t(1)),
            Operation::abort(t(3)),
            Operation::commit(t(2)),
        ];
        assert_eq!(commit_order(&schedule), vec![t(1), t(2)]);
    }

    #[test]
    fn test_commit_order_must_match_exactly() {
        let schedule = vec![
            Operation::write(t(1), "x"),
            Operation::write(t(2), "y"),
            Operation::commit(t(2)),
            Operation::commit(t(1)),
        ];
        assert!(is_commit_order_preserving(
            &schedule,
            &[vec![t(1), t(2)], vec![t(2), t(1)]]
        ));
        assert!(!is_commit_order_preserving(&schedule, &[vec![t(1), t(2)]]));
    }

    #[test]
    fn test_uncommitted_transaction_never_matches() {
        let schedule = vec![
            Operation::write(t(1), "x"),
            Operation::commit(t(1)),
            Operation::read(t(2), "y"),
        ];
        assert!(!is_commit_order_preserving(
            &schedule,
            &[vec![t(1), t(2)], vec![t(2), t(1)]]
        ));
    }
}
