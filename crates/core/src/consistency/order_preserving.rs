//! Order-preserving conflict serializability (OCSR).
//!
//! A schedule is OCSR if some equivalent serial order also respects real
//! time: whenever a transaction `i` commits before another transaction `j`
//! has issued any operation, `i` must precede `j` in the serial order.
//!
//! The real-time constraints are read off a reduced schedule that keeps, per
//! transaction, only its first operation and its commit. For every commit in
//! that reduced sequence, the transactions whose first operation comes later
//! form the set of transactions the committer must precede. A commit is never
//! a first operation; an abort can be.

use alloc::vec::Vec;

use hashbrown::{HashMap, HashSet};

use crate::schedule::types::{Operation, TransactionId};

#[derive(Debug, Clone, Copy)]
enum Step {
    Start(TransactionId),
    Commit(TransactionId),
}

/// Real-time precedence constraints of a schedule.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RealTimeOrder {
    /// `(i, later)`: `i` committed before any transaction of `later` started.
    /// Ordered by commit position; transactions with an empty set are omitted.
    pub precedes: Vec<(TransactionId, Vec<TransactionId>)>,
}

impl RealTimeOrder {
    #[must_use]
    pub fn from_schedule<Variable>(schedule: &[Operation<Variable>]) -> Self {
        let mut started = HashSet::new();
        let steps: Vec<Step> = schedule
            .iter()
            .filter_map(|op| match op {
                Operation::Commit { transaction } => Some(Step::Commit(*transaction)),
                _ => started
                    .insert(op.transaction())
                    .then(|| Step::Start(op.transaction())),
            })
            .collect();

        let precedes = steps
            .iter()
            .enumerate()
            .filter_map(|(position, step)| {
                let Step::Commit(committer) = step else {
                    return None;
                };
                let later: Vec<TransactionId> = steps[position + 1..]
                    .iter()
                    .filter_map(|step| match step {
                        Step::Start(transaction) => Some(*transaction),
                        Step::Commit(_) => None,
                    })
                    .collect();
                (!later.is_empty()).then_some((*committer, later))
            })
            .collect();

        Self { precedes }
    }

    /// Returns `true` if no transaction is constrained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.precedes.is_empty()
    }

    /// Returns `true` if `order` places every committer before all
    /// transactions that started after its commit.
    ///
    /// Constraints of a committer absent from `order` are ignored; a
    /// constrained transaction absent from `order` fails the check.
    #[must_use]
    pub fn satisfied_by(&self, order: &[TransactionId]) -> bool {
        let position: HashMap<TransactionId, usize> = order
            .iter()
            .enumerate()
            .map(|(index, transaction)| (*transaction, index))
            .collect();
        self.precedes.iter().all(|(committer, later)| {
            let Some(&committed_at) = position.get(committer) else {
                return true;
            };
            later
                .iter()
                .all(|transaction| position.get(transaction).is_some_and(|&p| p > committed_at))
        })
    }
}

/// The first of `orders` that respects the real-time constraints of
/// `schedule`, if any.
pub fn find_order_preserving<Variable, I>(
    schedule: &[Operation<Variable>],
    orders: I,
) -> Option<Vec<TransactionId>>
where
    I: IntoIterator<Item = Vec<TransactionId>>,
{
    let real_time = RealTimeOrder::from_schedule(schedule);
    orders
        .into_iter()
        .find(|order| real_time.satisfied_by(order))
}

/// Returns `true` if one of `orders`, the serial orders equivalent to
/// `schedule`, respects its real-time constraints.
#[must_use]
pub fn is_order_preserving<Variable>(
    schedule: &[Operation<Variable>],
    orders: &[Vec<TransactionId>],
) -> bool {
    let real_time = RealTimeOrder::from_schedule(schedule);
    orders.iter().any(|order| real_time.satisfied_by(order))
}
