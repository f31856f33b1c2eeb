#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use sercop_core::{Operation, TransactionId};

/// DSL macro for building test schedules.
///
/// Produces `Vec<Operation<&'static str>>`.
///
/// # Syntax
///
/// ```ignore
/// schedule![w(0, x), r(1, x), c(0), a(1)]
/// ```
///
/// - `r(t, var)` → `Operation::read(TransactionId(t), "var")`
/// - `w(t, var)` → `Operation::write(TransactionId(t), "var")`
/// - `u(t, var)` → `Operation::compensating_write(TransactionId(t), "var")`
/// - `c(t)`      → `Operation::commit(TransactionId(t))`
/// - `a(t)`      → `Operation::abort(TransactionId(t))`
///
/// Build a single Operation.
#[macro_export]
macro_rules! op {
    (r($t:literal, $var:ident)) => {
        sercop_core::Operation::<&'static str>::read(
            sercop_core::TransactionId($t),
            stringify!($var),
        )
    };
    (w($t:literal, $var:ident)) => {
        sercop_core::Operation::<&'static str>::write(
            sercop_core::TransactionId($t),
            stringify!($var),
        )
    };
    (u($t:literal, $var:ident)) => {
        sercop_core::Operation::<&'static str>::compensating_write(
            sercop_core::TransactionId($t),
            stringify!($var),
        )
    };
    (c($t:literal)) => {
        sercop_core::Operation::<&'static str>::commit(sercop_core::TransactionId($t))
    };
    (a($t:literal)) => {
        sercop_core::Operation::<&'static str>::abort(sercop_core::TransactionId($t))
    };
}

/// Build a schedule from operation tokens.
#[macro_export]
macro_rules! schedule {
    ($($kind:ident($($args:tt)*)),* $(,)?) => {
        vec![$($crate::op!($kind($($args)*))),*]
    };
}

pub fn tids(ids: &[u64]) -> Vec<TransactionId> {
    ids.iter().copied().map(TransactionId).collect()
}

pub fn orders(raw: &[&[u64]]) -> Vec<Vec<TransactionId>> {
    raw.iter().map(|order| tids(order)).collect()
}

const VARIABLES: [&str; 3] = ["x", "y", "z"];

/// Random well-formed schedule over `transactions` transactions.
///
/// Each transaction issues between one and three reads or writes and then
/// commits, or aborts with probability 1/5. Operations of different
/// transactions are interleaved uniformly.
pub fn random_schedule(rng: &mut StdRng, transactions: u64) -> Vec<Operation<&'static str>> {
    let mut pending: Vec<Vec<Operation<&'static str>>> = (0..transactions)
        .map(|t| {
            let transaction = TransactionId(t);
            let mut ops: Vec<_> = (0..rng.random_range(1..=3_usize))
                .map(|_| {
                    let variable = VARIABLES[rng.random_range(0..VARIABLES.len())];
                    if rng.random::<bool>() {
                        Operation::read(transaction, variable)
                    } else {
                        Operation::write(transaction, variable)
                    }
                })
                .collect();
            if rng.random_range(0..5_u32) == 0 {
                ops.push(Operation::abort(transaction));
            } else {
                ops.push(Operation::commit(transaction));
            }
            ops.reverse();
            ops
        })
        .collect();

    let mut schedule = Vec::new();
    while !pending.is_empty() {
        let pick = rng.random_range(0..pending.len());
        if let Some(op) = pending[pick].pop() {
            schedule.push(op);
        }
        if pending[pick].is_empty() {
            pending.swap_remove(pick);
        }
    }
    schedule
}

pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
