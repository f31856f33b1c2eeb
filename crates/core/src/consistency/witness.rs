use alloc::vec::Vec;

use crate::schedule::types::{Schedule, TransactionId};

/// Evidence that a schedule belongs to a class.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Witness<Variable> {
    /// An equivalent serial order.
    /// Returned by the CSR, OCSR and COCSR checkers; for COCSR it is the
    /// commit order of the schedule.
    SerialOrder(Vec<TransactionId>),
    /// The abort-expanded schedule, whose conflict graph is acyclic.
    /// Returned by the XCSR checker.
    Expanded(Schedule<Variable>),
}
