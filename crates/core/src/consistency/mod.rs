use alloc::vec::Vec;
use core::fmt::{Display, Formatter};
use core::hash::Hash;

use self::commit_order::commit_order;
use self::error::Error;
use self::order_preserving::RealTimeOrder;
use crate::graph::conflict::{ConflictGraph, ConflictPolicy};
use crate::schedule::types::{Operation, TransactionId};
use crate::schedule::{expand, validate_raw};

pub mod commit_order;
pub mod enumeration;
pub mod error;
pub mod order_preserving;
pub mod report;
pub mod witness;

pub use enumeration::{collect_serial_orders, Enumeration, SerialOrders};
pub use report::{analyze, AnalysisOptions, Report, Verdict};
pub use witness::Witness;

/// Serializability classes, ordered by the checks they build on.
///
/// COCSR implies OCSR implies CSR, and XCSR implies CSR. Each checker runs
/// its prerequisite first.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Class {
    /// Conflict serializable: the conflict graph is acyclic.
    Csr,
    /// CSR, and still acyclic after aborts are expanded into compensating
    /// writes.
    Xcsr,
    /// CSR with an equivalent serial order that respects real-time order.
    Ocsr,
    /// CSR whose commit order is an equivalent serial order.
    Cocsr,
}

impl Class {
    pub const ALL: [Self; 4] = [Self::Csr, Self::Xcsr, Self::Ocsr, Self::Cocsr];

    /// The class that must hold before this one is checked.
    #[must_use]
    pub const fn prerequisite(self) -> Option<Self> {
        match self {
            Self::Csr => None,
            Self::Xcsr | Self::Ocsr => Some(Self::Csr),
            Self::Cocsr => Some(Self::Ocsr),
        }
    }
}

impl Display for Class {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Csr => "CSR",
            Self::Xcsr => "XCSR",
            Self::Ocsr => "OCSR",
            Self::Cocsr => "COCSR",
        };
        f.write_str(name)
    }
}

/// Check whether `schedule` belongs to `class`.
///
/// Equivalent to [`check_with_limit`] without an enumeration cap.
///
/// # Errors
///
/// See [`check_with_limit`]; never returns
/// [`Error::EnumerationLimitExceeded`].
pub fn check<Variable>(
    schedule: &[Operation<Variable>],
    class: Class,
) -> Result<Witness<Variable>, Error>
where
    Variable: Eq + Hash + Clone,
{
    check_with_limit(schedule, class, None)
}

/// Check whether `schedule` belongs to `class`, visiting at most `limit`
/// serial orders.
///
/// On success, returns a [`Witness`]:
///
/// - CSR: [`Witness::SerialOrder`] with the first equivalent serial order.
/// - XCSR: [`Witness::Expanded`] with the abort-expanded schedule.
/// - OCSR: [`Witness::SerialOrder`] with the first serial order respecting
///   real-time order.
/// - COCSR: [`Witness::SerialOrder`] with the commit order.
///
/// OCSR and COCSR stop enumerating at the first qualifying order.
///
/// # Errors
///
/// - [`Error::Malformed`] if the schedule is structurally invalid.
/// - [`Error::Cycle`] if the conflict graph of the class (or of its
///   prerequisite) is cyclic.
/// - [`Error::Invalid`] if no equivalent serial order qualifies for OCSR or
///   COCSR.
/// - [`Error::EnumerationLimitExceeded`] if `limit` orders were visited
///   without a qualifying one and more remain.
pub fn check_with_limit<Variable>(
    schedule: &[Operation<Variable>],
    class: Class,
    limit: Option<usize>,
) -> Result<Witness<Variable>, Error>
where
    Variable: Eq + Hash + Clone,
{
    tracing::debug!(operations = schedule.len(), %class, ?limit, "checking schedule");
    validate_raw(schedule)?;

    match class {
        Class::Csr => {
            let graph = serializable_graph(schedule, ConflictPolicy::Strict, Class::Csr)?;
            graph
                .serial_orders()
                .next()
                .map(Witness::SerialOrder)
                .ok_or(Error::Invalid(Class::Csr))
        }
        Class::Xcsr => {
            serializable_graph(schedule, ConflictPolicy::Basic, Class::Csr)?;
            let expanded = expand(schedule);
            serializable_graph(&expanded, ConflictPolicy::Strict, Class::Xcsr)?;
            Ok(Witness::Expanded(expanded))
        }
        Class::Ocsr => {
            let graph = serializable_graph(schedule, ConflictPolicy::Strict, Class::Csr)?;
            let real_time = RealTimeOrder::from_schedule(schedule);
            find_serial_order(&graph, Class::Ocsr, limit, |order| {
                real_time.satisfied_by(order)
            })
            .map(Witness::SerialOrder)
        }
        Class::Cocsr => {
            check_with_limit(schedule, Class::Ocsr, limit)?;
            let graph = serializable_graph(schedule, ConflictPolicy::Strict, Class::Csr)?;
            let committed = commit_order(schedule);
            find_serial_order(&graph, Class::Cocsr, limit, |order| {
                order == committed.as_slice()
            })
            .map(Witness::SerialOrder)
        }
    }
}

/// Build the conflict graph of `schedule`, failing with a cycle witness
/// attributed to `class` if it is cyclic.
fn serializable_graph<Variable>(
    schedule: &[Operation<Variable>],
    policy: ConflictPolicy,
    class: Class,
) -> Result<ConflictGraph<Variable>, Error>
where
    Variable: Eq + Hash + Clone,
{
    let graph = ConflictGraph::build(schedule, policy)?;
    match graph.find_cycle_edge() {
        Some((a, b)) => Err(Error::Cycle { class, a, b }),
        None => Ok(graph),
    }
}

/// First serial order of `graph` accepted by `accept`, visiting at most
/// `limit` orders.
fn find_serial_order<Variable, F>(
    graph: &ConflictGraph<Variable>,
    class: Class,
    limit: Option<usize>,
    mut accept: F,
) -> Result<Vec<TransactionId>, Error>
where
    F: FnMut(&[TransactionId]) -> bool,
{
    for (visited, order) in graph.serial_orders().enumerate() {
        if let Some(limit) = limit.filter(|&limit| visited >= limit) {
            tracing::debug!(%class, limit, "enumeration limit reached");
            return Err(Error::EnumerationLimitExceeded { class, limit });
        }
        if accept(&order) {
            tracing::debug!(%class, visited, "found qualifying serial order");
            return Ok(order);
        }
    }
    Err(Error::Invalid(class))
}
