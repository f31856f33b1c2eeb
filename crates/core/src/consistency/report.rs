//! Full analysis of a schedule against several classes at once.
//!
//! Unlike [`check`](crate::consistency::check), which stops at the first
//! qualifying serial order, [`analyze`] enumerates the serial orders up front
//! (up to the configured cap) and then filters them, so the complete list can
//! be reported alongside the verdicts.

use alloc::vec::Vec;
use core::fmt::{Display, Formatter};
use core::hash::Hash;

use typed_builder::TypedBuilder;

use crate::consistency::commit_order::is_commit_order_preserving;
use crate::consistency::enumeration::collect_serial_orders;
use crate::consistency::order_preserving::is_order_preserving;
use crate::consistency::Class;
use crate::graph::conflict::{ConflictEdge, ConflictGraph, ConflictPolicy};
use crate::schedule::error::Error;
use crate::schedule::types::{Operation, Schedule, TransactionId};
use crate::schedule::{expand, validate_raw};

/// Outcome for one class.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Verdict {
    Holds,
    Violated,
    /// A prerequisite class does not hold.
    NotApplicable,
    /// The enumeration cap was reached before a qualifying order was found.
    Undetermined,
}

impl Verdict {
    #[must_use]
    pub const fn holds(self) -> bool {
        matches!(self, Self::Holds)
    }

    const fn from_bool(holds: bool) -> Self {
        if holds {
            Self::Holds
        } else {
            Self::Violated
        }
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        let text = match self {
            Self::Holds => "holds",
            Self::Violated => "violated",
            Self::NotApplicable => "not applicable",
            Self::Undetermined => "undetermined",
        };
        f.write_str(text)
    }
}

/// What to compute in [`analyze`].
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct AnalysisOptions {
    /// Classes to decide. Prerequisites are evaluated internally either way.
    #[builder(default = Class::ALL.to_vec())]
    pub classes: Vec<Class>,
    /// Maximum number of serial orders to enumerate.
    #[builder(default, setter(strip_option))]
    pub enumeration_limit: Option<usize>,
    /// Report every equivalent serial order.
    #[builder(default)]
    pub collect_orders: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Result of [`analyze`]. Verdicts of classes that were not requested are
/// `None`.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report<Variable> {
    pub csr: Option<Verdict>,
    pub xcsr: Option<Verdict>,
    pub ocsr: Option<Verdict>,
    pub cocsr: Option<Verdict>,
    /// Every conflicting operation pair of the schedule.
    pub conflicts: Vec<ConflictEdge<Variable>>,
    /// An edge on a conflict cycle, if the schedule is not CSR.
    pub cycle: Option<(TransactionId, TransactionId)>,
    /// Equivalent serial orders, when requested and the schedule is CSR.
    pub serial_orders: Option<Vec<Vec<TransactionId>>>,
    /// `true` if `serial_orders` stops at the enumeration cap.
    pub orders_truncated: bool,
    /// The abort-expanded schedule, when XCSR was requested and the schedule
    /// is CSR.
    pub expanded: Option<Schedule<Variable>>,
}

impl<Variable> Report<Variable> {
    #[must_use]
    pub const fn verdict(&self, class: Class) -> Option<Verdict> {
        match class {
            Class::Csr => self.csr,
            Class::Xcsr => self.xcsr,
            Class::Ocsr => self.ocsr,
            Class::Cocsr => self.cocsr,
        }
    }
}

/// Decide every class in `options` for `schedule`.
///
/// # Errors
///
/// Returns a [`schedule::error::Error`](Error) if the schedule is malformed.
pub fn analyze<Variable>(
    schedule: &[Operation<Variable>],
    options: &AnalysisOptions,
) -> Result<Report<Variable>, Error>
where
    Variable: Eq + Hash + Clone,
{
    validate_raw(schedule)?;
    let requested = |class: Class| options.classes.contains(&class);

    let graph = ConflictGraph::build(schedule, ConflictPolicy::Strict)?;
    let cycle = graph.find_cycle_edge();
    let csr = cycle.is_none();
    tracing::debug!(
        operations = schedule.len(),
        transactions = graph.transactions.len(),
        csr,
        "analysing schedule"
    );

    let mut xcsr = None;
    let mut expanded = None;
    if requested(Class::Xcsr) {
        let basic = ConflictGraph::build(schedule, ConflictPolicy::Basic)?;
        xcsr = Some(if basic.is_acyclic() {
            let expansion = expand(schedule);
            let holds = ConflictGraph::build(&expansion, ConflictPolicy::Strict)?.is_acyclic();
            expanded = Some(expansion);
            Verdict::from_bool(holds)
        } else {
            Verdict::NotApplicable
        });
    }

    let needs_orders =
        options.collect_orders || requested(Class::Ocsr) || requested(Class::Cocsr);
    let enumeration = (csr && needs_orders)
        .then(|| collect_serial_orders(&graph.dependencies, options.enumeration_limit));

    let (ocsr, cocsr) = match &enumeration {
        None => (Verdict::NotApplicable, Verdict::NotApplicable),
        Some(enumeration) => {
            let orders = enumeration.orders();
            let decide = |found: bool| match (found, enumeration.is_complete()) {
                (true, _) => Verdict::Holds,
                (false, true) => Verdict::Violated,
                (false, false) => Verdict::Undetermined,
            };
            let ocsr = decide(is_order_preserving(schedule, orders));
            let cocsr = if ocsr.holds() {
                decide(is_commit_order_preserving(schedule, orders))
            } else if ocsr == Verdict::Undetermined {
                Verdict::Undetermined
            } else {
                Verdict::NotApplicable
            };
            (ocsr, cocsr)
        }
    };

    let orders_truncated = enumeration
        .as_ref()
        .is_some_and(|enumeration| !enumeration.is_complete());
    let serial_orders = enumeration
        .filter(|_| options.collect_orders)
        .map(|enumeration| enumeration.into_orders());

    Ok(Report {
        csr: requested(Class::Csr).then_some(Verdict::from_bool(csr)),
        xcsr,
        ocsr: requested(Class::Ocsr).then_some(ocsr),
        cocsr: requested(Class::Cocsr).then_some(cocsr),
        conflicts: graph.edges,
        cycle,
        serial_orders,
        orders_truncated,
        expanded,
    })
}
