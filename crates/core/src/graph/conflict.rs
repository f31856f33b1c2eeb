//! Conflict (precedence) graphs of schedules.
//!
//! Two operations conflict when they access the same variable, belong to
//! different transactions, and at least one of them is a write. Every
//! conflicting pair `(earlier, later)` contributes an edge from the
//! transaction of `earlier` to the transaction of `later`: any equivalent
//! serial execution must run the former first.
//!
//! The graph is a multigraph. Each conflicting pair is kept as a separate
//! labelled [`ConflictEdge`] for diagnostics, while the deduplicated
//! [`DiGraph`] projection is what acyclicity and enumeration work on.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{Display, Formatter};
use core::hash::Hash;

use hashbrown::HashMap;

use crate::consistency::enumeration::SerialOrders;
use crate::graph::digraph::DiGraph;
use crate::schedule::error::Error;
use crate::schedule::types::{OpKind, Operation, TransactionId};
use crate::schedule::{transactions, validate};

/// Which earlier operations a later operation on the same variable depends on.
///
/// Under both policies a read depends on earlier writes only, and operations
/// of the same transaction never conflict.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ConflictPolicy {
    /// A write depends on earlier reads and writes, named explicitly.
    Basic,
    /// A write depends on every earlier operation on its variable.
    #[default]
    Strict,
}

impl ConflictPolicy {
    /// Returns `true` if `later` must be ordered after `earlier`.
    ///
    /// Both operations are expected to access the same variable.
    #[must_use]
    pub fn conflicts<Variable>(
        self,
        earlier: &Operation<Variable>,
        later: &Operation<Variable>,
    ) -> bool {
        if earlier.transaction() == later.transaction() {
            return false;
        }
        match (later.kind(), earlier.kind()) {
            (OpKind::Read, OpKind::Write) | (OpKind::Write, OpKind::Read | OpKind::Write) => true,
            (OpKind::Write, _) => self == Self::Strict,
            _ => false,
        }
    }
}

/// One conflicting operation pair and the edge it induces.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictEdge<Variable> {
    pub source: TransactionId,
    pub target: TransactionId,
    /// The operation of `source`.
    pub earlier: Operation<Variable>,
    /// The operation of `target`.
    pub later: Operation<Variable>,
}

impl<Variable> Display for ConflictEdge<Variable>
where
    Variable: Display,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}->{}", self.earlier, self.later)
    }
}

/// Conflict multigraph over the transactions of a schedule.
#[derive(Debug, Clone)]
pub struct ConflictGraph<Variable> {
    /// Every transaction of the schedule, in order of first appearance,
    /// including those without any conflict.
    pub transactions: Vec<TransactionId>,
    /// Every conflicting pair, grouped by variable in order of first access.
    pub edges: Vec<ConflictEdge<Variable>>,
    /// Deduplicated projection of `edges`.
    pub dependencies: DiGraph<TransactionId>,
}

impl<Variable> ConflictGraph<Variable>
where
    Variable: Eq + Hash + Clone,
{
    /// Build the conflict graph of `schedule` under `policy`.
    ///
    /// # Errors
    ///
    /// Returns a [`schedule::error::Error`](Error) if a transaction terminates
    /// twice or operates after terminating.
    pub fn build(schedule: &[Operation<Variable>], policy: ConflictPolicy) -> Result<Self, Error> {
        validate(schedule)?;

        let mut slots: HashMap<&Variable, usize> = HashMap::new();
        let mut per_variable: Vec<Vec<&Operation<Variable>>> = Vec::new();
        for op in schedule {
            let Some(variable) = op.variable() else {
                continue;
            };
            let slot = *slots.entry(variable).or_insert_with(|| {
                per_variable.push(Vec::new());
                per_variable.len() - 1
            });
            per_variable[slot].push(op);
        }

        let transactions = transactions(schedule);
        let mut dependencies = DiGraph::default();
        for transaction in &transactions {
            dependencies.add_vertex(*transaction);
        }

        let mut edges = Vec::new();
        for ops in &per_variable {
            for (i, later) in ops.iter().enumerate() {
                for earlier in &ops[..i] {
                    if policy.conflicts(earlier, later) {
                        let edge = ConflictEdge {
                            source: earlier.transaction(),
                            target: later.transaction(),
                            earlier: (*earlier).clone(),
                            later: (*later).clone(),
                        };
                        tracing::trace!(source = %edge.source, target = %edge.target, "conflict");
                        dependencies.add_edge(edge.source, edge.target);
                        edges.push(edge);
                    }
                }
            }
        }

        tracing::debug!(
            operations = schedule.len(),
            transactions = transactions.len(),
            edges = edges.len(),
            ?policy,
            "built conflict graph"
        );

        Ok(Self {
            transactions,
            edges,
            dependencies,
        })
    }
}

impl<Variable> ConflictGraph<Variable> {
    /// Returns `true` if some conflict orders `source` before `target`.
    #[must_use]
    pub fn has_edge(&self, source: TransactionId, target: TransactionId) -> bool {
        self.dependencies.has_edge(&source, &target)
    }

    /// Number of conflicting pairs that order `source` before `target`.
    #[must_use]
    pub fn multiplicity(&self, source: TransactionId, target: TransactionId) -> usize {
        self.edges
            .iter()
            .filter(|edge| edge.source == source && edge.target == target)
            .count()
    }

    /// Returns `true` if the graph has no cycle, i.e. the schedule is
    /// conflict serializable.
    #[must_use]
    pub fn is_acyclic(&self) -> bool {
        self.dependencies.is_acyclic()
    }

    /// An edge on some cycle, or `None` if the graph is acyclic.
    #[must_use]
    pub fn find_cycle_edge(&self) -> Option<(TransactionId, TransactionId)> {
        self.dependencies.find_cycle_edge()
    }

    /// Enumerate every serial order consistent with the graph.
    ///
    /// Each call starts a fresh enumeration. A cyclic graph has none.
    #[must_use]
    pub fn serial_orders(&self) -> SerialOrders {
        SerialOrders::new(&self.dependencies)
    }

    /// Human-readable labels of every conflicting pair, e.g. `w1(x)->r2(x)`.
    #[must_use]
    pub fn labels(&self) -> Vec<String>
    where
        Variable: Display,
    {
        use alloc::string::ToString;
        self.edges.iter().map(ToString::to_string).collect()
    }
}
