//! Exhaustive enumeration of serial orders.
//!
//! The serial orders equivalent to a conflict-serializable schedule are
//! exactly the topological orderings (linear extensions) of its conflict
//! graph. [`SerialOrders`] produces all of them lazily with a backtracking
//! search over in-degree counts:
//!
//! 1. Compute the in-degree (`active_parent` count) of every vertex.
//! 2. The frontier is the set of unplaced vertices with zero in-degree.
//! 3. Place each frontier vertex in turn, decrementing the in-degree of its
//!    successors, and descend.
//! 4. When every vertex is placed, yield the order. On the way back, undo the
//!    placement and try the next frontier vertex.
//!
//! The search state lives in an explicit stack of frames, so the iterator can
//! be suspended between orders. Frontier candidates are tried in ascending
//! [`TransactionId`] order, which makes the sequence of orders deterministic
//! and lexicographically increasing.
//!
//! The number of orders is factorial in the number of mutually unordered
//! transactions; callers bound the work with a cap ([`collect_serial_orders`])
//! or by stopping at the first order they are interested in.

use alloc::vec;
use alloc::vec::Vec;
use core::iter::FusedIterator;

use hashbrown::HashMap;

use crate::graph::digraph::DiGraph;
use crate::schedule::types::TransactionId;

/// One choice point of the search.
#[derive(Debug, Clone)]
struct Frame {
    /// Vertex indices with zero in-degree when the frame was opened.
    candidates: Vec<usize>,
    /// Next candidate to try.
    cursor: usize,
    /// Candidate currently placed by this frame.
    placed: Option<usize>,
}

/// Lazy iterator over every topological ordering of a graph.
///
/// Created by [`ConflictGraph::serial_orders`] or [`SerialOrders::new`].
///
/// [`ConflictGraph::serial_orders`]: crate::graph::conflict::ConflictGraph::serial_orders
#[derive(Debug, Clone)]
pub struct SerialOrders {
    /// Vertices sorted ascending; indices below refer to this list.
    vertices: Vec<TransactionId>,
    children: Vec<Vec<usize>>,
    active_parent: Vec<usize>,
    is_placed: Vec<bool>,
    linearization: Vec<usize>,
    stack: Vec<Frame>,
    /// The empty graph has exactly one (empty) ordering.
    pending_empty: bool,
}

impl SerialOrders {
    #[must_use]
    pub fn new(graph: &DiGraph<TransactionId>) -> Self {
        let mut vertices: Vec<TransactionId> = graph.adj_map.keys().copied().collect();
        vertices.sort_unstable();

        let index_of: HashMap<TransactionId, usize> = vertices
            .iter()
            .enumerate()
            .map(|(index, &vertex)| (vertex, index))
            .collect();

        let mut children = Vec::with_capacity(vertices.len());
        let mut active_parent = vec![0; vertices.len()];
        for vertex in &vertices {
            let mut successors: Vec<usize> = graph
                .successors(vertex)
                .filter_map(|successor| index_of.get(successor).copied())
                .collect();
            successors.sort_unstable();
            for &child in &successors {
                active_parent[child] += 1;
            }
            children.push(successors);
        }

        let mut orders = Self {
            is_placed: vec![false; vertices.len()],
            linearization: Vec::with_capacity(vertices.len()),
            pending_empty: vertices.is_empty(),
            vertices,
            children,
            active_parent,
            stack: Vec::new(),
        };
        if !orders.pending_empty {
            let candidates = orders.frontier();
            orders.stack.push(Frame {
                candidates,
                cursor: 0,
                placed: None,
            });
        }
        orders
    }

    fn frontier(&self) -> Vec<usize> {
        (0..self.vertices.len())
            .filter(|&v| !self.is_placed[v] && self.active_parent[v] == 0)
            .collect()
    }

    fn place(&mut self, v: usize) {
        self.is_placed[v] = true;
        self.linearization.push(v);
        for &child in &self.children[v] {
            self.active_parent[child] -= 1;
        }
    }

    fn unplace(&mut self, v: usize) {
        for &child in &self.children[v] {
            self.active_parent[child] += 1;
        }
        self.linearization.pop();
        self.is_placed[v] = false;
    }

    fn current_order(&self) -> Vec<TransactionId> {
        self.linearization
            .iter()
            .map(|&v| self.vertices[v])
            .collect()
    }
}

impl Iterator for SerialOrders {
    type Item = Vec<TransactionId>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pending_empty {
            self.pending_empty = false;
            return Some(Vec::new());
        }
        loop {
            let frame = self.stack.last_mut()?;
            let undo = frame.placed.take();
            let next = frame.candidates.get(frame.cursor).copied();
            if next.is_some() {
                frame.cursor += 1;
                frame.placed = next;
            }

            if let Some(v) = undo {
                self.unplace(v);
            }
            let Some(v) = next else {
                self.stack.pop();
                continue;
            };

            self.place(v);
            if self.linearization.len() == self.vertices.len() {
                return Some(self.current_order());
            }

            // An empty frontier before every vertex is placed means the
            // remaining vertices are on a cycle; the frame is popped at once.
            let candidates = self.frontier();
            self.stack.push(Frame {
                candidates,
                cursor: 0,
                placed: None,
            });
        }
    }
}

impl FusedIterator for SerialOrders {}

/// Outcome of a capped enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enumeration {
    /// Every serial order was produced.
    Complete(Vec<Vec<TransactionId>>),
    /// The cap was reached; the orders produced so far.
    Truncated(Vec<Vec<TransactionId>>),
}

impl Enumeration {
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }

    #[must_use]
    pub fn orders(&self) -> &[Vec<TransactionId>] {
        match self {
            Self::Complete(orders) | Self::Truncated(orders) => orders,
        }
    }

    #[must_use]
    pub fn into_orders(self) -> Vec<Vec<TransactionId>> {
        match self {
            Self::Complete(orders) | Self::Truncated(orders) => orders,
        }
    }
}

/// Collect the serial orders of `graph`, stopping after `limit` orders.
///
/// The result is [`Enumeration::Truncated`] only if more than `limit` orders
/// exist; reaching exactly `limit` orders is complete.
#[must_use]
pub fn collect_serial_orders(
    graph: &DiGraph<TransactionId>,
    limit: Option<usize>,
) -> Enumeration {
    let mut orders_iter = SerialOrders::new(graph);
    let Some(limit) = limit else {
        let orders: Vec<_> = orders_iter.collect();
        tracing::debug!(orders = orders.len(), "enumerated serial orders");
        return Enumeration::Complete(orders);
    };

    let orders: Vec<_> = orders_iter.by_ref().take(limit).collect();
    if orders_iter.next().is_some() {
        tracing::debug!(limit, "serial order enumeration truncated");
        Enumeration::Truncated(orders)
    } else {
        tracing::debug!(orders = orders.len(), "enumerated serial orders");
        Enumeration::Complete(orders)
    }
}
