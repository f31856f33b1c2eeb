use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::{HashMap, HashSet};

/// Directed graph backed by an adjacency map.
///
/// Each vertex of type `T` maps to the set of its outgoing neighbors, so
/// parallel edges collapse into one. Vertices are added implicitly when they
/// appear in an edge, or explicitly via [`add_vertex`](Self::add_vertex).
///
/// Used as the simple-graph projection of a conflict multigraph, where only
/// reachability matters.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct DiGraph<T>
where
    T: Hash + Eq + Clone + Debug,
{
    /// Maps each vertex to the set of vertices it has edges to.
    pub adj_map: HashMap<T, HashSet<T>>,
}

impl<T> DiGraph<T>
where
    T: Hash + Eq + Clone + Debug,
{
    /// Inserts a directed edge from `source` to `target`.
    ///
    /// Both vertices are added to the graph if not already present.
    /// Returns `true` if the edge was not present before.
    pub fn add_edge(&mut self, source: T, target: T) -> bool {
        let added = self
            .adj_map
            .entry(source)
            .or_default()
            .insert(target.clone());
        self.adj_map.entry(target).or_default();
        added
    }

    /// Adds a vertex with no outgoing edges (if not already present).
    pub fn add_vertex(&mut self, source: T) {
        self.adj_map.entry(source).or_default();
    }

    /// Returns `true` if an edge from `source` to `target` exists.
    pub fn has_edge(&self, source: &T, target: &T) -> bool {
        self.adj_map
            .get(source)
            .is_some_and(|neighbor| neighbor.contains(target))
    }

    /// Outgoing neighbors of `source`; empty for unknown vertices.
    pub fn successors(&self, source: &T) -> impl Iterator<Item = &T> {
        self.adj_map.get(source).into_iter().flatten()
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.adj_map.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.adj_map.values().map(HashSet::len).sum()
    }

    /// Number of incoming edges of every vertex.
    #[must_use]
    pub fn in_degrees(&self) -> HashMap<T, usize> {
        let mut in_degree: HashMap<T, usize> = self
            .adj_map
            .keys()
            .map(|vertex| (vertex.clone(), 0))
            .collect();
        for neighbors in self.adj_map.values() {
            for neighbor in neighbors {
                *in_degree.entry(neighbor.clone()).or_insert(0) += 1;
            }
        }
        in_degree
    }

    /// Runs Kahn's reduction and returns the removed vertices in removal
    /// order. Vertices that remain lie on, or downstream of, a cycle.
    fn kahn_order(&self) -> Vec<T> {
        let mut in_degree = self.in_degrees();

        let mut queue: Vec<T> = in_degree
            .iter()
            .filter(|(_, &degree)| degree == 0)
            .map(|(vertex, _)| vertex.clone())
            .collect();

        let mut result = Vec::with_capacity(self.adj_map.len());

        while let Some(vertex) = queue.pop() {
            for neighbor in self.successors(&vertex) {
                if let Some(degree) = in_degree.get_mut(neighbor) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push(neighbor.clone());
                    }
                }
            }
            result.push(vertex);
        }

        result
    }

    /// Detects if the graph contains a cycle using Kahn's algorithm.
    /// Time complexity: O(V+E)
    #[must_use]
    pub fn has_cycle(&self) -> bool {
        self.kahn_order().len() != self.adj_map.len()
    }

    /// Returns `true` if the graph has no cycles.
    #[must_use]
    pub fn is_acyclic(&self) -> bool {
        !self.has_cycle()
    }
}

impl<T> DiGraph<T>
where
    T: Hash + Eq + Clone + Debug + Ord,
{
    /// Returns an edge `(a, b)` that participates in a cycle, or `None` if acyclic.
    ///
    /// Kahn's reduction strips every vertex that is not on or downstream of a
    /// cycle; what is left has in-degree at least one from within the
    /// remainder, so walking predecessors from any remaining vertex must
    /// revisit one. The walk starts at the smallest remaining vertex and
    /// always steps to the smallest remaining predecessor. Of the cycle it
    /// closes, the edge leaving the smallest vertex is returned, so the
    /// witness does not depend on hash iteration order.
    /// Time complexity: O((V+E) log V).
    #[must_use]
    pub fn find_cycle_edge(&self) -> Option<(T, T)> {
        let removed: HashSet<T> = self.kahn_order().into_iter().collect();
        if removed.len() == self.adj_map.len() {
            return None;
        }

        let mut predecessor: BTreeMap<&T, &T> = BTreeMap::new();
        for (src, neighbors) in &self.adj_map {
            if removed.contains(src) {
                continue;
            }
            for dst in neighbors.iter().filter(|dst| !removed.contains(*dst)) {
                predecessor
                    .entry(dst)
                    .and_modify(|min| {
                        if src < *min {
                            *min = src;
                        }
                    })
                    .or_insert(src);
            }
        }

        let mut current = *predecessor.keys().next()?;
        let mut visited: BTreeSet<&T> = BTreeSet::new();
        while visited.insert(current) {
            current = *predecessor.get(current)?;
        }

        // `current` is on the cycle; go around it once.
        let mut edge = (*predecessor.get(current)?, current);
        let mut vertex = edge.0;
        while vertex != current {
            let source = *predecessor.get(vertex)?;
            if source < edge.0 {
                edge = (source, vertex);
            }
            vertex = source;
        }
        Some((edge.0.clone(), edge.1.clone()))
    }
}
