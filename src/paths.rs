//! Lazy enumeration of simple paths in non-decreasing weight order.
//!
//! `ShortestSimplePaths` is Yen's algorithm as an iterator: repeated Dijkstra
//! runs with banned nodes and edges, candidates held in a heap, nothing
//! computed past what the caller consumes. Taking `k` items and dropping the
//! iterator leaves the rest of the (combinatorially large) path space
//! untouched.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::graph::{Metric, RouteGraph};

/// Heap entry for the Dijkstra runs. Reverse ordering for min-heap.
struct DijkstraEntry {
    node: NodeIndex,
    cost: f64,
}

impl PartialEq for DijkstraEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost
    }
}

impl Eq for DijkstraEntry {}

impl PartialOrd for DijkstraEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DijkstraEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
    }
}

/// Dijkstra from `source` to `target`, skipping banned nodes and banned
/// directed edges. Paths never revisit a node: relaxation only ever improves
/// strictly, so zero-weight edges cannot close a cycle.
fn shortest_path_excluding(
    graph: &RouteGraph,
    source: NodeIndex,
    target: NodeIndex,
    metric: Metric,
    banned_nodes: &FxHashSet<NodeIndex>,
    banned_edges: &FxHashSet<(NodeIndex, NodeIndex)>,
) -> Option<(f64, Vec<NodeIndex>)> {
    let mut dist: FxHashMap<NodeIndex, f64> = FxHashMap::default();
    let mut came_from: FxHashMap<NodeIndex, NodeIndex> = FxHashMap::default();
    let mut heap = BinaryHeap::new();

    dist.insert(source, 0.0);
    heap.push(DijkstraEntry {
        node: source,
        cost: 0.0,
    });

    while let Some(DijkstraEntry { node, cost }) = heap.pop() {
        if node == target {
            let mut path = vec![target];
            let mut current = target;
            while let Some(&prev) = came_from.get(&current) {
                path.push(prev);
                current = prev;
            }
            path.reverse();
            return Some((cost, path));
        }
        if cost > dist.get(&node).copied().unwrap_or(f64::INFINITY) {
            continue; // stale heap entry
        }
        for edge in graph.graph.edges(node) {
            let next = edge.target();
            if banned_nodes.contains(&next) || banned_edges.contains(&(node, next)) {
                continue;
            }
            let next_cost = cost + metric.weight(edge.weight());
            if next_cost < dist.get(&next).copied().unwrap_or(f64::INFINITY) {
                dist.insert(next, next_cost);
                came_from.insert(next, node);
                heap.push(DijkstraEntry {
                    node: next,
                    cost: next_cost,
                });
            }
        }
    }

    None
}

/// Candidate path waiting in the Yen heap. Min-ordered by total cost, then by
/// discovery order so equal-cost paths come out in the order they were found.
struct Candidate {
    cost: f64,
    seq: u64,
    path: Vec<NodeIndex>,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Iterator over simple paths from `source` to `target` in strictly
/// non-decreasing total weight under `metric`.
pub struct ShortestSimplePaths<'a> {
    graph: &'a RouteGraph,
    source: NodeIndex,
    target: NodeIndex,
    metric: Metric,
    found: Vec<Vec<NodeIndex>>,
    candidates: BinaryHeap<Candidate>,
    enqueued: FxHashSet<Vec<NodeIndex>>,
    seq: u64,
    done: bool,
}

impl<'a> ShortestSimplePaths<'a> {
    pub fn new(graph: &'a RouteGraph, source: NodeIndex, target: NodeIndex, metric: Metric) -> Self {
        Self {
            graph,
            source,
            target,
            metric,
            found: Vec::new(),
            candidates: BinaryHeap::new(),
            enqueued: FxHashSet::default(),
            seq: 0,
            done: false,
        }
    }

    fn path_cost(&self, path: &[NodeIndex]) -> f64 {
        path.windows(2)
            .map(|leg| {
                self.graph
                    .edge_between(leg[0], leg[1])
                    .map(|attrs| self.metric.weight(attrs))
                    .unwrap_or(0.0)
            })
            .sum()
    }

    /// Spur off every prefix of the most recently accepted path, banning the
    /// deviating edges of earlier results that share the prefix and the
    /// prefix's own interior nodes.
    fn push_spur_candidates(&mut self, prev: &[NodeIndex]) {
        for i in 0..prev.len() - 1 {
            let spur = prev[i];
            let root = &prev[..=i];

            let mut banned_edges: FxHashSet<(NodeIndex, NodeIndex)> = FxHashSet::default();
            for p in &self.found {
                if p.len() > i + 1 && p[..=i] == *root {
                    banned_edges.insert((p[i], p[i + 1]));
                }
            }
            let banned_nodes: FxHashSet<NodeIndex> = root[..i].iter().copied().collect();

            if let Some((_, spur_path)) = shortest_path_excluding(
                self.graph,
                spur,
                self.target,
                self.metric,
                &banned_nodes,
                &banned_edges,
            ) {
                let mut candidate: Vec<NodeIndex> = root[..i].to_vec();
                candidate.extend(spur_path);
                if self.enqueued.insert(candidate.clone()) {
                    let cost = self.path_cost(&candidate);
                    self.seq += 1;
                    self.candidates.push(Candidate {
                        cost,
                        seq: self.seq,
                        path: candidate,
                    });
                }
            }
        }
    }
}

impl Iterator for ShortestSimplePaths<'_> {
    type Item = (f64, Vec<NodeIndex>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if self.found.is_empty() {
            let empty_nodes = FxHashSet::default();
            let empty_edges = FxHashSet::default();
            return match shortest_path_excluding(
                self.graph,
                self.source,
                self.target,
                self.metric,
                &empty_nodes,
                &empty_edges,
            ) {
                Some((cost, path)) => {
                    self.enqueued.insert(path.clone());
                    self.found.push(path.clone());
                    Some((cost, path))
                }
                None => {
                    self.done = true;
                    None
                }
            };
        }

        let prev = self.found.last().cloned().unwrap_or_default();
        self.push_spur_candidates(&prev);

        match self.candidates.pop() {
            Some(candidate) => {
                self.found.push(candidate.path.clone());
                Some((candidate.cost, candidate.path))
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

/// Unweighted shortest path by hop count, used by the undirected fallback.
/// The caller passes a graph with both directions materialized, so following
/// out-edges covers the undirected neighborhood.
pub fn shortest_path_by_hops(
    graph: &RouteGraph,
    source: NodeIndex,
    target: NodeIndex,
) -> Option<Vec<NodeIndex>> {
    let mut came_from: FxHashMap<NodeIndex, NodeIndex> = FxHashMap::default();
    let mut visited: FxHashSet<NodeIndex> = FxHashSet::default();
    let mut queue = VecDeque::new();

    visited.insert(source);
    queue.push_back(source);

    while let Some(node) = queue.pop_front() {
        if node == target {
            let mut path = vec![target];
            let mut current = target;
            while let Some(&prev) = came_from.get(&current) {
                path.push(prev);
                current = prev;
            }
            path.reverse();
            return Some(path);
        }
        for edge in graph.graph.edges(node) {
            let next = edge.target();
            if visited.insert(next) {
                came_from.insert(next, node);
                queue.push_back(next);
            }
        }
    }

    None
}
