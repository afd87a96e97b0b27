//! Directed weighted graph over airports.

use std::fmt;
use std::str::FromStr;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use crate::error::Error;
use crate::records::EdgeRecord;

/// Per-edge attributes of the working graph, defaults resolved: a missing
/// numeric value becomes 0.0 here and nowhere later.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeAttrs {
    pub distance: f64,
    pub fare: f64,
    pub delay: f64,
    pub co2: f64,
    pub primary_carrier: String,
    pub carriers: String,
}

impl EdgeAttrs {
    fn from_record(r: &EdgeRecord) -> Self {
        Self {
            distance: r.distance.unwrap_or(0.0),
            fare: r.fare.unwrap_or(0.0),
            delay: r.delay.unwrap_or(0.0),
            co2: r.co2.unwrap_or(0.0),
            primary_carrier: r.primary_carrier.clone(),
            carriers: r.carriers.clone(),
        }
    }
}

/// Cost metric selecting which edge attribute weighs a leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Distance,
    Fare,
    Delay,
    Co2,
}

impl Metric {
    pub fn weight(&self, attrs: &EdgeAttrs) -> f64 {
        match self {
            Metric::Distance => attrs.distance,
            Metric::Fare => attrs.fare,
            Metric::Delay => attrs.delay,
            Metric::Co2 => attrs.co2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Distance => "distance",
            Metric::Fare => "fare",
            Metric::Delay => "delay",
            Metric::Co2 => "co2",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "distance" => Ok(Metric::Distance),
            "fare" => Ok(Metric::Fare),
            "delay" => Ok(Metric::Delay),
            "co2" => Ok(Metric::Co2),
            other => Err(Error::UnknownMetric(other.to_string())),
        }
    }
}

/// Directed graph of airports with a code -> index map on the side.
///
/// Graphs are rebuilt on demand from row subsets and never mutated after
/// construction. At most one edge is materialized per ordered airport pair;
/// when the source table carries duplicate rows for a pair, the last row
/// processed wins.
#[derive(Debug)]
pub struct RouteGraph {
    pub graph: DiGraph<String, EdgeAttrs>,
    node_map: FxHashMap<String, NodeIndex>,
}

impl RouteGraph {
    /// Build the directed graph: one edge per record.
    pub fn from_records(records: &[EdgeRecord]) -> Self {
        Self::build(records, false)
    }

    /// Build the undirected view used by the last-resort fallback: every
    /// record is materialized in both directions.
    pub fn undirected_from_records(records: &[EdgeRecord]) -> Self {
        Self::build(records, true)
    }

    fn build(records: &[EdgeRecord], both_directions: bool) -> Self {
        let mut graph = DiGraph::new();
        let mut node_map: FxHashMap<String, NodeIndex> = FxHashMap::default();

        for r in records {
            let a = Self::intern(&mut graph, &mut node_map, &r.origin);
            let b = Self::intern(&mut graph, &mut node_map, &r.dest);
            let attrs = EdgeAttrs::from_record(r);
            if graph.find_edge(a, b).is_some() {
                trace!(origin = %r.origin, dest = %r.dest, "duplicate edge row overwrites earlier one");
            }
            graph.update_edge(a, b, attrs.clone());
            if both_directions {
                graph.update_edge(b, a, attrs);
            }
        }

        Self { graph, node_map }
    }

    fn intern(
        graph: &mut DiGraph<String, EdgeAttrs>,
        node_map: &mut FxHashMap<String, NodeIndex>,
        code: &str,
    ) -> NodeIndex {
        if let Some(&idx) = node_map.get(code) {
            return idx;
        }
        let idx = graph.add_node(code.to_string());
        node_map.insert(code.to_string(), idx);
        idx
    }

    pub fn node(&self, code: &str) -> Option<NodeIndex> {
        self.node_map.get(code).copied()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.node_map.contains_key(code)
    }

    /// Translate a node-index path back to airport codes.
    pub fn codes(&self, path: &[NodeIndex]) -> Vec<String> {
        path.iter().map(|&idx| self.graph[idx].clone()).collect()
    }

    pub fn edge(&self, origin: &str, dest: &str) -> Option<&EdgeAttrs> {
        let a = self.node(origin)?;
        let b = self.node(dest)?;
        self.edge_between(a, b)
    }

    pub fn edge_between(&self, a: NodeIndex, b: NodeIndex) -> Option<&EdgeAttrs> {
        self.graph
            .find_edge(a, b)
            .and_then(|e| self.graph.edge_weight(e))
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of distinct airports connected to `code` in either direction.
    pub fn degree(&self, code: &str) -> usize {
        match self.node(code) {
            Some(idx) => {
                let neighbors: FxHashSet<NodeIndex> =
                    self.graph.neighbors_undirected(idx).collect();
                neighbors.len()
            }
            None => 0,
        }
    }

    pub fn airports(&self) -> impl Iterator<Item = &str> {
        self.graph.node_weights().map(String::as_str)
    }

    /// Outbound legs from `origin`, in edge insertion order.
    pub fn direct_connections(&self, origin: &str) -> Vec<(&str, &EdgeAttrs)> {
        let Some(idx) = self.node(origin) else {
            return Vec::new();
        };
        self.graph
            .edges(idx)
            .map(|e| (self.graph[e.target()].as_str(), e.weight()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(origin: &str, dest: &str, fare: Option<f64>) -> EdgeRecord {
        EdgeRecord {
            origin: origin.to_string(),
            dest: dest.to_string(),
            distance: Some(1.0),
            fare,
            delay: None,
            co2: None,
            quarter_tag: String::new(),
            primary_carrier: String::new(),
            carriers: String::new(),
        }
    }

    #[test]
    fn builds_one_edge_per_record_with_defaults() {
        let g = RouteGraph::from_records(&[rec("JFK", "ORD", None)]);
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 1);
        assert!(g.contains("JFK") && g.contains("ORD"));
        assert!(!g.contains("SFO"));
        let attrs = g.edge("JFK", "ORD").unwrap();
        assert_eq!(attrs.fare, 0.0);
        assert_eq!(attrs.distance, 1.0);
        assert!(g.edge("ORD", "JFK").is_none());
    }

    #[test]
    fn duplicate_rows_last_wins() {
        let g = RouteGraph::from_records(&[
            rec("JFK", "ORD", Some(100.0)),
            rec("JFK", "ORD", Some(250.0)),
        ]);
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.edge("JFK", "ORD").unwrap().fare, 250.0);
    }

    #[test]
    fn construction_is_idempotent() {
        let rows = vec![
            rec("JFK", "ORD", Some(100.0)),
            rec("ORD", "SFO", Some(150.0)),
            rec("JFK", "SFO", None),
        ];
        let a = RouteGraph::from_records(&rows);
        let b = RouteGraph::from_records(&rows);
        assert_eq!(a.node_count(), b.node_count());
        assert_eq!(a.edge_count(), b.edge_count());
        for airport in a.airports() {
            for (to, attrs) in a.direct_connections(airport) {
                assert_eq!(b.edge(airport, to), Some(attrs));
            }
        }
    }

    #[test]
    fn undirected_materializes_both_directions() {
        let g = RouteGraph::undirected_from_records(&[rec("JFK", "ORD", Some(100.0))]);
        assert_eq!(g.edge("JFK", "ORD").unwrap().fare, 100.0);
        assert_eq!(g.edge("ORD", "JFK").unwrap().fare, 100.0);
    }

    #[test]
    fn degree_counts_distinct_neighbors() {
        let g = RouteGraph::from_records(&[
            rec("ORD", "JFK", None),
            rec("JFK", "ORD", None),
            rec("ORD", "SFO", None),
        ]);
        assert_eq!(g.degree("ORD"), 2);
        assert_eq!(g.degree("SFO"), 1);
        assert_eq!(g.degree("LAX"), 0);
    }

    #[test]
    fn metric_parsing() {
        assert_eq!("fare".parse::<Metric>().unwrap(), Metric::Fare);
        assert_eq!("co2".parse::<Metric>().unwrap(), Metric::Co2);
        assert!("speed".parse::<Metric>().is_err());
    }
}
