//! Path cost evaluation against an explicit reference graph.

use crate::graph::{Metric, RouteGraph};

/// Total cost of `path` under `metric`, summed leg by leg on `graph`.
///
/// The reference graph is a required parameter: callers must pass the graph
/// that produced the path (or a superset built from the same rows). Legs
/// absent from the reference graph contribute 0.0.
pub fn path_cost(graph: &RouteGraph, path: &[String], metric: Metric) -> f64 {
    path.windows(2)
        .map(|leg| {
            graph
                .edge(&leg[0], &leg[1])
                .map(|attrs| metric.weight(attrs))
                .unwrap_or(0.0)
        })
        .sum()
}
