//! k-shortest route search with a staged constraint-relaxation ladder.
//!
//! Four independent stages are tried in order, each building its own graph
//! from a differently filtered row subset. The first stage that yields any
//! path wins; a hop-count search on the undirected full graph is the last
//! resort, so a query only comes back empty when the two airports are not
//! connected in the data at all.

use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

use crate::carriers::{leg_carrier, summarize_carriers, UNKNOWN_CARRIER};
use crate::cost::path_cost;
use crate::error::{Error, Result};
use crate::filter::{delay_within, Constraints};
use crate::graph::{Metric, RouteGraph};
use crate::paths::{shortest_path_by_hops, ShortestSimplePaths};
use crate::records::EdgeRecord;

/// Most routes a single query may request.
pub const MAX_ROUTES: usize = 10;

/// Which rung of the relaxation ladder produced a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchStage {
    Filtered,
    PriceOnly,
    DelayOnly,
    NoFilters,
    UndirectedFallback,
    NoPath,
}

impl SearchStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchStage::Filtered => "filtered",
            SearchStage::PriceOnly => "price-only",
            SearchStage::DelayOnly => "delay-only",
            SearchStage::NoFilters => "no-filters",
            SearchStage::UndirectedFallback => "undirected-fallback",
            SearchStage::NoPath => "no-path",
        }
    }
}

impl fmt::Display for SearchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A route query as the caller poses it.
#[derive(Debug, Clone)]
pub struct RouteQuery {
    pub origin: String,
    pub dest: String,
    pub metric: Metric,
    pub k: usize,
    pub constraints: Constraints,
}

/// Paths plus the graph that produced them.
///
/// Costs for these paths must be computed against `graph` (or a superset
/// built from the same rows), never against an ambient default: graphs built
/// from different row subsets can disagree on an edge's attributes when the
/// table carries duplicate rows.
pub struct SearchOutcome {
    pub paths: Vec<Vec<String>>,
    pub stage: SearchStage,
    pub graph: Option<RouteGraph>,
}

/// Run the relaxation ladder and return up to `k` simple paths.
///
/// Stages are independent, not cumulative; a stage whose graph lacks either
/// endpoint is skipped. The enumeration is lazy, so no stage computes paths
/// beyond the `k` it returns.
pub fn search(records: &[EdgeRecord], query: &RouteQuery) -> Result<SearchOutcome> {
    if query.origin == query.dest {
        return Err(Error::SameAirport(query.origin.clone()));
    }
    if query.k < 1 || query.k > MAX_ROUTES {
        return Err(Error::RouteCountOutOfRange(query.k));
    }

    let stages = [
        (SearchStage::Filtered, query.constraints.apply(records)),
        (SearchStage::PriceOnly, query.constraints.price_only(records)),
        (SearchStage::DelayOnly, delay_within(records, 1.0)),
        (SearchStage::NoFilters, records.to_vec()),
    ];

    for (stage, rows) in stages {
        let graph = RouteGraph::from_records(&rows);
        let (Some(s), Some(t)) = (graph.node(&query.origin), graph.node(&query.dest)) else {
            debug!(stage = %stage, "endpoint missing from stage graph, relaxing");
            continue;
        };
        let paths: Vec<Vec<String>> = ShortestSimplePaths::new(&graph, s, t, query.metric)
            .take(query.k)
            .map(|(_, path)| graph.codes(&path))
            .collect();
        if !paths.is_empty() {
            info!(stage = %stage, routes = paths.len(), metric = %query.metric, "route search succeeded");
            return Ok(SearchOutcome {
                paths,
                stage,
                graph: Some(graph),
            });
        }
        debug!(stage = %stage, "no path at this stage, relaxing");
    }

    let undirected = RouteGraph::undirected_from_records(records);
    if let (Some(s), Some(t)) = (
        undirected.node(&query.origin),
        undirected.node(&query.dest),
    ) {
        if let Some(path) = shortest_path_by_hops(&undirected, s, t) {
            info!(origin = %query.origin, dest = %query.dest, "undirected fallback produced a path");
            return Ok(SearchOutcome {
                paths: vec![undirected.codes(&path)],
                stage: SearchStage::UndirectedFallback,
                graph: Some(undirected),
            });
        }
    }

    info!(origin = %query.origin, dest = %query.dest, "airports are not connected in the dataset");
    Ok(SearchOutcome {
        paths: Vec::new(),
        stage: SearchStage::NoPath,
        graph: None,
    })
}

/// One suggested route, scored and attributed.
#[derive(Debug, Clone, Serialize)]
pub struct Route {
    pub nodes: Vec<String>,
    pub stops: usize,
    pub cost: f64,
    pub leg_carriers: Vec<String>,
    pub suggested_carrier: String,
}

/// Result set of a full query.
#[derive(Debug, Serialize)]
pub struct QueryResult {
    pub routes: Vec<Route>,
    pub stage: SearchStage,
}

/// The full query contract: run the ladder, then score every returned path
/// against the graph of the complete raw table (so the reported numbers are
/// comparable across stages) and attach per-leg carriers and the per-route
/// carrier summary. Whenever `stage` is not `filtered`, the routes may
/// violate the caller's original constraints.
pub fn run_query(records: &[EdgeRecord], query: &RouteQuery) -> Result<QueryResult> {
    let outcome = search(records, query)?;
    let full_graph = RouteGraph::from_records(records);

    let routes = outcome
        .paths
        .iter()
        .map(|path| {
            let carriers: Vec<Option<String>> = path
                .windows(2)
                .map(|leg| leg_carrier(records, &leg[0], &leg[1]))
                .collect();
            let known: Vec<&str> = carriers
                .iter()
                .flatten()
                .map(String::as_str)
                .collect();
            let suggested_carrier = summarize_carriers(&known);
            Route {
                nodes: path.clone(),
                stops: path.len().saturating_sub(2),
                cost: path_cost(&full_graph, path, query.metric),
                leg_carriers: carriers
                    .into_iter()
                    .map(|c| c.unwrap_or_else(|| UNKNOWN_CARRIER.to_string()))
                    .collect(),
                suggested_carrier,
            }
        })
        .collect();

    Ok(QueryResult {
        routes,
        stage: outcome.stage,
    })
}
