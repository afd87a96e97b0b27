use std::io::Write;

use skypath::{
    load_edge_table, path_cost, run_query, search, Constraints, Metric, RouteQuery, SearchStage,
};

const SAMPLE_TABLE: &str = r#"[
    {"Origin": "JFK", "Dest": "ORD", "avg_distance_miles": 740.0, "wavg_itin_fare_usd": 100.0,
     "delay_rate": 0.1, "est_emissions_kgco2": 90.0, "quarter_tag": "2025_Q1",
     "primary_carrier": "AA", "carriers": "AA,B6"},
    {"Origin": "ORD", "Dest": "SFO", "avg_distance_miles": 1846.0, "wavg_itin_fare_usd": 150.0,
     "delay_rate": 0.05, "est_emissions_kgco2": 210.0, "quarter_tag": "2025_Q1",
     "primary_carrier": "UA", "carriers": "UA"},
    {"Origin": "JFK", "Dest": "SFO", "avg_distance_miles": 2586.0, "wavg_itin_fare_usd": 400.0,
     "delay_rate": 0.5, "est_emissions_kgco2": 310.0, "quarter_tag": "2025_Q1",
     "primary_carrier": "DL", "carriers": "DL,AA"}
]"#;

fn sample_query(price_range: (f64, f64), max_delay: f64) -> RouteQuery {
    RouteQuery {
        origin: "JFK".to_string(),
        dest: "SFO".to_string(),
        metric: Metric::Fare,
        k: 5,
        constraints: Constraints {
            price_range,
            max_delay,
        },
    }
}

fn write_table(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", content).unwrap();
    file
}

#[test]
fn filtered_stage_finds_the_cheap_connection() {
    let table = write_table(SAMPLE_TABLE);
    let records = load_edge_table(table.path()).unwrap();

    let result = run_query(&records, &sample_query((0.0, 300.0), 0.3)).unwrap();
    assert_eq!(result.stage, SearchStage::Filtered);
    let best = &result.routes[0];
    assert_eq!(best.nodes, vec!["JFK", "ORD", "SFO"]);
    assert_eq!(best.cost, 250.0);
    assert_eq!(best.leg_carriers, vec!["AA", "UA"]);
}

#[test]
fn exhausted_filters_fall_through_the_ladder() {
    let table = write_table(SAMPLE_TABLE);
    let records = load_edge_table(table.path()).unwrap();

    // A [0,50] price window excludes every leg; the ladder must end at
    // no-filters and still produce a route.
    let result = run_query(&records, &sample_query((0.0, 50.0), 0.3)).unwrap();
    assert_eq!(result.stage, SearchStage::NoFilters);
    assert!(!result.routes.is_empty());
    assert_eq!(result.routes[0].nodes, vec!["JFK", "ORD", "SFO"]);
}

#[test]
fn unknown_airport_reports_no_path() {
    let table = write_table(SAMPLE_TABLE);
    let records = load_edge_table(table.path()).unwrap();

    let query = RouteQuery {
        origin: "JFK".to_string(),
        dest: "XXX".to_string(),
        ..sample_query((0.0, 1000.0), 1.0)
    };
    let result = run_query(&records, &query).unwrap();
    assert_eq!(result.stage, SearchStage::NoPath);
    assert!(result.routes.is_empty());
}

#[test]
fn direct_no_filter_edge_is_never_no_path() {
    let table = write_table(SAMPLE_TABLE);
    let records = load_edge_table(table.path()).unwrap();

    // Whatever the constraints, a directly connected pair must resolve.
    for (price_range, max_delay) in [((0.0, 1.0), 0.0), ((999.0, 1000.0), 0.01)] {
        let result = run_query(&records, &sample_query(price_range, max_delay)).unwrap();
        assert_ne!(result.stage, SearchStage::NoPath);
        assert!(!result.routes.is_empty());
    }
}

#[test]
fn returned_paths_are_simple_sorted_and_edge_connected() {
    let table = write_table(SAMPLE_TABLE);
    let records = load_edge_table(table.path()).unwrap();

    let query = sample_query((0.0, 1000.0), 1.0);
    let outcome = search(&records, &query).unwrap();
    let graph = outcome.graph.as_ref().unwrap();

    let mut last_cost = f64::NEG_INFINITY;
    for path in &outcome.paths {
        assert!(path.len() >= 2);
        // No repeated node.
        for (i, a) in path.iter().enumerate() {
            for b in &path[i + 1..] {
                assert_ne!(a, b, "repeated node in {:?}", path);
            }
        }
        // Every consecutive pair is an edge of the producing graph.
        for leg in path.windows(2) {
            assert!(
                graph.edge(&leg[0], &leg[1]).is_some(),
                "missing edge {:?} in producing graph",
                leg
            );
        }
        // Costs non-decreasing against the graph that produced the paths.
        let cost = path_cost(graph, path, query.metric);
        assert!(cost >= last_cost);
        last_cost = cost;
    }
}

#[test]
fn reverse_only_pair_resolves_through_undirected_fallback() {
    let table = write_table(
        r#"[{"Origin": "SFO", "Dest": "JFK", "wavg_itin_fare_usd": 250.0, "delay_rate": 0.2,
             "primary_carrier": "UA", "carriers": "UA"}]"#,
    );
    let records = load_edge_table(table.path()).unwrap();

    let result = run_query(&records, &sample_query((0.0, 1000.0), 1.0)).unwrap();
    assert_eq!(result.stage, SearchStage::UndirectedFallback);
    assert_eq!(result.routes[0].nodes, vec!["JFK", "SFO"]);
}

#[test]
fn malformed_rows_are_dropped_on_load() {
    let table = write_table(
        r#"[
            {"Origin": "JFK", "Dest": "ORD", "wavg_itin_fare_usd": 100.0},
            {"Origin": 123, "Dest": "ORD"},
            {"Origin": "LGA"}
        ]"#,
    );
    let records = load_edge_table(table.path()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].origin, "JFK");
}

#[test]
fn metric_selection_changes_the_winner() {
    // Two JFK->SFO options: cheap but long vs short but expensive.
    let table = write_table(
        r#"[
            {"Origin": "JFK", "Dest": "ORD", "avg_distance_miles": 740.0, "wavg_itin_fare_usd": 50.0},
            {"Origin": "ORD", "Dest": "SFO", "avg_distance_miles": 1846.0, "wavg_itin_fare_usd": 50.0},
            {"Origin": "JFK", "Dest": "SFO", "avg_distance_miles": 2475.0, "wavg_itin_fare_usd": 400.0}
        ]"#,
    );
    let records = load_edge_table(table.path()).unwrap();

    let by_fare = run_query(
        &records,
        &RouteQuery {
            metric: Metric::Fare,
            ..sample_query((0.0, 1000.0), 1.0)
        },
    )
    .unwrap();
    assert_eq!(by_fare.routes[0].nodes, vec!["JFK", "ORD", "SFO"]);

    let by_distance = run_query(
        &records,
        &RouteQuery {
            metric: Metric::Distance,
            ..sample_query((0.0, 1000.0), 1.0)
        },
    )
    .unwrap();
    assert_eq!(by_distance.routes[0].nodes, vec!["JFK", "SFO"]);
}
