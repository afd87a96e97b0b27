use std::cmp::Ordering;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use skypath::carriers::UNKNOWN_CARRIER;
use skypath::server::run_server;
use skypath::{
    leg_carrier, load_edge_table, load_node_table, path_cost, search, summarize_carriers,
    Constraints, EdgeRecord, Metric, RouteGraph, RouteQuery, SearchStage,
};

#[derive(Parser)]
#[command(name = "skypath")]
#[command(about = "Route search over aggregated U.S. airline survey data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the k best routes between two airports
    Route {
        /// Edge table (JSON array of route rows)
        #[arg(long)]
        edges: PathBuf,

        /// Origin airport code
        #[arg(long)]
        from: String,

        /// Destination airport code
        #[arg(long)]
        to: String,

        /// Cost metric: distance, fare, delay or co2
        #[arg(long, default_value = "fare")]
        metric: String,

        /// How many routes to return
        #[arg(short, long, default_value_t = 5, value_parser = clap::value_parser!(u8).range(1..=10))]
        k: u8,

        /// Lowest acceptable leg fare in USD
        #[arg(long, default_value_t = 0.0)]
        price_min: f64,

        /// Highest acceptable leg fare in USD
        #[arg(long, default_value_t = 800.0)]
        price_max: f64,

        /// Maximum acceptable delay rate
        #[arg(long, default_value_t = 0.4)]
        max_delay: f64,

        /// Also list direct connections from the origin after filtering
        #[arg(long)]
        direct: bool,
    },

    /// Rank airports by connectivity
    Airports {
        /// Edge table (JSON array of route rows)
        #[arg(long)]
        edges: PathBuf,

        /// Optional node table with per-airport aggregates
        #[arg(long)]
        nodes: Option<PathBuf>,

        /// How many airports to list
        #[arg(long, default_value_t = 20)]
        top: usize,
    },

    /// Start the HTTP query API
    Serve {
        /// Edge table (JSON array of route rows)
        #[arg(long)]
        edges: PathBuf,

        /// Port to listen on
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Route {
            edges,
            from,
            to,
            metric,
            k,
            price_min,
            price_max,
            max_delay,
            direct,
        } => {
            let records = load_edge_table(&edges)?;
            let metric: Metric = metric.parse()?;
            let constraints = Constraints {
                price_range: (price_min, price_max),
                max_delay,
            };
            run_route(&records, &from, &to, metric, k as usize, constraints, direct)?;
        }
        Commands::Airports { edges, nodes, top } => {
            let records = load_edge_table(&edges)?;
            let node_info = match nodes {
                Some(path) => load_node_table(path)?,
                None => Vec::new(),
            };
            rank_airports(&records, &node_info, top);
        }
        Commands::Serve { edges, port } => {
            let records = load_edge_table(&edges)?;
            println!("Loaded {} edge rows", records.len());
            run_server(records, port).await?;
        }
    }

    Ok(())
}

fn run_route(
    records: &[EdgeRecord],
    from: &str,
    to: &str,
    metric: Metric,
    k: usize,
    constraints: Constraints,
    direct: bool,
) -> Result<()> {
    let query = RouteQuery {
        origin: from.to_string(),
        dest: to.to_string(),
        metric,
        k,
        constraints,
    };

    let filtered_graph = RouteGraph::from_records(&constraints.apply(records));
    println!(
        "Airports remaining (filtered): {} | Routes remaining: {}",
        filtered_graph.node_count(),
        filtered_graph.edge_count()
    );

    let start = Instant::now();
    let outcome = search(records, &query)?;
    println!("Search finished in {:.3}s", start.elapsed().as_secs_f64());

    if outcome.paths.is_empty() {
        println!("\nNo path exists between {} and {} in the dataset.", from, to);
        return Ok(());
    }

    let full_graph = RouteGraph::from_records(records);
    println!("\nSuggested routes (k-shortest by {}):", metric);
    for path in &outcome.paths {
        let legs: Vec<Option<String>> = path
            .windows(2)
            .map(|leg| leg_carrier(records, &leg[0], &leg[1]))
            .collect();
        let known: Vec<&str> = legs.iter().flatten().map(String::as_str).collect();
        println!(
            "  {} | stops: {} | {}: {:.3} | airline: {}",
            path.join(" -> "),
            path.len().saturating_sub(2),
            metric,
            path_cost(&full_graph, path, metric),
            summarize_carriers(&known),
        );
    }
    if outcome.stage != SearchStage::Filtered {
        println!(
            "\nUsed fallback search: {} (filters relaxed to guarantee a path).",
            outcome.stage
        );
    }

    if let Some(graph_used) = &outcome.graph {
        let best = &outcome.paths[0];
        println!(
            "\nBest path ({}): {} | stops: {} | total: {:.3}",
            metric,
            best.join(" -> "),
            best.len().saturating_sub(2),
            path_cost(graph_used, best, metric)
        );
        for leg in best.windows(2) {
            let carrier = leg_carrier(records, &leg[0], &leg[1])
                .unwrap_or_else(|| UNKNOWN_CARRIER.to_string());
            match graph_used.edge(&leg[0], &leg[1]) {
                Some(attrs) => println!(
                    "  {} -> {} | {} | {:.0} mi | ${:.2} | delay {:.2} | {:.1} kg CO2",
                    leg[0], leg[1], carrier, attrs.distance, attrs.fare, attrs.delay, attrs.co2
                ),
                None => println!("  {} -> {} | {} | no leg data", leg[0], leg[1], carrier),
            }
        }
    }

    if direct {
        print_direct_connections(records, &filtered_graph, from);
    }

    Ok(())
}

fn print_direct_connections(records: &[EdgeRecord], filtered_graph: &RouteGraph, origin: &str) {
    let mut out = filtered_graph.direct_connections(origin);
    if out.is_empty() {
        println!("\nNo direct routes from {} after current filters.", origin);
        return;
    }
    out.sort_by(|a, b| {
        a.1.fare
            .partial_cmp(&b.1.fare)
            .unwrap_or(Ordering::Equal)
            .then(
                a.1.distance
                    .partial_cmp(&b.1.distance)
                    .unwrap_or(Ordering::Equal),
            )
    });
    println!("\nDirect connections from {} (after filters):", origin);
    for (to, attrs) in out {
        let carrier =
            leg_carrier(records, origin, to).unwrap_or_else(|| UNKNOWN_CARRIER.to_string());
        println!(
            "  {} | {} | {:.0} mi | ${:.2} | delay {:.2} | {:.1} kg CO2",
            to, carrier, attrs.distance, attrs.fare, attrs.delay, attrs.co2
        );
    }
}

fn rank_airports(records: &[EdgeRecord], node_info: &[skypath::NodeRecord], top: usize) {
    let graph = RouteGraph::from_records(records);
    let mut ranked: Vec<(&str, usize)> = graph
        .airports()
        .map(|airport| (airport, graph.degree(airport)))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    println!("Top {} airports by connectivity:", top.min(ranked.len()));
    for (airport, degree) in ranked.into_iter().take(top) {
        match node_info.iter().find(|n| n.airport == airport) {
            Some(n) => println!(
                "  {} | degree {} | carriers serving: {} | avg fare: {} | avg delay: {}",
                airport,
                degree,
                n.carriers_serving
                    .map_or("-".to_string(), |v| format!("{}", v as u64)),
                n.avg_out_fare_usd
                    .map_or("-".to_string(), |v| format!("${:.2}", v)),
                n.avg_out_delay_rate
                    .map_or("-".to_string(), |v| format!("{:.2}", v)),
            ),
            None => println!("  {} | degree {}", airport, degree),
        }
    }
}
