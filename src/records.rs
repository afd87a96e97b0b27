//! Edge and node table ingestion.
//!
//! The upstream survey ETL hands over two JSON tables (arrays of row
//! objects). Normalization happens exactly once, here: every consumer
//! downstream works with fully typed records and never re-derives defaults.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// One row of the edge table after normalization.
///
/// Numeric fields keep `None` for missing values rather than collapsing to a
/// default: the constraint filter treats a missing fare as infinitely
/// expensive while the graph builder treats it as 0.0, and both need to see
/// the difference.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRecord {
    pub origin: String,
    pub dest: String,
    pub distance: Option<f64>,
    pub fare: Option<f64>,
    pub delay: Option<f64>,
    pub co2: Option<f64>,
    pub quarter_tag: String,
    pub primary_carrier: String,
    pub carriers: String,
}

/// One row of the node table. Only the presentation layer reads these; the
/// search core derives everything it needs from the edge table.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeRecord {
    #[serde(default)]
    pub airport: String,
    #[serde(default)]
    pub degree: Option<f64>,
    #[serde(default)]
    pub carriers_serving: Option<f64>,
    #[serde(default)]
    pub top_carriers: Option<String>,
    #[serde(default)]
    pub avg_out_fare_usd: Option<f64>,
    #[serde(default)]
    pub avg_out_delay_rate: Option<f64>,
    #[serde(default)]
    pub avg_out_distance_miles: Option<f64>,
}

fn string_field(row: &Value, key: &str) -> Option<String> {
    match row.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    }
}

fn text_field(row: &Value, key: &str) -> String {
    string_field(row, key).unwrap_or_default()
}

fn numeric_field(row: &Value, key: &str) -> Option<f64> {
    row.get(key).and_then(Value::as_f64)
}

/// Normalize one raw row. Returns `None` when Origin or Dest is not a
/// non-empty JSON string; such rows are malformed upstream data and are
/// skipped rather than reported.
pub fn normalize_edge(row: &Value) -> Option<EdgeRecord> {
    let origin = string_field(row, "Origin").filter(|s| !s.is_empty())?;
    let dest = string_field(row, "Dest").filter(|s| !s.is_empty())?;

    let carriers = text_field(row, "carriers");
    let mut primary_carrier = text_field(row, "primary_carrier");
    if primary_carrier.trim().is_empty() && !carriers.trim().is_empty() {
        primary_carrier = carriers
            .split(',')
            .next()
            .unwrap_or("")
            .trim()
            .to_string();
    }

    Some(EdgeRecord {
        origin,
        dest,
        distance: numeric_field(row, "avg_distance_miles"),
        fare: numeric_field(row, "wavg_itin_fare_usd"),
        delay: numeric_field(row, "delay_rate"),
        co2: numeric_field(row, "est_emissions_kgco2"),
        quarter_tag: text_field(row, "quarter_tag"),
        primary_carrier,
        carriers,
    })
}

fn read_rows(path: &Path) -> Result<Vec<Value>> {
    let file = File::open(path).map_err(|source| Error::MissingTable {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| Error::MalformedTable {
        path: path.to_path_buf(),
        source,
    })
}

/// Load and normalize the edge table. Fails when the file is missing or when
/// no row survives normalization; queries cannot run without edges.
pub fn load_edge_table<P: AsRef<Path>>(path: P) -> Result<Vec<EdgeRecord>> {
    let path = path.as_ref();
    let rows = read_rows(path)?;
    let total = rows.len();

    let records: Vec<EdgeRecord> = rows.iter().filter_map(normalize_edge).collect();
    let dropped = total - records.len();
    if dropped > 0 {
        debug!(dropped, total, "skipped rows without string endpoints");
    }
    if records.is_empty() {
        return Err(Error::EmptyTable);
    }
    info!(rows = records.len(), path = %path.display(), "loaded edge table");
    Ok(records)
}

/// Load the node table. An empty table is fine here; nothing in the search
/// path depends on it.
pub fn load_node_table<P: AsRef<Path>>(path: P) -> Result<Vec<NodeRecord>> {
    let path = path.as_ref();
    let rows = read_rows(path)?;
    let records: Vec<NodeRecord> = rows
        .into_iter()
        .filter_map(|row| serde_json::from_value(row).ok())
        .collect();
    info!(rows = records.len(), path = %path.display(), "loaded node table");
    Ok(records)
}
