//! Error types for the skypath library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for skypath operations.
///
/// An unreachable airport pair is NOT an error: the search reports it through
/// its `no-path` stage label. Malformed table rows are dropped during
/// normalization, not raised.
#[derive(Debug, Error)]
pub enum Error {
    /// Table file is absent or unreadable
    #[error("table not found: {path}")]
    MissingTable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Table file exists but is not a JSON array of row objects
    #[error("table {path} is not a JSON array of rows")]
    MalformedTable {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No row survived normalization, so no query can be answered
    #[error("edge table has no usable rows (string Origin and Dest required)")]
    EmptyTable,

    /// Origin and destination must differ; a one-airport route has no legs
    #[error("origin and destination are both {0}")]
    SameAirport(String),

    /// Requested route count outside the supported 1..=10 window
    #[error("route count {0} outside supported range 1..=10")]
    RouteCountOutOfRange(usize),

    /// Metric name not one of distance, fare, delay, co2
    #[error("unknown metric '{0}' (expected distance, fare, delay or co2)")]
    UnknownMetric(String),
}

/// Convenience result type for skypath operations.
pub type Result<T> = std::result::Result<T, Error>;
