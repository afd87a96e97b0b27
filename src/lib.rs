pub mod carriers;
pub mod cost;
pub mod error;
pub mod filter;
pub mod graph;
pub mod paths;
pub mod records;
pub mod search;
pub mod server;

pub use carriers::{leg_carrier, summarize_carriers};
pub use cost::path_cost;
pub use error::{Error, Result};
pub use filter::Constraints;
pub use graph::{EdgeAttrs, Metric, RouteGraph};
pub use records::{load_edge_table, load_node_table, EdgeRecord, NodeRecord};
pub use search::{run_query, search, QueryResult, Route, RouteQuery, SearchOutcome, SearchStage};
