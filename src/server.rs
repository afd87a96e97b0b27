//! HTTP query API.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use crate::error::Error;
use crate::filter::Constraints;
use crate::graph::Metric;
use crate::records::EdgeRecord;
use crate::search::{run_query, RouteQuery};

#[derive(OpenApi)]
#[openapi(
    paths(routes_handler, health),
    components(schemas(RoutesRequest, RoutesResponse, RouteEntry, HealthResponse, ErrorResponse)),
    info(
        title = "SkyPath API",
        description = "k-shortest flight routes with constraint relaxation"
    )
)]
struct ApiDoc;

/// Shared, read-only query state: the normalized edge table.
pub struct ServerState {
    pub records: Vec<EdgeRecord>,
}

fn default_k() -> usize {
    5
}

fn default_price_range() -> [f64; 2] {
    [0.0, f64::INFINITY]
}

fn default_max_delay() -> f64 {
    1.0
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RoutesRequest {
    /// Origin airport code
    #[schema(example = "JFK")]
    pub origin: String,

    /// Destination airport code
    #[schema(example = "SFO")]
    pub dest: String,

    /// Cost metric: distance, fare, delay or co2
    #[schema(example = "fare")]
    pub metric: String,

    /// How many routes to return (1-10)
    #[schema(example = 5)]
    #[serde(default = "default_k")]
    pub k: usize,

    /// Inclusive fare range in USD; legs without fare data fail any finite upper bound
    #[schema(example = json!([0.0, 800.0]))]
    #[serde(default = "default_price_range")]
    pub price_range: [f64; 2],

    /// Maximum acceptable delay rate in [0,1]
    #[schema(example = 0.4)]
    #[serde(default = "default_max_delay")]
    pub max_delay: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RouteEntry {
    /// Airport codes from origin to destination
    pub nodes: Vec<String>,

    /// Intermediate stops on the route
    pub stops: usize,

    /// Total cost under the requested metric, scored on the full raw graph
    pub cost: f64,

    /// Operating carrier per leg, "(n/a)" where unresolved
    pub leg_carriers: Vec<String>,

    /// Dominant carrier across the route's legs
    pub suggested_carrier: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoutesResponse {
    /// Which relaxation stage produced the result; anything but "filtered"
    /// means the caller's constraints were relaxed to find a path
    #[schema(example = "filtered")]
    pub stage: String,

    pub routes: Vec<RouteEntry>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,

    /// Rows in the loaded edge table
    pub edges: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

#[utoipa::path(
    post,
    path = "/routes",
    request_body = RoutesRequest,
    responses(
        (status = 200, description = "Route search completed (an empty route list means the airports are not connected)", body = RoutesResponse),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse),
        (status = 500, description = "Server error", body = ErrorResponse)
    ),
    tag = "routing"
)]
async fn routes_handler(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<RoutesRequest>,
) -> Result<Json<RoutesResponse>, (StatusCode, Json<ErrorResponse>)> {
    let metric: Metric = req
        .metric
        .parse()
        .map_err(|e: Error| bad_request(e.to_string()))?;

    let query = RouteQuery {
        origin: req.origin,
        dest: req.dest,
        metric,
        k: req.k,
        constraints: Constraints {
            price_range: (req.price_range[0], req.price_range[1]),
            max_delay: req.max_delay,
        },
    };

    match run_query(&state.records, &query) {
        Ok(result) => Ok(Json(RoutesResponse {
            stage: result.stage.to_string(),
            routes: result
                .routes
                .into_iter()
                .map(|r| RouteEntry {
                    nodes: r.nodes,
                    stops: r.stops,
                    cost: r.cost,
                    leg_carriers: r.leg_carriers,
                    suggested_carrier: r.suggested_carrier,
                })
                .collect(),
        })),
        Err(e @ (Error::SameAirport(_) | Error::RouteCountOutOfRange(_))) => {
            Err(bad_request(e.to_string()))
        }
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

fn bad_request(error: String) -> (StatusCode, Json<ErrorResponse>) {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error }))
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "routing"
)]
async fn health(State(state): State<Arc<ServerState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        edges: state.records.len(),
    })
}

/// Build the Axum router.
pub fn build_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/routes", post(routes_handler))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run_server(records: Vec<EdgeRecord>, port: u16) -> anyhow::Result<()> {
    let app = build_router(Arc::new(ServerState { records }));

    let addr = format!("0.0.0.0:{}", port);
    println!("Server starting on http://{}", addr);
    println!("API docs available at http://{}/docs", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
