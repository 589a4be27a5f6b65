mod analyze;
mod health;
mod metrics;

use crate::server::SharedState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(health::healthcheck))
        .route("/analyze", post(analyze::analyze_image))
        .route("/metrics", get(metrics::metrics_handler))
}
