//! HTTP surface: the liveness root plus the two collections.
pub mod error;
pub mod routes;
pub mod stops;

use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::store::SharedStore;

pub const LIVENESS_MESSAGE: &str = "Transit Directory API Running...";

pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/", get(root))
        .route(
            "/bus_stops",
            get(stops::list_stops).post(stops::create_stop),
        )
        .route(
            "/bus_routes",
            get(routes::list_routes).post(routes::create_route),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(store)
}

async fn root() -> &'static str {
    LIVENESS_MESSAGE
}
