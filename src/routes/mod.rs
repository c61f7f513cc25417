pub mod health;
pub mod metrics;
pub mod reconcile;
pub mod sandbox;

use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowHeaders, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::HeaderName::from_static("x-super-admin-key"),
        ]))
        .allow_origin(Any);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::metrics_handler))
        .route("/auth/sandbox", post(sandbox::create_sandbox))
        .route("/super-admin/reconcile", post(reconcile::reconcile_tenants))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
