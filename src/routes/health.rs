use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::db::namespace::Namespace;
use crate::db::template::SchemaTemplate;
use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let template_revision = SchemaTemplate::for_namespace(&Namespace::reference()).latest_revision();
    match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "db": "connected", "template_revision": template_revision })),
        ),
        Err(e) => {
            tracing::warn!("health check: database unreachable: {e}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "error", "db": "unreachable", "template_revision": template_revision })),
            )
        }
    }
}
