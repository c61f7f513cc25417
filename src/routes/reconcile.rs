use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    db::namespace::Namespace,
    middleware::super_admin::SuperAdminAuth,
    services::{
        directory::PgTenantDirectory,
        reconciler::{self, ReconcileReport},
    },
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct ReconcileQuery {
    pub namespace: Option<String>,
}

/// POST /super-admin/reconcile[?namespace=...]: replay the schema template
/// against every active tenant and return the per-tenant report.
pub async fn reconcile_tenants(
    _auth: SuperAdminAuth,
    State(state): State<AppState>,
    Query(params): Query<ReconcileQuery>,
) -> Result<Json<ReconcileReport>, (StatusCode, Json<Value>)> {
    let mut directory = PgTenantDirectory::new(state.db.clone());
    if let Some(raw) = params.namespace.as_deref() {
        let namespace = Namespace::parse(raw)
            .map_err(|e| (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))))?;
        directory = directory.only(namespace);
    }

    let report = reconciler::reconcile_all(&state.db, &directory)
        .await
        .map_err(|e| {
            tracing::error!("reconcile: tenant directory unavailable: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Tenant directory unavailable" })),
            )
        })?;

    Ok(Json(report))
}
