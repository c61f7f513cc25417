use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

/// A provisioning event for the control-plane log.
#[derive(Debug, Clone)]
pub struct ProvisioningEvent {
    pub namespace: String,
    pub origin_request_id: Option<Uuid>,
    pub event: &'static str,
    pub detail: Value,
}

pub async fn record(pool: &PgPool, event: &ProvisioningEvent) -> sqlx::Result<()> {
    sqlx::query(
        "INSERT INTO public.provisioning_events (namespace, origin_request_id, event, detail)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(&event.namespace)
    .bind(event.origin_request_id)
    .bind(event.event)
    .bind(&event.detail)
    .execute(pool)
    .await?;
    Ok(())
}

/// Fire-and-forget provisioning event.
/// Spawns a background task: never blocks the caller and never propagates
/// errors (logs a warning on failure).
pub fn log(pool: PgPool, event: ProvisioningEvent) {
    tokio::spawn(async move {
        if let Err(e) = record(&pool, &event).await {
            tracing::warn!(
                namespace = %event.namespace,
                event = event.event,
                "provisioning event insert failed: {e}"
            );
        }
    });
}
