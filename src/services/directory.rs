use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::namespace::Namespace;
use crate::models::tenant::{DirectoryEntry, Tenant, TenantStatus};

/// Source of the tenants the reconciler walks.
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    async fn entries(&self) -> anyhow::Result<Vec<DirectoryEntry>>;
}

/// Active rows of `public.tenants`, optionally narrowed to one namespace.
pub struct PgTenantDirectory {
    pool: PgPool,
    only: Option<Namespace>,
}

impl PgTenantDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool, only: None }
    }

    pub fn only(mut self, namespace: Namespace) -> Self {
        self.only = Some(namespace);
        self
    }
}

#[async_trait]
impl TenantDirectory for PgTenantDirectory {
    async fn entries(&self) -> anyhow::Result<Vec<DirectoryEntry>> {
        let tenants: Vec<Tenant> = sqlx::query_as(
            "SELECT namespace, display_name, kind, status, origin_request_id, created_at
             FROM public.tenants
             WHERE status = $1 AND ($2::TEXT IS NULL OR namespace = $2)
             ORDER BY created_at",
        )
        .bind(TenantStatus::Active)
        .bind(self.only.as_ref().map(Namespace::as_str))
        .fetch_all(&self.pool)
        .await?;

        let mut entries = Vec::with_capacity(tenants.len());
        for tenant in tenants {
            match Namespace::parse(&tenant.namespace) {
                Ok(namespace) => entries.push(DirectoryEntry {
                    namespace,
                    display_name: tenant.display_name,
                }),
                Err(e) => tracing::warn!(kind = ?tenant.kind, "skipping directory row: {e}"),
            }
        }
        Ok(entries)
    }
}

/// A fixed list, for one-off runs and tests.
pub struct StaticDirectory(pub Vec<DirectoryEntry>);

#[async_trait]
impl TenantDirectory for StaticDirectory {
    async fn entries(&self) -> anyhow::Result<Vec<DirectoryEntry>> {
        Ok(self.0.clone())
    }
}
