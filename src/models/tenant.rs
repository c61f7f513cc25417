use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::db::namespace::Namespace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "tenant_kind", rename_all = "snake_case")]
#[serde(rename_all = "lowercase")]
pub enum TenantKind {
    Clinic,
    Sandbox,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "tenant_status", rename_all = "snake_case")]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    Active,
    Suspended,
}

/// Row of the control-plane directory `public.tenants`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Tenant {
    pub namespace: String,
    pub display_name: String,
    pub kind: TenantKind,
    pub status: TenantStatus,
    pub origin_request_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// What the reconciler needs to know about a tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub namespace: Namespace,
    pub display_name: String,
}
