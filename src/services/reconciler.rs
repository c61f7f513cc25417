//! Replays the schema template against every known tenant, one transaction
//! per tenant. A tenant that fails is reported and skipped; the batch goes on.

use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;

use crate::db::namespace::{namespace_exists, Namespace, TenantScope};
use crate::db::template::{ApplyReport, SchemaTemplate, TemplateError};
use crate::models::tenant::DirectoryEntry;
use crate::services::directory::TenantDirectory;
use crate::services::metrics::{RECONCILE_COUNTER, TENANTS_GAUGE};

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("namespace {0} does not exist")]
    MissingNamespace(String),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ReconcileError {
    pub fn effect(&self) -> Option<&str> {
        match self {
            Self::Template(e) => Some(&e.effect),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TenantOutcome {
    Applied(ApplyReport),
    Failed { effect: Option<String>, error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct TenantReconciliation {
    pub namespace: String,
    pub display_name: String,
    pub outcome: TenantOutcome,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileReport {
    pub tenants: Vec<TenantReconciliation>,
    pub succeeded: usize,
    pub failed: usize,
}

impl ReconcileReport {
    fn push(&mut self, entry: &DirectoryEntry, result: Result<ApplyReport, ReconcileError>) {
        let outcome = match result {
            Ok(report) => {
                self.succeeded += 1;
                TenantOutcome::Applied(report)
            }
            Err(e) => {
                self.failed += 1;
                TenantOutcome::Failed {
                    effect: e.effect().map(str::to_string),
                    error: e.to_string(),
                }
            }
        };
        self.tenants.push(TenantReconciliation {
            namespace: entry.namespace.to_string(),
            display_name: entry.display_name.clone(),
            outcome,
        });
    }

    pub fn failures(&self) -> impl Iterator<Item = &TenantReconciliation> {
        self.tenants
            .iter()
            .filter(|t| matches!(t.outcome, TenantOutcome::Failed { .. }))
    }

    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Bring one existing namespace up to the current template. Never creates
/// the namespace itself.
pub async fn reconcile_one(pool: &PgPool, namespace: &Namespace) -> Result<ApplyReport, ReconcileError> {
    if !namespace_exists(pool, namespace).await? {
        return Err(ReconcileError::MissingNamespace(namespace.to_string()));
    }

    // A schema dropped after the check fails the first DDL effect; nothing
    // here recreates it.
    let mut scope = TenantScope::begin(pool, namespace).await?;
    let report = SchemaTemplate::for_namespace(namespace).apply(&mut scope).await?;

    scope.commit().await?;
    Ok(report)
}

/// Only fails when the directory itself cannot be read.
pub async fn reconcile_all(
    pool: &PgPool,
    directory: &dyn TenantDirectory,
) -> anyhow::Result<ReconcileReport> {
    let entries = directory.entries().await?;
    tracing::info!("Reconciling {} tenant(s)", entries.len());
    TENANTS_GAUGE.set(entries.len() as f64);

    let mut report = ReconcileReport::default();
    for entry in &entries {
        let result = reconcile_one(pool, &entry.namespace).await;
        match &result {
            Ok(applied) => {
                RECONCILE_COUNTER.with_label_values(&["success"]).inc();
                tracing::info!(
                    namespace = %entry.namespace,
                    effects = applied.effects_applied,
                    new_revisions = ?applied.revisions_recorded,
                    "Tenant schema reconciled"
                );
            }
            Err(e) => {
                RECONCILE_COUNTER.with_label_values(&["failure"]).inc();
                tracing::error!(namespace = %entry.namespace, "Tenant reconciliation failed: {e}");
            }
        }
        report.push(entry, result);
    }

    tracing::info!(
        succeeded = report.succeeded,
        failed = report.failed,
        "Reconciliation finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> DirectoryEntry {
        DirectoryEntry {
            namespace: Namespace::parse(name).unwrap(),
            display_name: name.to_uppercase(),
        }
    }

    #[test]
    fn test_report_totals_and_failures() {
        let mut report = ReconcileReport::default();
        report.push(&entry("tenant_a"), Ok(ApplyReport::default()));
        report.push(
            &entry("tenant_b"),
            Err(ReconcileError::MissingNamespace("tenant_b".into())),
        );
        report.push(&entry("tenant_c"), Ok(ApplyReport::default()));

        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
        assert!(!report.is_clean());
        let failed: Vec<_> = report.failures().map(|t| t.namespace.as_str()).collect();
        assert_eq!(failed, ["tenant_b"]);
    }

    #[test]
    fn test_report_serializes_outcome_tag() {
        let mut report = ReconcileReport::default();
        report.push(
            &entry("tenant_b"),
            Err(ReconcileError::Template(TemplateError {
                namespace: "tenant_b".into(),
                effect: "table:patients".into(),
                source: sqlx::Error::RowNotFound,
            })),
        );

        let json = serde_json::to_value(&report).unwrap();
        let outcome = &json["tenants"][0]["outcome"];
        assert_eq!(outcome["status"], "failed");
        assert_eq!(outcome["effect"], "table:patients");
        assert!(outcome["error"].as_str().unwrap().contains("tenant_b"));
    }
}
