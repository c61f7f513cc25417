mod common;

use emr_tenancy::db::namespace::Namespace;
use emr_tenancy::models::tenant::DirectoryEntry;
use emr_tenancy::services::directory::{PgTenantDirectory, StaticDirectory, TenantDirectory};
use emr_tenancy::services::provisioner::provision_sandbox;
use emr_tenancy::services::reconciler::{reconcile_all, reconcile_one, ReconcileError, TenantOutcome};

macro_rules! require_db {
    () => {
        match common::pool().await {
            Some(pool) => pool,
            None => {
                eprintln!("DATABASE_URL not set; skipping");
                return;
            }
        }
    };
}

fn entry(namespace: &str) -> DirectoryEntry {
    DirectoryEntry {
        namespace: Namespace::parse(namespace).unwrap(),
        display_name: namespace.to_string(),
    }
}

#[tokio::test]
async fn test_one_broken_tenant_does_not_stop_the_batch() {
    let pool = require_db!();
    let config = common::config(1);
    let a = provision_sandbox(&pool, &config, None).await.expect("provision a");
    let b = provision_sandbox(&pool, &config, None).await.expect("provision b");
    let missing = Namespace::generate_sandbox();

    let directory = StaticDirectory(vec![
        entry(&a.namespace),
        entry(missing.as_str()),
        entry(&b.namespace),
    ]);
    let report = reconcile_all(&pool, &directory).await.expect("directory readable");

    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 1);
    let failed: Vec<_> = report.failures().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].namespace, missing.as_str());
    assert!(matches!(report.tenants[0].outcome, TenantOutcome::Applied(_)));
    assert!(matches!(report.tenants[2].outcome, TenantOutcome::Applied(_)));

    // Reconciling never creates a namespace that was not provisioned.
    let err = reconcile_one(&pool, &missing).await.unwrap_err();
    assert!(matches!(err, ReconcileError::MissingNamespace(_)));

    common::drop_tenant(&pool, &a.namespace).await;
    common::drop_tenant(&pool, &b.namespace).await;
}

#[tokio::test]
async fn test_failing_effect_is_named_and_rolled_back() {
    let pool = require_db!();
    let config = common::config(1);
    let healthy = provision_sandbox(&pool, &config, None).await.expect("provision");

    // A hand-made partition whose `roles` table predates the template and
    // cannot take the name constraint.
    let broken = Namespace::generate_sandbox();
    let q = broken.quoted();
    sqlx::raw_sql(&format!("CREATE SCHEMA {q}; CREATE TABLE {q}.roles (id UUID PRIMARY KEY);"))
        .execute(&pool)
        .await
        .expect("create broken partition");

    let directory = StaticDirectory(vec![entry(broken.as_str()), entry(&healthy.namespace)]);
    let report = reconcile_all(&pool, &directory).await.expect("directory readable");

    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 1);
    match &report.tenants[0].outcome {
        TenantOutcome::Failed { effect, error } => {
            assert_eq!(effect.as_deref(), Some("constraint:roles.roles_name_key"));
            assert!(error.contains(broken.as_str()), "{error}");
        }
        other => panic!("expected failure, got {other:?}"),
    }

    // Everything the failed run created was rolled back.
    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT table_name::TEXT FROM information_schema.tables WHERE table_schema = $1",
    )
    .bind(broken.as_str())
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(tables, vec!["roles".to_string()]);

    common::drop_tenant(&pool, broken.as_str()).await;
    common::drop_tenant(&pool, &healthy.namespace).await;
}

#[tokio::test]
async fn test_drifted_tenant_is_backfilled() {
    let pool = require_db!();
    let config = common::config(1);
    let tenant = provision_sandbox(&pool, &config, None).await.expect("provision");
    let ns = Namespace::parse(&tenant.namespace).unwrap();
    let q = ns.quoted();

    // Simulate a tenant created before revision 8 shipped.
    sqlx::raw_sql(&format!(
        "ALTER TABLE {q}.patients DROP COLUMN preferred_language;
         ALTER TABLE {q}.appointments DROP COLUMN status_history;
         DROP INDEX {q}.patients_name_trgm_idx;
         DELETE FROM {q}.schema_migrations WHERE revision IN (7, 8);"
    ))
    .execute(&pool)
    .await
    .expect("simulate drift");

    let report = reconcile_one(&pool, &ns).await.expect("reconcile");
    assert_eq!(report.revisions_recorded, vec![7, 8]);

    let columns: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM information_schema.columns
         WHERE table_schema = $1
           AND (table_name, column_name) IN (('patients', 'preferred_language'), ('appointments', 'status_history'))",
    )
    .bind(ns.as_str())
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(columns, 2);

    let index: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM pg_indexes WHERE schemaname = $1 AND indexname = 'patients_name_trgm_idx')",
    )
    .bind(ns.as_str())
    .fetch_one(&pool)
    .await
    .unwrap();
    assert!(index);

    // Seeded rows survive the backfill.
    assert_eq!(common::scoped_count(&pool, ns.as_str(), "SELECT COUNT(*) FROM patients").await, 1);

    common::drop_tenant(&pool, ns.as_str()).await;
}

#[tokio::test]
async fn test_directory_lists_active_tenants_only() {
    let pool = require_db!();
    let config = common::config(1);
    let active = provision_sandbox(&pool, &config, None).await.expect("provision active");
    let suspended = provision_sandbox(&pool, &config, None).await.expect("provision suspended");
    sqlx::query("UPDATE public.tenants SET status = 'suspended' WHERE namespace = $1")
        .bind(&suspended.namespace)
        .execute(&pool)
        .await
        .unwrap();

    let all = PgTenantDirectory::new(pool.clone()).entries().await.unwrap();
    assert!(all.iter().any(|e| e.namespace.as_str() == active.namespace));
    assert!(!all.iter().any(|e| e.namespace.as_str() == suspended.namespace));

    let only = PgTenantDirectory::new(pool.clone())
        .only(Namespace::parse(&active.namespace).unwrap())
        .entries()
        .await
        .unwrap();
    assert_eq!(only.len(), 1);
    assert_eq!(only[0].namespace.as_str(), active.namespace);

    common::drop_tenant(&pool, &active.namespace).await;
    common::drop_tenant(&pool, &suspended.namespace).await;
}
