#![allow(dead_code)]

use std::sync::Arc;

use emr_tenancy::config::Config;
use emr_tenancy::db;
use emr_tenancy::db::namespace::{Namespace, TenantScope};
use sqlx::PgPool;

/// Database tests run only when DATABASE_URL points at a disposable Postgres.
pub async fn pool() -> Option<PgPool> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let pool = db::create_pool(&url, 5).await.expect("connect to DATABASE_URL");
    db::run_migrations(&pool).await.expect("control-plane migrations");
    Some(pool)
}

pub fn config(roster: usize) -> Arc<Config> {
    Arc::new(Config {
        database_url: String::new(),
        db_max_connections: 5,
        redis_url: String::new(),
        jwt_secret: "integration-test-secret".into(),
        sandbox_token_ttl_seconds: 600,
        sandbox_roster_size: roster,
        host: "127.0.0.1".into(),
        port: 0,
        super_admin_key: "integration-super-admin".into(),
    })
}

pub async fn drop_tenant(pool: &PgPool, namespace: &str) {
    let ns = Namespace::parse(namespace).expect("valid namespace");
    sqlx::raw_sql(&format!("DROP SCHEMA IF EXISTS {} CASCADE", ns.quoted()))
        .execute(pool)
        .await
        .expect("drop schema");
    sqlx::query("DELETE FROM public.tenants WHERE namespace = $1")
        .bind(namespace)
        .execute(pool)
        .await
        .expect("delete tenant row");
}

/// Names and definitions of every object in the namespace, sorted.
pub async fn catalog_snapshot(pool: &PgPool, namespace: &str) -> Vec<String> {
    sqlx::query_scalar(
        r#"SELECT 'column:' || table_name::text || '.' || column_name::text || ':' || data_type::text
             FROM information_schema.columns WHERE table_schema = $1
           UNION ALL
           SELECT 'index:' || indexname::text || ':' || indexdef
             FROM pg_indexes WHERE schemaname = $1
           UNION ALL
           SELECT 'constraint:' || c.conname::text || ':' || pg_get_constraintdef(c.oid)
             FROM pg_constraint c JOIN pg_namespace n ON n.oid = c.connamespace
            WHERE n.nspname = $1
           UNION ALL
           SELECT 'trigger:' || t.tgname::text
             FROM pg_trigger t
             JOIN pg_class c ON c.oid = t.tgrelid
             JOIN pg_namespace n ON n.oid = c.relnamespace
            WHERE n.nspname = $1 AND NOT t.tgisinternal
           UNION ALL
           SELECT 'type:' || t.typname::text
             FROM pg_type t JOIN pg_namespace n ON n.oid = t.typnamespace
            WHERE n.nspname = $1
           UNION ALL
           SELECT 'enum:' || t.typname::text || ':' || e.enumlabel::text
             FROM pg_enum e
             JOIN pg_type t ON t.oid = e.enumtypid
             JOIN pg_namespace n ON n.oid = t.typnamespace
            WHERE n.nspname = $1
           ORDER BY 1"#,
    )
    .bind(namespace)
    .fetch_all(pool)
    .await
    .expect("catalog snapshot")
}

/// Run one scalar query with resolution scoped to `namespace`.
pub async fn scoped_count(pool: &PgPool, namespace: &str, sql: &str) -> i64 {
    let ns = Namespace::parse(namespace).expect("valid namespace");
    let mut scope = TenantScope::begin(pool, &ns).await.expect("enter scope");
    let count: i64 = sqlx::query_scalar(sql)
        .fetch_one(scope.conn())
        .await
        .expect("scoped query");
    scope.rollback().await.expect("rollback");
    count
}
