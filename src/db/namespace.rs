//! Tenant namespaces (PostgreSQL schemas) and the connection-scoped
//! resolution context every tenant-aware call receives.
//!
//! Namespace names are interpolated into DDL with `format!()`, so the only way
//! to obtain a [`Namespace`] is through validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgExecutor, PgPool, Postgres, Transaction};
use thiserror::Error;
use uuid::Uuid;

/// Schema that holds the control plane and shared extensions.
pub const SHARED_NAMESPACE: &str = "public";

pub const SANDBOX_PREFIX: &str = "sandbox_";
pub const CLINIC_PREFIX: &str = "tenant_";

const RESERVED: &[&str] = &["public", "information_schema"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NamespaceError {
    #[error("invalid namespace identifier: {0:?}")]
    Invalid(String),
    #[error("namespace {0:?} is reserved")]
    Reserved(String),
}

/// Lowercase ASCII letters, digits and underscores, starting with a letter,
/// 3 to 63 bytes (the PostgreSQL identifier limit).
fn is_valid_namespace(s: &str) -> bool {
    let len = s.len();
    (3..=63).contains(&len)
        && s.starts_with(|c: char| c.is_ascii_lowercase())
        && s.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Namespace(String);

impl Namespace {
    pub fn parse(raw: &str) -> Result<Self, NamespaceError> {
        if !is_valid_namespace(raw) {
            return Err(NamespaceError::Invalid(raw.to_string()));
        }
        if RESERVED.contains(&raw) || raw.starts_with("pg_") {
            return Err(NamespaceError::Reserved(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    /// A fresh, collision-resistant sandbox namespace (`sandbox_` + 128 random bits).
    pub fn generate_sandbox() -> Self {
        Self(format!("{SANDBOX_PREFIX}{}", Uuid::new_v4().simple()))
    }

    /// Namespace for a named clinic: `tenant_` + the slug with every
    /// non-alphanumeric character folded to `_`.
    pub fn for_clinic(slug: &str) -> Result<Self, NamespaceError> {
        let sanitized: String = slug
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() { c } else { '_' })
            .collect();
        Self::parse(&format!("{CLINIC_PREFIX}{sanitized}"))
    }

    /// Fixed namespace that template checksums are rendered against, so a
    /// revision hashes the same in every tenant.
    pub(crate) fn reference() -> Self {
        Self(format!("{CLINIC_PREFIX}template"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Double-quoted identifier, ready to splice into SQL.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }

    pub fn is_sandbox(&self) -> bool {
        self.0.starts_with(SANDBOX_PREFIX)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Namespace {
    type Error = NamespaceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Namespace> for String {
    fn from(ns: Namespace) -> Self {
        ns.0
    }
}

pub async fn namespace_exists<'e>(
    executor: impl PgExecutor<'e>,
    namespace: &Namespace,
) -> sqlx::Result<bool> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pg_namespace WHERE nspname = $1)")
        .bind(namespace.as_str())
        .fetch_one(executor)
        .await
}

/// Name resolution pinned to one tenant for the lifetime of a transaction.
///
/// The scope owns its transaction. `enter` issues `SET LOCAL search_path`,
/// which Postgres discards at commit or rollback, so the scope can never leak
/// into another checkout of the pooled connection.
pub struct TenantScope {
    tx: Transaction<'static, Postgres>,
    namespace: Namespace,
}

impl TenantScope {
    /// Open a fresh transaction on `pool` and scope it to `namespace`.
    pub async fn begin(pool: &PgPool, namespace: &Namespace) -> sqlx::Result<Self> {
        Self::enter(pool.begin().await?, namespace).await
    }

    /// Scope a transaction that is already open. Statements issued on it
    /// before the call stay part of the same unit of work.
    pub async fn enter(
        mut tx: Transaction<'static, Postgres>,
        namespace: &Namespace,
    ) -> sqlx::Result<Self> {
        sqlx::Executor::execute(
            &mut *tx,
            sqlx::raw_sql(&format!(
                "SET LOCAL search_path TO {}, {SHARED_NAMESPACE}",
                namespace.quoted()
            )),
        )
        .await?;

        Ok(Self {
            tx,
            namespace: namespace.clone(),
        })
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn conn(&mut self) -> &mut PgConnection {
        &mut self.tx
    }

    pub async fn commit(self) -> sqlx::Result<()> {
        self.tx.commit().await
    }

    pub async fn rollback(self) -> sqlx::Result<()> {
        self.tx.rollback().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_sandbox_namespaces_are_valid_and_distinct() {
        let a = Namespace::generate_sandbox();
        let b = Namespace::generate_sandbox();

        assert!(Namespace::parse(a.as_str()).is_ok());
        assert!(a.is_sandbox());
        assert_eq!(a.as_str().len(), SANDBOX_PREFIX.len() + 32);
        assert_ne!(a, b);
    }

    #[test]
    fn test_rejects_injection_and_reserved_names() {
        assert!(matches!(
            Namespace::parse("x\"; DROP SCHEMA public CASCADE; --"),
            Err(NamespaceError::Invalid(_))
        ));
        assert!(Namespace::parse("Tenant_Upper").is_err());
        assert!(Namespace::parse("9starts_with_digit").is_err());
        assert!(Namespace::parse("ab").is_err());
        assert!(Namespace::parse(&"a".repeat(64)).is_err());
        assert_eq!(
            Namespace::parse("public"),
            Err(NamespaceError::Reserved("public".into()))
        );
        assert!(matches!(Namespace::parse("pg_catalog"), Err(NamespaceError::Reserved(_))));
    }

    #[test]
    fn test_clinic_namespace_folds_separators() {
        let ns = Namespace::for_clinic("Family-Care.Clinic").unwrap();
        assert_eq!(ns.as_str(), "tenant_family_care_clinic");
        assert!(!ns.is_sandbox());
        assert_eq!(ns.quoted(), "\"tenant_family_care_clinic\"");
    }

    #[test]
    fn test_serde_validates_on_deserialize() {
        let ok: Namespace = serde_json::from_str("\"tenant_abc\"").unwrap();
        assert_eq!(ok.as_str(), "tenant_abc");
        assert!(serde_json::from_str::<Namespace>("\"bad name\"").is_err());
    }
}
