use thiserror::Error;

use crate::db::template::TemplateError;

/// Why a provisioning call failed. Internal only: the HTTP layer logs the
/// variant and answers with one opaque message.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("namespace {0} already exists")]
    NamespaceCollision(String),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("seeding failed: {0:#}")]
    Seed(anyhow::Error),

    #[error("credential minting failed: {0}")]
    Credential(#[from] jsonwebtoken::errors::Error),

    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ProvisionError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NamespaceCollision(_) => "collision",
            Self::Template(_) => "template",
            Self::Seed(_) => "seed",
            Self::Credential(_) => "credential",
            Self::Hash(_) => "hash",
            Self::Database(_) => "database",
        }
    }
}

/// Whether `CREATE SCHEMA` lost to an existing namespace.
pub(crate) fn is_duplicate_schema(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|e| schema_conflict(e.code().as_deref(), e.constraint()))
}

/// SQLSTATE 42P06 `duplicate_schema` when the schema was already committed;
/// 23505 on the catalog index when a concurrent transaction created it first.
fn schema_conflict(code: Option<&str>, constraint: Option<&str>) -> bool {
    match code {
        Some("42P06") => true,
        Some("23505") => constraint == Some("pg_namespace_nspname_index"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_conflict_covers_committed_and_concurrent_creation() {
        assert!(schema_conflict(Some("42P06"), None));
        assert!(schema_conflict(Some("23505"), Some("pg_namespace_nspname_index")));
        assert!(!schema_conflict(Some("23505"), Some("tenants_pkey")));
        assert!(!schema_conflict(Some("42501"), None));
        assert!(!schema_conflict(None, None));
    }
}
