//! Schema template registry: the complete, idempotent shape of a tenant
//! partition, replayed in full on every provision and reconcile.

pub mod ddl;
mod revisions;

use serde::Serialize;
use sha2::{Digest, Sha256};
use sqlx::PgConnection;
use thiserror::Error;

use self::ddl::SchemaEffect;
use crate::db::namespace::{Namespace, TenantScope};

pub use self::revisions::UPDATED_AT_TABLES;

#[derive(Debug, Error)]
#[error("schema effect `{effect}` failed in namespace {namespace}: {source}")]
pub struct TemplateError {
    pub namespace: String,
    pub effect: String,
    #[source]
    pub source: sqlx::Error,
}

#[derive(Debug, Clone)]
pub struct Revision {
    pub number: i32,
    pub name: &'static str,
    pub effects: Vec<SchemaEffect>,
    /// SHA-256 of the revision rendered against [`Namespace::reference`].
    pub checksum: String,
}

impl Revision {
    fn new(number: i32, name: &'static str, effects: Vec<SchemaEffect>) -> Self {
        Self {
            number,
            name,
            effects,
            checksum: String::new(),
        }
    }
}

fn checksum(effects: &[SchemaEffect]) -> String {
    let mut hasher = Sha256::new();
    for effect in effects {
        hasher.update(effect.name.as_bytes());
        hasher.update(b"\n");
        hasher.update(effect.sql.as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}

/// What one application of the template did to a namespace.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ApplyReport {
    pub effects_applied: usize,
    /// Revisions seen for the first time in this namespace's ledger.
    pub revisions_recorded: Vec<i32>,
    /// Revisions whose stored checksum differed and was refreshed.
    pub revisions_refreshed: Vec<i32>,
}

pub struct SchemaTemplate {
    namespace: Namespace,
    ledger: SchemaEffect,
    revisions: Vec<Revision>,
}

impl SchemaTemplate {
    pub fn for_namespace(namespace: &Namespace) -> Self {
        let reference = revisions::all(&Namespace::reference());
        let revisions = revisions::all(namespace)
            .into_iter()
            .zip(reference)
            .map(|(mut revision, rendered)| {
                revision.checksum = checksum(&rendered.effects);
                revision
            })
            .collect();

        Self {
            namespace: namespace.clone(),
            ledger: revisions::ledger(namespace),
            revisions,
        }
    }

    pub fn revisions(&self) -> &[Revision] {
        &self.revisions
    }

    /// Every effect in execution order, ledger bootstrap first.
    pub fn effects(&self) -> impl Iterator<Item = &SchemaEffect> {
        std::iter::once(&self.ledger).chain(self.revisions.iter().flat_map(|r| r.effects.iter()))
    }

    /// Effects that would fail or duplicate objects on a second run.
    pub fn unguarded_effects(&self) -> Vec<&SchemaEffect> {
        self.effects().filter(|e| !e.is_guarded()).collect()
    }

    pub fn latest_revision(&self) -> i32 {
        self.revisions.last().map(|r| r.number).unwrap_or(0)
    }

    /// Replay every effect through the scoped connection and record each
    /// revision in the namespace's `schema_migrations` ledger.
    ///
    /// The caller owns the transaction: an error leaves it to be rolled back.
    pub async fn apply(&self, scope: &mut TenantScope) -> Result<ApplyReport, TemplateError> {
        let conn = scope.conn();
        let mut report = ApplyReport::default();

        self.execute(&mut *conn, &self.ledger).await?;
        report.effects_applied += 1;

        for revision in &self.revisions {
            for effect in &revision.effects {
                self.execute(&mut *conn, effect).await?;
                report.effects_applied += 1;
            }

            match self.record(&mut *conn, revision).await? {
                Some(true) => report.revisions_recorded.push(revision.number),
                Some(false) => report.revisions_refreshed.push(revision.number),
                None => {}
            }
            tracing::debug!(
                namespace = %self.namespace,
                revision = revision.number,
                name = revision.name,
                "Template revision applied"
            );
        }

        Ok(report)
    }

    async fn execute(
        &self,
        conn: &mut PgConnection,
        effect: &SchemaEffect,
    ) -> Result<(), TemplateError> {
        sqlx::Executor::execute(conn, sqlx::raw_sql(&effect.sql))
            .await
            .map_err(|source| TemplateError {
                namespace: self.namespace.to_string(),
                effect: effect.name.clone(),
                source,
            })?;
        Ok(())
    }

    /// `Some(true)` for a new ledger row, `Some(false)` for a refreshed
    /// checksum, `None` when the row already matched.
    async fn record(
        &self,
        conn: &mut PgConnection,
        revision: &Revision,
    ) -> Result<Option<bool>, TemplateError> {
        let sql = format!(
            r#"INSERT INTO {}.schema_migrations AS m (revision, name, checksum)
               VALUES ($1, $2, $3)
               ON CONFLICT (revision) DO UPDATE
                 SET name = EXCLUDED.name, checksum = EXCLUDED.checksum, applied_at = NOW()
                 WHERE m.checksum <> EXCLUDED.checksum
               RETURNING (xmax = 0)"#,
            self.namespace.quoted()
        );

        sqlx::query_scalar::<_, bool>(&sql)
            .bind(revision.number)
            .bind(revision.name)
            .bind(&revision.checksum)
            .fetch_optional(conn)
            .await
            .map_err(|source| TemplateError {
                namespace: self.namespace.to_string(),
                effect: format!("ledger:{}", revision.number),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::ddl::EffectKind;
    use super::*;

    fn template(name: &str) -> SchemaTemplate {
        SchemaTemplate::for_namespace(&Namespace::parse(name).unwrap())
    }

    #[test]
    fn test_every_effect_is_guarded() {
        let t = template("sandbox_0123456789abcdef0123456789abcdef");
        let unguarded: Vec<_> = t.unguarded_effects().iter().map(|e| e.name.clone()).collect();
        assert!(unguarded.is_empty(), "unguarded effects: {unguarded:?}");
    }

    #[test]
    fn test_effect_names_are_unique() {
        let t = template("tenant_demo");
        let mut seen = HashSet::new();
        for effect in t.effects() {
            assert!(seen.insert(effect.name.clone()), "duplicate effect {}", effect.name);
        }
    }

    #[test]
    fn test_revisions_are_numbered_consecutively() {
        let t = template("tenant_demo");
        let numbers: Vec<i32> = t.revisions().iter().map(|r| r.number).collect();
        let expected: Vec<i32> = (1..=numbers.len() as i32).collect();
        assert_eq!(numbers, expected);
        assert_eq!(t.latest_revision(), 13);
    }

    #[test]
    fn test_checksums_do_not_depend_on_namespace() {
        let a = template("tenant_north");
        let b = template("sandbox_ffffffffffffffffffffffffffffffff");
        for (ra, rb) in a.revisions().iter().zip(b.revisions()) {
            assert_eq!(ra.checksum, rb.checksum, "revision {}", ra.number);
            assert_eq!(ra.checksum.len(), 64);
        }
        let distinct: HashSet<_> = a.revisions().iter().map(|r| &r.checksum).collect();
        assert_eq!(distinct.len(), a.revisions().len());
    }

    #[test]
    fn test_effects_only_target_their_namespace() {
        let t = template("tenant_demo");
        for effect in t.effects() {
            assert!(!effect.sql.contains("{schema}"), "{}", effect.name);
            if effect.kind != EffectKind::Extension {
                assert!(effect.sql.contains("\"tenant_demo\""), "{}", effect.name);
            }
        }
    }

    #[test]
    fn test_tables_exist_before_they_are_referenced() {
        let t = template("tenant_demo");
        let mut created: HashSet<String> = HashSet::new();
        for effect in t.effects() {
            for referenced in effect.sql.split("REFERENCES \"tenant_demo\".").skip(1) {
                let table: String = referenced.chars().take_while(|c| *c != '(').collect();
                assert!(created.contains(&table), "{} references {table} before creation", effect.name);
            }
            if let Some(table) = effect.name.strip_prefix("table:") {
                created.insert(table.to_string());
            }
            if let Some(table) = effect.name.strip_prefix("columns:") {
                assert!(created.contains(table), "{} patches a missing table", effect.name);
            }
        }
    }

    #[test]
    fn test_update_triggers_target_tables_with_updated_at() {
        let t = template("tenant_demo");
        for table in UPDATED_AT_TABLES {
            let body = t
                .effects()
                .find(|e| e.name == format!("table:{table}"))
                .unwrap_or_else(|| panic!("no table {table}"));
            assert!(body.sql.contains("updated_at"), "{table} lacks updated_at");
            assert!(t.effects().any(|e| e.name == format!("trigger:{table}_set_updated_at")));
        }

        // Tables added after the triggers revision install their own.
        for effect in t.effects().filter(|e| e.kind == EffectKind::Table) {
            let table = effect.name.trim_start_matches("table:");
            if effect.sql.contains("updated_at") {
                let trigger = format!("trigger:{table}_set_updated_at");
                assert!(t.effects().any(|e| e.name == trigger), "{table} has no update trigger");
            }
        }
    }

    #[test]
    fn test_covers_access_control_and_billing_tables() {
        let t = template("tenant_demo");
        for table in [
            "privileges",
            "role_privileges",
            "sessions",
            "order_sets",
            "clinical_alerts",
            "lab_reference_ranges",
            "cancellation_followups",
            "cancellation_followup_notes",
            "insurance_plans",
            "fee_schedule",
            "claims",
            "settings",
            "email_settings",
        ] {
            assert!(t.effects().any(|e| e.name == format!("table:{table}")), "missing {table}");
        }
    }

    #[test]
    fn test_ledger_is_bootstrapped_first() {
        let t = template("tenant_demo");
        let first = t.effects().next().unwrap();
        assert_eq!(first.name, "table:schema_migrations");
    }
}
