//! Creates a tenant partition end to end in one transaction: schema, template,
//! default identity, operating defaults and demo data. Nothing is visible to
//! other sessions until the commit.

use std::time::Instant;

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::json;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::config::Config;
use crate::db::namespace::{Namespace, TenantScope};
use crate::db::template::{ApplyReport, SchemaTemplate};
use crate::error::{is_duplicate_schema, ProvisionError};
use crate::models::provision::{ProvisionRequest, ProvisionedTenant};
use crate::models::tenant::TenantKind;
use crate::seed::catalog::{DEFAULT_FLAG_TYPES, DEFAULT_PRIVILEGES};
use crate::seed::{ClinicalSeeder, SeedSummary, Seeder};
use crate::services::audit::{self, ProvisioningEvent};
use crate::services::credential;
use crate::services::metrics::{PROVISIONS_COUNTER, PROVISION_SECONDS};

/// Role carried by the default identity and its credential.
pub const DEFAULT_ROLE: &str = "admin";

const DEFAULT_ROLES: &[(&str, &str)] = &[
    ("admin", "Practice administrator"),
    ("physician", "Licensed provider with signing rights"),
    ("nurse", "Clinical staff"),
    ("front_desk", "Scheduling and check-in"),
    ("billing", "Claims and payments"),
];

enum Grant {
    Every,
    Only(&'static [&'static str]),
}

/// Privileges each default role starts with.
const ROLE_GRANTS: &[(&str, Grant)] = &[
    ("admin", Grant::Every),
    (
        "physician",
        Grant::Only(&[
            "document_visit", "sign_notes", "view_labs", "order_labs", "view_imaging",
            "order_imaging", "enter_vitals", "view_patients", "edit_patients", "e_prescribe",
            "create_referrals", "view_medications", "manage_problems", "manage_allergies",
            "search_icd10", "search_cpt", "create_superbill", "send_messages", "view_messages",
            "assign_tasks",
        ]),
    ),
    (
        "nurse",
        Grant::Only(&[
            "view_labs", "enter_vitals", "view_patients", "edit_patients", "view_medications",
            "manage_allergies", "register_patients", "schedule_appointments", "send_messages",
            "view_messages",
        ]),
    ),
    (
        "front_desk",
        Grant::Only(&[
            "view_patients", "register_patients", "schedule_appointments", "upload_documents",
            "send_messages", "view_messages",
        ]),
    ),
    (
        "billing",
        Grant::Only(&[
            "view_patients", "search_icd10", "search_cpt", "create_superbill", "manage_claims",
            "view_billing", "financial_reports", "view_messages",
        ]),
    ),
];

/// (key, category, enabled)
const DEFAULT_FEATURE_FLAGS: &[(&str, &str, bool)] = &[
    ("smart_search", "general", true),
    ("patient_flags", "clinical", true),
    ("lab_results", "clinical", true),
    ("telehealth", "scheduling", false),
    ("e_prescribing", "clinical", false),
    ("patient_portal", "engagement", false),
];

/// Provision a sandbox with the standard demo roster.
pub async fn provision_sandbox(
    pool: &PgPool,
    config: &Config,
    origin_request_id: Option<Uuid>,
) -> Result<ProvisionedTenant, ProvisionError> {
    let seeder = ClinicalSeeder::new(config.sandbox_roster_size);
    provision(pool, config, &seeder, ProvisionRequest::sandbox(origin_request_id)).await
}

pub async fn provision(
    pool: &PgPool,
    config: &Config,
    seeder: &dyn Seeder,
    request: ProvisionRequest,
) -> Result<ProvisionedTenant, ProvisionError> {
    let kind = match request.kind {
        TenantKind::Clinic => "clinic",
        TenantKind::Sandbox => "sandbox",
    };
    let started = Instant::now();

    let (identity_id, template, seed) = match create_partition(pool, seeder, &request).await {
        Ok(created) => created,
        Err(e) => {
            PROVISIONS_COUNTER.with_label_values(&[kind, "failure"]).inc();
            tracing::error!(
                namespace = %request.namespace,
                error_kind = e.kind(),
                "Tenant provisioning rolled back: {e}"
            );
            return Err(e);
        }
    };
    PROVISION_SECONDS.observe(started.elapsed().as_secs_f64());
    tracing::info!(
        namespace = %request.namespace,
        patients = seed.patients,
        effects = template.effects_applied,
        "Tenant provisioned"
    );

    audit::log(
        pool.clone(),
        ProvisioningEvent {
            namespace: request.namespace.to_string(),
            origin_request_id: request.origin_request_id,
            event: "provisioned",
            detail: json!({
                "kind": kind,
                "identity_id": identity_id,
                "template_revision": template.revisions_recorded.last(),
                "seed": seed,
            }),
        },
    );

    let token = credential::mint(
        &config.jwt_secret,
        config.sandbox_token_ttl_seconds,
        &request.namespace,
        identity_id,
        DEFAULT_ROLE,
    )
    .inspect_err(|_| {
        PROVISIONS_COUNTER.with_label_values(&[kind, "failure"]).inc();
    })?;
    PROVISIONS_COUNTER.with_label_values(&[kind, "success"]).inc();

    Ok(ProvisionedTenant {
        namespace: request.namespace.to_string(),
        identity_id,
        token,
        template,
        seed,
    })
}

async fn create_partition(
    pool: &PgPool,
    seeder: &dyn Seeder,
    request: &ProvisionRequest,
) -> Result<(Uuid, ApplyReport, SeedSummary), ProvisionError> {
    let namespace = &request.namespace;
    let mut tx = pool.begin().await?;

    // No IF NOT EXISTS: an existing schema is a collision, never reused.
    sqlx::Executor::execute(&mut *tx, sqlx::raw_sql(&format!("CREATE SCHEMA {}", namespace.quoted())))
        .await
        .map_err(|e| {
            if is_duplicate_schema(&e) {
                ProvisionError::NamespaceCollision(namespace.to_string())
            } else {
                ProvisionError::Database(e)
            }
        })?;

    sqlx::query(
        "INSERT INTO public.tenants (namespace, display_name, kind, origin_request_id)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(namespace.as_str())
    .bind(&request.display_name)
    .bind(request.kind)
    .bind(request.origin_request_id)
    .execute(&mut *tx)
    .await?;

    let mut scope = TenantScope::enter(tx, namespace).await?;
    let template = SchemaTemplate::for_namespace(namespace).apply(&mut scope).await?;

    insert_roles(scope.conn()).await?;
    let identity_id = insert_default_identity(scope.conn(), namespace).await?;
    insert_operating_defaults(scope.conn(), namespace, identity_id).await?;

    let seed = seeder
        .seed(&mut scope, identity_id)
        .await
        .map_err(ProvisionError::Seed)?;

    scope.commit().await?;
    Ok((identity_id, template, seed))
}

async fn insert_roles(conn: &mut PgConnection) -> Result<(), ProvisionError> {
    for (name, description) in DEFAULT_ROLES {
        sqlx::query("INSERT INTO roles (name, description, is_system_role) VALUES ($1, $2, TRUE)")
            .bind(name)
            .bind(description)
            .execute(&mut *conn)
            .await?;
    }

    for (name, description, category) in DEFAULT_PRIVILEGES {
        sqlx::query("INSERT INTO privileges (name, description, category) VALUES ($1, $2, $3)")
            .bind(name)
            .bind(description)
            .bind(category)
            .execute(&mut *conn)
            .await?;
    }

    for (role, grant) in ROLE_GRANTS {
        let only: Option<Vec<&str>> = match grant {
            Grant::Every => None,
            Grant::Only(names) => Some(names.to_vec()),
        };
        sqlx::query(
            "INSERT INTO role_privileges (role_id, privilege_id)
             SELECT r.id, p.id FROM roles r CROSS JOIN privileges p
             WHERE r.name = $1 AND ($2::TEXT[] IS NULL OR p.name = ANY($2))",
        )
        .bind(role)
        .bind(only)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// The administrative user the credential is issued for. Its password is
/// random and never disclosed: the only way in is the minted token.
async fn insert_default_identity(
    conn: &mut PgConnection,
    namespace: &Namespace,
) -> Result<Uuid, ProvisionError> {
    let password: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();
    let password_hash = bcrypt::hash(&password, bcrypt::DEFAULT_COST)?;
    let is_ephemeral = namespace.is_sandbox();
    let email = format!("admin@{namespace}.local");

    let id: Uuid = sqlx::query_scalar(
        r#"INSERT INTO users
             (email, password_hash, first_name, last_name, role, role_id, is_admin, is_ephemeral, credentials)
           VALUES ($1, $2, 'Demo', 'Provider', $3, (SELECT id FROM roles WHERE name = $3), TRUE, $4, 'MD')
           RETURNING id"#,
    )
    .bind(&email)
    .bind(&password_hash)
    .bind(DEFAULT_ROLE)
    .bind(is_ephemeral)
    .fetch_one(conn)
    .await?;

    Ok(id)
}

async fn insert_operating_defaults(
    conn: &mut PgConnection,
    namespace: &Namespace,
    identity_id: Uuid,
) -> Result<(), ProvisionError> {
    let practice_name = if namespace.is_sandbox() {
        "Sandbox Family Medicine"
    } else {
        "My Practice"
    };

    sqlx::query(
        "INSERT INTO practice_settings (practice_name, practice_type, updated_by)
         VALUES ($1, 'Family Medicine', $2)",
    )
    .bind(practice_name)
    .bind(identity_id)
    .execute(&mut *conn)
    .await?;

    sqlx::query("INSERT INTO clinical_settings (updated_by) VALUES ($1)")
        .bind(identity_id)
        .execute(&mut *conn)
        .await?;

    sqlx::query("INSERT INTO security_settings (updated_by) VALUES ($1)")
        .bind(identity_id)
        .execute(&mut *conn)
        .await?;

    for (key, category, enabled) in DEFAULT_FEATURE_FLAGS {
        sqlx::query("INSERT INTO feature_flags (feature_key, category, enabled) VALUES ($1, $2, $3)")
            .bind(key)
            .bind(category)
            .bind(enabled)
            .execute(&mut *conn)
            .await?;
    }

    for flag in DEFAULT_FLAG_TYPES {
        sqlx::query(
            "INSERT INTO flag_types (label, category, severity, color, requires_acknowledgment, is_default)
             VALUES ($1, $2, $3::flag_severity, $4, $5, TRUE)",
        )
        .bind(flag.label)
        .bind(flag.category)
        .bind(flag.severity)
        .bind(flag.color)
        .bind(flag.requires_acknowledgment)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_grants_name_known_roles_and_privileges() {
        for (role, grant) in ROLE_GRANTS {
            assert!(DEFAULT_ROLES.iter().any(|(name, _)| name == role), "unknown role {role}");
            if let Grant::Only(names) = grant {
                for name in *names {
                    assert!(
                        DEFAULT_PRIVILEGES.iter().any(|(p, _, _)| p == name),
                        "{role} is granted unknown privilege {name}"
                    );
                }
            }
        }
        assert!(matches!(
            ROLE_GRANTS.iter().find(|(role, _)| *role == DEFAULT_ROLE),
            Some((_, Grant::Every))
        ));
    }
}
