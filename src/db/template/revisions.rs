//! The clinical partition template, revision by revision.
//!
//! Revisions are append-only. A column added after first release goes into a
//! new revision as an `ADD COLUMN IF NOT EXISTS` patch; existing revisions are
//! never edited in a way that changes the shape they produce.

use super::ddl::{Ddl, SchemaEffect};
use super::Revision;
use crate::db::namespace::Namespace;

/// Tables whose `updated_at` trigger is installed by the triggers revision.
/// Later revisions install triggers for the tables they create.
pub const UPDATED_AT_TABLES: &[&str] = &[
    "roles",
    "users",
    "patients",
    "problems",
    "medications",
    "visits",
    "orders",
    "appointments",
    "referrals",
    "practice_settings",
    "clinical_settings",
    "security_settings",
    "feature_flags",
    "flag_types",
    "patient_flags",
];

pub fn all(ns: &Namespace) -> Vec<Revision> {
    let ddl = Ddl::new(ns);
    vec![
        Revision::new(1, "identity", identity(&ddl)),
        Revision::new(2, "patient_chart", patient_chart(&ddl)),
        Revision::new(3, "encounters", encounters(&ddl)),
        Revision::new(4, "operating_configuration", operating_configuration(&ddl)),
        Revision::new(5, "patient_flags", patient_flags(&ddl)),
        Revision::new(6, "activity_and_audit", activity_and_audit(&ddl)),
        Revision::new(7, "search", search(&ddl)),
        Revision::new(8, "drift_backfill", drift_backfill(&ddl)),
        Revision::new(9, "triggers", triggers(&ddl)),
        Revision::new(10, "access_control", access_control(&ddl)),
        Revision::new(11, "clinical_support", clinical_support(&ddl)),
        Revision::new(12, "billing", billing(&ddl)),
        Revision::new(13, "practice_administration", practice_administration(&ddl)),
    ]
}

/// Applied before any revision so the ledger exists to record them.
pub fn ledger(ns: &Namespace) -> SchemaEffect {
    Ddl::new(ns).table(
        "schema_migrations",
        r#"
        revision    INTEGER PRIMARY KEY,
        name        VARCHAR(100) NOT NULL,
        checksum    CHAR(64) NOT NULL,
        applied_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
        "#,
    )
}

fn identity(ddl: &Ddl) -> Vec<SchemaEffect> {
    vec![
        ddl.enum_type("user_status", &["active", "suspended", "inactive"]),
        ddl.table(
            "roles",
            r#"
            id              UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name            VARCHAR(100) NOT NULL,
            description     TEXT,
            is_system_role  BOOLEAN NOT NULL DEFAULT FALSE,
            created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
            "#,
        ),
        ddl.constraint("roles", "roles_name_key", "UNIQUE (name)"),
        ddl.table(
            "users",
            r#"
            id              UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            email           VARCHAR(255) NOT NULL,
            password_hash   TEXT NOT NULL,
            first_name      VARCHAR(100) NOT NULL,
            last_name       VARCHAR(100) NOT NULL,
            role            VARCHAR(50) NOT NULL DEFAULT 'physician',
            role_id         UUID,
            is_admin        BOOLEAN NOT NULL DEFAULT FALSE,
            is_ephemeral    BOOLEAN NOT NULL DEFAULT FALSE,
            status          {schema}.user_status NOT NULL DEFAULT 'active',
            credentials     VARCHAR(50),
            npi             VARCHAR(10),
            last_login      TIMESTAMPTZ,
            created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
            "#,
        ),
        ddl.constraint("users", "users_email_key", "UNIQUE (email)"),
        ddl.constraint(
            "users",
            "users_role_id_fkey",
            "FOREIGN KEY (role_id) REFERENCES {schema}.roles(id) ON DELETE SET NULL",
        ),
        ddl.index("users_role_id_idx", "users", "(role_id)"),
    ]
}

fn patient_chart(ddl: &Ddl) -> Vec<SchemaEffect> {
    vec![
        ddl.enum_type("problem_status", &["active", "resolved", "inactive"]),
        ddl.enum_type("allergy_severity", &["mild", "moderate", "severe"]),
        ddl.table(
            "patients",
            r#"
            id                     UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            mrn                    VARCHAR(50) NOT NULL,
            first_name             VARCHAR(100) NOT NULL,
            last_name              VARCHAR(100) NOT NULL,
            dob                    DATE NOT NULL,
            sex                    VARCHAR(10) CHECK (sex IN ('M', 'F', 'Other')),
            phone                  VARCHAR(20),
            email                  VARCHAR(255),
            address_line1          VARCHAR(255),
            city                   VARCHAR(100),
            state                  VARCHAR(50),
            zip                    VARCHAR(20),
            primary_care_provider  UUID REFERENCES {schema}.users(id) ON DELETE SET NULL,
            created_at             TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at             TIMESTAMPTZ NOT NULL DEFAULT NOW()
            "#,
        ),
        ddl.constraint("patients", "patients_mrn_key", "UNIQUE (mrn)"),
        ddl.index("patients_name_idx", "patients", "(last_name, first_name)"),
        ddl.table(
            "problems",
            r#"
            id            UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            patient_id    UUID NOT NULL REFERENCES {schema}.patients(id) ON DELETE CASCADE,
            problem_name  VARCHAR(255) NOT NULL,
            icd10_code    VARCHAR(20),
            onset_date    DATE,
            status        {schema}.problem_status NOT NULL DEFAULT 'active',
            created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
            "#,
        ),
        ddl.constraint(
            "problems",
            "problems_patient_code_key",
            "UNIQUE (patient_id, icd10_code)",
        ),
        ddl.index("problems_patient_idx", "problems", "(patient_id)"),
        ddl.table(
            "medications",
            r#"
            id               UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            patient_id       UUID NOT NULL REFERENCES {schema}.patients(id) ON DELETE CASCADE,
            medication_name  VARCHAR(255) NOT NULL,
            dosage           VARCHAR(100),
            frequency        VARCHAR(100),
            route            VARCHAR(50),
            start_date       DATE,
            end_date         DATE,
            active           BOOLEAN NOT NULL DEFAULT TRUE,
            instructions     TEXT,
            prescriber_id    UUID REFERENCES {schema}.users(id) ON DELETE SET NULL,
            created_at       TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at       TIMESTAMPTZ NOT NULL DEFAULT NOW()
            "#,
        ),
        ddl.index("medications_patient_idx", "medications", "(patient_id) WHERE active"),
        ddl.table(
            "allergies",
            r#"
            id          UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            patient_id  UUID NOT NULL REFERENCES {schema}.patients(id) ON DELETE CASCADE,
            allergen    VARCHAR(255) NOT NULL,
            reaction    VARCHAR(255),
            severity    {schema}.allergy_severity,
            onset_date  DATE,
            active      BOOLEAN NOT NULL DEFAULT TRUE,
            created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
            "#,
        ),
        ddl.index("allergies_patient_idx", "allergies", "(patient_id)"),
        ddl.table(
            "family_history",
            r#"
            id                UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            patient_id        UUID NOT NULL REFERENCES {schema}.patients(id) ON DELETE CASCADE,
            condition         VARCHAR(255) NOT NULL,
            relationship      VARCHAR(100) NOT NULL,
            age_at_diagnosis  INTEGER CHECK (age_at_diagnosis >= 0),
            notes             TEXT,
            created_at        TIMESTAMPTZ NOT NULL DEFAULT NOW()
            "#,
        ),
        ddl.table(
            "social_history",
            r#"
            id                  UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            patient_id          UUID NOT NULL REFERENCES {schema}.patients(id) ON DELETE CASCADE,
            smoking_status      VARCHAR(50),
            smoking_pack_years  NUMERIC(5,2),
            alcohol_use         VARCHAR(50),
            exercise_frequency  VARCHAR(100),
            occupation          VARCHAR(255),
            living_situation    VARCHAR(255),
            notes               TEXT,
            created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW()
            "#,
        ),
        ddl.constraint(
            "social_history",
            "social_history_patient_key",
            "UNIQUE (patient_id)",
        ),
    ]
}

fn encounters(ddl: &Ddl) -> Vec<SchemaEffect> {
    vec![
        ddl.enum_type("visit_status", &["draft", "signed"]),
        ddl.enum_type("order_type", &["lab", "imaging", "rx", "referral"]),
        ddl.enum_type("order_status", &["pending", "sent", "completed", "cancelled"]),
        ddl.enum_type(
            "appointment_status",
            &["scheduled", "confirmed", "checked_in", "in_progress", "completed", "cancelled", "no_show"],
        ),
        ddl.table(
            "visits",
            r#"
            id              UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            patient_id      UUID NOT NULL REFERENCES {schema}.patients(id) ON DELETE CASCADE,
            provider_id     UUID NOT NULL REFERENCES {schema}.users(id) ON DELETE RESTRICT,
            visit_date      TIMESTAMPTZ NOT NULL,
            encounter_date  DATE NOT NULL,
            visit_type      VARCHAR(50),
            note_type       VARCHAR(50) NOT NULL DEFAULT 'office_visit',
            reason          VARCHAR(255),
            vitals          JSONB,
            note_draft      TEXT,
            note_signed_by  UUID REFERENCES {schema}.users(id) ON DELETE SET NULL,
            note_signed_at  TIMESTAMPTZ,
            status          {schema}.visit_status NOT NULL DEFAULT 'draft',
            locked          BOOLEAN NOT NULL DEFAULT FALSE,
            created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
            "#,
        ),
        ddl.constraint(
            "visits",
            "visits_signed_has_timestamp",
            "CHECK (status <> 'signed' OR note_signed_at IS NOT NULL)",
        ),
        ddl.index("visits_patient_date_idx", "visits", "(patient_id, visit_date DESC)"),
        ddl.unique_index(
            "visits_one_open_draft_per_day",
            "visits",
            "(patient_id, encounter_date, note_type) WHERE status = 'draft' AND note_signed_at IS NULL",
        ),
        ddl.table(
            "orders",
            r#"
            id              UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            patient_id      UUID NOT NULL REFERENCES {schema}.patients(id) ON DELETE CASCADE,
            visit_id        UUID REFERENCES {schema}.visits(id) ON DELETE SET NULL,
            order_type      {schema}.order_type NOT NULL,
            status          {schema}.order_status NOT NULL DEFAULT 'pending',
            ordered_by      UUID NOT NULL REFERENCES {schema}.users(id) ON DELETE RESTRICT,
            test_name       VARCHAR(255),
            test_code       VARCHAR(50),
            order_payload   JSONB,
            result_payload  JSONB,
            completed_at    TIMESTAMPTZ,
            reviewed        BOOLEAN NOT NULL DEFAULT FALSE,
            reviewed_at     TIMESTAMPTZ,
            reviewed_by     UUID REFERENCES {schema}.users(id) ON DELETE SET NULL,
            created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
            "#,
        ),
        ddl.index("orders_patient_idx", "orders", "(patient_id)"),
        ddl.index("orders_status_idx", "orders", "(status, created_at DESC)"),
        ddl.table(
            "appointments",
            r#"
            id                UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            patient_id        UUID NOT NULL REFERENCES {schema}.patients(id) ON DELETE CASCADE,
            provider_id       UUID NOT NULL REFERENCES {schema}.users(id) ON DELETE RESTRICT,
            appointment_date  DATE NOT NULL,
            appointment_time  TIME NOT NULL,
            duration          INTEGER NOT NULL DEFAULT 30 CHECK (duration > 0),
            appointment_type  VARCHAR(50) NOT NULL DEFAULT 'Follow-up',
            status            {schema}.appointment_status NOT NULL DEFAULT 'scheduled',
            notes             TEXT,
            created_by        UUID REFERENCES {schema}.users(id) ON DELETE SET NULL,
            created_at        TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at        TIMESTAMPTZ NOT NULL DEFAULT NOW()
            "#,
        ),
        ddl.index(
            "appointments_schedule_idx",
            "appointments",
            "(appointment_date, appointment_time)",
        ),
        ddl.index("appointments_patient_idx", "appointments", "(patient_id)"),
        ddl.table(
            "documents",
            r#"
            id           UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            patient_id   UUID NOT NULL REFERENCES {schema}.patients(id) ON DELETE CASCADE,
            visit_id     UUID REFERENCES {schema}.visits(id) ON DELETE SET NULL,
            uploader_id  UUID REFERENCES {schema}.users(id) ON DELETE SET NULL,
            doc_type     VARCHAR(50) CHECK (doc_type IN ('imaging', 'consult', 'lab', 'other')),
            filename     VARCHAR(255) NOT NULL,
            file_path    VARCHAR(500) NOT NULL,
            mime_type    VARCHAR(100),
            file_size    BIGINT,
            tags         TEXT[],
            reviewed     BOOLEAN NOT NULL DEFAULT FALSE,
            created_at   TIMESTAMPTZ NOT NULL DEFAULT NOW()
            "#,
        ),
        ddl.index("documents_patient_idx", "documents", "(patient_id)"),
        ddl.table(
            "referrals",
            r#"
            id                   UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            patient_id           UUID NOT NULL REFERENCES {schema}.patients(id) ON DELETE CASCADE,
            visit_id             UUID REFERENCES {schema}.visits(id) ON DELETE SET NULL,
            created_by           UUID REFERENCES {schema}.users(id) ON DELETE SET NULL,
            recipient_name       VARCHAR(255),
            recipient_specialty  VARCHAR(100),
            reason               TEXT NOT NULL,
            status               {schema}.order_status NOT NULL DEFAULT 'pending',
            referral_letter      TEXT,
            created_at           TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at           TIMESTAMPTZ NOT NULL DEFAULT NOW()
            "#,
        ),
        ddl.table(
            "messages",
            r#"
            id            UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            patient_id    UUID REFERENCES {schema}.patients(id) ON DELETE CASCADE,
            from_user_id  UUID REFERENCES {schema}.users(id) ON DELETE SET NULL,
            to_user_id    UUID REFERENCES {schema}.users(id) ON DELETE SET NULL,
            subject       VARCHAR(255),
            body          TEXT NOT NULL,
            message_type  VARCHAR(20) NOT NULL DEFAULT 'message' CHECK (message_type IN ('message', 'task')),
            priority      VARCHAR(20) NOT NULL DEFAULT 'normal' CHECK (priority IN ('low', 'normal', 'high', 'urgent')),
            read_at       TIMESTAMPTZ,
            created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
            "#,
        ),
        ddl.index("messages_recipient_idx", "messages", "(to_user_id, created_at DESC)"),
    ]
}

fn operating_configuration(ddl: &Ddl) -> Vec<SchemaEffect> {
    // Settings tables hold exactly one row, enforced by the `singleton` key.
    vec![
        ddl.table(
            "practice_settings",
            r#"
            id             UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            singleton      BOOLEAN NOT NULL DEFAULT TRUE UNIQUE CHECK (singleton),
            practice_name  VARCHAR(255) NOT NULL,
            practice_type  VARCHAR(100),
            npi            VARCHAR(20),
            phone          VARCHAR(20),
            email          VARCHAR(255),
            address_line1  VARCHAR(255),
            city           VARCHAR(100),
            state          VARCHAR(50),
            zip            VARCHAR(20),
            timezone       VARCHAR(50) NOT NULL DEFAULT 'America/New_York',
            date_format    VARCHAR(20) NOT NULL DEFAULT 'MM/DD/YYYY',
            time_format    VARCHAR(10) NOT NULL DEFAULT '12h',
            updated_by     UUID REFERENCES {schema}.users(id) ON DELETE SET NULL,
            created_at     TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at     TIMESTAMPTZ NOT NULL DEFAULT NOW()
            "#,
        ),
        ddl.table(
            "clinical_settings",
            r#"
            id                              UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            singleton                       BOOLEAN NOT NULL DEFAULT TRUE UNIQUE CHECK (singleton),
            require_dx_on_visit             BOOLEAN NOT NULL DEFAULT TRUE,
            require_vitals_on_visit         BOOLEAN NOT NULL DEFAULT FALSE,
            enable_clinical_alerts          BOOLEAN NOT NULL DEFAULT TRUE,
            enable_drug_interaction_check   BOOLEAN NOT NULL DEFAULT TRUE,
            enable_allergy_alerts           BOOLEAN NOT NULL DEFAULT TRUE,
            default_visit_duration_minutes  INTEGER NOT NULL DEFAULT 15,
            updated_by                      UUID REFERENCES {schema}.users(id) ON DELETE SET NULL,
            created_at                      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at                      TIMESTAMPTZ NOT NULL DEFAULT NOW()
            "#,
        ),
        ddl.table(
            "security_settings",
            r#"
            id                        UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            singleton                 BOOLEAN NOT NULL DEFAULT TRUE UNIQUE CHECK (singleton),
            password_min_length       INTEGER NOT NULL DEFAULT 8,
            session_timeout_minutes   INTEGER NOT NULL DEFAULT 30,
            max_login_attempts        INTEGER NOT NULL DEFAULT 5,
            lockout_duration_minutes  INTEGER NOT NULL DEFAULT 15,
            require_2fa               BOOLEAN NOT NULL DEFAULT FALSE,
            audit_log_retention_days  INTEGER NOT NULL DEFAULT 365,
            updated_by                UUID REFERENCES {schema}.users(id) ON DELETE SET NULL,
            created_at                TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at                TIMESTAMPTZ NOT NULL DEFAULT NOW()
            "#,
        ),
        ddl.table(
            "feature_flags",
            r#"
            id           UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            feature_key  VARCHAR(100) NOT NULL,
            category     VARCHAR(100),
            enabled      BOOLEAN NOT NULL DEFAULT FALSE,
            config_data  JSONB,
            created_at   TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at   TIMESTAMPTZ NOT NULL DEFAULT NOW()
            "#,
        ),
        ddl.constraint("feature_flags", "feature_flags_key_key", "UNIQUE (feature_key)"),
    ]
}

fn patient_flags(ddl: &Ddl) -> Vec<SchemaEffect> {
    vec![
        ddl.enum_type("flag_severity", &["info", "warn", "critical"]),
        ddl.table(
            "flag_types",
            r#"
            id                       UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            label                    VARCHAR(100) NOT NULL,
            category                 VARCHAR(20) NOT NULL CHECK (category IN ('clinical', 'admin', 'safety')),
            severity                 {schema}.flag_severity NOT NULL,
            color                    VARCHAR(16),
            requires_acknowledgment  BOOLEAN NOT NULL DEFAULT FALSE,
            is_default               BOOLEAN NOT NULL DEFAULT FALSE,
            created_at               TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at               TIMESTAMPTZ NOT NULL DEFAULT NOW()
            "#,
        ),
        ddl.constraint("flag_types", "flag_types_label_key", "UNIQUE (label)"),
        ddl.table(
            "patient_flags",
            r#"
            id                   UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            patient_id           UUID NOT NULL REFERENCES {schema}.patients(id) ON DELETE CASCADE,
            flag_type_id         UUID NOT NULL REFERENCES {schema}.flag_types(id) ON DELETE CASCADE,
            note                 TEXT,
            status               VARCHAR(20) NOT NULL DEFAULT 'active' CHECK (status IN ('active', 'resolved', 'expired')),
            created_by_user_id   UUID REFERENCES {schema}.users(id) ON DELETE SET NULL,
            resolved_by_user_id  UUID REFERENCES {schema}.users(id) ON DELETE SET NULL,
            expires_at           TIMESTAMPTZ,
            resolved_at          TIMESTAMPTZ,
            created_at           TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at           TIMESTAMPTZ NOT NULL DEFAULT NOW()
            "#,
        ),
        ddl.index("patient_flags_patient_idx", "patient_flags", "(patient_id) WHERE status = 'active'"),
        ddl.table(
            "patient_flag_acknowledgments",
            r#"
            id               UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            patient_flag_id  UUID NOT NULL REFERENCES {schema}.patient_flags(id) ON DELETE CASCADE,
            user_id          UUID NOT NULL REFERENCES {schema}.users(id) ON DELETE CASCADE,
            acknowledged_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
            "#,
        ),
        ddl.constraint(
            "patient_flag_acknowledgments",
            "patient_flag_ack_once_key",
            "UNIQUE (patient_flag_id, user_id)",
        ),
    ]
}

fn activity_and_audit(ddl: &Ddl) -> Vec<SchemaEffect> {
    vec![
        ddl.table(
            "activity_events",
            r#"
            id           UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            user_id      UUID NOT NULL REFERENCES {schema}.users(id) ON DELETE CASCADE,
            patient_id   UUID REFERENCES {schema}.patients(id) ON DELETE CASCADE,
            event_type   VARCHAR(50) NOT NULL,
            occurred_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            metadata     JSONB
            "#,
        ),
        ddl.index(
            "activity_events_recent_idx",
            "activity_events",
            "(user_id, event_type, occurred_at DESC)",
        ),
        ddl.table(
            "audit_logs",
            r#"
            id           UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            user_id      UUID REFERENCES {schema}.users(id) ON DELETE SET NULL,
            action       VARCHAR(100) NOT NULL,
            target_type  VARCHAR(50),
            target_id    UUID,
            details      JSONB,
            ip_address   VARCHAR(64),
            created_at   TIMESTAMPTZ NOT NULL DEFAULT NOW()
            "#,
        ),
        ddl.index("audit_logs_user_idx", "audit_logs", "(user_id)"),
        ddl.index("audit_logs_target_idx", "audit_logs", "(target_type, target_id)"),
        ddl.index("audit_logs_created_idx", "audit_logs", "(created_at DESC)"),
    ]
}

fn search(ddl: &Ddl) -> Vec<SchemaEffect> {
    vec![
        ddl.extension("pg_trgm"),
        ddl.index(
            "patients_name_trgm_idx",
            "patients",
            "USING gin ((first_name || ' ' || last_name) public.gin_trgm_ops)",
        ),
        ddl.index("patients_mrn_trgm_idx", "patients", "USING gin (mrn public.gin_trgm_ops)"),
        ddl.index(
            "problems_name_fts_idx",
            "problems",
            "USING gin (to_tsvector('english', problem_name))",
        ),
        ddl.index(
            "visits_note_fts_idx",
            "visits",
            "USING gin (to_tsvector('english', coalesce(note_draft, '')))",
        ),
    ]
}

fn drift_backfill(ddl: &Ddl) -> Vec<SchemaEffect> {
    vec![
        ddl.columns(
            "patients",
            &[
                "middle_name VARCHAR(100)",
                "preferred_name VARCHAR(100)",
                "preferred_language VARCHAR(50)",
                "insurance_provider VARCHAR(255)",
                "insurance_member_id VARCHAR(100)",
                "pharmacy_name VARCHAR(255)",
                "pharmacy_phone VARCHAR(20)",
                "deceased BOOLEAN NOT NULL DEFAULT FALSE",
                "deceased_date DATE",
            ],
        ),
        ddl.columns(
            "appointments",
            &[
                "patient_status VARCHAR(50) NOT NULL DEFAULT 'scheduled'",
                "current_room VARCHAR(20)",
                "arrival_time TIMESTAMPTZ",
                "checkout_time TIMESTAMPTZ",
                "cancellation_reason TEXT",
                "status_history JSONB NOT NULL DEFAULT '[]'::jsonb",
            ],
        ),
        ddl.columns(
            "audit_logs",
            &[
                "outcome VARCHAR(20) NOT NULL DEFAULT 'success'",
                "request_id VARCHAR(100)",
                "session_id UUID",
            ],
        ),
        ddl.enum_value("visit_status", "amended"),
    ]
}

fn triggers(ddl: &Ddl) -> Vec<SchemaEffect> {
    let mut effects = vec![ddl.function(
        "set_updated_at",
        "() RETURNS TRIGGER AS $fn$
         BEGIN NEW.updated_at = NOW(); RETURN NEW; END;
         $fn$ LANGUAGE plpgsql",
    )];
    effects.extend(
        UPDATED_AT_TABLES
            .iter()
            .map(|table| ddl.update_trigger(table, "set_updated_at")),
    );
    effects
}

fn access_control(ddl: &Ddl) -> Vec<SchemaEffect> {
    vec![
        ddl.table(
            "privileges",
            r#"
            id           UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name         VARCHAR(100) NOT NULL,
            description  TEXT,
            category     VARCHAR(50),
            created_at   TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at   TIMESTAMPTZ NOT NULL DEFAULT NOW()
            "#,
        ),
        ddl.constraint("privileges", "privileges_name_key", "UNIQUE (name)"),
        ddl.table(
            "role_privileges",
            r#"
            id            UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            role_id       UUID NOT NULL REFERENCES {schema}.roles(id) ON DELETE CASCADE,
            privilege_id  UUID NOT NULL REFERENCES {schema}.privileges(id) ON DELETE CASCADE,
            granted_by    UUID REFERENCES {schema}.users(id) ON DELETE SET NULL,
            granted_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
            "#,
        ),
        ddl.constraint(
            "role_privileges",
            "role_privileges_role_privilege_key",
            "UNIQUE (role_id, privilege_id)",
        ),
        ddl.table(
            "sessions",
            r#"
            id             UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            user_id        UUID NOT NULL REFERENCES {schema}.users(id) ON DELETE CASCADE,
            token_hash     VARCHAR(255) NOT NULL,
            ip_address     VARCHAR(45),
            user_agent     TEXT,
            expires_at     TIMESTAMPTZ NOT NULL,
            last_activity  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            created_at     TIMESTAMPTZ NOT NULL DEFAULT NOW()
            "#,
        ),
        ddl.index("sessions_user_idx", "sessions", "(user_id)"),
        ddl.index("sessions_expires_idx", "sessions", "(expires_at)"),
        ddl.update_trigger("privileges", "set_updated_at"),
    ]
}

fn clinical_support(ddl: &Ddl) -> Vec<SchemaEffect> {
    vec![
        ddl.table(
            "order_sets",
            r#"
            id           UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name         VARCHAR(255) NOT NULL,
            description  TEXT,
            items        JSONB NOT NULL DEFAULT '[]'::jsonb,
            is_public    BOOLEAN NOT NULL DEFAULT FALSE,
            created_by   UUID REFERENCES {schema}.users(id) ON DELETE SET NULL,
            created_at   TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at   TIMESTAMPTZ NOT NULL DEFAULT NOW()
            "#,
        ),
        ddl.table(
            "clinical_alerts",
            r#"
            id               UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            patient_id       UUID NOT NULL REFERENCES {schema}.patients(id) ON DELETE CASCADE,
            alert_type       VARCHAR(50) NOT NULL,
            severity         VARCHAR(20) NOT NULL DEFAULT 'normal'
                               CHECK (severity IN ('low', 'normal', 'high', 'critical')),
            message          TEXT NOT NULL,
            rule_name        VARCHAR(100),
            active           BOOLEAN NOT NULL DEFAULT TRUE,
            acknowledged_by  UUID REFERENCES {schema}.users(id) ON DELETE SET NULL,
            acknowledged_at  TIMESTAMPTZ,
            created_at       TIMESTAMPTZ NOT NULL DEFAULT NOW()
            "#,
        ),
        ddl.index("clinical_alerts_patient_idx", "clinical_alerts", "(patient_id)"),
        ddl.index("clinical_alerts_active_idx", "clinical_alerts", "(active, severity)"),
        ddl.table(
            "lab_reference_ranges",
            r#"
            id             UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            test_name      VARCHAR(255) NOT NULL,
            test_code      VARCHAR(50),
            age_min        INTEGER,
            age_max        INTEGER,
            sex            VARCHAR(10),
            normal_min     NUMERIC(10, 2),
            normal_max     NUMERIC(10, 2),
            units          VARCHAR(50),
            critical_low   NUMERIC(10, 2),
            critical_high  NUMERIC(10, 2),
            active         BOOLEAN NOT NULL DEFAULT TRUE,
            created_at     TIMESTAMPTZ NOT NULL DEFAULT NOW()
            "#,
        ),
        ddl.index("lab_reference_ranges_code_idx", "lab_reference_ranges", "(test_code)"),
        ddl.table(
            "cancellation_followups",
            r#"
            id              UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            appointment_id  UUID REFERENCES {schema}.appointments(id) ON DELETE SET NULL,
            patient_id      UUID REFERENCES {schema}.patients(id) ON DELETE CASCADE,
            provider_id     UUID REFERENCES {schema}.users(id) ON DELETE SET NULL,
            status          VARCHAR(50) NOT NULL DEFAULT 'pending',
            reason          TEXT,
            addressed_by    UUID REFERENCES {schema}.users(id) ON DELETE SET NULL,
            addressed_at    TIMESTAMPTZ,
            dismissed_by    UUID REFERENCES {schema}.users(id) ON DELETE SET NULL,
            dismissed_at    TIMESTAMPTZ,
            dismiss_reason  TEXT,
            notes           TEXT,
            created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
            "#,
        ),
        ddl.index(
            "cancellation_followups_open_idx",
            "cancellation_followups",
            "(provider_id) WHERE status = 'pending'",
        ),
        ddl.table(
            "cancellation_followup_notes",
            r#"
            id               UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            followup_id      UUID NOT NULL REFERENCES {schema}.cancellation_followups(id) ON DELETE CASCADE,
            note             TEXT NOT NULL,
            note_type        VARCHAR(50) NOT NULL DEFAULT 'general',
            created_by       UUID REFERENCES {schema}.users(id) ON DELETE SET NULL,
            created_by_name  VARCHAR(255),
            created_at       TIMESTAMPTZ NOT NULL DEFAULT NOW()
            "#,
        ),
        ddl.index(
            "cancellation_followup_notes_followup_idx",
            "cancellation_followup_notes",
            "(followup_id)",
        ),
        ddl.update_trigger("order_sets", "set_updated_at"),
        ddl.update_trigger("cancellation_followups", "set_updated_at"),
    ]
}

fn billing(ddl: &Ddl) -> Vec<SchemaEffect> {
    vec![
        ddl.enum_type("claim_status", &["pending", "submitted", "paid", "denied", "cancelled"]),
        ddl.table(
            "insurance_plans",
            r#"
            id          UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name        VARCHAR(255) NOT NULL,
            payer_id    VARCHAR(50),
            plan_type   VARCHAR(50),
            active      BOOLEAN NOT NULL DEFAULT TRUE,
            created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
            "#,
        ),
        ddl.table(
            "fee_schedule",
            r#"
            id           UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            code_type    VARCHAR(20) NOT NULL CHECK (code_type IN ('CPT', 'HCPCS', 'ICD10')),
            code         VARCHAR(50) NOT NULL,
            description  TEXT,
            fee_amount   NUMERIC(10, 2),
            active       BOOLEAN NOT NULL DEFAULT TRUE,
            created_at   TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at   TIMESTAMPTZ NOT NULL DEFAULT NOW()
            "#,
        ),
        ddl.constraint("fee_schedule", "fee_schedule_code_key", "UNIQUE (code_type, code)"),
        ddl.table(
            "claims",
            r#"
            id                  UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            visit_id            UUID REFERENCES {schema}.visits(id) ON DELETE SET NULL,
            patient_id          UUID NOT NULL REFERENCES {schema}.patients(id) ON DELETE CASCADE,
            insurance_plan_id   UUID REFERENCES {schema}.insurance_plans(id) ON DELETE SET NULL,
            diagnosis_codes     JSONB NOT NULL DEFAULT '[]'::jsonb,
            procedure_codes     JSONB NOT NULL DEFAULT '[]'::jsonb,
            total_amount        NUMERIC(10, 2),
            status              {schema}.claim_status NOT NULL DEFAULT 'pending',
            insurance_provider  VARCHAR(255),
            claim_number        VARCHAR(100),
            submitted_at        TIMESTAMPTZ,
            paid_at             TIMESTAMPTZ,
            created_by          UUID REFERENCES {schema}.users(id) ON DELETE SET NULL,
            created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW()
            "#,
        ),
        ddl.index("claims_patient_idx", "claims", "(patient_id)"),
        ddl.index("claims_visit_idx", "claims", "(visit_id)"),
        ddl.update_trigger("fee_schedule", "set_updated_at"),
        ddl.update_trigger("claims", "set_updated_at"),
    ]
}

fn practice_administration(ddl: &Ddl) -> Vec<SchemaEffect> {
    vec![
        ddl.table(
            "settings",
            r#"
            id           SERIAL PRIMARY KEY,
            key          VARCHAR(255) NOT NULL,
            value        TEXT,
            description  TEXT,
            category     VARCHAR(100),
            is_public    BOOLEAN NOT NULL DEFAULT FALSE,
            updated_by   UUID REFERENCES {schema}.users(id) ON DELETE SET NULL,
            created_at   TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at   TIMESTAMPTZ NOT NULL DEFAULT NOW()
            "#,
        ),
        ddl.constraint("settings", "settings_key_key", "UNIQUE (key)"),
        ddl.table(
            "email_settings",
            r#"
            id              UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            singleton       BOOLEAN NOT NULL DEFAULT TRUE UNIQUE CHECK (singleton),
            smtp_host       VARCHAR(255),
            smtp_port       INTEGER,
            smtp_secure     BOOLEAN NOT NULL DEFAULT TRUE,
            smtp_username   VARCHAR(255),
            smtp_password   VARCHAR(255),
            from_name       VARCHAR(255),
            from_email      VARCHAR(255),
            reply_to_email  VARCHAR(255),
            enabled         BOOLEAN NOT NULL DEFAULT FALSE,
            updated_by      UUID REFERENCES {schema}.users(id) ON DELETE SET NULL,
            created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
            "#,
        ),
        ddl.update_trigger("settings", "set_updated_at"),
        ddl.update_trigger("email_settings", "set_updated_at"),
    ]
}
