//! Synthetic clinical data for freshly provisioned partitions.

pub mod catalog;
pub mod generator;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use sqlx::types::Json;
use uuid::Uuid;

use self::generator::{SeedBundle, SeedGenerator, SeedPlan};
use crate::db::namespace::TenantScope;

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct SeedSummary {
    pub patients: usize,
    pub problems: usize,
    pub medications: usize,
    pub allergies: usize,
    pub visits: usize,
    pub draft_visits: usize,
    pub appointments: usize,
    pub lab_orders: usize,
    pub flags: usize,
}

impl SeedSummary {
    pub fn add(&mut self, bundle: &SeedBundle) {
        self.patients += 1;
        self.problems += bundle.problems.len();
        self.medications += bundle.medications.len();
        self.allergies += usize::from(bundle.allergy.is_some());
        self.visits += bundle.visits.len();
        self.draft_visits += usize::from(bundle.draft.is_some());
        self.appointments += bundle.appointments.len();
        self.lab_orders += usize::from(bundle.lab_order.is_some());
        self.flags += usize::from(bundle.flag.is_some());
    }
}

/// Fills a newly created partition with demo data. Runs inside the
/// provisioning transaction; an error rolls the whole tenant back.
#[async_trait]
pub trait Seeder: Send + Sync {
    async fn seed(&self, scope: &mut TenantScope, identity: Uuid) -> anyhow::Result<SeedSummary>;
}

pub struct ClinicalSeeder {
    roster_size: usize,
    rng_seed: Option<u64>,
}

impl ClinicalSeeder {
    pub fn new(roster_size: usize) -> Self {
        Self {
            roster_size,
            rng_seed: None,
        }
    }

    /// Reproducible rosters, for tests.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn roster(&self) -> Vec<SeedBundle> {
        let rng = match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        SeedGenerator::new(rng).roster(&SeedPlan::new(self.roster_size))
    }
}

#[async_trait]
impl Seeder for ClinicalSeeder {
    async fn seed(&self, scope: &mut TenantScope, identity: Uuid) -> anyhow::Result<SeedSummary> {
        let mut summary = SeedSummary::default();
        for bundle in self.roster() {
            write_bundle(scope, identity, &bundle).await?;
            summary.add(&bundle);
        }
        tracing::info!(namespace = %scope.namespace(), patients = summary.patients, "Seeded demo roster");
        Ok(summary)
    }
}

/// Insert one chart through the scoped connection. Table names are left
/// unqualified and resolve into the scope's namespace.
pub async fn write_bundle(
    scope: &mut TenantScope,
    identity: Uuid,
    bundle: &SeedBundle,
) -> anyhow::Result<()> {
    let conn = scope.conn();
    let p = &bundle.patient;
    sqlx::query(
        r#"INSERT INTO patients (id, mrn, first_name, last_name, dob, sex, phone, email, primary_care_provider)
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#,
    )
    .bind(p.id)
    .bind(&p.mrn)
    .bind(&p.first_name)
    .bind(&p.last_name)
    .bind(p.dob)
    .bind(p.sex)
    .bind(&p.phone)
    .bind(&p.email)
    .bind(identity)
    .execute(&mut *conn)
    .await?;

    for problem in &bundle.problems {
        sqlx::query(
            r#"INSERT INTO problems (patient_id, problem_name, icd10_code, onset_date, status)
               VALUES ($1, $2, $3, $4, 'active')"#,
        )
        .bind(p.id)
        .bind(problem.name)
        .bind(problem.icd10)
        .bind(problem.onset)
        .execute(&mut *conn)
        .await?;
    }

    for med in &bundle.medications {
        sqlx::query(
            r#"INSERT INTO medications
                 (patient_id, medication_name, dosage, frequency, route, start_date, active, prescriber_id)
               VALUES ($1, $2, $3, $4, $5, $6, TRUE, $7)"#,
        )
        .bind(p.id)
        .bind(med.name)
        .bind(med.dosage)
        .bind(med.frequency)
        .bind(med.route)
        .bind(med.start_date)
        .bind(identity)
        .execute(&mut *conn)
        .await?;
    }

    if let Some(allergy) = &bundle.allergy {
        sqlx::query(
            r#"INSERT INTO allergies (patient_id, allergen, reaction, severity)
               VALUES ($1, $2, $3, $4::allergy_severity)"#,
        )
        .bind(p.id)
        .bind(allergy.allergen)
        .bind(allergy.reaction)
        .bind(allergy.severity)
        .execute(&mut *conn)
        .await?;
    }

    for visit in &bundle.visits {
        sqlx::query(
            r#"INSERT INTO visits
                 (id, patient_id, provider_id, visit_date, encounter_date, visit_type, reason, vitals,
                  note_draft, note_signed_by, note_signed_at, status, locked)
               VALUES ($1, $2, $3, $4, $5, 'Office Visit', $6, $7, $8, $3, $4, 'signed', TRUE)"#,
        )
        .bind(visit.id)
        .bind(p.id)
        .bind(identity)
        .bind(visit.visit_date)
        .bind(visit.visit_date.date_naive())
        .bind(visit.reason)
        .bind(Json(&visit.vitals))
        .bind(&visit.note)
        .execute(&mut *conn)
        .await?;
    }

    if let Some(draft) = &bundle.draft {
        sqlx::query(
            r#"INSERT INTO visits
                 (id, patient_id, provider_id, visit_date, encounter_date, visit_type, reason, note_draft, status)
               VALUES ($1, $2, $3, $4, $5, 'Office Visit', $6, $7, 'draft')"#,
        )
        .bind(draft.id)
        .bind(p.id)
        .bind(identity)
        .bind(draft.visit_date)
        .bind(draft.visit_date.date_naive())
        .bind(draft.reason)
        .bind(&draft.note)
        .execute(&mut *conn)
        .await?;
    }

    for appt in &bundle.appointments {
        sqlx::query(
            r#"INSERT INTO appointments
                 (patient_id, provider_id, appointment_date, appointment_time, duration, appointment_type, created_by)
               VALUES ($1, $2, $3, $4, $5, $6, $2)"#,
        )
        .bind(p.id)
        .bind(identity)
        .bind(appt.date)
        .bind(appt.time)
        .bind(appt.duration)
        .bind(appt.appointment_type)
        .execute(&mut *conn)
        .await?;
    }

    if let Some(order) = &bundle.lab_order {
        sqlx::query(
            r#"INSERT INTO orders
                 (patient_id, visit_id, order_type, status, ordered_by, test_name, test_code,
                  result_payload, completed_at, created_at)
               VALUES ($1, $2, 'lab', 'completed', $3, $4, $5, $6, $7, $8)"#,
        )
        .bind(p.id)
        .bind(order.visit_id)
        .bind(identity)
        .bind(order.test_name)
        .bind(order.test_code)
        .bind(Json(&order.result))
        .bind(order.completed_at)
        .bind(order.ordered_at)
        .execute(&mut *conn)
        .await?;
    }

    if let Some(flag) = &bundle.flag {
        let inserted = sqlx::query(
            r#"INSERT INTO patient_flags (patient_id, flag_type_id, note, created_by_user_id)
               SELECT $1, id, $3, $4 FROM flag_types WHERE label = $2"#,
        )
        .bind(p.id)
        .bind(flag.label)
        .bind(flag.note)
        .bind(identity)
        .execute(&mut *conn)
        .await?
        .rows_affected();
        anyhow::ensure!(inserted == 1, "flag type {:?} is not defined", flag.label);
    }

    sqlx::query(
        r#"INSERT INTO activity_events (user_id, patient_id, event_type, occurred_at)
           VALUES ($1, $2, 'patient_viewed', $3)"#,
    )
    .bind(identity)
    .bind(p.id)
    .bind(bundle.viewed_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_bundle_rows() {
        let roster = ClinicalSeeder::new(10).with_rng_seed(42).roster();
        let mut summary = SeedSummary::default();
        for bundle in &roster {
            summary.add(bundle);
        }

        assert_eq!(summary.patients, 10);
        assert!(summary.problems >= 30 && summary.problems <= 50);
        assert!(summary.medications >= 30 && summary.medications <= 50);
        assert!(summary.visits >= 50 && summary.visits <= 100);
        assert!(summary.allergies <= 10);
    }

    #[test]
    fn test_advisory_flags_use_default_flag_types() {
        for (label, _) in catalog::ADVISORY_FLAGS {
            assert!(
                catalog::DEFAULT_FLAG_TYPES.iter().any(|t| t.label == *label),
                "{label} is not a default flag type"
            );
        }
    }

    #[test]
    fn test_rng_seed_makes_roster_reproducible() {
        let a = ClinicalSeeder::new(3).with_rng_seed(9).roster();
        let b = ClinicalSeeder::new(3).with_rng_seed(9).roster();
        assert_eq!(a[2].visits[0].vitals, b[2].visits[0].vitals);
    }
}
