//! Fixed reference catalogs the synthetic roster draws from.

pub struct DemoPatient {
    pub first_name: &'static str,
    pub last_name: &'static str,
    pub dob: (i32, u32, u32),
    pub sex: &'static str,
    pub phone: &'static str,
    pub email: &'static str,
}

pub const DEMO_PATIENTS: &[DemoPatient] = &[
    DemoPatient { first_name: "John", last_name: "Doe", dob: (1975, 6, 12), sex: "M", phone: "555-0101", email: "john.doe@demo.com" },
    DemoPatient { first_name: "Jane", last_name: "Smith", dob: (1982, 3, 24), sex: "F", phone: "555-0102", email: "jane.smith@demo.com" },
    DemoPatient { first_name: "Alice", last_name: "Johnson", dob: (1990, 11, 5), sex: "F", phone: "555-0103", email: "alice.j@demo.com" },
    DemoPatient { first_name: "Bob", last_name: "Brown", dob: (1968, 9, 18), sex: "M", phone: "555-0104", email: "bob.b@demo.com" },
    DemoPatient { first_name: "Charlie", last_name: "Davis", dob: (1955, 12, 30), sex: "M", phone: "555-0105", email: "charlie.d@demo.com" },
    DemoPatient { first_name: "Diana", last_name: "Evans", dob: (1988, 7, 21), sex: "F", phone: "555-0106", email: "diana.e@demo.com" },
    DemoPatient { first_name: "Edward", last_name: "Frank", dob: (1972, 4, 15), sex: "M", phone: "555-0107", email: "ed.f@demo.com" },
    DemoPatient { first_name: "Fiona", last_name: "Garcia", dob: (1995, 1, 10), sex: "F", phone: "555-0108", email: "fiona.g@demo.com" },
    DemoPatient { first_name: "George", last_name: "Harris", dob: (1963, 8, 2), sex: "M", phone: "555-0109", email: "george.h@demo.com" },
    DemoPatient { first_name: "Hannah", last_name: "Ives", dob: (1980, 5, 25), sex: "F", phone: "555-0110", email: "hannah.i@demo.com" },
];

/// Chronic conditions as (description, ICD-10 code).
pub const CONDITIONS: &[(&str, &str)] = &[
    ("Essential hypertension", "I10"),
    ("Type 2 diabetes mellitus without complications", "E11.9"),
    ("Hyperlipidemia, unspecified", "E78.5"),
    ("Obesity, unspecified", "E66.9"),
    ("Chronic obstructive pulmonary disease, unspecified", "J44.9"),
    ("Asthma, uncomplicated", "J45.909"),
    ("Hypothyroidism, unspecified", "E03.9"),
    ("Gastro-esophageal reflux disease without esophagitis", "K21.9"),
    ("Major depressive disorder, single episode, unspecified", "F32.9"),
    ("Generalized anxiety disorder", "F41.1"),
    ("Osteoarthritis of knee, unspecified", "M17.9"),
    ("Chronic kidney disease, stage 3 unspecified", "N18.30"),
];

pub struct Medication {
    pub name: &'static str,
    pub dosage: &'static str,
    pub frequency: &'static str,
    pub route: &'static str,
}

pub const MEDICATIONS: &[Medication] = &[
    Medication { name: "Lisinopril", dosage: "10 mg", frequency: "Once daily", route: "PO" },
    Medication { name: "Metformin", dosage: "500 mg", frequency: "Twice daily", route: "PO" },
    Medication { name: "Atorvastatin", dosage: "20 mg", frequency: "Once daily at bedtime", route: "PO" },
    Medication { name: "Amlodipine", dosage: "5 mg", frequency: "Once daily", route: "PO" },
    Medication { name: "Levothyroxine", dosage: "50 mcg", frequency: "Once daily before breakfast", route: "PO" },
    Medication { name: "Omeprazole", dosage: "20 mg", frequency: "Once daily", route: "PO" },
    Medication { name: "Sertraline", dosage: "50 mg", frequency: "Once daily", route: "PO" },
    Medication { name: "Albuterol HFA", dosage: "90 mcg/actuation", frequency: "Every 4-6 hours as needed", route: "Inhaled" },
    Medication { name: "Hydrochlorothiazide", dosage: "25 mg", frequency: "Once daily", route: "PO" },
    Medication { name: "Metoprolol succinate", dosage: "25 mg", frequency: "Once daily", route: "PO" },
    Medication { name: "Gabapentin", dosage: "300 mg", frequency: "Three times daily", route: "PO" },
    Medication { name: "Aspirin", dosage: "81 mg", frequency: "Once daily", route: "PO" },
];

/// Allergies as (allergen, reaction, severity).
pub const ALLERGIES: &[(&str, &str, &str)] = &[
    ("Penicillin", "Hives", "moderate"),
    ("Sulfa drugs", "Rash", "mild"),
    ("Peanuts", "Anaphylaxis", "severe"),
    ("Latex", "Contact dermatitis", "mild"),
    ("Codeine", "Nausea and vomiting", "moderate"),
    ("Shellfish", "Swelling of lips", "severe"),
];

pub const VISIT_REASONS: &[&str] = &[
    "Chronic care follow-up",
    "Blood pressure check",
    "Medication review",
    "Annual physical",
    "Lab results review",
    "Weight management follow-up",
];

pub const APPOINTMENT_TYPES: &[&str] = &["Follow-up", "Office Visit", "Physical", "Telehealth", "Lab Review"];

pub struct Analyte {
    pub name: &'static str,
    pub unit: &'static str,
    pub low: f64,
    pub high: f64,
}

pub struct LabPanel {
    pub test_name: &'static str,
    pub test_code: &'static str,
    pub analytes: &'static [Analyte],
}

pub const LAB_PANELS: &[LabPanel] = &[
    LabPanel {
        test_name: "Basic Metabolic Panel",
        test_code: "80048",
        analytes: &[
            Analyte { name: "Glucose", unit: "mg/dL", low: 70.0, high: 99.0 },
            Analyte { name: "BUN", unit: "mg/dL", low: 7.0, high: 20.0 },
            Analyte { name: "Creatinine", unit: "mg/dL", low: 0.6, high: 1.2 },
            Analyte { name: "Sodium", unit: "mmol/L", low: 135.0, high: 145.0 },
            Analyte { name: "Potassium", unit: "mmol/L", low: 3.5, high: 5.1 },
        ],
    },
    LabPanel {
        test_name: "Lipid Panel",
        test_code: "80061",
        analytes: &[
            Analyte { name: "Total Cholesterol", unit: "mg/dL", low: 125.0, high: 200.0 },
            Analyte { name: "LDL", unit: "mg/dL", low: 0.0, high: 100.0 },
            Analyte { name: "HDL", unit: "mg/dL", low: 40.0, high: 90.0 },
            Analyte { name: "Triglycerides", unit: "mg/dL", low: 0.0, high: 150.0 },
        ],
    },
    LabPanel {
        test_name: "Hemoglobin A1c",
        test_code: "83036",
        analytes: &[Analyte { name: "HbA1c", unit: "%", low: 4.0, high: 5.6 }],
    },
    LabPanel {
        test_name: "Thyroid Stimulating Hormone",
        test_code: "84443",
        analytes: &[Analyte { name: "TSH", unit: "mIU/L", low: 0.4, high: 4.0 }],
    },
];

pub struct FlagType {
    pub label: &'static str,
    pub category: &'static str,
    pub severity: &'static str,
    pub color: &'static str,
    pub requires_acknowledgment: bool,
}

/// Flag types every new tenant starts with.
pub const DEFAULT_FLAG_TYPES: &[FlagType] = &[
    FlagType { label: "VIP", category: "admin", severity: "info", color: "#8b5cf6", requires_acknowledgment: false },
    FlagType { label: "High Risk", category: "clinical", severity: "warn", color: "#f59e0b", requires_acknowledgment: false },
    FlagType { label: "Fall Risk", category: "clinical", severity: "warn", color: "#f59e0b", requires_acknowledgment: false },
    FlagType { label: "Infection Precaution", category: "clinical", severity: "critical", color: "#ef4444", requires_acknowledgment: false },
    FlagType { label: "Allergy Alert", category: "clinical", severity: "critical", color: "#ef4444", requires_acknowledgment: false },
    FlagType { label: "Behavioral Alert", category: "safety", severity: "critical", color: "#ef4444", requires_acknowledgment: true },
    FlagType { label: "Billing Hold", category: "admin", severity: "warn", color: "#f59e0b", requires_acknowledgment: false },
    FlagType { label: "Language Assistance", category: "admin", severity: "info", color: "#3b82f6", requires_acknowledgment: false },
    FlagType { label: "Security Risk", category: "safety", severity: "critical", color: "#ef4444", requires_acknowledgment: true },
];

/// Access privileges every new tenant starts with: (name, description, category).
pub const DEFAULT_PRIVILEGES: &[(&str, &str, &str)] = &[
    ("document_visit", "Document patient visits", "clinical"),
    ("sign_notes", "Sign and finalize visit notes", "clinical"),
    ("view_labs", "View laboratory results", "clinical"),
    ("order_labs", "Order laboratory tests", "clinical"),
    ("view_imaging", "View imaging studies", "clinical"),
    ("order_imaging", "Order imaging studies", "clinical"),
    ("enter_vitals", "Enter patient vital signs", "clinical"),
    ("view_patients", "View patient records", "clinical"),
    ("edit_patients", "Edit patient information", "clinical"),
    ("e_prescribe", "Create and send electronic prescriptions", "clinical"),
    ("create_referrals", "Create referral orders", "clinical"),
    ("view_medications", "View patient medications", "clinical"),
    ("manage_problems", "Manage problem list", "clinical"),
    ("manage_allergies", "Manage allergies", "clinical"),
    ("search_icd10", "Search ICD-10 diagnosis codes", "clinical"),
    ("search_cpt", "Search CPT procedure codes", "clinical"),
    ("create_superbill", "Create superbills", "billing"),
    ("manage_claims", "Manage insurance claims", "billing"),
    ("view_billing", "View billing information", "billing"),
    ("financial_reports", "Access financial reports", "billing"),
    ("manage_users", "Create, edit, and delete users", "admin"),
    ("manage_roles", "Manage roles and privileges", "admin"),
    ("view_audit_logs", "View system audit logs", "admin"),
    ("system_settings", "Modify system settings", "admin"),
    ("promote_to_admin", "Promote users to admin", "admin"),
    ("register_patients", "Register new patients", "patient_access"),
    ("schedule_appointments", "Schedule patient appointments", "patient_access"),
    ("upload_documents", "Upload patient documents", "patient_access"),
    ("send_messages", "Send internal messages", "workflow"),
    ("assign_tasks", "Assign tasks to users", "workflow"),
    ("view_messages", "View messages", "workflow"),
];

/// Flags the seeder may attach to a synthetic patient.
pub const ADVISORY_FLAGS: &[(&str, &str)] = &[
    ("Fall Risk", "Uses a cane; assist with transfers."),
    ("High Risk", "Multiple chronic conditions; review at every visit."),
    ("Language Assistance", "Prefers Spanish-speaking staff or interpreter."),
    ("VIP", "Board member of partner hospital."),
    ("Allergy Alert", "Confirm allergy list before prescribing."),
];
