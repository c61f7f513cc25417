use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_gauge, register_histogram, CounterVec, Gauge, Histogram,
};

lazy_static! {
    pub static ref PROVISIONS_COUNTER: CounterVec = register_counter_vec!(
        "tenancy_provisions_total",
        "Provisioning calls by tenant kind and outcome",
        &["kind", "outcome"]
    ).unwrap();

    pub static ref PROVISION_SECONDS: Histogram = register_histogram!(
        "tenancy_provision_duration_seconds",
        "Wall time of the provisioning transaction",
        vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    ).unwrap();

    pub static ref RECONCILE_COUNTER: CounterVec = register_counter_vec!(
        "tenancy_reconcile_tenants_total",
        "Per-tenant reconciliation outcomes",
        &["outcome"]
    ).unwrap();

    pub static ref TENANTS_GAUGE: Gauge = register_gauge!(
        "tenancy_tenants_active_total",
        "Active tenants seen by the last reconcile run"
    ).unwrap();
}
