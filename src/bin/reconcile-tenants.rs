/// Replay the current schema template against every active tenant.
/// Run after each deploy that adds a template revision.
///
/// Usage: reconcile-tenants [--namespace NAME] [--json]
///   --namespace NAME : Reconcile only this tenant (all active tenants otherwise)
///   --json           : Print the full report as JSON on stdout
///
/// Exits with status 1 when any tenant failed.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use emr_tenancy::db::{self, namespace::Namespace};
use emr_tenancy::services::directory::PgTenantDirectory;
use emr_tenancy::services::reconciler::{self, TenantOutcome};

#[derive(Parser)]
#[command(name = "reconcile-tenants", about = "Bring every tenant schema up to the current template")]
struct Args {
    /// Tenant namespace to reconcile (optional, all active tenants if not specified)
    #[arg(long)]
    namespace: Option<String>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Database connections to open
    #[arg(long, default_value_t = 2)]
    connections: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("Missing required env var: DATABASE_URL"))?;
    let pool = db::create_pool(&database_url, args.connections).await?;
    db::run_migrations(&pool).await?;

    let mut directory = PgTenantDirectory::new(pool.clone());
    if let Some(raw) = args.namespace.as_deref() {
        directory = directory.only(Namespace::parse(raw)?);
    }

    let report = reconciler::reconcile_all(&pool, &directory).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for tenant in &report.tenants {
            match &tenant.outcome {
                TenantOutcome::Applied(applied) => println!(
                    "ok      {:<45} {} effects, new revisions {:?}",
                    tenant.namespace, applied.effects_applied, applied.revisions_recorded
                ),
                TenantOutcome::Failed { effect, error } => println!(
                    "FAILED  {:<45} at {}: {}",
                    tenant.namespace,
                    effect.as_deref().unwrap_or("-"),
                    error
                ),
            }
        }
        println!("{} succeeded, {} failed", report.succeeded, report.failed);
    }

    if !report.is_clean() {
        std::process::exit(1);
    }
    Ok(())
}
