use std::sync::Arc;

use redis::Client as RedisClient;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use emr_tenancy::config::Config;
use emr_tenancy::db::{self, namespace::Namespace, template::SchemaTemplate};
use emr_tenancy::{routes, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env()?);

    // A template effect without an existence check would break the next
    // reconcile of every tenant; refuse to serve with one.
    let template = SchemaTemplate::for_namespace(&Namespace::generate_sandbox());
    let unguarded: Vec<_> = template.unguarded_effects().into_iter().map(|e| e.name.as_str()).collect();
    if !unguarded.is_empty() {
        anyhow::bail!("schema template has unguarded effects: {}", unguarded.join(", "));
    }

    let pool = db::create_pool(&config.database_url, config.db_max_connections).await?;
    db::run_migrations(&pool).await?;
    info!(
        template_revision = template.latest_revision(),
        "Database connected and control-plane migrations applied"
    );

    let redis_client = RedisClient::open(config.redis_url.as_str())?;
    let redis_conn = redis_client.get_multiplexed_async_connection().await?;
    info!("Redis connected");

    let state = AppState {
        db: pool,
        redis: redis_conn,
        config: config.clone(),
    };

    let app = routes::router(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("tenancy API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
