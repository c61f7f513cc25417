mod common;

use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::Json;
use emr_tenancy::db::namespace::Namespace;
use emr_tenancy::models::provision::SandboxRequest;
use emr_tenancy::routes::sandbox::create_sandbox;
use emr_tenancy::services::credential::decode_claims;
use emr_tenancy::services::directory::StaticDirectory;
use emr_tenancy::services::provisioner::provision_sandbox;
use emr_tenancy::services::reconciler::{reconcile_all, reconcile_one};
use emr_tenancy::AppState;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

fn assert_send<T: Send>(_: &T) {}

/// Axum only serves handlers whose futures are `Send`; the futures below are
/// built but never polled.
#[tokio::test]
async fn test_provisioning_and_reconcile_futures_are_send() {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/unused")
        .unwrap();
    let config = common::config(1);
    let ns = Namespace::generate_sandbox();
    let directory = StaticDirectory(Vec::new());

    let provision = provision_sandbox(&pool, &config, None);
    assert_send(&provision);
    let one = reconcile_one(&pool, &ns);
    assert_send(&one);
    let all = reconcile_all(&pool, &directory);
    assert_send(&all);
}

/// Postgres and Redis both have to be reachable.
async fn state() -> Option<AppState> {
    let db = common::pool().await?;
    let url = std::env::var("REDIS_URL").ok()?;
    let redis = redis::Client::open(url.as_str())
        .expect("valid REDIS_URL")
        .get_multiplexed_async_connection()
        .await
        .expect("connect to REDIS_URL");
    Some(AppState {
        db,
        redis,
        config: common::config(2),
    })
}

#[tokio::test]
async fn test_sandbox_route_answers_created_with_credential() {
    let Some(state) = state().await else {
        eprintln!("DATABASE_URL or REDIS_URL not set; skipping");
        return;
    };

    let ip = format!("198.51.100.{}", Uuid::new_v4().as_bytes()[0]);
    let mut redis = state.redis.clone();
    let _: () = redis::cmd("DEL")
        .arg(format!("rate:sandbox:ip:{ip}"))
        .arg("rate:sandbox:global")
        .query_async(&mut redis)
        .await
        .unwrap();

    let mut headers = HeaderMap::new();
    headers.insert("x-real-ip", HeaderValue::from_str(&ip).unwrap());
    let request = SandboxRequest {
        origin_request_id: Some(Uuid::new_v4()),
    };

    let (status, Json(body)) = match create_sandbox(State(state.clone()), headers, Json(request)).await {
        Ok(created) => created,
        Err((status, Json(err))) => panic!("sandbox route failed with {status}: {err}"),
    };

    assert_eq!(status, StatusCode::CREATED);
    assert!(body.success);
    assert_eq!(body.redirect, "/dashboard");
    assert!(Namespace::parse(&body.namespace).unwrap().is_sandbox());
    let claims = decode_claims(&body.token, &state.config.jwt_secret).unwrap();
    assert_eq!(claims.namespace, body.namespace);

    common::drop_tenant(&state.db, &body.namespace).await;
}
