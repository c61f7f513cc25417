use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::ProvisionError,
    middleware::rate_limit::{check_rate_limit, real_ip},
    models::provision::{ProvisionedTenant, SandboxRequest, SandboxResponse},
    services::provisioner,
    AppState,
};

/// Where the client lands once it holds the sandbox token.
const SANDBOX_REDIRECT: &str = "/dashboard";

type SandboxReply = Result<(StatusCode, Json<SandboxResponse>), (StatusCode, Json<Value>)>;

/// POST /auth/sandbox: provision a throwaway tenant with demo data and hand
/// back a credential for it.
pub async fn create_sandbox(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SandboxRequest>,
) -> SandboxReply {
    let ip = real_ip(&headers);
    let mut redis = state.redis.clone();

    // 10 sandboxes/hour per IP, 200/hour across all callers
    check_rate_limit(&mut redis, &format!("rate:sandbox:ip:{ip}"), 10, 3600).await?;
    check_rate_limit(&mut redis, "rate:sandbox:global", 200, 3600).await?;

    let result = provisioner::provision_sandbox(&state.db, &state.config, body.origin_request_id).await;
    sandbox_reply(result)
}

/// Detail is logged by the provisioner; the caller only learns it failed.
fn sandbox_reply(result: Result<ProvisionedTenant, ProvisionError>) -> SandboxReply {
    match result {
        Ok(tenant) => Ok((
            StatusCode::CREATED,
            Json(SandboxResponse {
                success: true,
                token: tenant.token,
                namespace: tenant.namespace,
                redirect: SANDBOX_REDIRECT,
            }),
        )),
        Err(_) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "success": false, "error": "Unable to provision sandbox" })),
        )),
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::db::template::ApplyReport;
    use crate::seed::SeedSummary;

    #[test]
    fn test_success_body_carries_token_and_namespace() {
        let tenant = ProvisionedTenant {
            namespace: "sandbox_0123456789abcdef0123456789abcdef".into(),
            identity_id: Uuid::new_v4(),
            token: "header.claims.signature".into(),
            template: ApplyReport::default(),
            seed: SeedSummary::default(),
        };

        let Ok((status, Json(body))) = sandbox_reply(Ok(tenant)) else {
            panic!("expected success");
        };
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "success": true,
                "token": "header.claims.signature",
                "namespace": "sandbox_0123456789abcdef0123456789abcdef",
                "redirect": "/dashboard",
            })
        );
    }

    #[test]
    fn test_failure_body_is_opaque() {
        let err = ProvisionError::NamespaceCollision("sandbox_secret_detail".into());

        let Err((status, Json(body))) = sandbox_reply(Err(err)) else {
            panic!("expected failure");
        };
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "success": false, "error": "Unable to provision sandbox" }));
        assert!(!body.to_string().contains("sandbox_secret_detail"));
    }
}
