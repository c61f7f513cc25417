use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use sha2::{Digest, Sha256};

use crate::config::DEFAULT_SUPER_ADMIN_KEY;
use crate::AppState;

pub const SUPER_ADMIN_HEADER: &str = "X-Super-Admin-Key";

/// Guards operator routes such as the reconcile trigger. Refuses every
/// request while the deployment still runs with the placeholder key.
pub struct SuperAdminAuth;

impl FromRequestParts<AppState> for SuperAdminAuth {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let configured = state.config.super_admin_key.as_str();
        if configured.is_empty() || configured == DEFAULT_SUPER_ADMIN_KEY {
            return Err((StatusCode::FORBIDDEN, "Super-admin routes are disabled"));
        }

        let presented = parts
            .headers
            .get(SUPER_ADMIN_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or((StatusCode::UNAUTHORIZED, "Missing X-Super-Admin-Key header"))?;

        if !keys_match(presented, configured) {
            tracing::warn!("rejected super-admin request with invalid key");
            return Err((StatusCode::UNAUTHORIZED, "Invalid super-admin key"));
        }

        Ok(SuperAdminAuth)
    }
}

/// Compares fixed-length digests so the check does not leak the key length
/// or a matching prefix through timing.
fn keys_match(presented: &str, configured: &str) -> bool {
    let a = Sha256::digest(presented.as_bytes());
    let b = Sha256::digest(configured.as_bytes());
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_match() {
        assert!(keys_match("s3cret-operator-key", "s3cret-operator-key"));
        assert!(!keys_match("s3cret-operator-kez", "s3cret-operator-key"));
        assert!(!keys_match("", "s3cret-operator-key"));
    }
}
