use serde::{Deserialize, Serialize};

/// Claims embedded in the short-lived sandbox access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxClaims {
    pub sub: String,       // default identity UUID
    pub namespace: String, // tenant schema
    pub is_sandbox: bool,
    pub role: String,
    pub iat: usize,
    pub exp: usize,
}
