use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::db::namespace::Namespace;
use crate::models::credential::SandboxClaims;

/// Sign a credential scoped to `namespace`, expiring `ttl_seconds` from now.
/// Never persisted; expiry is the only revocation.
pub fn mint(
    secret: &str,
    ttl_seconds: u64,
    namespace: &Namespace,
    identity: Uuid,
    role: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp() as usize;
    let claims = SandboxClaims {
        sub: identity.to_string(),
        namespace: namespace.to_string(),
        is_sandbox: namespace.is_sandbox(),
        role: role.to_string(),
        iat: now,
        exp: now + ttl_seconds as usize,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn decode_claims(token: &str, secret: &str) -> Result<SandboxClaims, anyhow::Error> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let data = decode::<SandboxClaims>(token, &key, &validation)?;
    Namespace::parse(&data.claims.namespace)?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-with-enough-entropy";

    #[test]
    fn test_minted_token_carries_namespace_and_identity() {
        let ns = Namespace::generate_sandbox();
        let identity = Uuid::new_v4();
        let token = mint(SECRET, 14_400, &ns, identity, "admin").unwrap();

        let claims = decode_claims(&token, SECRET).unwrap();
        assert_eq!(claims.namespace, ns.as_str());
        assert_eq!(claims.sub, identity.to_string());
        assert!(claims.is_sandbox);
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.exp - claims.iat, 14_400);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = mint(SECRET, 60, &Namespace::generate_sandbox(), Uuid::new_v4(), "admin").unwrap();
        assert!(decode_claims(&token, "another-secret").is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let now = Utc::now().timestamp() as usize;
        let claims = SandboxClaims {
            sub: Uuid::new_v4().to_string(),
            namespace: "sandbox_expired".into(),
            is_sandbox: true,
            role: "admin".into(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert!(decode_claims(&token, SECRET).is_err());
    }

    #[test]
    fn test_clinic_namespace_is_not_sandbox() {
        let ns = Namespace::for_clinic("lakeside").unwrap();
        let token = mint(SECRET, 60, &ns, Uuid::new_v4(), "admin").unwrap();
        assert!(!decode_claims(&token, SECRET).unwrap().is_sandbox);
    }
}
