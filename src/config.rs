use std::env;

/// Placeholder shipped in example env files; super-admin routes stay closed while it is in use.
pub const DEFAULT_SUPER_ADMIN_KEY: &str = "change_this_super_admin_key";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub redis_url: String,
    pub jwt_secret: String,
    pub sandbox_token_ttl_seconds: u64,
    pub sandbox_roster_size: usize,
    pub host: String,
    pub port: u16,
    pub super_admin_key: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".into())
                .parse()?,
            redis_url: env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".into()),
            jwt_secret: required("JWT_SECRET")?,
            sandbox_token_ttl_seconds: env::var("SANDBOX_TOKEN_TTL_SECONDS")
                .unwrap_or_else(|_| "14400".into())
                .parse()?,
            sandbox_roster_size: env::var("SANDBOX_ROSTER_SIZE")
                .unwrap_or_else(|_| "10".into())
                .parse()?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,
            super_admin_key: env::var("SUPER_ADMIN_KEY")
                .unwrap_or_else(|_| DEFAULT_SUPER_ADMIN_KEY.into()),
        })
    }
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key).map_err(|_| anyhow::anyhow!("Missing required env var: {}", key))
}
