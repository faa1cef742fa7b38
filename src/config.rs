use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    // Photo uploads
    pub upload_dir: String,
    pub max_upload_bytes: usize,

    pub log_dir: String,

    /// Seeded on startup when both are set and no admin exists yet
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub admin_name: String,
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", optional("DB_MAX_CONNECTIONS"), 10)?,
            jwt_secret: required("JWT_SECRET")?,
            // default 15 min
            access_token_ttl: parse_or("ACCESS_TOKEN_TTL", optional("ACCESS_TOKEN_TTL"), 900)?,

            rate_login_per_min: parse_or("RATE_LOGIN_PER_MIN", optional("RATE_LOGIN_PER_MIN"), 60)?,
            rate_protected_per_min: parse_or(
                "RATE_PROTECTED_PER_MIN",
                optional("RATE_PROTECTED_PER_MIN"),
                1000,
            )?,

            api_prefix: optional("API_PREFIX").unwrap_or_else(|| "/api".to_string()),

            upload_dir: optional("UPLOAD_DIR").unwrap_or_else(|| "uploads".to_string()),
            // 5 MiB
            max_upload_bytes: parse_or("MAX_UPLOAD_BYTES", optional("MAX_UPLOAD_BYTES"), 5 * 1024 * 1024)?,

            log_dir: optional("LOG_DIR").unwrap_or_else(|| "logs".to_string()),

            admin_email: optional("ADMIN_EMAIL"),
            admin_password: optional("ADMIN_PASSWORD"),
            admin_name: optional("ADMIN_NAME").unwrap_or_else(|| "Administrator".to_string()),
        })
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests(upload_dir: &str) -> Self {
        Self {
            database_url: String::new(),
            db_max_connections: 1,
            jwt_secret: "test-secret".to_string(),
            server_addr: "127.0.0.1:0".to_string(),
            access_token_ttl: 900,
            rate_login_per_min: 600,
            rate_protected_per_min: 6000,
            api_prefix: "/api".to_string(),
            upload_dir: upload_dir.to_string(),
            max_upload_bytes: 1024,
            log_dir: "logs".to_string(),
            admin_email: None,
            admin_password: None,
            admin_name: "Administrator".to_string(),
        }
    }
}
