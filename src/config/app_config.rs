use anyhow::{Context, Result, bail};
use std::env;

use crate::constants::{DEFAULT_CLEANUP_INTERVAL_SECS, DEFAULT_JWT_TTL_HOURS};

/// Runtime settings read from the process environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongodb_uri: String,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub cookie_name: String,
    pub frontend_origin: String,
    pub stripe_secret_key: Option<String>,
    pub stripe_webhook_secret: Option<String>,
    pub cleanup_interval_secs: u64,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parsed_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let jwt_secret = optional_var("JWT_SECRET_KEY").context("JWT_SECRET_KEY must be set")?;
        if jwt_secret.len() < 16 {
            bail!("JWT_SECRET_KEY must be at least 16 characters long");
        }

        Ok(Self {
            host: var_or("HOST", "127.0.0.1"),
            port: parsed_var("PORT", 8080)?,
            mongodb_uri: var_or("MONGODB_URI", "mongodb://localhost:27017"),
            jwt_secret,
            jwt_ttl_hours: parsed_var("JWT_TTL_HOURS", DEFAULT_JWT_TTL_HOURS)?,
            cookie_name: var_or("COOKIE_NAME", "bi_portal_session"),
            frontend_origin: var_or("FRONTEND_ORIGIN", "http://localhost:5173"),
            stripe_secret_key: optional_var("STRIPE_SECRET_KEY"),
            stripe_webhook_secret: optional_var("STRIPE_WEBHOOK_SECRET"),
            cleanup_interval_secs: parsed_var(
                "CLEANUP_INTERVAL_SECS",
                DEFAULT_CLEANUP_INTERVAL_SECS,
            )?,
        })
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            jwt_secret: "test-secret-key-with-enough-length".to_string(),
            jwt_ttl_hours: 1,
            cookie_name: "bi_portal_session".to_string(),
            frontend_origin: "http://localhost:5173".to_string(),
            stripe_secret_key: None,
            stripe_webhook_secret: Some("whsec_test".to_string()),
            cleanup_interval_secs: DEFAULT_CLEANUP_INTERVAL_SECS,
        }
    }
}
