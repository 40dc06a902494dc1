use anyhow::{ensure, Context};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_minutes: i64,
    pub leeway_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests don't have to
    /// mutate the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL is not set")?;
        ensure!(!database_url.trim().is_empty(), "DATABASE_URL must not be empty");

        let secret = lookup("JWT_SECRET").context("JWT_SECRET is not set")?;
        ensure!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let port = match lookup("PORT") {
            Some(v) => v.parse::<u16>().with_context(|| format!("invalid PORT {v:?}"))?,
            None => 5000,
        };

        let ttl_minutes = lookup("JWT_TTL_MINUTES")
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(60 * 24);
        ensure!(ttl_minutes > 0, "JWT_TTL_MINUTES must be positive");

        let jwt = JwtConfig {
            secret,
            ttl_minutes,
            leeway_seconds: lookup("JWT_LEEWAY_SECONDS")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(0),
        };

        Ok(Self {
            database_url,
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            jwt,
        })
    }
}
