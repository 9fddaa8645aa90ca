use std::str::FromStr;

use anyhow::Context;
use jsonwebtoken::Algorithm;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup, so tests don't have to touch
    /// the process environment.
    pub fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = get("DATABASE_URL").context("DATABASE_URL must be set")?;

        let algorithm = match get("JWT_ALGORITHM") {
            Some(name) => Algorithm::from_str(&name)
                .with_context(|| format!("unknown JWT_ALGORITHM {name:?}"))?,
            None => Algorithm::HS256,
        };
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            anyhow::bail!("JWT_ALGORITHM must be one of HS256, HS384, HS512");
        }

        let jwt = JwtConfig {
            secret: get("JWT_SECRET").context("JWT_SECRET must be set")?,
            algorithm,
            issuer: get("JWT_ISSUER").unwrap_or_else(|| "expense-tracker".into()),
            audience: get("JWT_AUDIENCE").unwrap_or_else(|| "expense-tracker-users".into()),
            ttl_minutes: parse_or(&get, "JWT_TTL_MINUTES", 60i64)?,
        };
        if jwt.ttl_minutes <= 0 {
            anyhow::bail!("JWT_TTL_MINUTES must be positive");
        }

        Ok(Self {
            database_url,
            max_connections: parse_or(&get, "DATABASE_MAX_CONNECTIONS", 10u32)?,
            host: get("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&get, "APP_PORT", 8080u16)?,
            jwt,
        })
    }
}

fn parse_or<T, F>(get: &F, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has invalid value {raw:?}")),
        None => Ok(default),
    }
}
