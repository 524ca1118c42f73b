//! Configuration module
//!
//! One explicit `Config` is built from the environment at startup and passed
//! by reference into each component constructor; no component reads ambient
//! environment state directly.

use std::env;

use crate::extract::RuleSet;
use crate::render::validate_template;

// Common defaults
const DB_MAX_CONNECTIONS: u32 = 5;
const DB_TIMEOUT_SECS: u64 = 30;
const STORE_RETRY_ATTEMPTS: u32 = 0;
const FFPROBE_PATH: &str = "ffprobe";

/// Caption template used when `CAPTION_TEMPLATE` is unset.
pub const DEFAULT_CAPTION_TEMPLATE: &str = "
🎬 {title} ({year}) | {quality} {resolution}
🌍 {language} | ⏳ {duration} | 📁 {ext}
👤 {artist} | {wish}!
";

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub caption_template: String,
    pub ffprobe_path: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    /// Extra upsert attempts after a storage failure. Zero keeps the
    /// original fire-and-forget behavior.
    pub store_retry_attempts: u32,
}

impl Config {
    /// Load configuration from the environment (and `.env` if present).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
        let caption_template = env::var("CAPTION_TEMPLATE")
            .unwrap_or_else(|_| DEFAULT_CAPTION_TEMPLATE.to_string());
        let ffprobe_path =
            env::var("FFPROBE_PATH").unwrap_or_else(|_| FFPROBE_PATH.to_string());

        Ok(Self {
            database_url,
            caption_template,
            ffprobe_path,
            db_max_connections: parse_env("DB_MAX_CONNECTIONS", DB_MAX_CONNECTIONS)?,
            db_timeout_seconds: parse_env("DB_TIMEOUT_SECONDS", DB_TIMEOUT_SECS)?,
            store_retry_attempts: parse_env("STORE_RETRY_ATTEMPTS", STORE_RETRY_ATTEMPTS)?,
        })
    }

    /// Fail fast on misconfiguration. A template naming an unknown field or
    /// an ambiguous rule table must halt startup, never surface per item.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        validate_template(&self.caption_template)?;
        RuleSet::default_set()?;
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, anyhow::Error>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|err| anyhow::anyhow!("invalid {}: {}", key, err)),
        Err(_) => Ok(default),
    }
}
