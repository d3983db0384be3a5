use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

/// Fixed page size for every paginated listing.
pub const ITEMS_PER_PAGE: i64 = 10;

/// Name of the cookie carrying the session JWT.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
}

impl Config {
    pub fn load() -> Result<Self, String> {
        Ok(Self {
            database_url: try_load("DATABASE_URL", "sqlite:travel_journal.db?mode=rwc")?,
            host: try_load("HOST", "127.0.0.1")?,
            port: try_load("PORT", "3001")?,
            db_max_connections: try_load("DB_MAX_CONNECTIONS", "5")?,
        })
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T, String>
where
    T::Err: Display,
{
    let raw = var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.trim().parse().map_err(|e| {
        warn!("Invalid {key} value: {e}");
        format!("invalid value for {key}: {e}")
    })
}
