use std::{net::SocketAddr, time::Duration};

use anyhow::Context;

use crate::relations::LoadStrategy;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout: Duration,
    pub request_timeout: Duration,
    pub load_strategy: LoadStrategy,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = var("PORT").unwrap_or_else(|| "3000".to_string()).parse().context("PORT")?;

        let database_url =
            var("DATABASE_URL").unwrap_or_else(|| "sqlite://filmoteka.db?mode=rwc".to_string());

        let db_max_connections: u32 =
            var("DB_MAX_CONNECTIONS").and_then(|s| s.parse().ok()).unwrap_or(5);

        let db_timeout_ms: u64 = var("DB_TIMEOUT_MS").and_then(|s| s.parse().ok()).unwrap_or(5_000);

        let request_timeout_secs: u64 =
            var("REQUEST_TIMEOUT_SECS").and_then(|s| s.parse().ok()).unwrap_or(30);

        let load_strategy = match var("LOAD_STRATEGY") {
            Some(s) => s.parse::<LoadStrategy>().context("LOAD_STRATEGY")?,
            None => LoadStrategy::default(),
        };

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url,
            db_max_connections,
            db_timeout: Duration::from_millis(db_timeout_ms),
            request_timeout: Duration::from_secs(request_timeout_secs),
            load_strategy,
        })
    }
}
