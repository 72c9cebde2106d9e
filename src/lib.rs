use anyhow::{Context, Result};
use std::env;

use crate::metrics::Metrics;

pub mod api;
pub mod manifests;
pub mod metrics;
pub mod middleware;
pub mod telemetry;

/// Process configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub version: String,
    pub environment: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let version = env::var("APP_VERSION").unwrap_or_else(|_| "1.0.0".to_string());
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("invalid PORT value: {raw}"))?,
            Err(_) => 5000,
        };

        Ok(Self {
            version,
            environment,
            port,
        })
    }
}

/// Shared state handed to handlers through `web::Data`.
#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub metrics: Metrics,
}

impl AppContext {
    pub fn new(config: AppConfig, metrics: Metrics) -> Self {
        Self { config, metrics }
    }
}
