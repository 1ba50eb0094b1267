//! Service configuration: optional TOML file, then environment overrides.

use std::env;
use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;

use assettrack_observability::LogFormat;

const CONFIG_PATH_VAR: &str = "ASSETTRACK_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "./assettrack.toml";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ApiConfig {
    pub bind_addr: String,
    /// Postgres connection string; the in-memory store is used when absent.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub log_format: LogFormat,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".to_string(),
            database_url: None,
            max_connections: 5,
            log_format: LogFormat::Json,
        }
    }
}

impl ApiConfig {
    /// Load from `$ASSETTRACK_CONFIG` (default `./assettrack.toml`) and the process
    /// environment. A missing file means defaults.
    pub async fn load() -> Result<Self> {
        let path = env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let file_path = Path::new(&path);

        let mut config = if file_path.exists() {
            let content = tokio::fs::read_to_string(file_path)
                .await
                .with_context(|| format!("failed to read {path}"))?;
            Self::from_toml_str(&content).with_context(|| format!("failed to parse {path}"))?
        } else {
            ApiConfig::default()
        };

        config.apply_overrides(|key| env::var(key).ok())?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply overrides from a key lookup (the process environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            let port: u16 = port
                .trim()
                .parse()
                .map_err(|e| anyhow!("invalid PORT {port:?}: {e}"))?;
            self.bind_addr = format!("0.0.0.0:{port}");
        }
        // An explicit bind address wins over PORT.
        if let Some(addr) = lookup("ASSETTRACK_BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = Some(url);
        }
        if let Some(max) = lookup("ASSETTRACK_MAX_CONNECTIONS") {
            self.max_connections = max
                .trim()
                .parse()
                .map_err(|e| anyhow!("invalid ASSETTRACK_MAX_CONNECTIONS {max:?}: {e}"))?;
        }
        if let Some(format) = lookup("ASSETTRACK_LOG_FORMAT") {
            self.log_format = format.parse().map_err(|e: String| anyhow!(e))?;
        }
        Ok(())
    }

    pub fn normalize(&mut self) {
        self.bind_addr = self.bind_addr.trim().to_string();
        if let Some(url) = &self.database_url {
            let url = url.trim();
            self.database_url = (!url.is_empty()).then(|| url.to_string());
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.socket_addr()?;
        if self.max_connections == 0 {
            bail!("max_connections must be at least 1");
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.bind_addr
            .parse()
            .with_context(|| format!("invalid bind_addr {:?}", self.bind_addr))
    }
}
