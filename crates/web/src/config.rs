use std::str::FromStr;

use anyhow::{Context, Result, bail};
use storage::services::personal_best::OverwritePolicy;

/// Where athlete records live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => bail!("STORE_BACKEND must be 'postgres' or 'memory', got '{}'", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub store_backend: StoreBackend,
    pub overwrite_policy: OverwritePolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let store_backend = match lookup("STORE_BACKEND") {
            Some(value) => value.parse()?,
            None => StoreBackend::Postgres,
        };

        let database_url = lookup("DATABASE_URL");
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            bail!("Cannot load DATABASE_URL env variable");
        }

        let overwrite_policy = match lookup("OVERWRITE_POLICY") {
            Some(value) => value
                .parse()
                .map_err(anyhow::Error::msg)
                .context("Invalid OVERWRITE_POLICY")?,
            None => OverwritePolicy::default(),
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: lookup("PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .context("PORT must be a number")?,
            database_url,
            store_backend,
            overwrite_policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/leaderboard")]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.store_backend, StoreBackend::Postgres);
        assert_eq!(config.overwrite_policy, OverwritePolicy::FasterOnly);
    }

    #[test]
    fn test_postgres_requires_database_url() {
        assert!(load(&[]).is_err());
    }

    #[test]
    fn test_memory_backend_without_database() {
        let config = load(&[("STORE_BACKEND", "memory"), ("OVERWRITE_POLICY", "always")]).unwrap();
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.overwrite_policy, OverwritePolicy::Always);
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(load(&[("STORE_BACKEND", "memory"), ("PORT", "http")]).is_err());
        assert!(load(&[("STORE_BACKEND", "memory"), ("OVERWRITE_POLICY", "never")]).is_err());
        assert!(load(&[("STORE_BACKEND", "redis")]).is_err());
    }
}
