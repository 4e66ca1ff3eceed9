//! Environment configuration

use std::str::FromStr;

use crate::domain::variants::DEFAULT_VARIANT_LABEL;
use crate::{Result, StorefrontError};

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Absent: run on in-memory stores.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub nats_url: Option<String>,
    /// Name given to the synthesized variant of a product without variants.
    pub default_variant_label: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: 10,
            host: "0.0.0.0".to_string(),
            port: 8083,
            nats_url: None,
            default_variant_label: DEFAULT_VARIANT_LABEL.to_string(),
        }
    }
}

impl Config {
    /// Read from the process environment. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Ok(Self {
            database_url: var("DATABASE_URL"),
            max_connections: parse_or(var("DATABASE_MAX_CONNECTIONS"), "DATABASE_MAX_CONNECTIONS", defaults.max_connections)?,
            host: var("HOST").unwrap_or(defaults.host),
            port: parse_or(var("PORT"), "PORT", defaults.port)?,
            nats_url: var("NATS_URL"),
            default_variant_label: var("DEFAULT_VARIANT_LABEL").unwrap_or(defaults.default_variant_label),
        })
    }

    pub fn bind_addr(&self) -> String { format!("{}:{}", self.host, self.port) }
}

fn parse_or<T: FromStr>(value: Option<String>, key: &str, default: T) -> Result<T> {
    match value {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| StorefrontError::Config(format!("{} is not valid: {:?}", key, raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.bind_addr(), "0.0.0.0:8083");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/shop"),
            ("PORT", "9000"),
            ("DATABASE_MAX_CONNECTIONS", "4"),
            ("DEFAULT_VARIANT_LABEL", "Standard"),
            ("NATS_URL", " "),
        ])).unwrap();
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/shop"));
        assert_eq!(config.port, 9000);
        assert_eq!(config.max_connections, 4);
        assert_eq!(config.default_variant_label, "Standard");
        assert_eq!(config.nats_url, None);
    }

    #[test]
    fn test_invalid_port() {
        let err = Config::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, StorefrontError::Config(_)));
    }
}
