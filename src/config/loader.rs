//! Load settings from process environment.

use crate::config::types::*;
use crate::error::ConfigError;
use std::net::SocketAddr;
use std::path::PathBuf;

impl AppConfig {
    /// Read `DATABASE_PATH`, `BIND_ADDR`, `USERS_CSV`, `ORDERS_CSV`, `BODY_LIMIT_BYTES`.
    /// Loads `.env` first when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let bind_raw = get("BIND_ADDR", DEFAULT_BIND_ADDR);
        let bind_addr: SocketAddr = bind_raw.parse().map_err(|e| ConfigError::Invalid {
            key: "BIND_ADDR",
            reason: format!("'{}': {}", bind_raw, e),
        })?;

        let limit_raw = get("BODY_LIMIT_BYTES", &DEFAULT_BODY_LIMIT_BYTES.to_string());
        let body_limit_bytes: usize = limit_raw.parse().map_err(|e| ConfigError::Invalid {
            key: "BODY_LIMIT_BYTES",
            reason: format!("'{}': {}", limit_raw, e),
        })?;
        if body_limit_bytes == 0 {
            return Err(ConfigError::Invalid {
                key: "BODY_LIMIT_BYTES",
                reason: "must be greater than zero".into(),
            });
        }

        Ok(AppConfig {
            database_path: PathBuf::from(get("DATABASE_PATH", DEFAULT_DATABASE_PATH)),
            bind_addr,
            users_csv: PathBuf::from(get("USERS_CSV", DEFAULT_USERS_CSV)),
            orders_csv: PathBuf::from(get("ORDERS_CSV", DEFAULT_ORDERS_CSV)),
            body_limit_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.database_path, PathBuf::from("ecommerce.db"));
        assert_eq!(config.bind_addr.port(), 5000);
        assert_eq!(config.body_limit_bytes, DEFAULT_BODY_LIMIT_BYTES);
    }

    #[test]
    fn overrides_from_environment() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_PATH", "/tmp/shop.db"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("USERS_CSV", "data/u.csv"),
        ]))
        .unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/shop.db"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.users_csv, PathBuf::from("data/u.csv"));
        assert_eq!(config.orders_csv, PathBuf::from("orders.csv"));
    }

    #[test]
    fn rejects_bad_bind_addr() {
        let err = AppConfig::from_lookup(lookup(&[("BIND_ADDR", "not-an-addr")])).unwrap_err();
        assert!(err.to_string().contains("BIND_ADDR"));
    }

    #[test]
    fn rejects_zero_body_limit() {
        assert!(AppConfig::from_lookup(lookup(&[("BODY_LIMIT_BYTES", "0")])).is_err());
    }
}
