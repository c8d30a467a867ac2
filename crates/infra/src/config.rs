//! Process configuration read from the environment.

use std::net::SocketAddr;

use rust_decimal::Decimal;
use thiserror::Error;

use tillpoint_observability::LogFormat;
use tillpoint_reporting::DEFAULT_ALERT_THRESHOLD;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(key: &'static str, value: &str, reason: impl ToString) -> Self {
        ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// When set, inventory is loaded from Postgres at startup.
    pub database_url: Option<String>,
    pub kds_websockets_enabled: bool,
    pub stock_alert_threshold: Decimal,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            database_url: None,
            kds_websockets_enabled: true,
            stock_alert_threshold: DEFAULT_ALERT_THRESHOLD,
            log_format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = AppConfig::default();

        if let Some(raw) = get("BIND_ADDR") {
            config.bind_addr = raw
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid("BIND_ADDR", &raw, e))?;
        }

        config.database_url = get("DATABASE_URL");

        if let Some(raw) = get("KDS_WEBSOCKETS_ENABLED") {
            config.kds_websockets_enabled = parse_flag(&raw)
                .ok_or_else(|| ConfigError::invalid("KDS_WEBSOCKETS_ENABLED", &raw, "expected a boolean"))?;
        }

        if let Some(raw) = get("STOCK_ALERT_THRESHOLD") {
            let threshold: Decimal = raw
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid("STOCK_ALERT_THRESHOLD", &raw, e))?;
            if threshold.is_sign_negative() {
                return Err(ConfigError::invalid(
                    "STOCK_ALERT_THRESHOLD",
                    &raw,
                    "must not be negative",
                ));
            }
            config.stock_alert_threshold = threshold;
        }

        if let Some(raw) = get("LOG_FORMAT") {
            config.log_format = raw
                .parse()
                .map_err(|e| ConfigError::invalid("LOG_FORMAT", &raw, e))?;
        }

        Ok(config)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(cfg.stock_alert_threshold, DEFAULT_ALERT_THRESHOLD);
        assert_eq!(cfg.stock_alert_threshold, dec!(20));
        assert!(cfg.kds_websockets_enabled);
        assert!(cfg.database_url.is_none());
    }

    #[test]
    fn reads_every_key() {
        let cfg = config(&[
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("DATABASE_URL", "postgres://pos@localhost/pos"),
            ("KDS_WEBSOCKETS_ENABLED", "off"),
            ("STOCK_ALERT_THRESHOLD", "12.5"),
            ("LOG_FORMAT", "pretty"),
        ])
        .unwrap();

        assert_eq!(cfg.bind_addr.port(), 9000);
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://pos@localhost/pos"));
        assert!(!cfg.kds_websockets_enabled);
        assert_eq!(cfg.stock_alert_threshold, dec!(12.5));
        assert_eq!(cfg.log_format, LogFormat::Pretty);
    }

    #[test]
    fn blank_values_are_ignored() {
        let cfg = config(&[("DATABASE_URL", "  "), ("BIND_ADDR", "")]).unwrap();
        assert!(cfg.database_url.is_none());
        assert_eq!(cfg.bind_addr, AppConfig::default().bind_addr);
    }

    #[test]
    fn bad_values_name_the_key() {
        let err = config(&[("KDS_WEBSOCKETS_ENABLED", "maybe")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "KDS_WEBSOCKETS_ENABLED", .. }));

        let err = config(&[("STOCK_ALERT_THRESHOLD", "-1")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "STOCK_ALERT_THRESHOLD", .. }));

        assert!(config(&[("BIND_ADDR", "nowhere")]).is_err());
        assert!(config(&[("LOG_FORMAT", "xml")]).is_err());
    }
}
