//! Environment configuration.

use std::net::{Ipv4Addr, SocketAddr};

use thiserror::Error;

pub const DEFAULT_PORT: u16 = 5000;
const DEV_SECRET: &str = "dev-secret";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PORT must be a port number, got '{0}'")]
    InvalidPort(String),
}

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub access_token_secret: String,
    /// `None` selects the in-memory store.
    pub database_url: Option<String>,
    /// `None` selects the fake payment gateway.
    pub payment_secret_key: Option<String>,
    pub payment_api_base: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
            None => DEFAULT_PORT,
        };

        let access_token_secret = get("ACCESS_TOKEN_SECRET").unwrap_or_else(|| {
            tracing::warn!("ACCESS_TOKEN_SECRET not set; using insecure dev default");
            DEV_SECRET.to_string()
        });

        let payment_secret_key = get("PAYMENT_SECRET_KEY");
        if payment_secret_key.is_none() {
            tracing::warn!("PAYMENT_SECRET_KEY not set; payment intents are faked");
        }

        Ok(Self {
            port,
            access_token_secret,
            database_url: get("DATABASE_URL"),
            payment_secret_key,
            payment_api_base: get("PAYMENT_API_BASE")
                .unwrap_or_else(|| silversport_infra::payments::stripe::DEFAULT_API_BASE.to_string()),
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_select_dev_backends() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.access_token_secret, "dev-secret");
        assert!(cfg.database_url.is_none());
        assert!(cfg.payment_secret_key.is_none());
        assert_eq!(cfg.payment_api_base, "https://api.stripe.com");
    }

    #[test]
    fn explicit_values_win_and_blanks_are_unset() {
        let cfg = config(&[
            ("PORT", "8080"),
            ("ACCESS_TOKEN_SECRET", "s3cret"),
            ("DATABASE_URL", "  "),
            ("PAYMENT_SECRET_KEY", "sk_test_1"),
        ])
        .unwrap();
        assert_eq!(cfg.listen_addr().port(), 8080);
        assert_eq!(cfg.access_token_secret, "s3cret");
        assert!(cfg.database_url.is_none());
        assert_eq!(cfg.payment_secret_key.as_deref(), Some("sk_test_1"));
    }

    #[test]
    fn bad_port_is_an_error() {
        assert!(matches!(config(&[("PORT", "http")]), Err(ConfigError::InvalidPort(_))));
    }
}
