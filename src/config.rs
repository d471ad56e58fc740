use std::env;

use thiserror::Error;

use crate::application::order_workflow::DEFAULT_CURRENCY;
use crate::infrastructure::stripe::DEFAULT_API_BASE;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Runtime settings, read from the process environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub stripe_secret_key: Option<String>,
    pub stripe_api_base: String,
    pub payment_currency: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Empty values count as
    /// unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let port = match get("PORT") {
            Some(raw) => raw.parse().map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
                key: "PORT",
                reason: e.to_string(),
            })?,
            None => 8080,
        };

        let stripe_secret_key = get("STRIPE_SECRET_KEY");
        if stripe_secret_key.is_none() {
            log::warn!("STRIPE_SECRET_KEY not set, card payments are disabled");
        }

        Ok(Config {
            database_url: required("DATABASE_URL")?,
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            jwt_secret: required("JWT_SECRET")?,
            stripe_secret_key,
            stripe_api_base: get("STRIPE_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            payment_currency: get("PAYMENT_CURRENCY")
                .map(|c| c.to_lowercase())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        })
    }
}
