use std::env;

use thiserror::Error;

pub mod cors;

pub use cors::create_cors_layer;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    MissingVar(&'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Public origin of the web app; checkout redirect and onboarding URLs
    /// are built under it.
    pub app_base_url: String,
    pub stripe_secret_key: String,
    pub stripe_webhook_secret: String,
    /// Client-side key; never used server-side, carried for completeness.
    pub stripe_publishable_key: Option<String>,
}

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_APP_BASE_URL: &str = "http://localhost:3000";

impl Config {
    /// Load from the environment. Missing Stripe secrets are a hard error:
    /// payment requests must never be accepted without them.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: lookup("DATABASE_URL").ok_or(ConfigError::MissingVar("DATABASE_URL"))?,
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            app_base_url: lookup("APP_BASE_URL")
                .unwrap_or_else(|| DEFAULT_APP_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            stripe_secret_key: lookup("STRIPE_SECRET_KEY")
                .ok_or(ConfigError::MissingVar("STRIPE_SECRET_KEY"))?,
            stripe_webhook_secret: lookup("STRIPE_WEBHOOK_SECRET")
                .ok_or(ConfigError::MissingVar("STRIPE_WEBHOOK_SECRET"))?,
            stripe_publishable_key: lookup("STRIPE_PUBLISHABLE_KEY"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn minimal() -> HashMap<String, String> {
        vars(&[
            ("DATABASE_URL", "postgres://localhost/dorehami"),
            ("STRIPE_SECRET_KEY", "sk_test_123"),
            ("STRIPE_WEBHOOK_SECRET", "whsec_123"),
        ])
    }

    #[test]
    fn test_minimal_config_with_defaults() {
        let env = minimal();
        let config = Config::from_lookup(|k| env.get(k).cloned()).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.app_base_url, DEFAULT_APP_BASE_URL);
        assert!(config.stripe_publishable_key.is_none());
    }

    #[test]
    fn test_missing_stripe_secret_fails_fast() {
        let mut env = minimal();
        env.remove("STRIPE_SECRET_KEY");
        assert!(Config::from_lookup(|k| env.get(k).cloned()).is_err());
    }

    #[test]
    fn test_missing_webhook_secret_fails_fast() {
        let mut env = minimal();
        env.remove("STRIPE_WEBHOOK_SECRET");
        assert!(Config::from_lookup(|k| env.get(k).cloned()).is_err());
    }

    #[test]
    fn test_app_base_url_trailing_slash_trimmed() {
        let mut env = minimal();
        env.insert("APP_BASE_URL".to_string(), "https://dorehami.example/".to_string());
        let config = Config::from_lookup(|k| env.get(k).cloned()).unwrap();
        assert_eq!(config.app_base_url, "https://dorehami.example");
    }
}
