//! Application configuration loaded from environment variables.
//!
//! All variables are prefixed `GIGROUTE_`. Parsing is factored through a
//! lookup closure so tests can drive it from a plain `HashMap` without
//! touching the process environment.

use std::net::SocketAddr;

use thiserror::Error;

use crate::scoring::ScoringWeights;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error(transparent)]
    Validation(#[from] crate::error::ValidationError),
}

/// Deployment environment, parsed from `GIGROUTE_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Test => write!(f, "test"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Runtime configuration for the gigroute service.
#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub catalog_base_url: String,
    pub catalog_api_key: Option<String>,
    pub catalog_timeout_secs: u64,
    pub catalog_max_retries: u32,
    pub catalog_backoff_base_ms: u64,
    pub max_concurrent_fetches: usize,
    pub cache_ttl_secs: u64,
    pub discovery_enabled: bool,
    pub scoring_weights: ScoringWeights,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("catalog_base_url", &self.catalog_base_url)
            .field(
                "catalog_api_key",
                &self.catalog_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("catalog_timeout_secs", &self.catalog_timeout_secs)
            .field("catalog_max_retries", &self.catalog_max_retries)
            .field("catalog_backoff_base_ms", &self.catalog_backoff_base_ms)
            .field("max_concurrent_fetches", &self.max_concurrent_fetches)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .field("discovery_enabled", &self.discovery_enabled)
            .field("scoring_weights", &self.scoring_weights)
            .finish()
    }
}

/// Loads configuration from the process environment.
///
/// # Errors
///
/// Returns [`ConfigError`] if any variable fails to parse or the scoring
/// weights do not sum to 1.0.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Builds configuration using the provided env-var lookup function.
///
/// The core parsing and validation logic, decoupled from the real
/// environment so it can be tested with a pure `HashMap` lookup.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default =
        |var: &str, default: &str| lookup(var).unwrap_or_else(|_| default.to_owned());

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_owned(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_owned(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_owned(),
                reason: e.to_string(),
            })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_owned(),
                reason: e.to_string(),
            })
    };

    let parse_bool = |var: &str, default: bool| -> Result<bool, ConfigError> {
        match lookup(var) {
            Err(_) => Ok(default),
            Ok(raw) => match raw.to_lowercase().as_str() {
                "1" | "true" | "yes" => Ok(true),
                "0" | "false" | "no" => Ok(false),
                other => Err(ConfigError::InvalidEnvVar {
                    var: var.to_owned(),
                    reason: format!("expected a boolean, got '{other}'"),
                }),
            },
        }
    };

    let env = match or_default("GIGROUTE_ENV", "development").to_lowercase().as_str() {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    };

    Ok(AppConfig {
        env,
        bind_addr: parse_addr("GIGROUTE_BIND_ADDR", "0.0.0.0:8080")?,
        log_level: or_default("GIGROUTE_LOG_LEVEL", "info"),
        catalog_base_url: or_default(
            "GIGROUTE_CATALOG_BASE_URL",
            "https://rest.bandsintown.com",
        ),
        catalog_api_key: lookup("GIGROUTE_CATALOG_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty()),
        catalog_timeout_secs: parse_u64("GIGROUTE_CATALOG_TIMEOUT_SECS", "10")?,
        catalog_max_retries: parse_u32("GIGROUTE_CATALOG_MAX_RETRIES", "2")?,
        catalog_backoff_base_ms: parse_u64("GIGROUTE_CATALOG_BACKOFF_BASE_MS", "500")?,
        max_concurrent_fetches: parse_usize("GIGROUTE_MAX_CONCURRENT_FETCHES", "5")?.max(1),
        cache_ttl_secs: parse_u64("GIGROUTE_CACHE_TTL_SECS", "3600")?,
        discovery_enabled: parse_bool("GIGROUTE_DISCOVERY_ENABLED", true)?,
        // Weight overrides are not env-tunable; the default table is the
        // validated configuration record the scorer receives.
        scoring_weights: ScoringWeights::default().validated()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::env::VarError;

    fn lookup_from<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| map.get(key).map(ToString::to_string).ok_or(VarError::NotPresent)
    }

    #[test]
    fn defaults_apply_with_empty_environment() {
        let map = HashMap::new();
        let config = build_app_config(lookup_from(&map)).expect("config");
        assert_eq!(config.env, Environment::Development);
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.cache_ttl_secs, 3600);
        assert_eq!(config.max_concurrent_fetches, 5);
        assert!(config.discovery_enabled);
        assert!(config.catalog_api_key.is_none());
    }

    #[test]
    fn explicit_values_override_defaults() {
        let map = HashMap::from([
            ("GIGROUTE_ENV", "production"),
            ("GIGROUTE_BIND_ADDR", "127.0.0.1:9000"),
            ("GIGROUTE_CATALOG_API_KEY", "secret-key"),
            ("GIGROUTE_MAX_CONCURRENT_FETCHES", "12"),
            ("GIGROUTE_DISCOVERY_ENABLED", "false"),
        ]);
        let config = build_app_config(lookup_from(&map)).expect("config");
        assert_eq!(config.env, Environment::Production);
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.catalog_api_key.as_deref(), Some("secret-key"));
        assert_eq!(config.max_concurrent_fetches, 12);
        assert!(!config.discovery_enabled);
    }

    #[test]
    fn blank_api_key_counts_as_absent() {
        let map = HashMap::from([("GIGROUTE_CATALOG_API_KEY", "   ")]);
        let config = build_app_config(lookup_from(&map)).expect("config");
        assert!(config.catalog_api_key.is_none());
    }

    #[test]
    fn malformed_bind_addr_is_rejected() {
        let map = HashMap::from([("GIGROUTE_BIND_ADDR", "not-an-addr")]);
        assert!(matches!(
            build_app_config(lookup_from(&map)),
            Err(ConfigError::InvalidEnvVar { .. })
        ));
    }

    #[test]
    fn malformed_boolean_is_rejected() {
        let map = HashMap::from([("GIGROUTE_DISCOVERY_ENABLED", "maybe")]);
        assert!(matches!(
            build_app_config(lookup_from(&map)),
            Err(ConfigError::InvalidEnvVar { .. })
        ));
    }

    #[test]
    fn zero_concurrency_is_raised_to_one() {
        let map = HashMap::from([("GIGROUTE_MAX_CONCURRENT_FETCHES", "0")]);
        let config = build_app_config(lookup_from(&map)).expect("config");
        assert_eq!(config.max_concurrent_fetches, 1);
    }

    #[test]
    fn debug_output_redacts_the_api_key() {
        let map = HashMap::from([("GIGROUTE_CATALOG_API_KEY", "super-secret")]);
        let config = build_app_config(lookup_from(&map)).expect("config");
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[redacted]"));
    }
}
