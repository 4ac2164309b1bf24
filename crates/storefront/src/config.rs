//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MEDUSA_BACKEND_URL` - Base URL of the commerce backend (e.g., <http://localhost:9000>)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 8000)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (default: <http://localhost:8000>)
//! - `MEDUSA_PUBLISHABLE_KEY` - Store API publishable key
//! - `MEDUSA_TIMEOUT_SECS` - Overall timeout for backend requests (default: 10)
//! - `COMPARE_CAPACITY` - Maximum products in the compare list (default: 10)
//! - `RECENTLY_VIEWED_CAPACITY` - Maximum recently viewed products (default: 8)
//! - `LIKED_CACHE_TTL_SECS` - Lifetime of cached liked-id lists (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

use crate::cookies::{compare, recently_viewed};

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Commerce backend configuration
    pub medusa: MedusaConfig,
    /// List capacities and cache lifetimes
    pub lists: ListConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Commerce backend (Medusa) configuration.
///
/// Implements `Debug` manually to redact the publishable key.
#[derive(Clone)]
pub struct MedusaConfig {
    /// Base URL of the backend, without a trailing slash
    pub backend_url: String,
    /// Publishable key sent with store API requests
    pub publishable_key: Option<SecretString>,
    /// Overall timeout for a single backend request
    pub timeout: Duration,
}

impl std::fmt::Debug for MedusaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MedusaConfig")
            .field("backend_url", &self.backend_url)
            .field(
                "publishable_key",
                &self.publishable_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// List capacities and cache lifetimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListConfig {
    /// Maximum number of products in the compare list
    pub compare_capacity: usize,
    /// Maximum number of recently viewed products
    pub recently_viewed_capacity: usize,
    /// How long a fetched liked-id list may be served from cache
    pub liked_cache_ttl: Duration,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            compare_capacity: compare::DEFAULT_CAPACITY,
            recently_viewed_capacity: recently_viewed::DEFAULT_CAPACITY,
            liked_cache_ttl: Duration::from_secs(30),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the publishable key fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env_or_default::<IpAddr>("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env_or_default::<u16>("STOREFRONT_PORT", "8000")?;
        let base_url = get_env_or_default("STOREFRONT_BASE_URL", "http://localhost:8000");

        let medusa = MedusaConfig::from_env()?;
        let lists = ListConfig::from_env()?;

        Ok(Self {
            host,
            port,
            base_url,
            medusa,
            lists,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration for a storefront talking to `backend_url`, with defaults
    /// everywhere else.
    #[must_use]
    pub fn for_backend(backend_url: &str) -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 8000,
            base_url: "http://localhost:8000".to_string(),
            medusa: MedusaConfig {
                backend_url: normalize_base_url(backend_url),
                publishable_key: None,
                timeout: Duration::from_secs(10),
            },
            lists: ListConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies set by the storefront should carry the `Secure` flag.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl MedusaConfig {
    /// Load the backend configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `MEDUSA_BACKEND_URL` is missing or not a URL,
    /// or if the publishable key looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend_url = get_required_env("MEDUSA_BACKEND_URL")?;
        url::Url::parse(&backend_url).map_err(|e| {
            ConfigError::InvalidEnvVar("MEDUSA_BACKEND_URL".to_string(), e.to_string())
        })?;

        let publishable_key = get_optional_env("MEDUSA_PUBLISHABLE_KEY")
            .map(|key| {
                validate_secret_strength(&key, "MEDUSA_PUBLISHABLE_KEY")?;
                Ok::<_, ConfigError>(SecretString::from(key))
            })
            .transpose()?;

        let timeout_secs = parse_env_or_default::<u64>("MEDUSA_TIMEOUT_SECS", "10")?;

        Ok(Self {
            backend_url: normalize_base_url(&backend_url),
            publishable_key,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl ListConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let compare_capacity = parse_env_or_default::<usize>(
            "COMPARE_CAPACITY",
            &defaults.compare_capacity.to_string(),
        )?;
        let recently_viewed_capacity = parse_env_or_default::<usize>(
            "RECENTLY_VIEWED_CAPACITY",
            &defaults.recently_viewed_capacity.to_string(),
        )?;
        let liked_cache_ttl_secs = parse_env_or_default::<u64>(
            "LIKED_CACHE_TTL_SECS",
            &defaults.liked_cache_ttl.as_secs().to_string(),
        )?;

        if compare_capacity == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "COMPARE_CAPACITY".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        if recently_viewed_capacity == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "RECENTLY_VIEWED_CAPACITY".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            compare_capacity,
            recently_viewed_capacity,
            liked_cache_ttl: Duration::from_secs(liked_cache_ttl_secs),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Real publishable keys are long random strings
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Copy the key from the backend admin."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-publishable-key", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("pk_aaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength(
            "pk_01J9Zq4mT7vBx2LwN8cRk5HsYd3Fa6Ge",
            "TEST_VAR",
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_for_backend_strips_trailing_slash() {
        let config = StorefrontConfig::for_backend("http://localhost:9000/");
        assert_eq!(config.medusa.backend_url, "http://localhost:9000");
        assert_eq!(config.lists, ListConfig::default());
    }

    #[test]
    fn test_list_defaults_match_cookie_lists() {
        let lists = ListConfig::default();
        assert_eq!(lists.compare_capacity, compare::DEFAULT_CAPACITY);
        assert_eq!(lists.recently_viewed_capacity, recently_viewed::DEFAULT_CAPACITY);
        assert_eq!(recently_viewed::DEFAULT_CAPACITY, 8);
    }

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig::for_backend("http://localhost:9000");
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8000);
    }

    #[test]
    fn test_secure_cookies_follows_base_url_scheme() {
        let mut config = StorefrontConfig::for_backend("http://localhost:9000");
        assert!(!config.secure_cookies());

        config.base_url = "https://lunette-optique.com".to_string();
        assert!(config.secure_cookies());
    }

    #[test]
    fn test_medusa_config_debug_redacts_key() {
        let config = MedusaConfig {
            backend_url: "http://localhost:9000".to_string(),
            publishable_key: Some(SecretString::from("pk_super_secret_value")),
            timeout: Duration::from_secs(10),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("localhost:9000"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("pk_super_secret_value"));
    }
}
