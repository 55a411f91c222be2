//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SABOR_API_URL` - Base URL of the backend API (e.g., `http://localhost:4000`)
//!
//! ## Optional
//! - `SABOR_API_TOKEN` - Bearer token sent before anyone signs in (high entropy)
//! - `SABOR_DATA_DIR` - Directory for durable client storage (default: `<data dir>/sabor`)
//! - `SABOR_HTTP_TIMEOUT_SECS` - Request timeout in seconds (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
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

/// Storefront client configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct StorefrontConfig {
    /// Backend API base URL
    pub api_url: Url,
    /// Bearer token used until a sign-in provides one
    pub api_token: Option<SecretString>,
    /// Directory holding `storage.json`
    pub data_dir: PathBuf,
    /// Per-request timeout
    pub http_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl std::fmt::Debug for StorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontConfig")
            .field("api_url", &self.api_url.as_str())
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("data_dir", &self.data_dir)
            .field("http_timeout", &self.http_timeout)
            .field("sentry_dsn", &self.sentry_dsn)
            .field("sentry_environment", &self.sentry_environment)
            .finish()
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
    /// if the API token fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`StorefrontConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let api_url = env.required("SABOR_API_URL")?;
        let api_url = Url::parse(&api_url)
            .map_err(|e| ConfigError::InvalidEnvVar("SABOR_API_URL".to_string(), e.to_string()))?;
        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                "SABOR_API_URL".to_string(),
                format!("unsupported scheme '{}'", api_url.scheme()),
            ));
        }

        let api_token = env
            .optional("SABOR_API_TOKEN")
            .map(|token| {
                validate_secret_strength(&token, "SABOR_API_TOKEN")?;
                Ok::<_, ConfigError>(SecretString::from(token))
            })
            .transpose()?;

        let data_dir = match env.optional("SABOR_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()
                .ok_or_else(|| ConfigError::MissingEnvVar("SABOR_DATA_DIR".to_string()))?,
        };

        let timeout_secs = env
            .optional("SABOR_HTTP_TIMEOUT_SECS")
            .map_or(Ok(DEFAULT_HTTP_TIMEOUT_SECS), |raw| {
                raw.trim().parse::<u64>().map_err(|e| {
                    ConfigError::InvalidEnvVar("SABOR_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
                })
            })?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "SABOR_HTTP_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            api_url,
            api_token,
            data_dir,
            http_timeout: Duration::from_secs(timeout_secs),
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Path of the durable storage file.
    #[must_use]
    pub fn storage_path(&self) -> PathBuf {
        self.data_dir.join("storage.json")
    }
}

/// `<platform data dir>/sabor`, e.g. `~/.local/share/sabor` on Linux.
#[must_use]
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("sabor"))
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable lookup with the empty-means-unset rule applied.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional variable. Blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }
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
    let len = s.chars().count() as f64;
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

    // Real tokens (JWTs, random API keys) have high entropy
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the token issued by the backend."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

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
        let err = validate_secret_strength("your-api-token-here", "TEST_VAR").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let err = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        assert!(validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR").is_ok());
    }

    #[test]
    fn test_minimal_config() {
        let config = StorefrontConfig::from_lookup(lookup(&[
            ("SABOR_API_URL", "http://localhost:4000"),
            ("SABOR_DATA_DIR", "/tmp/sabor-test"),
        ]))
        .unwrap();

        assert_eq!(config.api_url.as_str(), "http://localhost:4000/");
        assert!(config.api_token.is_none());
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert_eq!(config.storage_path(), PathBuf::from("/tmp/sabor-test/storage.json"));
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_missing_api_url() {
        let err = StorefrontConfig::from_lookup(lookup(&[("SABOR_DATA_DIR", "/tmp")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "SABOR_API_URL"));
    }

    #[test]
    fn test_invalid_api_url() {
        let err = StorefrontConfig::from_lookup(lookup(&[
            ("SABOR_API_URL", "ftp://backend"),
            ("SABOR_DATA_DIR", "/tmp"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_invalid_timeout() {
        for raw in ["soon", "0"] {
            let err = StorefrontConfig::from_lookup(lookup(&[
                ("SABOR_API_URL", "http://localhost:4000"),
                ("SABOR_DATA_DIR", "/tmp"),
                ("SABOR_HTTP_TIMEOUT_SECS", raw),
            ]))
            .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "SABOR_HTTP_TIMEOUT_SECS"));
        }
    }

    #[test]
    fn test_token_is_validated_and_redacted() {
        let err = StorefrontConfig::from_lookup(lookup(&[
            ("SABOR_API_URL", "http://localhost:4000"),
            ("SABOR_DATA_DIR", "/tmp"),
            ("SABOR_API_TOKEN", "changeme"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));

        let config = StorefrontConfig::from_lookup(lookup(&[
            ("SABOR_API_URL", "http://localhost:4000"),
            ("SABOR_DATA_DIR", "/tmp"),
            ("SABOR_API_TOKEN", "eyJhbGciOiJIUzI1NiJ9.k3Yq9Zp2Lm"),
        ]))
        .unwrap();
        assert_eq!(
            config.api_token.as_ref().unwrap().expose_secret(),
            "eyJhbGciOiJIUzI1NiJ9.k3Yq9Zp2Lm"
        );

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("k3Yq9Zp2Lm"));
    }

    #[test]
    fn test_blank_values_count_as_unset() {
        let config = StorefrontConfig::from_lookup(lookup(&[
            ("SABOR_API_URL", "https://api.saboryfuego.cl"),
            ("SABOR_DATA_DIR", "/tmp"),
            ("SABOR_API_TOKEN", "  "),
            ("SENTRY_DSN", ""),
        ]))
        .unwrap();
        assert!(config.api_token.is_none());
        assert!(config.sentry_dsn.is_none());
    }
}
