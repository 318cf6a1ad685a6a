//! Configuration management for the storefront.
//!
//! All configuration is loaded from environment variables (optionally via a
//! `.env` file). Loading fails fast: a missing or malformed variable aborts
//! startup with a descriptive error instead of limping along with a half
//! configured process.
//!
//! # Required Variables
//!
//! - `COMMERCE_API_URL` - Base URL of the commerce backend
//! - `STOREFRONT_SESSION_SECRET` - Session signing secret (32+ chars, validated)
//!
//! # Optional Variables
//!
//! - `STOREFRONT_HOST` / `STOREFRONT_PORT` - Bind address (default `127.0.0.1:3000`)
//! - `STOREFRONT_BASE_URL` - Public URL of this storefront
//! - `COMMERCE_API_TIMEOUT_SECS` - Backend request timeout (default 10)
//! - `SENTRY_DSN` / `SENTRY_ENVIRONMENT` - Error tracking

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Minimum length for the session secret.
const MIN_SESSION_SECRET_LENGTH: usize = 32;

/// Minimum Shannon entropy (bits per character) for the session secret.
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Substrings that mark a secret as a placeholder rather than a real value.
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "changeme",
    "change-me",
    "placeholder",
    "example",
    "your-secret",
    "insert-",
    "xxx",
];

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {name}: {message}")]
    InvalidEnvVar { name: String, message: String },

    #[error("Weak session secret: {0}")]
    WeakSecret(String),
}

/// Connection settings for the commerce backend.
#[derive(Debug, Clone)]
pub struct CommerceApiConfig {
    /// Base URL without a trailing slash.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Address to bind the HTTP server to.
    pub host: IpAddr,
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Public URL of this storefront, used to decide cookie security.
    pub base_url: String,
    /// Secret used to sign session cookies.
    pub session_secret: SecretString,
    /// Commerce backend settings.
    pub commerce: CommerceApiConfig,
    /// Sentry DSN; error tracking is disabled when unset.
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag (e.g. `production`, `staging`).
    pub sentry_environment: Option<String>,
    /// Fraction of error events to send to Sentry.
    pub sentry_sample_rate: f32,
    /// Fraction of requests to trace in Sentry.
    pub sentry_traces_sample_rate: f32,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing, a value fails to
    /// parse, or the session secret fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let host = parse_env("STOREFRONT_HOST", &get_env_or_default("STOREFRONT_HOST", "127.0.0.1"))?;
        let port = parse_env("STOREFRONT_PORT", &get_env_or_default("STOREFRONT_PORT", "3000"))?;
        let base_url = get_validated_url("STOREFRONT_BASE_URL", Some("http://localhost:3000"))?;

        let commerce_base_url = get_validated_url("COMMERCE_API_URL", None)?;
        let timeout_secs: u64 = parse_env(
            "COMMERCE_API_TIMEOUT_SECS",
            &get_env_or_default("COMMERCE_API_TIMEOUT_SECS", "10"),
        )?;

        let session_secret = get_validated_secret("STOREFRONT_SESSION_SECRET")?;

        let sentry_sample_rate = parse_env(
            "SENTRY_SAMPLE_RATE",
            &get_env_or_default("SENTRY_SAMPLE_RATE", "1.0"),
        )?;
        let sentry_traces_sample_rate = parse_env(
            "SENTRY_TRACES_SAMPLE_RATE",
            &get_env_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.1"),
        )?;

        Ok(Self {
            host,
            port,
            base_url,
            session_secret,
            commerce: CommerceApiConfig {
                base_url: commerce_base_url,
                timeout: Duration::from_secs(timeout_secs),
            },
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// The socket address to bind the server to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

/// Get a required environment variable.
fn get_required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

/// Get an optional environment variable; empty values count as unset.
fn get_optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Get an environment variable with a fallback default.
fn get_env_or_default(name: &str, default: &str) -> String {
    get_optional_env(name).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable value into a typed setting.
fn parse_env<T>(name: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::InvalidEnvVar {
        name: name.to_string(),
        message: e.to_string(),
    })
}

/// Load a URL-valued variable, validate it, and strip any trailing slash.
fn get_validated_url(name: &str, default: Option<&str>) -> Result<String, ConfigError> {
    let raw = match default {
        Some(default) => get_env_or_default(name, default),
        None => get_required_env(name)?,
    };

    let parsed = Url::parse(&raw).map_err(|e| ConfigError::InvalidEnvVar {
        name: name.to_string(),
        message: e.to_string(),
    })?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ConfigError::InvalidEnvVar {
            name: name.to_string(),
            message: format!("unsupported URL scheme: {}", parsed.scheme()),
        });
    }

    Ok(raw.trim_end_matches('/').to_string())
}

/// Load a secret from the environment and validate its strength.
fn get_validated_secret(name: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(name)?;
    validate_session_secret(&value).map_err(ConfigError::WeakSecret)?;
    Ok(SecretString::from(value))
}

/// Validate that a session secret is long enough, not a known placeholder,
/// and has enough entropy to resist guessing.
fn validate_session_secret(secret: &str) -> Result<(), String> {
    if secret.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(format!(
            "must be at least {MIN_SESSION_SECRET_LENGTH} characters (got {})",
            secret.len()
        ));
    }

    let lowered = secret.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lowered.contains(pattern) {
            return Err(format!("contains placeholder text ({pattern})"));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(format!(
            "entropy too low ({entropy:.2} bits/char, need {MIN_ENTROPY_BITS_PER_CHAR})"
        ));
    }

    Ok(())
}

/// Shannon entropy of a string in bits per character.
#[allow(clippy::cast_precision_loss)]
fn shannon_entropy(value: &str) -> f64 {
    let total = value.chars().count() as f64;
    if total == 0.0 {
        return 0.0;
    }

    let mut counts: HashMap<char, usize> = HashMap::new();
    for c in value.chars() {
        *counts.entry(c).or_insert(0) += 1;
    }

    counts
        .values()
        .map(|&count| {
            let p = count as f64 / total;
            -p * p.log2()
        })
        .sum()
}
