//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `ADMIN_BASE_URL` - Public URL of the console
//! - `FIREBASE_API_KEY` - Web API key of the identity provider project
//! - `CLOUDINARY_CLOUD_NAME` - Media CDN cloud name
//! - `CLOUDINARY_API_KEY` - Media CDN API key
//! - `CLOUDINARY_API_SECRET` - Media CDN API secret (signs uploads and deletes)
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `FIREBASE_AUTH_BASE_URL` - Identity Toolkit base URL (default: Google production;
//!   point at the auth emulator for local work)
//! - `CLOUDINARY_FOLDER` - Folder uploads land in (default: portfolio)
//! - `LOCKOUT_MAX_ATTEMPTS` - Failed sign-ins before the login form locks (default: 5)
//! - `LOCKOUT_MINUTES` - Length of the login lock (default: 15)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`
//!
//! ## Optional (TLS)
//! - `ADMIN_TLS_CERT` - PEM-encoded certificate chain
//! - `ADMIN_TLS_KEY` - PEM-encoded private key

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use chrono::TimeDelta;
use folio_core::LockoutPolicy;
use folio_core::lockout::{DEFAULT_LOCK_MINUTES, DEFAULT_MAX_ATTEMPTS};
use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_FIREBASE_AUTH_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const DEFAULT_CLOUDINARY_FOLDER: &str = "portfolio";

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

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the console
    pub base_url: String,
    /// Hosted identity provider
    pub identity: IdentityConfig,
    /// Hosted media CDN
    pub media: MediaConfig,
    /// Login lockout thresholds
    pub lockout: LockoutConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
    /// TLS configuration for HTTPS (optional)
    pub tls: Option<TlsConfig>,
}

/// Identity provider (Firebase Identity Toolkit) configuration.
#[derive(Clone)]
pub struct IdentityConfig {
    /// Web API key sent as the `key` query parameter
    pub api_key: SecretString,
    /// REST base URL, without trailing slash
    pub base_url: String,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl IdentityConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_key = get_required_env("FIREBASE_API_KEY")?;
        // Web API keys identify the project rather than grant access, so a
        // weak-looking key is only worth a warning.
        if let Err(e) = validate_secret_strength(&api_key, "FIREBASE_API_KEY") {
            tracing::warn!("FIREBASE_API_KEY validation warning: {e}");
        }
        let base_url = get_env_or_default("FIREBASE_AUTH_BASE_URL", DEFAULT_FIREBASE_AUTH_BASE_URL)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            api_key: SecretString::from(api_key),
            base_url,
        })
    }
}

/// Media CDN (Cloudinary) configuration.
#[derive(Clone)]
pub struct MediaConfig {
    /// Cloud name (first path segment of every API and delivery URL)
    pub cloud_name: String,
    /// Public API key
    pub api_key: String,
    /// API secret used to sign uploads and deletes
    pub api_secret: SecretString,
    /// Folder that uploads land in and listings are scoped to
    pub folder: String,
}

impl std::fmt::Debug for MediaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("folder", &self.folder)
            .finish()
    }
}

impl MediaConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let folder = get_env_or_default("CLOUDINARY_FOLDER", DEFAULT_CLOUDINARY_FOLDER)
            .trim_matches('/')
            .to_string();
        if folder.is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "CLOUDINARY_FOLDER".to_string(),
                "must not be empty".to_string(),
            ));
        }

        Ok(Self {
            cloud_name: get_required_env("CLOUDINARY_CLOUD_NAME")?,
            api_key: get_required_env("CLOUDINARY_API_KEY")?,
            api_secret: get_validated_secret("CLOUDINARY_API_SECRET")?,
            folder,
        })
    }
}

/// Login lockout thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutConfig {
    /// Consecutive failures that lock the login form
    pub max_attempts: u32,
    /// Lock length in minutes
    pub lock_minutes: i64,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            lock_minutes: DEFAULT_LOCK_MINUTES,
        }
    }
}

impl LockoutConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let max_attempts = get_env_or_default("LOCKOUT_MAX_ATTEMPTS", "5")
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                ConfigError::InvalidEnvVar(
                    "LOCKOUT_MAX_ATTEMPTS".to_string(),
                    "must be a positive integer".to_string(),
                )
            })?;
        let lock_minutes = get_env_or_default("LOCKOUT_MINUTES", "15")
            .parse::<i64>()
            .ok()
            .filter(|n| (1..=24 * 60).contains(n))
            .ok_or_else(|| {
                ConfigError::InvalidEnvVar(
                    "LOCKOUT_MINUTES".to_string(),
                    "must be between 1 and 1440".to_string(),
                )
            })?;

        Ok(Self {
            max_attempts,
            lock_minutes,
        })
    }

    /// Build the guard policy from these thresholds.
    #[must_use]
    pub fn policy(&self) -> LockoutPolicy {
        LockoutPolicy::new(self.max_attempts, TimeDelta::minutes(self.lock_minutes))
    }
}

/// TLS configuration for HTTPS.
#[derive(Clone)]
pub struct TlsConfig {
    /// PEM-encoded certificate chain
    pub cert_pem: String,
    /// PEM-encoded private key
    pub key_pem: SecretString,
}

impl std::fmt::Debug for TlsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsConfig")
            .field("cert_pem", &"[CERTIFICATE]")
            .field("key_pem", &"[REDACTED]")
            .finish()
    }
}

impl TlsConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let cert_pem = get_optional_env("ADMIN_TLS_CERT");
        let key_pem = get_optional_env("ADMIN_TLS_KEY");

        match (cert_pem, key_pem) {
            (Some(cert), Some(key)) => Ok(Some(Self {
                cert_pem: cert,
                key_pem: SecretString::from(key),
            })),
            (None, None) => Ok(None),
            _ => Err(ConfigError::InvalidEnvVar(
                "ADMIN_TLS_*".to_string(),
                "Both ADMIN_TLS_CERT and ADMIN_TLS_KEY must be set together".to_string(),
            )),
        }
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("ADMIN_DATABASE_URL")?;
        let host = get_env_or_default("ADMIN_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("ADMIN_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("ADMIN_BASE_URL")?;
        url::Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_BASE_URL".to_string(), e.to_string()))?;

        let identity = IdentityConfig::from_env()?;
        let media = MediaConfig::from_env()?;
        let lockout = LockoutConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.2);
        let tls = TlsConfig::from_env()?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            identity,
            media,
            lockout,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
            tls,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the console is served over HTTPS (controls the `Secure` cookie flag).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    std::env::var(primary_key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
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

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
impl AdminConfig {
    /// Fixed configuration for unit tests; never touches the environment.
    pub(crate) fn for_tests() -> Self {
        Self {
            database_url: SecretString::from("postgres://localhost/folio_test"),
            host: std::net::Ipv4Addr::LOCALHOST.into(),
            port: 3001,
            base_url: "http://localhost:3001".to_string(),
            identity: IdentityConfig {
                api_key: SecretString::from("AIzaSyD-test-key"),
                base_url: DEFAULT_FIREBASE_AUTH_BASE_URL.to_string(),
            },
            media: MediaConfig {
                cloud_name: "folio-demo".to_string(),
                api_key: "123456789012345".to_string(),
                api_secret: SecretString::from("cdn_api_secret_value"),
                folder: DEFAULT_CLOUDINARY_FOLDER.to_string(),
            },
            lockout: LockoutConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.2,
            tls: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_bounds() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!(shannon_entropy("aB3$xY9!mK2@nL5#") > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let err = validate_secret_strength("your-api-secret-here", "TEST_VAR").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let err = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        assert!(validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR").is_ok());
    }

    #[test]
    fn test_socket_addr_and_security() {
        let mut config = AdminConfig::for_tests();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3001);
        assert!(!config.is_secure());

        config.base_url = "https://admin.folio.dev".to_string();
        assert!(config.is_secure());
    }

    #[test]
    fn test_lockout_config_builds_policy() {
        let policy = LockoutConfig {
            max_attempts: 3,
            lock_minutes: 10,
        }
        .policy();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.lock_duration(), TimeDelta::minutes(10));
        assert_eq!(LockoutConfig::default().policy(), LockoutPolicy::default());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = AdminConfig::for_tests();
        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("folio-demo"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("AIzaSyD-test-key"));
        assert!(!debug_output.contains("cdn_api_secret_value"));
    }
}
