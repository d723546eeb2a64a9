//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 5000)
//! - `CORS_ORIGIN` - Browser origin allowed to call the API (default: <http://localhost:3000>)
//! - `UPLOAD_DIR` - Local image directory (default: uploads)
//! - `CLOUDINARY_CLOUD_NAME`, `CLOUDINARY_API_KEY`, `CLOUDINARY_API_SECRET` -
//!   store images on Cloudinary instead of local disk (all three or none)
//! - `CLOUDINARY_FOLDER` - Cloudinary folder (default: `jewel_products`)
//! - `ORDER_TAX_RATE` - Tax rate applied to the items price (default: 0)
//! - `ORDER_SHIPPING_PRICE` - Flat shipping price (default: 0)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)
//! - `LOG_FORMAT` - `json` for JSON logs, anything else for text

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;

use jewelbox_core::Money;
use jewelbox_core::order::PricingPolicy;

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

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Browser origin allowed to make credentialed API calls
    pub cors_origin: String,
    /// Where uploaded images are stored
    pub images: ImageStoreConfig,
    /// Tax and shipping applied at checkout
    pub pricing: PricingPolicy,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
    /// Emit JSON logs instead of text
    pub json_logs: bool,
}

/// Image storage backend selection.
#[derive(Debug, Clone)]
pub enum ImageStoreConfig {
    /// Files written under `dir` and served from `/uploads`.
    Local { dir: PathBuf },
    Cloudinary(CloudinaryConfig),
}

/// Cloudinary upload credentials.
///
/// Implements `Debug` manually to redact the API secret.
#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: SecretString,
    pub folder: String,
}

impl std::fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("folder", &self.folder)
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
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = SecretString::from(get_required_env("DATABASE_URL")?);
        let host: IpAddr = parse_env_or_default("STOREFRONT_HOST", "127.0.0.1")?;
        let port: u16 = parse_env_or_default("STOREFRONT_PORT", "5000")?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;
        url::Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_BASE_URL".to_string(), e.to_string())
        })?;
        let cors_origin = get_env_or_default("CORS_ORIGIN", "http://localhost:3000");

        let images = ImageStoreConfig::from_env()?;
        let pricing = pricing_from_env()?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            cors_origin,
            images,
            pricing,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env_or_default("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
            json_logs: get_optional_env("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl ImageStoreConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let cloud_name = get_optional_env("CLOUDINARY_CLOUD_NAME");
        let api_key = get_optional_env("CLOUDINARY_API_KEY");
        let api_secret = get_optional_env("CLOUDINARY_API_SECRET");

        match (cloud_name, api_key, api_secret) {
            (None, None, None) => Ok(Self::Local {
                dir: PathBuf::from(get_env_or_default("UPLOAD_DIR", "uploads")),
            }),
            (Some(cloud_name), Some(api_key), Some(api_secret)) => {
                validate_secret_strength(&api_secret, "CLOUDINARY_API_SECRET")?;
                Ok(Self::Cloudinary(CloudinaryConfig {
                    cloud_name,
                    api_key,
                    api_secret: SecretString::from(api_secret),
                    folder: get_env_or_default("CLOUDINARY_FOLDER", "jewel_products"),
                }))
            }
            _ => Err(ConfigError::InvalidEnvVar(
                "CLOUDINARY_*".to_string(),
                "CLOUDINARY_CLOUD_NAME, CLOUDINARY_API_KEY and CLOUDINARY_API_SECRET must be set together"
                    .to_string(),
            )),
        }
    }
}

fn pricing_from_env() -> Result<PricingPolicy, ConfigError> {
    let tax_rate: Decimal = parse_env_or_default("ORDER_TAX_RATE", "0")?;
    if tax_rate.is_sign_negative() {
        return Err(ConfigError::InvalidEnvVar(
            "ORDER_TAX_RATE".to_string(),
            "must not be negative".to_string(),
        ));
    }

    let shipping = get_env_or_default("ORDER_SHIPPING_PRICE", "0");
    let shipping_price = Money::parse(&shipping).map_err(|e| {
        ConfigError::InvalidEnvVar("ORDER_SHIPPING_PRICE".to_string(), e.to_string())
    })?;

    Ok(PricingPolicy {
        tax_rate,
        shipping_price,
    })
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
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> StorefrontConfig {
        StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/jewelbox"),
            host: "127.0.0.1".parse().unwrap(),
            port: 5000,
            base_url: "http://localhost:5000".to_string(),
            cors_origin: "http://localhost:3000".to_string(),
            images: ImageStoreConfig::Local {
                dir: PathBuf::from("uploads"),
            },
            pricing: PricingPolicy::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
            json_logs: false,
        }
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
        let result = validate_secret_strength("your-cloudinary-secret", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        assert!(validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR").is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let addr = config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 5000);
    }

    #[test]
    fn test_is_secure_follows_base_url() {
        let mut config = config();
        assert!(!config.is_secure());
        config.base_url = "https://jewelbox.shop".to_string();
        assert!(config.is_secure());
    }

    #[test]
    fn test_cloudinary_debug_redacts_secret() {
        let cloudinary = CloudinaryConfig {
            cloud_name: "jewelbox".to_string(),
            api_key: "123456".to_string(),
            api_secret: SecretString::from("s3cr3t-value-that-leaks"),
            folder: "jewel_products".to_string(),
        };

        let debug_output = format!("{cloudinary:?}");
        assert!(debug_output.contains("jewelbox"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("s3cr3t-value-that-leaks"));
    }
}
