//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `BF_HOST` - Bind address (default: 127.0.0.1)
//! - `BF_PORT` - Listen port (default: 3000)
//! - `BF_BASE_URL` - Public URL; `https://` turns on secure cookies
//!   (default: `http://localhost:3000`)
//! - `BF_CATALOG` - Path or http(s) URL of the `web.json` catalog (default: `web.json`)
//! - `BF_CATALOG_CACHE_SECS` - How long a fetched catalog is reused (default: 300)
//! - `BF_ACCOUNTS_FILE` - JSON list of predefined accounts with argon2 hashes
//! - `BF_STATIC_DIR` - Directory served under `/static` (default: `crates/storefront/static`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0 to 1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate, 0.0 to 1.0 (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::models::Account;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Invalid accounts file {0}: {1}")]
    AccountsFile(PathBuf, String),
}

/// Where the catalog document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// A file on disk.
    File(PathBuf),
    /// A document served over HTTP.
    Url(Url),
    /// A document held in memory (tests and demos).
    Inline(String),
}

impl CatalogSource {
    /// Interpret a `BF_CATALOG` value: http(s) URLs are fetched, anything else
    /// is a file path.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` for a malformed URL.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        if value.starts_with("http://") || value.starts_with("https://") {
            Url::parse(value)
                .map(Self::Url)
                .map_err(|e| ConfigError::InvalidEnvVar("BF_CATALOG".to_string(), e.to_string()))
        } else {
            Ok(Self::File(PathBuf::from(value)))
        }
    }
}

impl std::fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
            Self::Inline(_) => f.write_str("<inline>"),
        }
    }
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
    /// Catalog document location
    pub catalog: CatalogSource,
    /// Time a loaded catalog is served from cache
    pub catalog_cache_ttl: Duration,
    /// Predefined accounts file
    pub accounts_file: Option<PathBuf>,
    /// Static asset directory
    pub static_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry trace sample rate
    pub sentry_traces_sample_rate: f32,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            catalog: CatalogSource::File(PathBuf::from("web.json")),
            catalog_cache_ttl: Duration::from_secs(300),
            accounts_file: None,
            static_dir: PathBuf::from("crates/storefront/static"),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
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
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env("BF_HOST", "127.0.0.1")?;
        let port = parse_env("BF_PORT", "3000")?;
        let base_url = get_env_or_default("BF_BASE_URL", "http://localhost:3000");
        let catalog = CatalogSource::parse(&get_env_or_default("BF_CATALOG", "web.json"))?;
        let catalog_cache_ttl = Duration::from_secs(parse_env("BF_CATALOG_CACHE_SECS", "300")?);
        let accounts_file = get_optional_env("BF_ACCOUNTS_FILE").map(PathBuf::from);
        let static_dir = PathBuf::from(get_env_or_default(
            "BF_STATIC_DIR",
            "crates/storefront/static",
        ));

        let sentry_sample_rate = parse_rate("SENTRY_SAMPLE_RATE", "1.0")?;
        let sentry_traces_sample_rate = parse_rate("SENTRY_TRACES_SAMPLE_RATE", "0.0")?;

        Ok(Self {
            host,
            port,
            base_url,
            catalog,
            catalog_cache_ttl,
            accounts_file,
            static_dir,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Load the predefined accounts, if an accounts file is configured.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::AccountsFile` if the file can't be read or parsed.
    pub fn load_accounts(&self) -> Result<Vec<Account>, ConfigError> {
        self.accounts_file
            .as_deref()
            .map_or_else(|| Ok(Vec::new()), load_accounts_file)
    }
}

/// Read a predefined accounts file.
///
/// # Errors
///
/// Returns `ConfigError::AccountsFile` if the file can't be read or parsed.
pub fn load_accounts_file(path: &Path) -> Result<Vec<Account>, ConfigError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::AccountsFile(path.to_path_buf(), e.to_string()))?;
    serde_json::from_str(&text).map_err(|e| ConfigError::AccountsFile(path.to_path_buf(), e.to_string()))
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to a default.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a sample rate between 0.0 and 1.0.
fn parse_rate(key: &str, default: &str) -> Result<f32, ConfigError> {
    let rate: f32 = parse_env(key, default)?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ))
    }
}
