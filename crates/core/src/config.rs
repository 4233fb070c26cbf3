//! Environment-driven configuration
//!
//! All settings come from the process environment, read once at startup
//! into an immutable [`Config`] that is passed by reference into every
//! component. Validation of required fields happens here, before any
//! network call is attempted.

use url::Url;

use crate::error::{Error, Result};

/// Default object key prefix when `S3_PREFIX` is unset
pub const DEFAULT_PREFIX: &str = "truenas-backups";

/// Default store region hint when `S3_REGION` is unset
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default retention window in days when `BACKUP_RETENTION_DAYS` is unset
pub const DEFAULT_RETENTION_DAYS: i64 = 30;

/// Immutable run configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the appliance, e.g. `https://truenas.local`
    pub truenas_url: String,
    /// API key used for both RPC login and the archive download
    pub truenas_api_key: String,
    /// Display name used in the backup filename
    pub truenas_name: String,
    /// S3-compatible endpoint URL
    pub s3_endpoint: String,
    pub s3_access_key: String,
    pub s3_secret_key: String,
    pub s3_bucket: String,
    /// Object key namespace; may be empty
    pub s3_prefix: String,
    pub s3_region: String,
    /// When false, certificate validation is skipped for RPC and download
    pub verify_ssl: bool,
    /// Cleanup cutoff in days; zero or negative disables cleanup
    pub retention_days: i64,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an injectable variable lookup
    ///
    /// Empty values are treated the same as unset, matching how container
    /// orchestrators pass through blank environment entries.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let mut missing = Vec::new();
        let mut require = |key: &'static str| match get(key) {
            Some(v) => v,
            None => {
                missing.push(key);
                String::new()
            }
        };

        let truenas_url = require("TRUENAS_URL");
        let truenas_api_key = require("TRUENAS_API_KEY");
        let s3_endpoint = require("S3_ENDPOINT");
        let s3_access_key = require("S3_ACCESS_KEY");
        let s3_secret_key = require("S3_SECRET_KEY");
        let s3_bucket = require("S3_BUCKET");

        if !missing.is_empty() {
            return Err(Error::Config(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        let truenas_name = get("TRUENAS_NAME")
            .unwrap_or_else(|| derive_appliance_name(&truenas_url));

        let retention_days = get("BACKUP_RETENTION_DAYS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_RETENTION_DAYS);

        Ok(Self {
            truenas_url,
            truenas_api_key,
            truenas_name,
            s3_endpoint,
            s3_access_key,
            s3_secret_key,
            s3_bucket,
            s3_prefix: get("S3_PREFIX").unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            s3_region: get("S3_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            verify_ssl: get("VERIFY_SSL").map_or(true, |v| v == "true"),
            retention_days,
        })
    }
}

/// Derive a short appliance name from its base URL
///
/// Falls back to stripping the scheme by hand when the URL does not parse,
/// so a bad URL still produces a usable filename component and fails later
/// at connect time with a proper connection error.
fn derive_appliance_name(url: &str) -> String {
    if let Ok(parsed) = Url::parse(url) {
        if let Some(host) = parsed.host_str() {
            return host.to_string();
        }
    }
    let stripped = url
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    stripped
        .split([':', '/'])
        .next()
        .unwrap_or(stripped)
        .to_string()
}
