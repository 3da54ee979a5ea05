//! Configuration management for proxyhost.
//!
//! This module provides the command-line interface:
//! - Command-line arguments via clap
//! - Environment variables with `PROXYHOST_` prefix
//! - Sensible defaults for all optional settings
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use proxyhost::config::{Cli, Command};
//!
//! match Cli::parse().command {
//!     Command::Serve(config) => println!("Listening on {}", config.bind_address()),
//!     Command::Check(config) => println!("Checking {:?}", config.storage.s3_bucket),
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `PROXYHOST_HOST` - Server bind address (default: 0.0.0.0)
//! - `PROXYHOST_PORT` - Server port (default: 8787)
//! - `PROXYHOST_STORAGE` - Storage backend: `s3` or `memory` (default: s3)
//! - `PROXYHOST_S3_BUCKET` - S3 bucket holding site objects (required for s3)
//! - `PROXYHOST_S3_ENDPOINT` - Custom S3 endpoint for S3-compatible services
//! - `PROXYHOST_S3_REGION` - AWS region (default: us-east-1)
//! - `PROXYHOST_SITE_PREFIX` - Route prefix for served sites (default: /site)
//! - `PROXYHOST_CACHE_MAX_AGE` - HTTP cache max-age seconds (default: 300)
//! - `PROXYHOST_FETCH_TIMEOUT` - Storage fetch timeout seconds, 0 disables (default: 10)
//! - `PROXYHOST_MAX_UPLOAD_BYTES` - Upload size limit (default: 10 MiB)
//! - `PROXYHOST_CORS_ORIGINS` - Allowed CORS origins, comma-separated

use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::gateway::{GatewayConfig, DEFAULT_CACHE_MAX_AGE, DEFAULT_FETCH_TIMEOUT_SECS};
use crate::server::{RouterConfig, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_SITE_PREFIX};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8787;

/// Default AWS region.
pub const DEFAULT_REGION: &str = "us-east-1";

// =============================================================================
// CLI Arguments
// =============================================================================

/// proxyhost - multi-tenant static site gateway.
///
/// Serves uploaded HTML sites from S3 or S3-compatible storage under
/// /<tenant>/<site>/ paths.
#[derive(Parser, Debug, Clone)]
#[command(name = "proxyhost")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP gateway.
    Serve(ServeConfig),

    /// Verify storage settings and optionally probe one site object.
    Check(CheckConfig),
}

/// Which blob store backs the gateway.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// S3 or an S3-compatible service
    S3,
    /// In-process map; contents are lost on restart
    Memory,
}

/// Storage settings shared by all subcommands.
#[derive(Args, Debug, Clone)]
pub struct StorageArgs {
    /// Storage backend.
    #[arg(long, value_enum, default_value_t = StorageBackend::S3, env = "PROXYHOST_STORAGE")]
    pub storage: StorageBackend,

    /// S3 bucket holding the site objects.
    #[arg(long, env = "PROXYHOST_S3_BUCKET")]
    pub s3_bucket: Option<String>,

    /// Custom S3 endpoint URL for S3-compatible services (MinIO, R2, etc.).
    ///
    /// If not specified, uses the default AWS S3 endpoint.
    #[arg(long, env = "PROXYHOST_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// AWS region for S3.
    #[arg(long, default_value = DEFAULT_REGION, env = "PROXYHOST_S3_REGION")]
    pub s3_region: String,
}

impl StorageArgs {
    /// Validate the storage settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.storage == StorageBackend::S3
            && self.s3_bucket.as_deref().map_or(true, str::is_empty)
        {
            return Err(
                "S3 bucket name is required. Set --s3-bucket or PROXYHOST_S3_BUCKET, \
                 or use --storage memory"
                    .to_string(),
            );
        }
        Ok(())
    }

    /// The configured bucket, or an empty string (call validate() first).
    pub fn bucket(&self) -> &str {
        self.s3_bucket.as_deref().unwrap_or("")
    }
}

/// Settings for the `serve` subcommand.
#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "PROXYHOST_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "PROXYHOST_PORT")]
    pub port: u16,

    // =========================================================================
    // Storage Configuration
    // =========================================================================
    #[command(flatten)]
    pub storage: StorageArgs,

    // =========================================================================
    // Serving Configuration
    // =========================================================================
    /// Route prefix under which sites are served ("/" serves at the root).
    #[arg(long, default_value = DEFAULT_SITE_PREFIX, env = "PROXYHOST_SITE_PREFIX")]
    pub site_prefix: String,

    /// HTTP Cache-Control max-age in seconds for served objects.
    #[arg(long, default_value_t = DEFAULT_CACHE_MAX_AGE, env = "PROXYHOST_CACHE_MAX_AGE")]
    pub cache_max_age: u32,

    /// Storage fetch timeout in seconds (0 disables the timeout).
    #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT_SECS, env = "PROXYHOST_FETCH_TIMEOUT")]
    pub fetch_timeout: u64,

    /// Maximum accepted upload size in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_BYTES, env = "PROXYHOST_MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: usize,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "PROXYHOST_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        self.storage.validate()?;

        if !self.site_prefix.starts_with('/') {
            return Err("site_prefix must start with '/'".to_string());
        }
        if self.site_prefix.contains(['{', '}', '*']) {
            return Err("site_prefix must be a literal path".to_string());
        }
        if self.site_prefix.trim_end_matches('/') == "/api"
            || self.site_prefix.trim_end_matches('/') == "/health"
        {
            return Err("site_prefix collides with a built-in route".to_string());
        }

        if self.max_upload_bytes == 0 {
            return Err("max_upload_bytes must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The fetch timeout, or None when disabled.
    pub fn fetch_timeout(&self) -> Option<Duration> {
        (self.fetch_timeout > 0).then(|| Duration::from_secs(self.fetch_timeout))
    }

    /// Build the gateway serving policy.
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig::new()
            .with_cache_max_age(self.cache_max_age)
            .with_fetch_timeout(self.fetch_timeout())
    }

    /// Build the router configuration.
    pub fn router_config(&self) -> RouterConfig {
        let mut router_config = RouterConfig::new()
            .with_gateway(self.gateway_config())
            .with_site_prefix(self.site_prefix.clone())
            .with_max_upload_bytes(self.max_upload_bytes)
            .with_tracing(!self.no_tracing);

        if let Some(ref origins) = self.cors_origins {
            router_config = router_config.with_cors_origins(origins.clone());
        }

        router_config
    }
}

/// Settings for the `check` subcommand.
#[derive(Args, Debug, Clone)]
pub struct CheckConfig {
    #[command(flatten)]
    pub storage: StorageArgs,

    /// Tenant id of an object to probe (requires --site).
    #[arg(long, requires = "site")]
    pub tenant: Option<String>,

    /// Site id of an object to probe (requires --tenant).
    #[arg(long, requires = "tenant")]
    pub site: Option<String>,

    /// Sub-path of the object to probe (default: index.html).
    #[arg(long, default_value = "")]
    pub path: String,

    /// Enable verbose logging.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl CheckConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.storage.storage != StorageBackend::S3 {
            return Err("check only applies to --storage s3".to_string());
        }
        self.storage.validate()
    }

    /// The raw request path for the object to probe, if one was requested.
    pub fn probe_path(&self) -> Option<String> {
        match (&self.tenant, &self.site) {
            (Some(tenant), Some(site)) => Some(format!("/{}/{}/{}", tenant, site, self.path)),
            _ => None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
