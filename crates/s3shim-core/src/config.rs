//! Server configuration.
//!
//! [`S3Config`] is loaded from environment variables via
//! [`S3Config::from_env`] or assembled in code with the typed builder.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Which storage backend the server runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Process-lifetime in-memory store.
    #[default]
    Memory,
    /// Files under [`S3Config::data_dir`].
    Disk,
}

impl BackendKind {
    /// Returns the configuration string for this backend.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Disk => "disk",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" | "inmemory" | "mem" => Ok(Self::Memory),
            "disk" | "file" | "fs" => Ok(Self::Disk),
            other => Err(format!("unknown backend: {other}")),
        }
    }
}

/// s3shim configuration.
///
/// # Examples
///
/// ```
/// use s3shim_core::config::S3Config;
///
/// let config = S3Config::default();
/// assert_eq!(config.gateway_listen, "0.0.0.0:10001");
/// assert!(config.internal_reset);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct S3Config {
    /// Bind address (e.g. `"0.0.0.0:10001"`).
    #[builder(default = String::from("0.0.0.0:10001"))]
    pub gateway_listen: String,

    /// Whether subdomain-style bucket addressing is enabled.
    #[builder(default = true)]
    pub s3_virtual_hosting: bool,

    /// Host name that identifies path-style requests; `<bucket>.<domain>`
    /// identifies subdomain-style requests.
    #[builder(default = String::from("localhost"))]
    pub s3_domain: String,

    /// Storage backend.
    #[builder(default)]
    pub backend: BackendKind,

    /// Base directory of the disk backend.
    #[builder(default = String::from("s3"))]
    pub data_dir: String,

    /// Whether `GET /_internal/reset` is served.
    #[builder(default = true)]
    pub internal_reset: bool,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,
}

impl Default for S3Config {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl S3Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `GATEWAY_LISTEN` | `0.0.0.0:10001` |
    /// | `S3_VIRTUAL_HOSTING` | `true` |
    /// | `S3_DOMAIN` | `localhost` |
    /// | `S3_BACKEND` | `memory` |
    /// | `DATA_DIR` | `s3` |
    /// | `S3_INTERNAL_RESET` | `true` |
    /// | `LOG_LEVEL` | `info` |
    ///
    /// Unparseable `S3_BACKEND` values keep the default.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("GATEWAY_LISTEN") {
            config.gateway_listen = v;
        }
        if let Ok(v) = std::env::var("S3_VIRTUAL_HOSTING") {
            config.s3_virtual_hosting = parse_bool(&v);
        }
        if let Ok(v) = std::env::var("S3_DOMAIN") {
            config.s3_domain = v;
        }
        if let Ok(v) = std::env::var("S3_BACKEND") {
            if let Ok(kind) = v.parse() {
                config.backend = kind;
            }
        }
        if let Ok(v) = std::env::var("DATA_DIR") {
            config.data_dir = v;
        }
        if let Ok(v) = std::env::var("S3_INTERNAL_RESET") {
            config.internal_reset = parse_bool(&v);
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }

        config
    }
}

/// Parse a string as a boolean, accepting `"1"` and `"true"` (case-insensitive).
fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}
