//! Exporter configuration
//!
//! Values come from serde (embedded in a caller's config file) or from the
//! standard OTLP environment variables.
//!
//! # Environment Variables
//!
//! - `OTEL_EXPORTER_OTLP_LOGS_ENDPOINT` / `OTEL_EXPORTER_OTLP_ENDPOINT`:
//!   collector endpoint (default: http://localhost:4317)
//! - `OTEL_EXPORTER_OTLP_TIMEOUT`: request timeout in ms (default: 10000)
//! - `OTEL_EXPORTER_OTLP_COMPRESSION`: `zstd` (default), `gzip` or `none`
//! - `OTLP_LOGS_EXPORTER_MAX_RETRIES`, `OTLP_LOGS_EXPORTER_INITIAL_DELAY_MS`,
//!   `OTLP_LOGS_EXPORTER_MAX_DELAY_MS`, `OTLP_LOGS_EXPORTER_JITTER_MS`:
//!   retry policy overrides

use crate::constants::*;
use crate::error::{Error, Result};
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tonic::codec::CompressionEncoding;

/// Request compression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    None,
    Gzip,
    #[default]
    Zstd,
}

impl Compression {
    pub fn encoding(self) -> Option<CompressionEncoding> {
        match self {
            Compression::None => None,
            Compression::Gzip => Some(CompressionEncoding::Gzip),
            Compression::Zstd => Some(CompressionEncoding::Zstd),
        }
    }
}

impl FromStr for Compression {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Compression::None),
            "gzip" => Ok(Compression::Gzip),
            "zstd" => Ok(Compression::Zstd),
            other => Err(Error::Config(format!("unsupported compression: {other}"))),
        }
    }
}

/// Exporter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExporterConfig {
    /// Collector gRPC endpoint, e.g. `http://localhost:4317`
    pub endpoint: String,
    pub timeout_ms: u64,
    pub connect_timeout_ms: u64,
    pub compression: Compression,
    /// Defer connecting until the first export
    pub lazy_connect: bool,
    pub retry: RetryPolicy,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            compression: Compression::default(),
            lazy_connect: false,
            retry: RetryPolicy::default(),
        }
    }
}

impl ExporterConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    ///
    /// Unset or blank keys keep their defaults. Set but unparseable keys
    /// are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values behave as if the variable were unset
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let endpoint = lookup(ENV_LOGS_ENDPOINT)
            .or_else(|| lookup(ENV_ENDPOINT))
            .unwrap_or(defaults.endpoint);

        let compression = match lookup(ENV_COMPRESSION) {
            Some(value) => value.parse()?,
            None => defaults.compression,
        };

        let retry = RetryPolicy {
            max_retries: parse_or(&lookup, ENV_MAX_RETRIES, defaults.retry.max_retries)?,
            initial_delay_ms: parse_or(
                &lookup,
                ENV_INITIAL_DELAY_MS,
                defaults.retry.initial_delay_ms,
            )?,
            max_delay_ms: parse_or(&lookup, ENV_MAX_DELAY_MS, defaults.retry.max_delay_ms)?,
            jitter_ms: parse_or(&lookup, ENV_JITTER_MS, defaults.retry.jitter_ms)?,
        };

        let config = Self {
            endpoint,
            timeout_ms: parse_or(&lookup, ENV_TIMEOUT, defaults.timeout_ms)?,
            connect_timeout_ms: defaults.connect_timeout_ms,
            compression,
            lazy_connect: defaults.lazy_connect,
            retry,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(Error::Config(format!(
                "endpoint must use http or https: {}",
                self.endpoint
            )));
        }

        if self.retry.max_delay_ms < self.retry.initial_delay_ms {
            return Err(Error::Config(format!(
                "max_delay_ms ({}) is smaller than initial_delay_ms ({})",
                self.retry.max_delay_ms, self.retry.initial_delay_ms
            )));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{key} is not a valid number: {raw:?}"))),
        None => Ok(default),
    }
}
