//! # Core Configuration Module
//!
//! Provides configuration management for the video library core.
//!
//! ## Overview
//!
//! A builder constructs a [`CoreConfig`] holding the catalog service location,
//! request behavior, and the injected [`HttpClient`]. Validation is fail-fast:
//! `build()` returns an actionable error instead of producing a config that
//! would only fail on the first request.
//!
//! ## Required
//!
//! - `base_url` - absolute `http`/`https` URL of the catalog service
//! - `HttpClient` - injected by the host, or provided by `bridge-desktop` when
//!   the `desktop-shims` feature is enabled
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//!
//! let config = CoreConfig::builder()
//!     .base_url("http://localhost:8088")
//!     .default_subdir("unsorted")
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{HttpClient, RetryPolicy};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Subdirectory shown before the user picks one.
pub const DEFAULT_SUBDIR: &str = "unsorted";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Core configuration for the video library client.
#[derive(Clone)]
pub struct CoreConfig {
    /// Root of the catalog service; endpoints are joined onto it
    pub base_url: Url,

    /// Subdirectory selected on mount
    pub default_subdir: String,

    /// Timeout applied to every catalog request
    pub request_timeout: Duration,

    /// Retry policy for read-only list/detail requests.
    /// Preview and mutating requests are never retried.
    pub read_retry: RetryPolicy,

    /// Capacity of the notification channel
    pub event_buffer_size: usize,

    /// HTTP client used for all catalog requests
    pub http_client: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("base_url", &self.base_url.as_str())
            .field("default_subdir", &self.default_subdir)
            .field("request_timeout", &self.request_timeout)
            .field("read_retry", &self.read_retry)
            .field("event_buffer_size", &self.event_buffer_size)
            .field("http_client", &"HttpClient { ... }")
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.base_url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "Catalog base URL must use http or https, got '{}'",
                self.base_url.scheme()
            )));
        }

        if self.default_subdir.trim().is_empty() {
            return Err(Error::Config(
                "Default subdirectory cannot be empty".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(Error::Config(
                "Request timeout must be greater than zero".to_string(),
            ));
        }

        if self.read_retry.max_attempts == 0 {
            return Err(Error::Config(
                "Read retry policy needs at least one attempt".to_string(),
            ));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn http_client_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "An HttpClient implementation is required to reach the catalog service. \
                 Desktop: enable the 'desktop-shims' feature to use the default ReqwestHttpClient. \
                 Other hosts: inject an adapter with .http_client()."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client(timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client = ReqwestHttpClient::with_timeout(timeout).map_err(|e| Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: e.to_string(),
    })?;
    Ok(Arc::new(client))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client(_timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    Err(http_client_missing_error())
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    base_url: Option<String>,
    default_subdir: Option<String>,
    request_timeout: Option<Duration>,
    read_retry: Option<RetryPolicy>,
    event_buffer_size: Option<usize>,
    http_client: Option<Arc<dyn HttpClient>>,
}

impl CoreConfigBuilder {
    /// Sets the catalog service root, e.g. `http://localhost:8088`.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the subdirectory loaded on mount. Default: `"unsorted"`.
    pub fn default_subdir(mut self, subdir: impl Into<String>) -> Self {
        self.default_subdir = Some(subdir.into());
        self
    }

    /// Sets the per-request timeout. Default: 30 seconds.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Sets the retry policy for read-only requests.
    pub fn read_retry(mut self, policy: RetryPolicy) -> Self {
        self.read_retry = Some(policy);
        self
    }

    /// Sets the notification channel capacity. Default: 100.
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Injects the HTTP client.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Errors
    ///
    /// - `Error::Config` when the base URL is missing or malformed, or a value
    ///   fails validation
    /// - `Error::CapabilityMissing` when no HTTP client is available
    pub fn build(self) -> Result<CoreConfig> {
        let raw_url = self.base_url.ok_or_else(|| {
            Error::Config("Catalog base URL is required. Use .base_url() to set it.".to_string())
        })?;

        let mut base_url = Url::parse(&raw_url)
            .map_err(|e| Error::Config(format!("Invalid catalog base URL '{}': {}", raw_url, e)))?;

        // Url::join replaces the last segment unless the path ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let request_timeout = self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client(request_timeout)?,
        };

        let config = CoreConfig {
            base_url,
            default_subdir: self
                .default_subdir
                .unwrap_or_else(|| DEFAULT_SUBDIR.to_string()),
            request_timeout,
            read_retry: self.read_retry.unwrap_or_default(),
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
            http_client,
        };

        config.validate()?;

        Ok(config)
    }
}
