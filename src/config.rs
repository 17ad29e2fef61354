//! Rewriter configuration
//!
//! The defaults reproduce the fixed policy: six excluded request headers,
//! `application/json` as the fallback content type and five static
//! CORS/security headers. A host may build a different configuration once at
//! start-up; after it is handed to the transformer it is shared read-only.
//!
//! # Environment
//!
//! - `CORS_REWRITER_DEFAULT_CONTENT_TYPE`: fallback Content-Type
//! - `CORS_REWRITER_EXTRA_EXCLUDED_HEADERS`: comma separated names added to the excluded set

use std::env;

use http::header::{HeaderName, HeaderValue};
use tracing::debug;

use crate::error::ConfigError;

/// Request headers never echoed into `Access-Control-Allow-Headers`.
pub const EXCLUDED_HEADERS: [&str; 6] = [
    "Cache-Control",
    "Connection",
    "User-Agent",
    "Postman-Token",
    "Accept-Encoding",
    "Accept-Language",
];

/// Content type used when neither the stub nor the request provides one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Literal appended to every computed `Access-Control-Allow-Headers` value.
pub const ALLOW_HEADERS_SUFFIX: &str = "Content-Encoding, Server, Transfer-Encoding, Content-Type";

/// Headers set on every rewritten response, overwriting existing values.
pub const STATIC_HEADERS: [(&str, &str); 5] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "*"),
    ("X-Content-Type-Options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("x-xss-protection", "1; mode=block"),
];

const DEFAULT_CONTENT_TYPE_ENV: &str = "CORS_REWRITER_DEFAULT_CONTENT_TYPE";
const EXTRA_EXCLUDED_HEADERS_ENV: &str = "CORS_REWRITER_EXTRA_EXCLUDED_HEADERS";

/// Immutable settings for the CORS header rewriter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriterConfig {
    excluded_headers: Vec<String>,
    default_content_type: String,
    allow_headers_suffix: String,
    static_headers: Vec<(String, String)>,
}

impl Default for RewriterConfig {
    fn default() -> Self {
        Self {
            excluded_headers: EXCLUDED_HEADERS.iter().map(|h| h.to_string()).collect(),
            default_content_type: DEFAULT_CONTENT_TYPE.to_string(),
            allow_headers_suffix: ALLOW_HEADERS_SUFFIX.to_string(),
            static_headers: STATIC_HEADERS
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        }
    }
}

impl RewriterConfig {
    /// Create a configuration with the default policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load overrides from environment variables on top of the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an override is not a legal header name or value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`RewriterConfig::from_env`] with a custom variable source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an override is not a legal header name or value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(content_type) = lookup(DEFAULT_CONTENT_TYPE_ENV) {
            debug!(content_type = %content_type, "Overriding default content type");
            config = config.with_default_content_type(content_type.trim());
        }

        if let Some(extra) = lookup(EXTRA_EXCLUDED_HEADERS_ENV) {
            for name in extra.split(',').map(str::trim).filter(|n| !n.is_empty()) {
                config = config.with_excluded_header(name);
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the fallback content type.
    pub fn with_default_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.default_content_type = content_type.into();
        self
    }

    /// Add a request header name to the excluded set.
    pub fn with_excluded_header(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.is_excluded(&name) {
            self.excluded_headers.push(name);
        }
        self
    }

    /// Check that every configured value can be written as an HTTP header.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_content_type.trim().is_empty() {
            return Err(ConfigError::EmptyContentType);
        }
        HeaderValue::from_str(&self.default_content_type)
            .map_err(|_| ConfigError::InvalidContentType(self.default_content_type.clone()))?;

        for name in &self.excluded_headers {
            HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ConfigError::InvalidHeaderName(name.clone()))?;
        }
        Ok(())
    }

    /// Whether a request header is kept out of `Access-Control-Allow-Headers`.
    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded_headers
            .iter()
            .any(|h| h.eq_ignore_ascii_case(name))
    }

    /// Excluded request header names.
    pub fn excluded_headers(&self) -> &[String] {
        &self.excluded_headers
    }

    /// Fallback content type.
    pub fn default_content_type(&self) -> &str {
        &self.default_content_type
    }

    /// Literal closing every `Access-Control-Allow-Headers` value.
    pub fn allow_headers_suffix(&self) -> &str {
        &self.allow_headers_suffix
    }

    /// Static headers in the order they are applied.
    pub fn static_headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.static_headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}
