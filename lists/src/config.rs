//! Client configuration.
//!
//! The base API URL is required; everything else has a default. Values are
//! read from the process environment (the CLI loads `.env` first).

use crate::error::ConfigError;
use reqwest::Url;
use std::time::Duration;

/// Environment variable holding the backend base URL
pub const BASE_API_URL_VAR: &str = "RECIPE_LISTS_BASE_API_URL";

/// Environment variable holding the simulated latency, in milliseconds
pub const REQUEST_DELAY_VAR: &str = "RECIPE_LISTS_REQUEST_DELAY_MS";

/// Configuration for the lists client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListsConfig {
    /// Base URL every endpoint path is appended to
    pub base_api_url: Url,

    /// Pause before each request, to make loading states visible while
    /// developing against a local backend.
    ///
    /// Default: zero (disabled)
    pub request_delay: Duration,
}

impl ListsConfig {
    /// Create a configuration for the given base URL
    #[must_use]
    pub const fn new(base_api_url: Url) -> Self {
        Self {
            base_api_url,
            request_delay: Duration::ZERO,
        }
    }

    /// Parse and validate a base URL
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseApiUrl`] unless `value` is an
    /// absolute `http` or `https` URL.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidBaseApiUrl {
            value: value.to_string(),
            reason,
        };

        let url = Url::parse(value.trim()).map_err(|e| invalid(e.to_string()))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
        }
        if url.cannot_be_a_base() {
            return Err(invalid("URL cannot be used as a base".to_string()));
        }

        Ok(Self::new(url))
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingBaseApiUrl`] if the base URL is unset,
    /// or a validation error for malformed values.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Same as [`ListsConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = lookup(BASE_API_URL_VAR)
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::MissingBaseApiUrl {
                var: BASE_API_URL_VAR,
            })?;

        let mut config = Self::parse(&base)?;

        if let Some(raw) = lookup(REQUEST_DELAY_VAR).filter(|value| !value.trim().is_empty()) {
            let millis = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidRequestDelay { value: raw.clone() })?;
            config.request_delay = Duration::from_millis(millis);
        }

        Ok(config)
    }

    /// Set the simulated request latency
    #[must_use]
    pub const fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn loads_base_url_and_delay() {
        let config = ListsConfig::from_lookup(lookup(&[
            (BASE_API_URL_VAR, "http://localhost:3000/api/"),
            (REQUEST_DELAY_VAR, "500"),
        ]))
        .unwrap();

        assert_eq!(config.base_api_url.as_str(), "http://localhost:3000/api/");
        assert_eq!(config.request_delay, Duration::from_millis(500));
    }

    #[test]
    fn delay_defaults_to_disabled() {
        let config =
            ListsConfig::from_lookup(lookup(&[(BASE_API_URL_VAR, "https://api.example.com")]))
                .unwrap();

        assert_eq!(config.request_delay, Duration::ZERO);
    }

    #[test]
    fn missing_base_url_is_fatal() {
        let error = ListsConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(error, ConfigError::MissingBaseApiUrl { .. }));

        let error = ListsConfig::from_lookup(lookup(&[(BASE_API_URL_VAR, "  ")])).unwrap_err();
        assert!(matches!(error, ConfigError::MissingBaseApiUrl { .. }));
    }

    #[test]
    fn rejects_non_http_urls() {
        for value in ["localhost:3000", "ftp://example.com", "not a url"] {
            let error = ListsConfig::parse(value).unwrap_err();
            assert!(
                matches!(error, ConfigError::InvalidBaseApiUrl { .. }),
                "{value} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_bad_delay() {
        let error = ListsConfig::from_lookup(lookup(&[
            (BASE_API_URL_VAR, "http://localhost:3000"),
            (REQUEST_DELAY_VAR, "half a second"),
        ]))
        .unwrap_err();

        assert!(matches!(error, ConfigError::InvalidRequestDelay { .. }));
    }

    #[test]
    fn builder_sets_delay() {
        let config = ListsConfig::parse("http://localhost:3000")
            .unwrap()
            .with_request_delay(Duration::from_millis(250));

        assert_eq!(config.request_delay, Duration::from_millis(250));
    }
}
