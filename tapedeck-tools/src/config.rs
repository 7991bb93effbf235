//! Configuration shared by every tool in the crate.

use std::time::Duration;

use reqwest::Client;

use crate::error::ToolsError;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_GEOCODING_API_URL: &str = "https://geocoding-api.open-meteo.com";
pub const DEFAULT_WEATHER_API_URL: &str = "https://api.open-meteo.com";

/// Endpoints, timing and HTTP settings for the bundled tools.
///
/// ```
/// use std::time::Duration;
/// use tapedeck_tools::ToolsConfig;
///
/// let config = ToolsConfig::default()
///     .with_loading_delay(Duration::from_secs(3))
///     .with_user_agent("my-app/1.0");
/// assert_eq!(config.loading_delay, Duration::from_secs(3));
/// ```
#[derive(Debug, Clone)]
pub struct ToolsConfig {
    /// Base URL of the GitHub REST API
    pub github_api_url: String,

    /// Base URL of the Open-Meteo geocoding API
    pub geocoding_api_url: String,

    /// Base URL of the Open-Meteo forecast API
    pub weather_api_url: String,

    /// Pause between the loading fragment and the final fragment
    pub loading_delay: Duration,

    /// User-Agent header sent with every request (GitHub rejects requests without one)
    pub user_agent: String,

    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            geocoding_api_url: DEFAULT_GEOCODING_API_URL.to_string(),
            weather_api_url: DEFAULT_WEATHER_API_URL.to_string(),
            loading_delay: Duration::ZERO,
            user_agent: default_user_agent(),
            timeout: Duration::from_secs(30),
        }
    }
}

fn default_user_agent() -> String {
    format!("tapedeck-tools/{}", env!("CARGO_PKG_VERSION"))
}

impl ToolsConfig {
    pub fn with_github_api_url(mut self, url: impl Into<String>) -> Self {
        self.github_api_url = url.into();
        self
    }

    pub fn with_geocoding_api_url(mut self, url: impl Into<String>) -> Self {
        self.geocoding_api_url = url.into();
        self
    }

    pub fn with_weather_api_url(mut self, url: impl Into<String>) -> Self {
        self.weather_api_url = url.into();
        self
    }

    pub fn with_loading_delay(mut self, delay: Duration) -> Self {
        self.loading_delay = delay;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the HTTP client shared by a tool set.
    pub fn http_client(&self) -> Result<Client, ToolsError> {
        Client::builder()
            .user_agent(&self.user_agent)
            .timeout(self.timeout)
            .build()
            .map_err(ToolsError::Client)
    }
}

/// Join a base URL and a path without doubling the slash.
pub(crate) fn endpoint(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ToolsConfig::default();
        assert_eq!(config.github_api_url, "https://api.github.com");
        assert_eq!(config.loading_delay, Duration::ZERO);
        assert!(config.user_agent.starts_with("tapedeck-tools/"));
    }

    #[test]
    fn test_endpoint_join() {
        assert_eq!(endpoint("http://x/", "/repos/a/b"), "http://x/repos/a/b");
        assert_eq!(endpoint("http://x", "v1/search"), "http://x/v1/search");
    }

    #[test]
    fn test_http_client_builds() {
        assert!(ToolsConfig::default().http_client().is_ok());
    }
}
