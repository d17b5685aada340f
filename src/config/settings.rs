//! Settings structures for speaker-events configuration

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main settings structure matching settings.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub outgoing: OutgoingSettings,
    pub firecrawl: FirecrawlSettings,
    pub search: SearchSettings,
    pub platforms: Vec<PlatformConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            general: GeneralSettings::default(),
            server: ServerSettings::default(),
            outgoing: OutgoingSettings::default(),
            firecrawl: FirecrawlSettings::default(),
            search: SearchSettings::default(),
            platforms: default_platforms(),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse settings from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(content)?;
        Ok(settings)
    }

    /// Merge with environment variables
    pub fn merge_env(&mut self) {
        self.merge_vars(|key| std::env::var(key).ok());
    }

    /// Merge overrides from an arbitrary variable source
    pub fn merge_vars<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = var("SPEAKER_EVENTS_DEBUG") {
            self.general.debug = val.parse().unwrap_or(false);
        }
        if let Some(val) = var("FIRECRAWL_KEY") {
            self.firecrawl.api_key = val;
        }
        if let Some(val) = var("FIRECRAWL_BASE_URL") {
            self.firecrawl.base_url = val;
        }
        // The prefixed variable wins over the generic one
        for key in ["PORT", "SPEAKER_EVENTS_PORT"] {
            if let Some(port) = var(key).and_then(|v| v.parse().ok()) {
                self.server.port = port;
            }
        }
        if let Some(val) = var("SPEAKER_EVENTS_BIND_ADDRESS") {
            self.server.bind_address = val;
        }
    }

    /// Reject settings the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.firecrawl.api_key.trim().is_empty() {
            bail!("missing Firecrawl API key (set FIRECRAWL_KEY or firecrawl.api_key)");
        }
        if self.enabled_platforms().is_empty() {
            bail!("no enabled platforms configured");
        }
        if self.search.results_per_platform == 0 {
            bail!("search.results_per_platform must be at least 1");
        }
        if self.search.max_candidate_urls == 0 {
            bail!("search.max_candidate_urls must be at least 1");
        }
        let timeout = self.outgoing.request_timeout;
        if !timeout.is_finite() || timeout <= 0.0 {
            bail!("outgoing.request_timeout must be a positive number of seconds");
        }
        Ok(())
    }

    /// Get all enabled platforms
    pub fn enabled_platforms(&self) -> Vec<&PlatformConfig> {
        self.platforms.iter().filter(|p| !p.disabled).collect()
    }
}

/// General settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Enable debug logging
    pub debug: bool,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Server port
    pub port: u16,
    /// Bind address
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 8000,
            bind_address: "127.0.0.1".to_string(),
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Request timeout in seconds
    pub request_timeout: f64,
    /// Pool max idle connections per host
    pub pool_maxsize: usize,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy settings
    pub proxies: ProxySettings,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: 30.0,
            pool_maxsize: 20,
            verify_ssl: true,
            proxies: ProxySettings::default(),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}

/// Firecrawl API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FirecrawlSettings {
    /// API key sent as a bearer token
    pub api_key: String,
    /// API root, without version segment
    pub base_url: String,
    /// Delay between batch job status checks
    pub poll_interval_ms: u64,
    /// Give up on a batch job after this long
    pub max_wait_secs: u64,
}

impl Default for FirecrawlSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.firecrawl.dev".to_string(),
            poll_interval_ms: 2000,
            max_wait_secs: 120,
        }
    }
}

/// Search behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Result limit forwarded to the search provider for each platform
    pub results_per_platform: usize,
    /// Cap on candidate URLs sent to the batch scraper
    pub max_candidate_urls: usize,
    /// Drop events whose speaker list does not mention the queried name
    pub require_speaker_match: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            results_per_platform: 5,
            max_candidate_urls: 25,
            require_speaker_match: false,
        }
    }
}

/// An event-listing platform searched for candidates
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Platform name (unique identifier)
    pub name: String,
    /// Domain used in the site restriction
    pub domain: String,
    /// Whether platform is disabled
    pub disabled: bool,
}

impl PlatformConfig {
    pub fn new(name: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
            disabled: false,
        }
    }
}

/// Default platform configurations
fn default_platforms() -> Vec<PlatformConfig> {
    vec![
        PlatformConfig::new("luma", "lu.ma"),
        PlatformConfig::new("meetup", "meetup.com"),
        PlatformConfig::new("eventbrite", "eventbrite.com"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8000);
        assert!(!settings.general.debug);
        assert_eq!(settings.enabled_platforms().len(), 3);
        assert_eq!(settings.search.results_per_platform, 5);
    }

    #[test]
    fn test_default_platforms() {
        let settings = Settings::default();
        let domains: Vec<_> = settings.platforms.iter().map(|p| p.domain.as_str()).collect();
        assert_eq!(domains, vec!["lu.ma", "meetup.com", "eventbrite.com"]);
    }

    #[test]
    fn test_yaml_partial_override() {
        let yaml = r#"
server:
  port: 9100
search:
  max_candidate_urls: 10
platforms:
  - name: luma
    domain: lu.ma
  - name: meetup
    domain: meetup.com
    disabled: true
"#;
        let settings = Settings::from_yaml(yaml).unwrap();
        assert_eq!(settings.server.port, 9100);
        assert_eq!(settings.server.bind_address, "127.0.0.1");
        assert_eq!(settings.search.max_candidate_urls, 10);
        assert_eq!(settings.search.results_per_platform, 5);
        let enabled: Vec<_> = settings
            .enabled_platforms()
            .into_iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(enabled, vec!["luma"]);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("FIRECRAWL_KEY", "fc-test"),
            ("PORT", "7000"),
            ("SPEAKER_EVENTS_PORT", "7001"),
            ("SPEAKER_EVENTS_DEBUG", "true"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings.merge_vars(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(settings.firecrawl.api_key, "fc-test");
        assert_eq!(settings.server.port, 7001);
        assert!(settings.general.debug);
    }

    #[test]
    fn test_validate() {
        let mut settings = Settings::default();
        assert!(settings.validate().is_err());

        settings.firecrawl.api_key = "fc-test".to_string();
        assert!(settings.validate().is_ok());

        for platform in &mut settings.platforms {
            platform.disabled = true;
        }
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_timeout() {
        let mut settings = Settings::default();
        settings.firecrawl.api_key = "fc-test".to_string();

        for timeout in [-1.0, 0.0, f64::NAN, f64::INFINITY] {
            settings.outgoing.request_timeout = timeout;
            assert!(settings.validate().is_err(), "timeout {} accepted", timeout);
        }

        let yaml = "firecrawl:\n  api_key: fc-test\noutgoing:\n  request_timeout: -5\n";
        assert!(Settings::from_yaml(yaml).unwrap().validate().is_err());
    }
}
