//! Provider traits and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A candidate page returned by the search provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub snippet: String,
}

impl SearchHit {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: String::new(),
            snippet: String::new(),
        }
    }
}

/// What the scraper should extract from each page
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    /// JSON schema of the structured output
    pub schema: serde_json::Value,
    /// Natural-language extraction instruction
    pub prompt: String,
}

/// Per-URL result of a batch scrape
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    /// Structured output matching the requested schema
    Extracted(serde_json::Value),
    /// The page could not be fetched or extracted
    Failed(String),
}

/// One scraped page
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapedPage {
    pub url: String,
    pub outcome: PageOutcome,
}

impl ScrapedPage {
    pub fn extracted(url: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            url: url.into(),
            outcome: PageOutcome::Extracted(data),
        }
    }

    pub fn failed(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            outcome: PageOutcome::Failed(reason.into()),
        }
    }
}

/// Free-text web search
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Provider name used in logs
    fn name(&self) -> &str;

    /// Return at most `limit` candidate pages for `query`
    async fn search(&self, query: &str, limit: usize) -> anyhow::Result<Vec<SearchHit>>;
}

/// Concurrent fetch-and-extract over a set of URLs
#[async_trait]
pub trait BatchScraper: Send + Sync {
    /// Provider name used in logs
    fn name(&self) -> &str;

    /// Scrape every URL, returning one page per requested URL in request
    /// order. Individual page failures are reported as
    /// [`PageOutcome::Failed`]; an `Err` means the batch as a whole failed.
    async fn scrape(
        &self,
        urls: &[String],
        request: &ExtractionRequest,
    ) -> anyhow::Result<Vec<ScrapedPage>>;
}

/// HTTP request to be made against a provider API
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    /// URL to request
    pub url: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// JSON body
    pub body: Option<serde_json::Value>,
}

impl ProviderRequest {
    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self::with_method(url, HttpMethod::Get)
    }

    /// Create a POST request
    pub fn post(url: impl Into<String>) -> Self {
        Self::with_method(url, HttpMethod::Post)
    }

    fn with_method(url: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            url: url.into(),
            method,
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add a bearer token
    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {}", token))
    }

    /// Add JSON body
    pub fn json(mut self, data: serde_json::Value) -> Self {
        self.body = Some(data);
        self
    }
}

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// HTTP response from a provider request
#[derive(Debug)]
pub struct ProviderResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub text: String,
    /// Response URL (after redirects)
    pub url: String,
}

impl ProviderResponse {
    /// Parse response as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> anyhow::Result<T> {
        Ok(serde_json::from_str(&self.text)?)
    }

    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check if response indicates rate limiting
    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }

    /// Fail unless the status is 2xx
    pub fn error_for_status(self) -> anyhow::Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        if self.is_rate_limited() {
            return Err(anyhow::anyhow!("rate limited by {}", self.url));
        }
        let excerpt: String = self.text.chars().take(200).collect();
        Err(anyhow::anyhow!(
            "HTTP error {} from {}: {}",
            self.status,
            self.url,
            excerpt
        ))
    }
}
