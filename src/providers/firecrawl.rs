//! Firecrawl API client
//!
//! Implements web search (`POST /v2/search`) and batch scraping with
//! structured JSON extraction (`POST /v2/batch/scrape`, then polling
//! `GET /v2/batch/scrape/{id}` until the job finishes).

use super::traits::*;
use crate::config::FirecrawlSettings;
use crate::events::canonical_url;
use crate::network::HttpClient;
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Firecrawl search and batch-scrape client
pub struct Firecrawl {
    client: HttpClient,
    api_key: String,
    base_url: String,
    poll_interval: Duration,
    max_wait: Duration,
}

impl Firecrawl {
    pub fn new(client: HttpClient, settings: &FirecrawlSettings) -> Self {
        Self {
            client,
            api_key: settings.api_key.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            poll_interval: Duration::from_millis(settings.poll_interval_ms),
            max_wait: Duration::from_secs(settings.max_wait_secs),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v2/{}", self.base_url, path)
    }

    async fn start_batch(&self, urls: &[String], request: &ExtractionRequest) -> Result<BatchStarted> {
        let body = json!({
            "urls": urls,
            "formats": [{
                "type": "json",
                "schema": request.schema,
                "prompt": request.prompt,
            }],
            "ignoreInvalidURLs": true,
        });

        let response = self
            .client
            .execute(
                ProviderRequest::post(self.endpoint("batch/scrape"))
                    .bearer(&self.api_key)
                    .json(body),
            )
            .await
            .context("Firecrawl batch scrape request failed")?
            .error_for_status()?;

        let started: BatchStarted = response
            .json()
            .context("Failed to parse Firecrawl batch scrape response")?;
        if !started.success {
            bail!(
                "Firecrawl rejected batch scrape: {}",
                started.error.as_deref().unwrap_or("unknown error")
            );
        }
        Ok(started)
    }

    async fn fetch_status(&self, url: &str) -> Result<BatchStatus> {
        let response = self
            .client
            .execute(ProviderRequest::get(url).bearer(&self.api_key))
            .await
            .context("Firecrawl batch status request failed")?
            .error_for_status()?;

        response
            .json()
            .context("Failed to parse Firecrawl batch status response")
    }

    /// Poll the job until it completes, then gather all result pages
    async fn wait_for_batch(&self, id: &str) -> Result<Vec<BatchDocument>> {
        let status_url = self.endpoint(&format!("batch/scrape/{}", id));
        let start = Instant::now();

        let mut status = loop {
            let status = self.fetch_status(&status_url).await?;
            match status.status.as_str() {
                "completed" => break status,
                "failed" | "cancelled" => {
                    bail!("Firecrawl batch job {} ended with status '{}'", id, status.status)
                }
                other => {
                    debug!(
                        "Batch job {} is {} ({}/{} pages)",
                        id, other, status.completed, status.total
                    );
                }
            }
            if start.elapsed() >= self.max_wait {
                bail!("Firecrawl batch job {} did not finish within {:?}", id, self.max_wait);
            }
            tokio::time::sleep(self.poll_interval).await;
        };

        let mut documents = std::mem::take(&mut status.data);
        while let Some(next) = status.next.take() {
            status = self.fetch_status(&next).await?;
            documents.append(&mut status.data);
        }

        info!(
            "Batch job {} completed with {} documents in {:?}",
            id,
            documents.len(),
            start.elapsed()
        );
        Ok(documents)
    }
}

#[async_trait]
impl SearchProvider for Firecrawl {
    fn name(&self) -> &str {
        "firecrawl"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let body = json!({
            "query": query,
            "limit": limit,
        });

        let response = self
            .client
            .execute(
                ProviderRequest::post(self.endpoint("search"))
                    .bearer(&self.api_key)
                    .json(body),
            )
            .await
            .context("Firecrawl search request failed")?
            .error_for_status()?;

        let parsed: SearchResponse = response
            .json()
            .context("Failed to parse Firecrawl search response")?;
        if !parsed.success {
            return Err(anyhow!(
                "Firecrawl search failed: {}",
                parsed.error.as_deref().unwrap_or("unknown error")
            ));
        }

        let items = match parsed.data {
            Some(SearchData::Sources { web }) => web,
            Some(SearchData::Flat(items)) => items,
            None => Vec::new(),
        };

        let hits: Vec<SearchHit> = items
            .into_iter()
            .filter(|item| !item.url.trim().is_empty())
            .take(limit)
            .map(|item| SearchHit {
                url: item.url,
                title: item.title,
                snippet: item.description,
            })
            .collect();

        debug!("Firecrawl search '{}' returned {} hits", query, hits.len());
        Ok(hits)
    }
}

#[async_trait]
impl BatchScraper for Firecrawl {
    fn name(&self) -> &str {
        "firecrawl"
    }

    async fn scrape(&self, urls: &[String], request: &ExtractionRequest) -> Result<Vec<ScrapedPage>> {
        if urls.is_empty() {
            return Ok(Vec::new());
        }

        let started = self.start_batch(urls, request).await?;
        let id = started
            .id
            .ok_or_else(|| anyhow!("Firecrawl batch scrape response has no job id"))?;
        info!("Started batch job {} for {} URLs", id, urls.len());

        let documents = self.wait_for_batch(&id).await?;

        let mut by_url: HashMap<String, BatchDocument> = HashMap::new();
        for document in documents {
            let keys = [
                document.metadata.source_url.as_deref(),
                document.metadata.url.as_deref(),
            ];
            for key in keys.into_iter().flatten() {
                by_url
                    .entry(canonical_url(key))
                    .or_insert_with(|| document.clone());
            }
        }

        let invalid: Vec<String> = started.invalid_urls.iter().map(|u| canonical_url(u)).collect();

        let pages = urls
            .iter()
            .map(|url| {
                let key = canonical_url(url);
                if invalid.contains(&key) {
                    return ScrapedPage::failed(url, "rejected as an invalid URL");
                }
                match by_url.remove(&key) {
                    Some(document) => document.into_page(url),
                    None => ScrapedPage::failed(url, "no result returned"),
                }
            })
            .collect::<Vec<_>>();

        let failed = pages
            .iter()
            .filter(|p| matches!(p.outcome, PageOutcome::Failed(_)))
            .count();
        if failed > 0 {
            warn!("{} of {} pages failed in batch job {}", failed, pages.len(), id);
        }

        Ok(pages)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    success: bool,
    data: Option<SearchData>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SearchData {
    Sources { web: Vec<SearchItem> },
    Flat(Vec<SearchItem>),
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    url: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct BatchStarted {
    #[serde(default)]
    success: bool,
    id: Option<String>,
    #[serde(default, rename = "invalidURLs")]
    invalid_urls: Vec<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BatchStatus {
    status: String,
    #[serde(default)]
    total: u64,
    #[serde(default)]
    completed: u64,
    #[serde(default)]
    data: Vec<BatchDocument>,
    next: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct BatchDocument {
    json: Option<serde_json::Value>,
    #[serde(default)]
    metadata: DocumentMetadata,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct DocumentMetadata {
    #[serde(rename = "sourceURL")]
    source_url: Option<String>,
    url: Option<String>,
    #[serde(rename = "statusCode")]
    status_code: Option<u16>,
    error: Option<String>,
}

impl BatchDocument {
    fn into_page(self, url: &str) -> ScrapedPage {
        if let Some(error) = self.metadata.error {
            return ScrapedPage::failed(url, error);
        }
        if let Some(code) = self.metadata.status_code.filter(|c| *c >= 400) {
            return ScrapedPage::failed(url, format!("page returned HTTP {}", code));
        }
        match self.json {
            Some(value) if !value.is_null() => ScrapedPage::extracted(url, value),
            _ => ScrapedPage::failed(url, "no structured data extracted"),
        }
    }
}
