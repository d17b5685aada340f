//! In-memory providers for tests

use super::traits::*;
use anyhow::anyhow;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Search provider answering from a fixed query table
#[derive(Default)]
pub struct MockSearch {
    responses: HashMap<String, Vec<String>>,
    failing: Vec<String>,
    fail_all: bool,
    pub queries: Mutex<Vec<(String, usize)>>,
}

impl MockSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer any query containing `needle` with `urls`
    pub fn with(mut self, needle: &str, urls: &[&str]) -> Self {
        self.responses
            .insert(needle.to_string(), urls.iter().map(|u| u.to_string()).collect());
        self
    }

    /// Fail any query containing `needle`
    pub fn failing(mut self, needle: &str) -> Self {
        self.failing.push(needle.to_string());
        self
    }

    pub fn fail_all(mut self) -> Self {
        self.fail_all = true;
        self
    }

    pub fn recorded(&self) -> Vec<(String, usize)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for MockSearch {
    fn name(&self) -> &str {
        "mock-search"
    }

    async fn search(&self, query: &str, limit: usize) -> anyhow::Result<Vec<SearchHit>> {
        self.queries.lock().unwrap().push((query.to_string(), limit));

        if self.fail_all || self.failing.iter().any(|n| query.contains(n.as_str())) {
            return Err(anyhow!("connection refused"));
        }

        Ok(self
            .responses
            .iter()
            .filter(|(needle, _)| query.contains(needle.as_str()))
            .flat_map(|(_, urls)| urls.iter().map(SearchHit::new))
            .take(limit)
            .collect())
    }
}

/// Batch scraper answering from a fixed page table
#[derive(Default)]
pub struct MockScraper {
    pages: HashMap<String, serde_json::Value>,
    fail_batch: bool,
    pub calls: Mutex<Vec<Vec<String>>>,
    pub prompts: Mutex<Vec<String>>,
}

impl MockScraper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, data: serde_json::Value) -> Self {
        self.pages.insert(url.to_string(), data);
        self
    }

    pub fn fail_batch(mut self) -> Self {
        self.fail_batch = true;
        self
    }

    pub fn recorded(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BatchScraper for MockScraper {
    fn name(&self) -> &str {
        "mock-scraper"
    }

    async fn scrape(
        &self,
        urls: &[String],
        request: &ExtractionRequest,
    ) -> anyhow::Result<Vec<ScrapedPage>> {
        self.calls.lock().unwrap().push(urls.to_vec());
        self.prompts.lock().unwrap().push(request.prompt.clone());

        if self.fail_batch {
            return Err(anyhow!("batch job failed"));
        }

        Ok(urls
            .iter()
            .map(|url| match self.pages.get(url) {
                Some(data) => ScrapedPage::extracted(url, data.clone()),
                None => ScrapedPage::failed(url, "timeout"),
            })
            .collect())
    }
}
