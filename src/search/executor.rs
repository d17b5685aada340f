//! Event search execution and orchestration

use super::models::{SearchQuery, SearchResult};
use super::query::{extraction_request, platform_query};
use crate::config::{PlatformConfig, SearchSettings, Settings};
use crate::error::EventSearchError;
use crate::events::{self, canonical_url, map_record, MappedRecord, RawEventRecord};
use crate::providers::{BatchScraper, PageOutcome, SearchHit, SearchProvider};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// Coordinates the search, scrape, extraction and filtering steps
pub struct EventSearch {
    /// Candidate page search
    provider: Arc<dyn SearchProvider>,
    /// Page fetch and extraction
    scraper: Arc<dyn BatchScraper>,
    /// Platforms searched on every request
    platforms: Vec<PlatformConfig>,
    /// Limits and matching behavior
    settings: SearchSettings,
}

impl EventSearch {
    /// Create a new event search from explicit settings
    pub fn new(
        provider: Arc<dyn SearchProvider>,
        scraper: Arc<dyn BatchScraper>,
        settings: &Settings,
    ) -> Self {
        Self {
            provider,
            scraper,
            platforms: settings.enabled_platforms().into_iter().cloned().collect(),
            settings: settings.search.clone(),
        }
    }

    /// Names of the platforms searched
    pub fn platforms(&self) -> impl Iterator<Item = &str> {
        self.platforms.iter().map(|p| p.name.as_str())
    }

    /// Validate raw parameters and run the search at the current time
    pub async fn search(
        &self,
        speaker_name: Option<&str>,
        filter: Option<&str>,
    ) -> Result<SearchResult, EventSearchError> {
        let query = SearchQuery::parse(speaker_name, filter)?;
        self.search_at(&query, Utc::now()).await
    }

    /// Run a validated search, treating `now` as the current moment
    pub async fn search_at(
        &self,
        query: &SearchQuery,
        now: DateTime<Utc>,
    ) -> Result<SearchResult, EventSearchError> {
        let request_id = uuid::Uuid::new_v4();
        let span = info_span!("event_search", %request_id, speaker = %query.speaker_name);
        self.run(query, now).instrument(span).await
    }

    async fn run(
        &self,
        query: &SearchQuery,
        now: DateTime<Utc>,
    ) -> Result<SearchResult, EventSearchError> {
        let start = Instant::now();
        let speaker = query.speaker_name.as_str();

        let candidates = self.collect_candidates(speaker).await?;
        if candidates.is_empty() {
            info!("No candidate pages found");
            return Ok(SearchResult::empty(speaker));
        }

        let today = now.date_naive();
        let request = extraction_request(speaker, today);
        info!("Starting batch scrape for {} URLs", candidates.len());

        let pages = self
            .scraper
            .scrape(&candidates, &request)
            .await
            .map_err(|e| {
                error!("Batch scrape via {} failed: {:#}", self.scraper.name(), e);
                EventSearchError::upstream_unavailable("event page scraper is unavailable")
            })?;

        let mut mapped = Vec::new();
        for page in pages {
            let data = match page.outcome {
                PageOutcome::Extracted(data) => data,
                PageOutcome::Failed(reason) => {
                    debug!("Skipping page {}: {}", page.url, reason);
                    continue;
                }
            };

            let records = RawEventRecord::from_page(&data);
            debug!("Found {} event records on {}", records.len(), page.url);
            for record in records {
                match map_record(record, today) {
                    MappedRecord::Valid(event) => mapped.push(event),
                    MappedRecord::Skipped(reason) => {
                        debug!("Skipping record on {}: {:?}", page.url, reason)
                    }
                }
            }
        }

        if self.settings.require_speaker_match {
            let before = mapped.len();
            mapped.retain(|event| event.features_speaker(speaker));
            debug!("{} of {} events list the speaker", mapped.len(), before);
        }

        let upcoming_events = events::process(mapped, query.filter, now);
        info!(
            "Found {} upcoming events in {:?}",
            upcoming_events.len(),
            start.elapsed()
        );

        Ok(SearchResult {
            speaker_name: speaker.to_string(),
            upcoming_events,
        })
    }

    /// Search all platforms concurrently and merge their candidate URLs.
    ///
    /// URLs are canonicalized, de-duplicated in platform order and capped.
    /// Fails only when no platform search succeeded.
    async fn collect_candidates(&self, speaker: &str) -> Result<Vec<String>, EventSearchError> {
        if self.platforms.is_empty() {
            error!("No platforms configured");
            return Err(EventSearchError::upstream_unavailable(
                "no event platforms are configured",
            ));
        }

        let limit = self.settings.results_per_platform;
        let futures: Vec<_> = self
            .platforms
            .iter()
            .map(|platform| self.search_platform(platform, speaker, limit))
            .collect();

        let outcomes = join_all(futures).await;

        let mut succeeded = 0;
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        for hits in outcomes.into_iter().flatten() {
            succeeded += 1;
            for hit in hits {
                let url = canonical_url(&hit.url);
                if seen.insert(url.clone()) {
                    candidates.push(url);
                }
            }
        }

        if succeeded == 0 {
            return Err(EventSearchError::upstream_unavailable(
                "event search provider is unavailable",
            ));
        }

        if candidates.len() > self.settings.max_candidate_urls {
            debug!(
                "Capping {} candidate URLs to {}",
                candidates.len(),
                self.settings.max_candidate_urls
            );
            candidates.truncate(self.settings.max_candidate_urls);
        }

        info!(
            "Collected {} candidate URLs from {}/{} platforms",
            candidates.len(),
            succeeded,
            self.platforms.len()
        );
        Ok(candidates)
    }

    /// Search a single platform, logging and swallowing its failure
    async fn search_platform(
        &self,
        platform: &PlatformConfig,
        speaker: &str,
        limit: usize,
    ) -> Option<Vec<SearchHit>> {
        let query = platform_query(platform, speaker);
        let start = Instant::now();
        debug!("Searching {} with '{}'", platform.name, query);

        match self.provider.search(&query, limit).await {
            Ok(hits) => {
                debug!(
                    "Platform {} returned {} hits in {:?}",
                    platform.name,
                    hits.len(),
                    start.elapsed()
                );
                Some(hits)
            }
            Err(e) => {
                warn!(
                    "Search via {} failed for platform {}: {:#}",
                    self.provider.name(),
                    platform.name,
                    e
                );
                None
            }
        }
    }
}
