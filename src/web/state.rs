//! Application state shared across handlers

use crate::config::Settings;
use crate::network::HttpClient;
use crate::providers::{BatchScraper, Firecrawl, SearchProvider};
use crate::search::EventSearch;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Event search orchestrator
    pub search: Arc<EventSearch>,
}

impl AppState {
    /// Create application state backed by the Firecrawl API
    pub fn new(settings: &Settings, client: HttpClient) -> Self {
        let firecrawl = Arc::new(Firecrawl::new(client, &settings.firecrawl));
        Self::with_providers(settings, firecrawl.clone(), firecrawl)
    }

    /// Create application state from explicit providers
    pub fn with_providers(
        settings: &Settings,
        provider: Arc<dyn SearchProvider>,
        scraper: Arc<dyn BatchScraper>,
    ) -> Self {
        Self {
            search: Arc::new(EventSearch::new(provider, scraper, settings)),
        }
    }
}
