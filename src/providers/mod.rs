//! External provider module
//!
//! Defines the search and batch-scrape traits the orchestrator depends on,
//! and the Firecrawl client that implements them.

mod firecrawl;
mod traits;

#[cfg(test)]
pub(crate) mod mock;

pub use firecrawl::Firecrawl;
pub use traits::*;
