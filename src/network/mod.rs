//! HTTP networking module
//!
//! Provides the HTTP client used to reach provider APIs.

mod client;

pub use client::HttpClient;
