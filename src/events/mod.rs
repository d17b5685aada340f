//! Event extraction and post-processing
//!
//! Turns scraped page records into normalized events, then filters,
//! de-duplicates and orders them.

mod dates;
mod mapper;
mod models;
mod pipeline;

pub use dates::{parse_event_date, EventDate};
pub use mapper::{map_record, MappedRecord, SkipReason};
pub use models::*;
pub use pipeline::process;
