pub mod client;
pub mod types;

pub use client::{newest_xbrl, RegistryClient, DISTRIBUTION_URL, REQUEST_TIMEOUT};
pub use types::{filings_query, SearchResponse};
