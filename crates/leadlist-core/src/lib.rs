/// Core library for the leadlist sales-prospect pipeline.
///
/// This crate contains all business logic: keyword query generation,
/// paged web search with pre-LLM filtering, LLM company-name cleansing,
/// concurrent contact scraping, the round-based search controller, and
/// the collaborator clients used by the HTTP server binary.
pub mod artifact;
pub mod cleanse;
pub mod collab;
pub mod config;
pub mod error;
pub mod job;
pub mod model;
pub mod query;
pub mod scrape;
pub mod search;
pub mod workflow;

pub use error::*;

/// Returns the version of the leadlist-core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
