//! Collaborator ports: the existing-domain source, the result sink, and
//! the optional progress reporter.
//!
//! The pipeline only sees these traits; the concrete transports (the
//! spreadsheet webhook, Slack) live in sibling modules.

pub mod sheets;
pub mod slack;

use std::collections::HashSet;

use crate::error::CollabError;
use crate::job::JobStatus;
use crate::model::EnrichedRecord;

pub use sheets::SheetsClient;
pub use slack::SlackNotifier;

/// Source of domains that are already known to the collaborator.
#[async_trait::async_trait]
pub trait ExistingDomainSource: Send + Sync {
    /// Fetch the already-known domains. Callers treat failure as an empty
    /// set.
    async fn get_existing_domains(&self) -> Result<HashSet<String>, CollabError>;
}

/// Sink persisting the final records.
#[async_trait::async_trait]
pub trait ResultSink: Send + Sync {
    /// Persist records and return a viewable spreadsheet URL.
    async fn save_results(
        &self,
        records: &[EnrichedRecord],
        search_keyword: &str,
    ) -> Result<String, CollabError>;
}

/// Optional observer of pipeline progress.
#[async_trait::async_trait]
pub trait ProgressReporter: Send + Sync {
    /// A status milestone was reached.
    async fn on_status(&self, status: JobStatus, progress: u8, message: &str);

    /// The pipeline finished with these records; `artifact` is an optional
    /// (filename, bytes) pair for delivery.
    async fn on_final(&self, records: &[EnrichedRecord], artifact: Option<(&str, &[u8])>);

    /// The pipeline failed.
    async fn on_error(&self, message: &str);
}

/// Reporter that discards everything.
pub struct NullReporter;

#[async_trait::async_trait]
impl ProgressReporter for NullReporter {
    async fn on_status(&self, _status: JobStatus, _progress: u8, _message: &str) {}

    async fn on_final(&self, _records: &[EnrichedRecord], _artifact: Option<(&str, &[u8])>) {}

    async fn on_error(&self, _message: &str) {}
}
