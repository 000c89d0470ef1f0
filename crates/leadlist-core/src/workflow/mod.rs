//! The round-based controller: one keyword in, N qualified, deduplicated,
//! contact-enriched company records out.
//!
//! Coordinates the query pool, the search aggregator, the cleanser, and
//! the scraper, then hands the surviving records to the result sink.
//! Collaborator failures degrade (empty domain set, empty spreadsheet
//! URL); only scrape-client construction can fail the workflow itself.

pub mod rounds;

#[cfg(test)]
mod tests;

use std::collections::HashSet;
use std::time::Duration;

use crate::cleanse::{is_invalid_company_name, normalize_company_name, LlmCleanser};
use crate::collab::{ExistingDomainSource, ProgressReporter, ResultSink};
use crate::job::JobStatus;
use crate::model::EnrichedRecord;
use crate::scrape::Scraper;
use crate::search::SerperClient;

/// Errors that fail the whole workflow.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// The scrape HTTP client could not be built.
    #[error("scrape client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// One workflow request.
#[derive(Debug, Clone)]
pub struct SearchInput {
    /// Free-form keyword, e.g. "東京 IT企業".
    pub search_keyword: String,
    /// Number of records requested.
    pub target_count: usize,
    /// Caller-provided round-0 queries; `None` uses the generator.
    pub queries: Option<Vec<String>>,
}

/// Runtime knobs for the scrape stage.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Maximum concurrent scrape fetches.
    pub scrape_concurrent: usize,
    /// Per-fetch scrape timeout.
    pub scrape_timeout: Duration,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            scrape_concurrent: 10,
            scrape_timeout: Duration::from_secs(10),
        }
    }
}

/// Result of a full workflow run.
#[derive(Debug, Clone)]
pub struct WorkflowOutcome {
    /// Final records (error-free, contact-first, at most `target_count`).
    pub records: Vec<EnrichedRecord>,
    /// Candidates that survived search + cleanse.
    pub search_count: usize,
    /// Records produced by the scraper (all kinds).
    pub scrape_count: usize,
    /// Spreadsheet URL from the sink ("" when saving failed or nothing to
    /// save).
    pub spreadsheet_url: String,
    /// Human-readable summary.
    pub message: String,
}

impl WorkflowOutcome {
    fn zero() -> Self {
        Self {
            records: Vec::new(),
            search_count: 0,
            scrape_count: 0,
            spreadsheet_url: String::new(),
            message: "検索結果が0件でした。キーワードを変更してお試しください。".to_string(),
        }
    }
}

/// Run the full search → cleanse → scrape → save pipeline.
pub async fn run_search_workflow(
    serper: &SerperClient,
    cleanser: Option<&LlmCleanser>,
    domain_source: &dyn ExistingDomainSource,
    sink: &dyn ResultSink,
    reporter: &dyn ProgressReporter,
    config: &WorkflowConfig,
    input: &SearchInput,
) -> Result<WorkflowOutcome, WorkflowError> {
    reporter
        .on_status(JobStatus::Searching, 5, "既存リストを取得中...")
        .await;

    let existing_domains: HashSet<String> = match domain_source.get_existing_domains().await {
        Ok(domains) => domains,
        Err(e) => {
            tracing::warn!(error = %e, "existing domains unavailable, proceeding empty");
            HashSet::new()
        }
    };

    reporter
        .on_status(JobStatus::Searching, 15, "企業を検索中...")
        .await;

    let candidates = rounds::accumulate_candidates(
        serper,
        cleanser,
        &input.search_keyword,
        input.target_count,
        &existing_domains,
        input.queries.clone(),
    )
    .await;
    let search_count = candidates.len();

    if candidates.is_empty() {
        tracing::info!(keyword = %input.search_keyword, "zero search results");
        return Ok(WorkflowOutcome::zero());
    }

    reporter
        .on_status(
            JobStatus::Scraping,
            35,
            &format!("{}件をスクレイピング中...", candidates.len()),
        )
        .await;

    let scraper = Scraper::new(config.scrape_concurrent, config.scrape_timeout)?;
    let scraped = scraper.scrape_companies(&candidates).await;
    let scrape_count = scraped.len();

    let mut records: Vec<EnrichedRecord> = scraped
        .into_iter()
        .filter(|r| r.error_kind.is_ok())
        .collect();

    // Records with a contact route come first; the sort is stable so
    // round order is preserved within each half.
    records.sort_by_key(|r| !r.has_contact());
    records.truncate(input.target_count);

    // Post-scrape cleansing pass.
    let before = records.len();
    records = records
        .into_iter()
        .filter_map(|mut record| {
            record.company_name = normalize_company_name(&record.company_name);
            if is_invalid_company_name(&record.company_name) {
                tracing::info!(name = %record.company_name, "dropped after scrape");
                None
            } else {
                Some(record)
            }
        })
        .collect();
    if records.len() < before {
        tracing::info!(
            before,
            after = records.len(),
            "post-scrape cleansing removed records"
        );
    }

    reporter
        .on_status(JobStatus::Saving, 80, "スプレッドシートに保存中...")
        .await;

    let spreadsheet_url = if records.is_empty() {
        String::new()
    } else {
        match sink.save_results(&records, &input.search_keyword).await {
            Ok(url) => url,
            Err(e) => {
                tracing::error!(error = %e, "sink save failed, returning records anyway");
                String::new()
            }
        }
    };

    let contact_count = records.iter().filter(|r| r.has_contact()).count();
    let mut message = format!(
        "検索完了: {}件の企業情報を取得しました（連絡先あり: {}件）",
        records.len(),
        contact_count
    );
    if !spreadsheet_url.is_empty() {
        message.push_str(&format!("\nスプレッドシート: {spreadsheet_url}"));
    }

    Ok(WorkflowOutcome {
        records,
        search_count,
        scrape_count,
        spreadsheet_url,
        message,
    })
}
