//! Synchronous and asynchronous search pipeline endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use leadlist_core::artifact;
use leadlist_core::collab::{NullReporter, ProgressReporter, SlackNotifier};
use leadlist_core::job::{Job, JobRegistry, JobStatus};
use leadlist_core::model::EnrichedRecord;
use leadlist_core::query::initial_queries;
use leadlist_core::workflow::{run_search_workflow, SearchInput};

use super::validate_search_request;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SearchRequest {
    pub search_keyword: String,
    #[serde(default = "default_target_count")]
    pub target_count: usize,
    #[serde(default)]
    pub queries: Option<Vec<String>>,
    /// Spreadsheet webhook override for this request.
    #[serde(default)]
    pub gas_webhook_url: Option<String>,
    /// Chat destination for progress and the final artifact.
    #[serde(default)]
    pub slack_channel_id: Option<String>,
    #[serde(default)]
    pub slack_thread_ts: Option<String>,
}

fn default_target_count() -> usize {
    100
}

#[derive(Serialize)]
pub struct SearchSyncResponse {
    pub status: &'static str,
    pub result_count: usize,
    pub search_count: usize,
    pub scrape_count: usize,
    pub spreadsheet_url: String,
    pub results: Vec<EnrichedRecord>,
    pub message: String,
}

#[derive(Serialize)]
pub struct SearchJobResponse {
    pub status: &'static str,
    pub job_id: String,
    pub message: String,
}

// ---------------------------------------------------------------------------
// POST /search_sync
// ---------------------------------------------------------------------------

pub async fn search_sync(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SearchRequest>,
) -> Result<Json<SearchSyncResponse>, ApiError> {
    validate_search_request(&state, &body.search_keyword, body.target_count)?;

    let serper = state.serper();
    let cleanser = state.cleanser();
    let sheets = state.sheets(body.gas_webhook_url.as_deref());
    let input = SearchInput {
        search_keyword: body.search_keyword.clone(),
        target_count: body.target_count,
        queries: body.queries.clone(),
    };

    let outcome = run_search_workflow(
        &serper,
        cleanser.as_ref(),
        &sheets,
        &sheets,
        &NullReporter,
        &state.workflow_config(),
        &input,
    )
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(SearchSyncResponse {
        status: "success",
        result_count: outcome.records.len(),
        search_count: outcome.search_count,
        scrape_count: outcome.scrape_count,
        spreadsheet_url: outcome.spreadsheet_url,
        results: outcome.records,
        message: outcome.message,
    }))
}

// ---------------------------------------------------------------------------
// POST /search
// ---------------------------------------------------------------------------

pub async fn search_async(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SearchRequest>,
) -> Result<Json<SearchJobResponse>, ApiError> {
    validate_search_request(&state, &body.search_keyword, body.target_count)?;

    let queries = body
        .queries
        .clone()
        .filter(|qs| !qs.is_empty())
        .unwrap_or_else(|| initial_queries(&body.search_keyword));

    let job = Job::new(&body.search_keyword, body.target_count as u32, queries);
    let job_id = job.id.clone();
    state.registry.create(job);

    tokio::spawn(run_job(Arc::clone(&state), job_id.clone(), body));

    Ok(Json(SearchJobResponse {
        status: "accepted",
        job_id,
        message: "検索ジョブを開始しました".to_string(),
    }))
}

/// Drive the workflow for one job, mirroring progress into the registry
/// and (when configured) Slack.
async fn run_job(state: Arc<AppState>, job_id: String, body: SearchRequest) {
    let slack_thread = match (&body.slack_channel_id, state.slack()) {
        (Some(channel), Some(notifier)) if !channel.is_empty() => Some(SlackThread {
            notifier,
            channel: channel.clone(),
            thread_ts: body.slack_thread_ts.clone().unwrap_or_default(),
        }),
        _ => None,
    };

    let reporter = JobReporter {
        registry: state.registry.clone(),
        job_id: job_id.clone(),
        slack: slack_thread,
    };

    let serper = state.serper();
    let cleanser = state.cleanser();
    let sheets = state.sheets(body.gas_webhook_url.as_deref());
    let input = SearchInput {
        search_keyword: body.search_keyword.clone(),
        target_count: body.target_count,
        queries: body.queries.clone(),
    };

    match run_search_workflow(
        &serper,
        cleanser.as_ref(),
        &sheets,
        &sheets,
        &reporter,
        &state.workflow_config(),
        &input,
    )
    .await
    {
        Ok(outcome) if outcome.records.is_empty() => {
            state
                .registry
                .with_job(&job_id, |job| job.set_error(&outcome.message));
            reporter.on_error(&outcome.message).await;
        }
        Ok(outcome) => {
            let spreadsheet_url =
                (!outcome.spreadsheet_url.is_empty()).then(|| outcome.spreadsheet_url.clone());
            state.registry.with_job(&job_id, |job| {
                job.set_completed(outcome.records.len(), spreadsheet_url.clone());
            });

            let csv = artifact::to_csv(&outcome.records);
            let filename = artifact::artifact_filename(
                &body.search_keyword,
                chrono::Utc::now().date_naive(),
            );
            reporter
                .on_final(&outcome.records, Some((&filename, &csv)))
                .await;
        }
        Err(e) => {
            tracing::error!(job_id = %job_id, error = %e, "job failed");
            state
                .registry
                .with_job(&job_id, |job| job.set_error(&e.to_string()));
            reporter.on_error(&e.to_string()).await;
        }
    }
}

struct SlackThread {
    notifier: SlackNotifier,
    channel: String,
    thread_ts: String,
}

/// Reporter that mirrors workflow progress into the job registry and a
/// Slack thread.
struct JobReporter {
    registry: JobRegistry,
    job_id: String,
    slack: Option<SlackThread>,
}

#[async_trait::async_trait]
impl ProgressReporter for JobReporter {
    async fn on_status(&self, status: JobStatus, progress: u8, message: &str) {
        self.registry
            .with_job(&self.job_id, |job| job.update_status(status, message, progress));
        if let Some(slack) = &self.slack {
            slack
                .notifier
                .notify_progress(&slack.channel, &slack.thread_ts, status, progress, message)
                .await;
        }
    }

    async fn on_final(&self, records: &[EnrichedRecord], artifact: Option<(&str, &[u8])>) {
        let Some(slack) = &self.slack else {
            return;
        };
        let (keyword, spreadsheet_url) = match self.registry.get(&self.job_id) {
            Some(job) => (job.search_keyword, job.spreadsheet_url.unwrap_or_default()),
            None => (String::new(), String::new()),
        };
        slack
            .notifier
            .notify_completion(
                &slack.channel,
                &slack.thread_ts,
                &keyword,
                records.len(),
                &spreadsheet_url,
            )
            .await;
        if let Some((filename, bytes)) = artifact {
            slack
                .notifier
                .upload_csv(
                    &slack.channel,
                    filename,
                    bytes.to_vec(),
                    (!slack.thread_ts.is_empty()).then_some(slack.thread_ts.as_str()),
                )
                .await;
        }
    }

    async fn on_error(&self, message: &str) {
        if let Some(slack) = &self.slack {
            slack
                .notifier
                .notify_error(&slack.channel, &slack.thread_ts, message)
                .await;
        }
    }
}
