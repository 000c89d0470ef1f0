//! Asynchronous job bookkeeping: status, progress, TTL-based eviction.
//!
//! The registry is an in-memory map owned by whoever accepts requests.
//! Each job has a single writer (its background task); the status endpoint
//! only reads snapshots.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a job. Transitions only move forward through the
/// listed order; `Failed` is reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Searching,
    Scraping,
    Saving,
    Completed,
    Failed,
}

impl JobStatus {
    fn rank(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Searching => 1,
            Self::Scraping => 2,
            Self::Saving => 3,
            Self::Completed => 4,
            Self::Failed => 5,
        }
    }

    /// True for `Completed` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Searching => "searching",
            Self::Scraping => "scraping",
            Self::Saving => "saving",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// One asynchronous search job.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub id: String,
    pub search_keyword: String,
    pub target_count: u32,
    pub queries: Vec<String>,
    pub status: JobStatus,
    pub progress: u8,
    pub message: String,
    pub error: Option<String>,
    pub result_count: usize,
    pub spreadsheet_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Create a fresh pending job.
    pub fn new(search_keyword: impl Into<String>, target_count: u32, queries: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            search_keyword: search_keyword.into(),
            target_count,
            queries,
            status: JobStatus::Pending,
            progress: 0,
            message: String::new(),
            error: None,
            result_count: 0,
            spreadsheet_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move the job forward. Backward status moves and progress
    /// regressions are ignored, keeping both monotone.
    pub fn update_status(&mut self, status: JobStatus, message: &str, progress: u8) {
        if status.rank() < self.status.rank() || self.status.is_terminal() {
            return;
        }
        self.status = status;
        if !message.is_empty() {
            self.message = message.to_string();
        }
        self.progress = self.progress.max(progress.min(100));
        self.updated_at = Utc::now();
    }

    /// Mark the job failed.
    pub fn set_error(&mut self, error: &str) {
        if self.status.is_terminal() {
            return;
        }
        self.status = JobStatus::Failed;
        self.error = Some(error.to_string());
        self.updated_at = Utc::now();
    }

    /// Mark the job completed.
    pub fn set_completed(&mut self, result_count: usize, spreadsheet_url: Option<String>) {
        if self.status.is_terminal() {
            return;
        }
        self.status = JobStatus::Completed;
        self.result_count = result_count;
        self.spreadsheet_url = spreadsheet_url;
        self.progress = 100;
        self.updated_at = Utc::now();
    }
}

/// In-memory job registry with TTL-based eviction on insert.
///
/// Cloning shares the underlying map, so the request acceptor and its
/// background tasks can hold the same registry.
#[derive(Clone)]
pub struct JobRegistry {
    jobs: Arc<Mutex<HashMap<String, Job>>>,
    ttl: Duration,
}

impl JobRegistry {
    /// Create a registry with the given time-to-live per job.
    pub fn new(ttl: Duration) -> Self {
        Self {
            jobs: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Create a registry with the default 24-hour TTL.
    pub fn with_default_ttl() -> Self {
        Self::new(Duration::from_secs(24 * 60 * 60))
    }

    /// Register a job, evicting entries older than the TTL first.
    pub fn create(&self, job: Job) {
        let mut jobs = match self.jobs.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let now = Utc::now();
        let ttl = chrono::TimeDelta::from_std(self.ttl).unwrap_or(chrono::TimeDelta::hours(24));
        jobs.retain(|id, existing| {
            let keep = now - existing.created_at <= ttl;
            if !keep {
                tracing::debug!(job_id = %id, "expired job evicted");
            }
            keep
        });

        tracing::info!(
            job_id = %job.id,
            keyword = %job.search_keyword,
            target = job.target_count,
            "job created"
        );
        jobs.insert(job.id.clone(), job);
    }

    /// Snapshot of a job by id.
    pub fn get(&self, id: &str) -> Option<Job> {
        let jobs = match self.jobs.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        jobs.get(id).cloned()
    }

    /// Store an updated job state.
    pub fn update(&self, job: Job) {
        let mut jobs = match self.jobs.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if jobs.contains_key(&job.id) {
            jobs.insert(job.id.clone(), job);
        }
    }

    /// Apply a mutation to a job in place.
    pub fn with_job(&self, id: &str, mutate: impl FnOnce(&mut Job)) {
        let mut jobs = match self.jobs.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(job) = jobs.get_mut(id) {
            mutate(job);
        }
    }
}
