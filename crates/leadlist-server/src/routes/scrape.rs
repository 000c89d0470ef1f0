//! Bulk scraping of caller-provided companies.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use leadlist_core::model::{Candidate, EnrichedRecord};
use leadlist_core::scrape::Scraper;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ScrapeRequest {
    pub companies: Vec<ScrapeCompany>,
}

#[derive(Deserialize)]
pub struct ScrapeCompany {
    pub company_name: String,
    pub url: String,
}

#[derive(Serialize)]
pub struct ScrapeResponse {
    pub status: &'static str,
    pub results: Vec<EnrichedRecord>,
    pub total: usize,
    pub scraped: usize,
    pub success_count: usize,
}

pub async fn scrape(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ScrapeRequest>,
) -> Result<Json<ScrapeResponse>, ApiError> {
    if body.companies.is_empty() {
        return Err(ApiError::BadRequest(
            "companies must not be empty".to_string(),
        ));
    }

    let config = state.workflow_config();
    let scraper = Scraper::new(config.scrape_concurrent, config.scrape_timeout)
        .map_err(|e| ApiError::Internal(format!("scrape client error: {e}")))?;

    let candidates: Vec<Candidate> = body
        .companies
        .iter()
        .map(|c| Candidate::new(c.company_name.clone(), c.url.clone()))
        .collect();

    let results = scraper.scrape_companies(&candidates).await;
    let success_count = results.iter().filter(|r| r.error_kind.is_ok()).count();

    Ok(Json(ScrapeResponse {
        status: "success",
        total: candidates.len(),
        scraped: results.len(),
        success_count,
        results,
    }))
}
