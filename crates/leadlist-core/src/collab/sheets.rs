//! Spreadsheet collaborator client (Apps Script webhook).
//!
//! One webhook URL answers both actions: `get_domains` returns every
//! domain already present in the master list, `save_results` appends the
//! new records and returns a viewable spreadsheet URL.

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{ExistingDomainSource, ResultSink};
use crate::error::CollabError;
use crate::model::EnrichedRecord;

const SHEETS_TIMEOUT: Duration = Duration::from_secs(300);

/// Client for the spreadsheet webhook.
pub struct SheetsClient {
    client: reqwest::Client,
    webhook_url: String,
}

#[derive(Serialize)]
struct GetDomainsRequest {
    action: &'static str,
}

#[derive(Deserialize)]
struct GetDomainsResponse {
    #[serde(default)]
    domains: Vec<String>,
}

#[derive(Serialize)]
struct SaveResultsRequest<'a> {
    action: &'static str,
    search_keyword: &'a str,
    companies: Vec<SavedCompany<'a>>,
}

#[derive(Serialize)]
struct SavedCompany<'a> {
    company_name: &'a str,
    base_url: &'a str,
    contact_url: &'a str,
    phone: &'a str,
    domain: &'a str,
}

#[derive(Deserialize)]
struct SaveResultsResponse {
    #[serde(default)]
    spreadsheet_url: String,
}

impl SheetsClient {
    /// Create a client for the given webhook URL.
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url: webhook_url.into(),
        }
    }

    async fn post<T: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        payload: &T,
    ) -> Result<R, CollabError> {
        let response = self
            .client
            .post(&self.webhook_url)
            .timeout(SHEETS_TIMEOUT)
            .json(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(CollabError::Api {
                status,
                message: body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| CollabError::Parse(e.to_string()))
    }
}

#[async_trait::async_trait]
impl ExistingDomainSource for SheetsClient {
    async fn get_existing_domains(&self) -> Result<HashSet<String>, CollabError> {
        let response: GetDomainsResponse = self
            .post(&GetDomainsRequest {
                action: "get_domains",
            })
            .await?;
        let domains: HashSet<String> = response.domains.into_iter().collect();
        tracing::info!(count = domains.len(), "existing domains fetched");
        Ok(domains)
    }
}

#[async_trait::async_trait]
impl ResultSink for SheetsClient {
    async fn save_results(
        &self,
        records: &[EnrichedRecord],
        search_keyword: &str,
    ) -> Result<String, CollabError> {
        let request = SaveResultsRequest {
            action: "save_results",
            search_keyword,
            companies: records
                .iter()
                .map(|r| SavedCompany {
                    company_name: &r.company_name,
                    base_url: &r.base_url,
                    contact_url: &r.contact_url,
                    phone: &r.phone,
                    domain: &r.domain,
                })
                .collect(),
        };
        let response: SaveResultsResponse = self.post(&request).await?;
        tracing::info!(url = %response.spreadsheet_url, "results saved");
        Ok(response.spreadsheet_url)
    }
}
