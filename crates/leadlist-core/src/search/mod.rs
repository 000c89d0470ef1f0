//! Paged search aggregation against the Serper.dev web-search API.
//!
//! Runs a sequence of queries, pages through results, applies the pre-LLM
//! filters, and deduplicates by domain against a running set. Provider
//! errors are isolated per query: they end that query's paging loop and the
//! aggregation moves on.

pub mod filter;

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::model::{extract_domain, Candidate};

const SEARCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the Serper.dev search API.
pub struct SerperClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    results_per_page: u32,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    q: &'a str,
    num: u32,
    gl: &'a str,
    hl: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    start: Option<u32>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic: Vec<OrganicResult>,
}

/// One organic result from the search provider.
#[derive(Debug, Clone, Deserialize)]
pub struct OrganicResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

impl SerperClient {
    /// Create a client against the production endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, "https://google.serper.dev")
    }

    /// Create a client against a custom endpoint (tests).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
            results_per_page: 100,
        }
    }

    /// Override the page size (capped at 100 by the provider).
    pub fn with_results_per_page(mut self, n: u32) -> Self {
        self.results_per_page = n.clamp(1, 100);
        self
    }

    /// Run one search page.
    pub async fn search(
        &self,
        query: &str,
        num: u32,
        start: u32,
    ) -> Result<Vec<OrganicResult>, SearchError> {
        let request = SearchRequest {
            q: query,
            num: num.min(100),
            gl: "jp",
            hl: "ja",
            start: (start > 0).then_some(start),
        };

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .header("X-API-KEY", &self.api_key)
            .timeout(SEARCH_TIMEOUT)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                status,
                message: body,
            });
        }

        let body: SearchResponse = response.json().await?;
        Ok(body.organic)
    }

    /// Aggregate candidates across queries until `target_count` is met or
    /// the queries are exhausted.
    ///
    /// Order is first-acceptance-wins across the query sequence. The
    /// running dedup set starts from `existing_domains` and grows with each
    /// accepted candidate.
    pub async fn search_companies(
        &self,
        queries: &[String],
        target_count: usize,
        existing_domains: &HashSet<String>,
        max_pages_per_query: u32,
    ) -> Vec<Candidate> {
        let mut found_domains: HashSet<String> = existing_domains.clone();
        let mut companies: Vec<Candidate> = Vec::new();

        for query in queries {
            if companies.len() >= target_count {
                break;
            }
            tracing::info!(query = %query, "search query");

            for page in 0..max_pages_per_query {
                if companies.len() >= target_count {
                    break;
                }

                let start = page * self.results_per_page;
                let results = match self.search(query, self.results_per_page, start).await {
                    Ok(results) => results,
                    Err(e) => {
                        tracing::warn!(query = %query, page, error = %e, "search page failed");
                        break;
                    }
                };
                if results.is_empty() {
                    break;
                }

                let mut skipped_domain = 0;
                let mut skipped_title = 0;
                let mut skipped_dup = 0;
                let mut added = 0;

                for result in results {
                    if companies.len() >= target_count {
                        break;
                    }
                    if result.link.is_empty() {
                        continue;
                    }

                    let domain = extract_domain(&result.link);
                    if domain.is_empty() {
                        continue;
                    }

                    if filter::is_excluded_domain(&domain) {
                        skipped_domain += 1;
                        continue;
                    }
                    if filter::is_excluded_title(&result.title) {
                        skipped_title += 1;
                        continue;
                    }
                    if found_domains.contains(&domain) {
                        skipped_dup += 1;
                        continue;
                    }
                    if !filter::looks_like_company(&result.title, &domain) {
                        skipped_title += 1;
                        continue;
                    }

                    found_domains.insert(domain.clone());
                    companies.push(Candidate {
                        company_name: result.title,
                        url: result.link,
                        domain,
                        snippet: result.snippet,
                    });
                    added += 1;
                }

                tracing::debug!(
                    query = %query,
                    page,
                    skipped_domain,
                    skipped_title,
                    skipped_dup,
                    added,
                    total = companies.len(),
                    "search page done"
                );

                // Further pages of a query that yielded nothing new have
                // diminishing returns.
                if added == 0 {
                    break;
                }
            }
        }

        tracing::info!(total = companies.len(), "search finished");
        companies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn organic(title: &str, link: &str) -> serde_json::Value {
        serde_json::json!({"title": title, "link": link, "snippet": "snippet"})
    }

    #[tokio::test]
    async fn search_sends_api_key_and_parses_organic() {
        let server = MockServer::start().await;

        let body = serde_json::json!({
            "organic": [organic("株式会社アルファ", "https://alpha.co.jp/")]
        });
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(header("X-API-KEY", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let client = SerperClient::with_base_url("test-key", server.uri());
        let results = client.search("東京 IT企業", 100, 0).await.expect("search");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "株式会社アルファ");
    }

    #[tokio::test]
    async fn search_error_status_maps_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(403).set_body_string("bad key"))
            .mount(&server)
            .await;

        let client = SerperClient::with_base_url("k", server.uri());
        let err = client.search("q", 100, 0).await.unwrap_err();
        match err {
            SearchError::Api { status, message } => {
                assert_eq!(status, 403);
                assert!(message.contains("bad key"));
            }
            other => panic!("expected Api, got: {other}"),
        }
    }

    #[tokio::test]
    async fn search_companies_filters_and_dedups() {
        let server = MockServer::start().await;

        let body = serde_json::json!({
            "organic": [
                organic("株式会社アルファ", "https://alpha.co.jp/"),
                // denylisted domain
                organic("採用 | Indeed", "https://jp.indeed.com/x"),
                // government suffix
                organic("東京都の案内", "https://www.metro.tokyo.lg.jp/"),
                // denylisted title
                organic("IT企業まとめ", "https://matome.example.jp/"),
                // duplicate domain
                organic("株式会社アルファ 採用", "https://alpha.co.jp/careers"),
                // pre-loaded existing domain
                organic("株式会社ベータ", "https://beta.co.jp/"),
                organic("合同会社ガンマ", "https://gamma.jp/"),
            ]
        });
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let client = SerperClient::with_base_url("k", server.uri());
        let existing: HashSet<String> = ["beta.co.jp".to_string()].into_iter().collect();
        let companies = client
            .search_companies(&["q1".to_string()], 10, &existing, 1)
            .await;

        let domains: Vec<&str> = companies.iter().map(|c| c.domain.as_str()).collect();
        assert_eq!(domains, vec!["alpha.co.jp", "gamma.jp"]);
    }

    #[tokio::test]
    async fn search_companies_stops_at_target() {
        let server = MockServer::start().await;

        let body = serde_json::json!({
            "organic": [
                organic("株式会社A", "https://a.co.jp/"),
                organic("株式会社B", "https://b.co.jp/"),
                organic("株式会社C", "https://c.co.jp/"),
            ]
        });
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let client = SerperClient::with_base_url("k", server.uri());
        let companies = client
            .search_companies(&["q1".to_string(), "q2".to_string()], 2, &HashSet::new(), 2)
            .await;
        assert_eq!(companies.len(), 2);
    }

    #[tokio::test]
    async fn provider_error_skips_query_not_whole_call() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/search"))
            .and(body_string_contains("bad-query"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "organic": [organic("株式会社A", "https://a.co.jp/")]
            })))
            .mount(&server)
            .await;

        let client = SerperClient::with_base_url("k", server.uri());
        let companies = client
            .search_companies(
                &["bad-query".to_string(), "good".to_string()],
                10,
                &HashSet::new(),
                1,
            )
            .await;
        assert_eq!(companies.len(), 1);
        assert_eq!(companies[0].domain, "a.co.jp");
    }

    #[tokio::test]
    async fn government_and_career_results_never_become_candidates() {
        let server = MockServer::start().await;

        let mut results = Vec::new();
        for i in 0..10 {
            results.push(organic("自治体の案内", &format!("https://city{i}.lg.jp/")));
        }
        for i in 0..5 {
            results.push(organic("エンジニア転職ガイド", &format!("https://career{i}.jp/")));
        }
        for i in 0..15 {
            results.push(organic(
                &format!("株式会社サンプル{i}"),
                &format!("https://sample{i}.co.jp/"),
            ));
        }
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "organic": results
            })))
            .mount(&server)
            .await;

        let client = SerperClient::with_base_url("k", server.uri());
        let companies = client
            .search_companies(&["q".to_string()], 100, &HashSet::new(), 1)
            .await;

        assert!(companies.len() <= 15);
        assert!(companies
            .iter()
            .all(|c| !c.domain.ends_with(".lg.jp") && !c.company_name.contains("転職")));
    }

    #[tokio::test]
    async fn empty_page_ends_query_paging() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "organic": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = SerperClient::with_base_url("k", server.uri());
        let companies = client
            .search_companies(&["q".to_string()], 10, &HashSet::new(), 5)
            .await;
        assert!(companies.is_empty());
    }
}
