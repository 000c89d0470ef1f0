//! End-to-end workflow tests against wiremock-backed collaborators,
//! search provider, LLM, and target sites.

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::rounds::accumulate_candidates;
use super::{run_search_workflow, SearchInput, WorkflowConfig};
use crate::cleanse::LlmCleanser;
use crate::collab::{NullReporter, ProgressReporter, SheetsClient};
use crate::job::JobStatus;
use crate::model::{extract_domain, EnrichedRecord};
use crate::search::SerperClient;

fn config() -> WorkflowConfig {
    WorkflowConfig {
        scrape_concurrent: 4,
        scrape_timeout: Duration::from_secs(5),
    }
}

fn input(keyword: &str, target: usize) -> SearchInput {
    SearchInput {
        search_keyword: keyword.to_string(),
        target_count: target,
        queries: None,
    }
}

async fn mock_serper(organic: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "organic": organic })),
        )
        .mount(&server)
        .await;
    server
}

async fn mock_sheets(existing: serde_json::Value, spreadsheet_url: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("get_domains"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "domains": existing })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("save_results"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "spreadsheet_url": spreadsheet_url
        })))
        .mount(&server)
        .await;
    server
}

/// A site whose top page names the company and links to a contact page
/// carrying a tel: link.
async fn mock_site(company_name: &str) -> MockServer {
    let server = MockServer::start().await;
    let top = format!(
        r#"<html><head><title>{company_name}</title></head>
        <body><a href="/contact/">お問い合わせ</a></body></html>"#
    );
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(top))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/contact/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body><form action="/send"></form>
            <a href="tel:0312345678">03-1234-5678</a></body></html>"#,
        ))
        .mount(&server)
        .await;
    server
}

struct RecordingReporter {
    events: Mutex<Vec<(JobStatus, u8)>>,
}

#[async_trait::async_trait]
impl ProgressReporter for RecordingReporter {
    async fn on_status(&self, status: JobStatus, progress: u8, _message: &str) {
        self.events
            .lock()
            .expect("reporter lock")
            .push((status, progress));
    }

    async fn on_final(&self, _records: &[EnrichedRecord], _artifact: Option<(&str, &[u8])>) {}

    async fn on_error(&self, _message: &str) {}
}

#[tokio::test]
async fn full_pipeline_enriches_and_saves_five_records() {
    let mut sites = Vec::new();
    for i in 1..=5 {
        sites.push(mock_site(&format!("株式会社テスト{i}")).await);
    }

    let organic: Vec<serde_json::Value> = sites
        .iter()
        .enumerate()
        .map(|(i, site)| {
            serde_json::json!({
                "title": format!("株式会社テスト{}｜公式サイト", i + 1),
                "link": format!("{}/", site.uri()),
                "snippet": "公式サイト"
            })
        })
        .collect();
    let serper_server = mock_serper(serde_json::json!(organic)).await;

    // The cleanser echoes normalized names for all five candidates.
    let cleaned: Vec<serde_json::Value> = sites
        .iter()
        .enumerate()
        .map(|(i, site)| {
            let url = format!("{}/", site.uri());
            serde_json::json!({
                "company_name": format!("株式会社テスト{}", i + 1),
                "url": url,
                "domain": extract_domain(&url),
                "relevance_score": 0.9
            })
        })
        .collect();
    let llm_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"content": serde_json::json!({
                "cleaned_companies": cleaned,
                "valid_count": 5,
                "excluded_count": 0
            }).to_string()}}]
        })))
        .mount(&llm_server)
        .await;

    let sheets_server = mock_sheets(serde_json::json!([]), "https://sheets.example/e2e").await;

    let serper = SerperClient::with_base_url("k", serper_server.uri());
    let cleanser = LlmCleanser::with_base_url("k", llm_server.uri());
    let sheets = SheetsClient::new(sheets_server.uri());
    let reporter = RecordingReporter {
        events: Mutex::new(Vec::new()),
    };

    let outcome = run_search_workflow(
        &serper,
        Some(&cleanser),
        &sheets,
        &sheets,
        &reporter,
        &config(),
        &input("東京 IT企業", 5),
    )
    .await
    .expect("workflow");

    assert_eq!(outcome.records.len(), 5);
    for record in &outcome.records {
        assert!(record.contact_url.contains("/contact/"));
        assert_eq!(record.phone, "03-1234-5678");
        assert!(record.company_name.starts_with("株式会社テスト"));
    }
    assert_eq!(outcome.spreadsheet_url, "https://sheets.example/e2e");
    assert!(outcome.message.contains("5件"));

    // Progress milestones arrive in order with monotone percentages.
    let events = reporter.events.lock().expect("reporter lock").clone();
    let progresses: Vec<u8> = events.iter().map(|(_, p)| *p).collect();
    assert_eq!(progresses, vec![5, 15, 35, 80]);
    assert_eq!(events[2].0, JobStatus::Scraping);
}

#[tokio::test]
async fn zero_results_yield_typed_zero_outcome() {
    let serper_server = mock_serper(serde_json::json!([])).await;
    let sheets_server = mock_sheets(serde_json::json!([]), "unused").await;

    let serper = SerperClient::with_base_url("k", serper_server.uri());
    let sheets = SheetsClient::new(sheets_server.uri());

    let outcome = run_search_workflow(
        &serper,
        None,
        &sheets,
        &sheets,
        &NullReporter,
        &config(),
        &input("存在しない業種", 10),
    )
    .await
    .expect("workflow");

    assert!(outcome.records.is_empty());
    assert_eq!(outcome.search_count, 0);
    assert!(outcome.spreadsheet_url.is_empty());
    assert!(outcome.message.contains("キーワード"));
}

#[tokio::test]
async fn post_scrape_pass_normalizes_and_drops_invalid_names() {
    // Without an LLM key the raw titles flow through to the scraper and
    // the post-scrape pass must clean up.
    let site_a = mock_site("アルファ技研").await;
    let site_b = mock_site("株式会社ベータ｜公式").await;

    let organic = serde_json::json!([
        {"title": "アルファ技研", "link": format!("{}/", site_a.uri()), "snippet": ""},
        {"title": "株式会社ベータ｜公式", "link": format!("{}/", site_b.uri()), "snippet": ""},
    ]);
    let serper_server = mock_serper(organic).await;
    let sheets_server = mock_sheets(serde_json::json!([]), "https://sheets.example/x").await;

    let serper = SerperClient::with_base_url("k", serper_server.uri());
    let sheets = SheetsClient::new(sheets_server.uri());

    let outcome = run_search_workflow(
        &serper,
        None,
        &sheets,
        &sheets,
        &NullReporter,
        &config(),
        &input("kw", 2),
    )
    .await
    .expect("workflow");

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].company_name, "株式会社ベータ");
}

#[tokio::test]
async fn records_with_contact_precede_records_without() {
    let bare = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><head><title>株式会社エー</title></head><body>ご挨拶</body></html>",
        ))
        .mount(&bare)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&bare)
        .await;

    let rich = mock_site("株式会社ビー").await;

    let organic = serde_json::json!([
        {"title": "株式会社エー", "link": format!("{}/", bare.uri()), "snippet": ""},
        {"title": "株式会社ビー", "link": format!("{}/", rich.uri()), "snippet": ""},
    ]);
    let serper_server = mock_serper(organic).await;
    let sheets_server = mock_sheets(serde_json::json!([]), "https://sheets.example/x").await;

    let serper = SerperClient::with_base_url("k", serper_server.uri());
    let sheets = SheetsClient::new(sheets_server.uri());

    let outcome = run_search_workflow(
        &serper,
        None,
        &sheets,
        &sheets,
        &NullReporter,
        &config(),
        &input("kw", 2),
    )
    .await
    .expect("workflow");

    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.records[0].company_name, "株式会社ビー");
    assert!(outcome.records[0].has_contact());
    assert!(!outcome.records[1].has_contact());
}

#[tokio::test]
async fn sink_failure_degrades_to_empty_spreadsheet_url() {
    let site = mock_site("株式会社ガンマ").await;
    let organic = serde_json::json!([
        {"title": "株式会社ガンマ", "link": format!("{}/", site.uri()), "snippet": ""},
    ]);
    let serper_server = mock_serper(organic).await;

    let sheets_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("get_domains"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"domains": []})))
        .mount(&sheets_server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("save_results"))
        .respond_with(ResponseTemplate::new(500).set_body_string("sheet locked"))
        .mount(&sheets_server)
        .await;

    let serper = SerperClient::with_base_url("k", serper_server.uri());
    let sheets = SheetsClient::new(sheets_server.uri());

    let outcome = run_search_workflow(
        &serper,
        None,
        &sheets,
        &sheets,
        &NullReporter,
        &config(),
        &input("kw", 1),
    )
    .await
    .expect("workflow");

    assert_eq!(outcome.records.len(), 1);
    assert!(outcome.spreadsheet_url.is_empty());
}

#[tokio::test]
async fn known_domains_from_the_collaborator_are_never_searched_again() {
    let site_known = mock_site("株式会社キラン").await;
    let site_new = mock_site("株式会社ニュー").await;
    let known_domain = extract_domain(&format!("{}/", site_known.uri()));

    let organic = serde_json::json!([
        {"title": "株式会社キラン", "link": format!("{}/", site_known.uri()), "snippet": ""},
        {"title": "株式会社ニュー", "link": format!("{}/", site_new.uri()), "snippet": ""},
    ]);
    let serper_server = mock_serper(organic).await;
    let sheets_server =
        mock_sheets(serde_json::json!([known_domain]), "https://sheets.example/x").await;

    let serper = SerperClient::with_base_url("k", serper_server.uri());
    let sheets = SheetsClient::new(sheets_server.uri());

    let outcome = run_search_workflow(
        &serper,
        None,
        &sheets,
        &sheets,
        &NullReporter,
        &config(),
        &input("kw", 5),
    )
    .await
    .expect("workflow");

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].company_name, "株式会社ニュー");
}

#[tokio::test]
async fn round_loop_terminates_when_yield_dries_up() {
    // Ten distinct fake domains, far below a target of 100: the loop must
    // stop as soon as a retry round adds nothing new.
    let organic: Vec<serde_json::Value> = (0..10)
        .map(|i| {
            serde_json::json!({
                "title": format!("株式会社ルーフ{i}"),
                "link": format!("https://roof{i}.co.jp/"),
                "snippet": ""
            })
        })
        .collect();
    let serper_server = mock_serper(serde_json::json!(organic)).await;
    let serper = SerperClient::with_base_url("k", serper_server.uri());

    let candidates =
        accumulate_candidates(&serper, None, "東京 IT企業", 100, &HashSet::new(), None).await;

    assert_eq!(candidates.len(), 10);
    let domains: HashSet<&str> = candidates.iter().map(|c| c.domain.as_str()).collect();
    assert_eq!(domains.len(), 10);
}
