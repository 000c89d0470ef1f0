//! LLM company-data cleansing with a deterministic post-processing layer.
//!
//! Candidates are sent to a chat-completion API in batches with a strict
//! normalization prompt. Every returned name then passes through the
//! deterministic normalizer and the invalidity predicate. A batch whose
//! call exhausts its retries is dropped entirely — raw pre-cleanse data
//! never reaches the output.

pub mod normalize;
pub mod prompt;
pub mod validate;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::model::{extract_domain, Candidate};

pub use normalize::{has_corporate_form, normalize_company_name, CORPORATE_FORMS_JP};
pub use validate::{is_invalid_company_name, rejection_rule};

const LLM_TIMEOUT: Duration = Duration::from_secs(90);
const MODEL: &str = "gpt-4o";
const MAX_RETRIES: usize = 2;
const DEFAULT_BATCH_SIZE: usize = 50;

/// Client for the OpenAI chat-completions cleansing call.
pub struct LlmCleanser {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    batch_size: usize,
}

/// Envelope the LLM must return.
#[derive(Debug, Deserialize)]
pub struct CleansedEnvelope {
    #[serde(default)]
    pub cleaned_companies: Vec<CleansedCompany>,
    #[serde(default)]
    pub valid_count: u32,
    #[serde(default)]
    pub excluded_count: u32,
}

/// One cleansed company in the envelope.
#[derive(Debug, Deserialize)]
pub struct CleansedCompany {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub relevance_score: f64,
}

impl LlmCleanser {
    /// Create a cleanser against the production endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, "https://api.openai.com")
    }

    /// Create a cleanser against a custom endpoint (tests).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Override the batch size (tests).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Cleanse candidates in sequential batches.
    ///
    /// Batches are processed independently and concatenated in batch
    /// order; a batch that fails all retries is dropped.
    pub async fn cleanse(
        &self,
        candidates: &[Candidate],
        search_keyword: &str,
        existing_domains: &[String],
    ) -> Vec<Candidate> {
        if candidates.is_empty() {
            return Vec::new();
        }

        tracing::info!(
            count = candidates.len(),
            keyword = %search_keyword,
            "cleansing start"
        );

        let mut all_cleansed: Vec<Candidate> = Vec::new();
        let mut failed_batches = 0;

        for (batch_num, batch) in candidates.chunks(self.batch_size).enumerate() {
            match self
                .cleanse_batch_with_retry(batch, search_keyword, existing_domains)
                .await
            {
                Some(cleansed) => {
                    tracing::info!(
                        batch = batch_num + 1,
                        input = batch.len(),
                        output = cleansed.len(),
                        "batch cleansed"
                    );
                    all_cleansed.extend(cleansed);
                }
                None => {
                    failed_batches += 1;
                    tracing::error!(
                        batch = batch_num + 1,
                        dropped = batch.len(),
                        "batch failed all retries, dropping"
                    );
                }
            }
        }

        tracing::info!(
            input = candidates.len(),
            output = all_cleansed.len(),
            failed_batches,
            "cleansing done"
        );
        all_cleansed
    }

    async fn cleanse_batch_with_retry(
        &self,
        batch: &[Candidate],
        search_keyword: &str,
        existing_domains: &[String],
    ) -> Option<Vec<Candidate>> {
        for attempt in 0..=MAX_RETRIES {
            match self
                .cleanse_batch(batch, search_keyword, existing_domains)
                .await
            {
                Ok(cleansed) => return Some(cleansed),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        max = MAX_RETRIES + 1,
                        error = %e,
                        "cleanse attempt failed"
                    );
                }
            }
        }
        None
    }

    async fn cleanse_batch(
        &self,
        batch: &[Candidate],
        search_keyword: &str,
        existing_domains: &[String],
    ) -> Result<Vec<Candidate>, LlmError> {
        let user_prompt = prompt::build_user_prompt(batch, search_keyword, existing_domains);

        let request = ChatCompletionRequest {
            model: MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompt::SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
            temperature: 0.1,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(LLM_TIMEOUT)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status,
                message: body,
            });
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(format!("chat completion body: {e}")))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();

        let envelope: CleansedEnvelope = serde_json::from_str(&content)
            .map_err(|e| LlmError::Parse(format!("cleansing envelope: {e}")))?;

        let mut cleansed = Vec::new();
        for company in envelope.cleaned_companies {
            let raw_name = company.company_name.trim();
            let url = company.url.trim();
            if raw_name.is_empty() || url.is_empty() {
                continue;
            }

            let name = normalize_company_name(raw_name);
            if name != raw_name {
                tracing::debug!(from = %raw_name, to = %name, "post-normalized");
            }
            if is_invalid_company_name(&name) {
                tracing::info!(name = %name, "rejected by safety net");
                continue;
            }

            let domain = if company.domain.trim().is_empty() {
                extract_domain(url)
            } else {
                company.domain.trim().to_string()
            };

            cleansed.push(Candidate {
                company_name: name,
                url: url.to_string(),
                domain,
                snippet: String::new(),
            });
        }

        tracing::debug!(
            llm_valid = envelope.valid_count,
            llm_excluded = envelope.excluded_count,
            kept = cleansed.len(),
            "batch post-processed"
        );
        Ok(cleansed)
    }
}

// --- Internal Serde types ---

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn completion_body(envelope: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "choices": [{"message": {"content": envelope.to_string()}}],
            "model": "gpt-4o"
        })
    }

    fn candidates(n: usize) -> Vec<Candidate> {
        (0..n)
            .map(|i| {
                Candidate::new(
                    format!("株式会社テスト{i}"),
                    format!("https://test{i}.co.jp/"),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn cleanse_normalizes_and_drops_invalid() {
        let server = MockServer::start().await;

        let envelope = serde_json::json!({
            "cleaned_companies": [
                {"company_name": "株式会社アルファ｜公式サイト", "url": "https://alpha.co.jp/", "domain": "alpha.co.jp", "relevance_score": 0.9},
                {"company_name": "WebマーケティングならWEB", "url": "https://web.example.jp/", "domain": "web.example.jp", "relevance_score": 0.4},
                {"company_name": "アルファ技研", "url": "https://giken.example.jp/", "domain": "giken.example.jp", "relevance_score": 0.5}
            ],
            "valid_count": 3,
            "excluded_count": 0
        });
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(envelope)))
            .mount(&server)
            .await;

        let cleanser = LlmCleanser::with_base_url("test-key", server.uri());
        let result = cleanser.cleanse(&candidates(3), "東京 IT企業", &[]).await;

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].company_name, "株式会社アルファ");
        assert_eq!(result[0].domain, "alpha.co.jp");
    }

    #[tokio::test]
    async fn missing_domain_is_derived_from_url() {
        let server = MockServer::start().await;

        let envelope = serde_json::json!({
            "cleaned_companies": [
                {"company_name": "株式会社ベータ", "url": "https://www.beta.co.jp/", "domain": "", "relevance_score": 0.8}
            ],
            "valid_count": 1,
            "excluded_count": 0
        });
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(envelope)))
            .mount(&server)
            .await;

        let cleanser = LlmCleanser::with_base_url("k", server.uri());
        let result = cleanser.cleanse(&candidates(1), "kw", &[]).await;
        assert_eq!(result[0].domain, "beta.co.jp");
    }

    #[tokio::test]
    async fn exhausted_batch_is_dropped_other_batches_survive() {
        let server = MockServer::start().await;

        // First batch (3 calls: initial + 2 retries) fails, second succeeds.
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .up_to_n_times(3)
            .mount(&server)
            .await;
        let envelope = serde_json::json!({
            "cleaned_companies": [
                {"company_name": "株式会社ガンマ", "url": "https://gamma.co.jp/", "domain": "gamma.co.jp", "relevance_score": 0.9}
            ],
            "valid_count": 1,
            "excluded_count": 0
        });
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(envelope)))
            .mount(&server)
            .await;

        let cleanser = LlmCleanser::with_base_url("k", server.uri()).with_batch_size(2);
        let result = cleanser.cleanse(&candidates(4), "kw", &[]).await;

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].company_name, "株式会社ガンマ");
    }

    #[tokio::test]
    async fn unparsable_envelope_fails_the_batch() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "not json"}}]
            })))
            .mount(&server)
            .await;

        let cleanser = LlmCleanser::with_base_url("k", server.uri());
        let result = cleanser.cleanse(&candidates(1), "kw", &[]).await;
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn empty_input_makes_no_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let cleanser = LlmCleanser::with_base_url("k", server.uri());
        let result = cleanser.cleanse(&[], "kw", &[]).await;
        assert!(result.is_empty());
    }
}
