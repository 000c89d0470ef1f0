//! Slack notifier: progress lines, completion blocks, error messages, and
//! CSV artifact upload.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::job::JobStatus;

const SLACK_TIMEOUT: Duration = Duration::from_secs(30);
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for the Slack Web API.
pub struct SlackNotifier {
    client: reqwest::Client,
    bot_token: String,
    base_url: String,
}

#[derive(Deserialize)]
struct SlackResponse {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    error: String,
}

impl SlackNotifier {
    /// Create a notifier against the production Slack API.
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self::with_base_url(bot_token, "https://slack.com")
    }

    /// Create a notifier against a custom endpoint (tests).
    pub fn with_base_url(bot_token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            bot_token: bot_token.into(),
            base_url: base_url.into(),
        }
    }

    /// Send a message, optionally threaded and with Block Kit blocks.
    /// Returns whether Slack accepted it; failures are logged, not raised.
    pub async fn send_message(
        &self,
        channel: &str,
        text: &str,
        thread_ts: Option<&str>,
        blocks: Option<serde_json::Value>,
    ) -> bool {
        let mut payload = json!({
            "channel": channel,
            "text": text,
        });
        if let Some(ts) = thread_ts {
            payload["thread_ts"] = json!(ts);
        }
        if let Some(blocks) = blocks {
            payload["blocks"] = blocks;
        }

        let result = self
            .client
            .post(format!("{}/api/chat.postMessage", self.base_url))
            .bearer_auth(&self.bot_token)
            .timeout(SLACK_TIMEOUT)
            .json(&payload)
            .send()
            .await;

        match result {
            Ok(response) => match response.json::<SlackResponse>().await {
                Ok(body) if body.ok => true,
                Ok(body) => {
                    tracing::error!(error = %body.error, "slack message rejected");
                    false
                }
                Err(e) => {
                    tracing::error!(error = %e, "slack response unreadable");
                    false
                }
            },
            Err(e) => {
                tracing::error!(error = %e, "slack message failed");
                false
            }
        }
    }

    /// Post a threaded progress line with a status emoji.
    pub async fn notify_progress(
        &self,
        channel: &str,
        thread_ts: &str,
        status: JobStatus,
        progress: u8,
        message: &str,
    ) -> bool {
        let emoji = status_emoji(status);
        let text = format!("{emoji} [{status}] {message} ({progress}%)");
        self.send_message(channel, &text, Some(thread_ts), None)
            .await
    }

    /// Post the completion message with the result count and spreadsheet
    /// link.
    pub async fn notify_completion(
        &self,
        channel: &str,
        thread_ts: &str,
        search_keyword: &str,
        result_count: usize,
        spreadsheet_url: &str,
    ) -> bool {
        let mut blocks = vec![json!({
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": format!(
                    ":white_check_mark: *営業リスト作成完了*\n\n*検索キーワード:* {search_keyword}\n*取得件数:* {result_count}件"
                )
            }
        })];
        if !spreadsheet_url.is_empty() {
            blocks.push(json!({
                "type": "section",
                "text": {
                    "type": "mrkdwn",
                    "text": format!(":spreadsheet: <{spreadsheet_url}|スプレッドシートを開く>")
                }
            }));
        }

        let text = format!("営業リスト作成完了: {search_keyword} ({result_count}件)");
        self.send_message(channel, &text, Some(thread_ts), Some(json!(blocks)))
            .await
    }

    /// Post an error message into the thread.
    pub async fn notify_error(&self, channel: &str, thread_ts: &str, error_message: &str) -> bool {
        let text = format!(":x: *エラーが発生しました*\n```{error_message}```");
        self.send_message(channel, &text, Some(thread_ts), None)
            .await
    }

    /// Upload a CSV artifact into the channel (threaded when `thread_ts`
    /// is given).
    pub async fn upload_csv(
        &self,
        channel: &str,
        filename: &str,
        content: Vec<u8>,
        thread_ts: Option<&str>,
    ) -> bool {
        let part = match reqwest::multipart::Part::bytes(content)
            .file_name(filename.to_string())
            .mime_str("text/csv")
        {
            Ok(part) => part,
            Err(e) => {
                tracing::error!(error = %e, "csv part build failed");
                return false;
            }
        };

        let mut form = reqwest::multipart::Form::new()
            .text("channels", channel.to_string())
            .text("filename", filename.to_string())
            .text("title", filename.to_string())
            .part("file", part);
        if let Some(ts) = thread_ts {
            form = form.text("thread_ts", ts.to_string());
        }

        let result = self
            .client
            .post(format!("{}/api/files.upload", self.base_url))
            .bearer_auth(&self.bot_token)
            .timeout(UPLOAD_TIMEOUT)
            .multipart(form)
            .send()
            .await;

        match result {
            Ok(response) => match response.json::<SlackResponse>().await {
                Ok(body) if body.ok => {
                    tracing::info!(filename, "csv uploaded to slack");
                    true
                }
                Ok(body) => {
                    tracing::error!(error = %body.error, "slack upload rejected");
                    false
                }
                Err(e) => {
                    tracing::error!(error = %e, "slack upload response unreadable");
                    false
                }
            },
            Err(e) => {
                tracing::error!(error = %e, "slack upload failed");
                false
            }
        }
    }
}

fn status_emoji(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Pending => ":hourglass:",
        JobStatus::Searching => ":mag:",
        JobStatus::Scraping => ":spider_web:",
        JobStatus::Saving => ":floppy_disk:",
        JobStatus::Completed => ":white_check_mark:",
        JobStatus::Failed => ":x:",
    }
}
