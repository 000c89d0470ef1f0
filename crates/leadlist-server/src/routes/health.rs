//! Liveness and environment status.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: String,
    pub env_status: BTreeMap<&'static str, &'static str>,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let s = &state.settings;
    let mut env_status = BTreeMap::new();
    env_status.insert(
        "SERPER_API_KEY",
        if s.serper_api_key.is_empty() { "missing" } else { "set" },
    );
    env_status.insert(
        "GAS_WEBHOOK_URL",
        if s.sheets_webhook_url.is_empty() { "missing" } else { "set" },
    );
    env_status.insert(
        "OPENAI_API_KEY",
        if s.openai_api_key.is_empty() { "missing" } else { "set" },
    );
    env_status.insert(
        "SLACK_BOT_TOKEN",
        if s.slack_bot_token.is_empty() { "missing" } else { "set" },
    );

    let status = if s.missing_required().is_empty() {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        message: format!("leadlist API v{}", leadlist_core::version()),
        env_status,
    })
}
