//! Gemini `generateContent` client.
//!
//! Blocking reqwest client (no Tokio runtime required).

use gridmerge_engine::Grid;
use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error;

use super::{
    EMPTY_REPLY_MESSAGE, FAILED_MESSAGE, SYSTEM_INSTRUCTION, Sample, Summarizer,
    UNAVAILABLE_MESSAGE, build_prompt,
};
use crate::config::SummaryConfig;
use crate::error::{GridMergeError, Result};

/// Why a call to the service failed. Never leaves this module.
#[derive(Error, Debug)]
enum ServiceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

pub struct GeminiSummarizer {
    http: reqwest::blocking::Client,
    config: SummaryConfig,
}

impl GeminiSummarizer {
    pub fn new(config: SummaryConfig) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("gridmerge/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GridMergeError::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { http, config })
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }

    fn request_body(&self, prompt: &str) -> Value {
        json!({
            "systemInstruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": { "temperature": self.config.temperature },
        })
    }

    fn generate(&self, api_key: &str, prompt: &str) -> std::result::Result<String, ServiceError> {
        let response = self
            .http
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&self.request_body(prompt))
            .send()
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ServiceError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response
            .json()
            .map_err(|e| ServiceError::Parse(e.to_string()))?;
        reply_text(&body)
    }
}

/// Concatenate the text parts of the first candidate.
fn reply_text(body: &Value) -> std::result::Result<String, ServiceError> {
    let parts = body
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array);
    let Some(parts) = parts else {
        // A reply without candidates (e.g. blocked prompt) is just empty.
        if body.get("candidates").is_some() || body.get("promptFeedback").is_some() {
            return Ok(String::new());
        }
        return Err(ServiceError::Parse("missing candidates".to_string()));
    };
    Ok(parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect())
}

impl Summarizer for GeminiSummarizer {
    fn summarize(&self, grid: &Grid) -> String {
        let Some(api_key) = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
        else {
            return UNAVAILABLE_MESSAGE.to_string();
        };

        let prompt = build_prompt(&Sample::from_grid(grid, self.config.max_rows));
        match self.generate(api_key, &prompt) {
            Ok(text) if text.trim().is_empty() => EMPTY_REPLY_MESSAGE.to_string(),
            Ok(text) => text,
            Err(err) => {
                log::warn!("Summarization failed: {}", err);
                FAILED_MESSAGE.to_string()
            }
        }
    }
}
