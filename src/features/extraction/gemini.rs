//! Gemini-backed action item extraction.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use super::{build_prompt, parse_candidates, ActionItemExtractor};
use crate::features::action_items::ActionItemCandidate;
use crate::shared::Config;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini extractor configuration
#[derive(Debug, Clone)]
pub struct GeminiExtractorConfig {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub timeout: std::time::Duration,
    pub default_due_days: u32,
}

impl GeminiExtractorConfig {
    /// Build from application config; `None` when no API key is set
    pub fn from_config(config: &Config) -> Option<Self> {
        let api_key = config.api_key()?;
        Some(Self {
            api_key,
            model: config.gemini_model.clone(),
            endpoint: config.gemini_endpoint.trim_end_matches('/').to_string(),
            timeout: config.request_timeout(),
            default_due_days: config.default_due_days,
        })
    }
}

/// Extractor calling the Gemini `generateContent` endpoint
pub struct GeminiExtractor {
    client: reqwest::Client,
    config: GeminiExtractorConfig,
}

impl GeminiExtractor {
    pub fn new(config: GeminiExtractorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    /// Endpoint URL; the key travels in a header so it never shows up in
    /// transport error messages
    fn build_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint, self.config.model
        )
    }

    fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut key = HeaderValue::from_str(&self.config.api_key)
            .map_err(|_| anyhow::anyhow!("Gemini API key contains invalid characters"))?;
        key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key);

        Ok(headers)
    }
}

// Gemini API request/response structures

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
    #[serde(rename = "responseSchema")]
    response_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContentResponse,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
struct GeminiPartResponse {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

/// Array of `{title, owner, dueDate}` objects, all fields required
fn action_item_schema() -> serde_json::Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "title": { "type": "STRING" },
                "owner": { "type": "STRING" },
                "dueDate": { "type": "STRING" }
            },
            "required": ["title", "owner", "dueDate"]
        }
    })
}

fn build_request(prompt: String) -> GeminiRequest {
    GeminiRequest {
        contents: vec![GeminiContent {
            role: "user".to_string(),
            parts: vec![GeminiPart { text: prompt }],
        }],
        generation_config: GeminiGenerationConfig {
            response_mime_type: "application/json".to_string(),
            response_schema: action_item_schema(),
        },
    }
}

/// Pull the first candidate's text out of a raw response body
fn response_text(body: &str) -> Result<Option<String>> {
    let parsed: GeminiResponse = serde_json::from_str(body)?;

    if let Some(error) = parsed.error {
        return Err(anyhow::anyhow!("Gemini API error: {}", error.message));
    }

    Ok(parsed
        .candidates
        .and_then(|c| c.into_iter().next())
        .map(|c| {
            c.content
                .parts
                .into_iter()
                .map(|p| p.text)
                .collect::<String>()
        }))
}

#[async_trait]
impl ActionItemExtractor for GeminiExtractor {
    async fn extract(&self, notes: &str) -> Result<Vec<ActionItemCandidate>> {
        let today = chrono::Local::now().date_naive();
        let body = build_request(build_prompt(notes, today, self.config.default_due_days));

        let headers = self.build_headers()?;

        debug!(model = %self.config.model, "requesting action item extraction");
        let response = self
            .client
            .post(self.build_url())
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("HTTP {status}: {text}"));
        }

        let text = response.text().await.map_err(reqwest::Error::without_url)?;
        let candidates = match response_text(&text)? {
            Some(content) => parse_candidates(&content),
            None => Vec::new(),
        };

        info!(count = candidates.len(), "extracted action item candidates");
        Ok(candidates)
    }
}
