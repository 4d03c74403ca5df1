//! Structured generation: the API constrains the reply to the payload schema.
//!
//! Talks to an OpenAI-compatible `/chat/completions` endpoint directly with
//! `response_format: json_schema`, because refusals only surface at this
//! level: a constrained model that declines fills `message.refusal` instead
//! of `message.content`. Both outcomes, plus an empty reply, are mapped to
//! distinct errors.

use crate::config::CoverLetterConfig;
use crate::error::CoverLetterError;
use crate::pipeline::payload::{self, RawPayload};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

const PROVIDER: &str = "openai";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<RequestMessage<'a>>,
    temperature: f32,
    max_tokens: usize,
    response_format: Value,
}

#[derive(Debug, Serialize)]
struct RequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub refusal: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// JSON schema for [`RawPayload`], in the strict form OpenAI requires.
pub fn payload_schema() -> Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": "cover_letter",
            "strict": true,
            "schema": {
                "type": "object",
                "properties": {
                    "filename": { "type": "string" },
                    "letter": { "type": "string" }
                },
                "required": ["filename", "letter"],
                "additionalProperties": false
            }
        }
    })
}

/// Send `prompt` with the payload schema attached and return the parsed payload.
pub async fn complete(
    prompt: &str,
    config: &CoverLetterConfig,
) -> Result<RawPayload, CoverLetterError> {
    let api_key = match config.api_key.clone() {
        Some(key) => key,
        None => std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| CoverLetterError::ProviderNotConfigured {
                provider: PROVIDER.to_string(),
                hint: "Structured mode needs OPENAI_API_KEY (or an explicit API key).".to_string(),
            })?,
    };

    let client = Client::builder()
        .timeout(Duration::from_secs(config.api_timeout_secs))
        .build()
        .map_err(|e| CoverLetterError::LlmApiError {
            message: e.to_string(),
        })?;

    let body = ChatRequest {
        model: &config.model,
        messages: vec![RequestMessage {
            role: "user",
            content: prompt,
        }],
        temperature: config.temperature,
        max_tokens: config.max_tokens,
        response_format: payload_schema(),
    };

    let url = format!("{}/chat/completions", config.api_base.trim_end_matches('/'));
    info!("Calling LLM API with structured output (model {})...", config.model);
    let start = Instant::now();

    let response = client
        .post(&url)
        .bearer_auth(&api_key)
        .json(&body)
        .send()
        .await
        .map_err(|e| {
            error!("API call failed: {}", e);
            if e.is_timeout() {
                CoverLetterError::ApiTimeout {
                    secs: config.api_timeout_secs,
                }
            } else {
                CoverLetterError::LlmApiError {
                    message: e.to_string(),
                }
            }
        })?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiError>(&text)
            .map(|e| e.error.message)
            .unwrap_or(text);
        error!("API call failed: HTTP {}: {}", status, message);
        return Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => CoverLetterError::AuthError {
                provider: PROVIDER.to_string(),
                detail: message,
            },
            _ => CoverLetterError::LlmApiError {
                message: format!("HTTP {status}: {message}"),
            },
        });
    }

    let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
        error!("Unreadable API response: {}", e);
        CoverLetterError::LlmApiError {
            message: format!("unreadable response body: {e}"),
        }
    })?;

    info!("✓ API response received");
    if let Some(ref usage) = parsed.usage {
        debug!(
            "{} input tokens, {} output tokens, {:?}",
            usage.prompt_tokens,
            usage.completion_tokens,
            start.elapsed()
        );
    }

    interpret(parsed)
}

/// Turn a completion response into a payload, surfacing refusals.
pub fn interpret(response: ChatCompletionResponse) -> Result<RawPayload, CoverLetterError> {
    let message = response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message)
        .unwrap_or_default();

    if let Some(reason) = message.refusal.filter(|r| !r.trim().is_empty()) {
        error!("Model refused: {}", reason);
        return Err(CoverLetterError::Refusal { reason });
    }

    match message.content {
        Some(content) if !content.trim().is_empty() => payload::parse_raw_response(&content),
        _ => {
            error!("API returned no structured payload");
            Err(CoverLetterError::MissingStructuredPayload)
        }
    }
}
