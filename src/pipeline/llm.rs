//! Unstructured generation: one plain chat completion via edgequake-llm.
//!
//! The prompt asks for a bare JSON object; whatever text comes back is
//! handed to [`crate::pipeline::payload`] unchanged. There is no retry
//! loop: a failed call is logged and ends the run.

use crate::config::CoverLetterConfig;
use crate::error::CoverLetterError;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{timeout, Duration};
use tracing::{debug, error, info};

/// Send `prompt` as a single user message and return the completion text.
pub async fn complete(
    provider: &Arc<dyn LLMProvider>,
    prompt: &str,
    config: &CoverLetterConfig,
) -> Result<String, CoverLetterError> {
    let messages = vec![ChatMessage::user(prompt)];
    let options = build_options(config);

    info!("Calling LLM API (model {})...", config.model);
    let start = Instant::now();

    let call = provider.chat(&messages, Some(&options));
    let response = match timeout(Duration::from_secs(config.api_timeout_secs), call).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            error!("API call failed: {}", e);
            return Err(CoverLetterError::LlmApiError {
                message: e.to_string(),
            });
        }
        Err(_) => {
            error!("API call timed out after {}s", config.api_timeout_secs);
            return Err(CoverLetterError::ApiTimeout {
                secs: config.api_timeout_secs,
            });
        }
    };

    info!("✓ API response received");
    debug!(
        "{} input tokens, {} output tokens, {:?}",
        response.prompt_tokens,
        response.completion_tokens,
        start.elapsed()
    );

    Ok(response.content.trim().to_string())
}

/// Build `CompletionOptions` from the config.
fn build_options(config: &CoverLetterConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}
