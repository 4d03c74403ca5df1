//! Top-level entry points: one job description in, one letter out.
//!
//! [`generate_letter`] runs input loading, prompt building, the single LLM
//! call and validation. [`write_outputs`] persists a validated letter. They
//! are separate so a caller (the CLI) can print the letter before any file
//! is written; [`generate_to_files`] chains both.

use crate::config::{sibling_text_path, CoverLetterConfig, GenerationMode};
use crate::error::CoverLetterError;
use crate::output::{CoverLetter, OutputArtifacts};
use crate::pipeline::{input, llm, payload, render, structured};
use edgequake_llm::{LLMProvider, ProviderFactory};
use std::sync::Arc;
use tracing::{debug, info};

/// Generate and validate a cover letter for `job_input`.
///
/// `job_input` is either the job description itself or a path to a file
/// holding it. Reference materials are loaded and the prompt is built before
/// the provider is contacted, so configuration errors never cost an API call.
///
/// # Errors
/// Every failure is fatal; see [`CoverLetterError::kind`] for the grouping.
pub async fn generate_letter(
    job_input: impl AsRef<str>,
    config: &CoverLetterConfig,
) -> Result<CoverLetter, CoverLetterError> {
    let materials = input::ReferenceMaterials::load(config)?;
    let job_description = input::resolve_job_description(job_input.as_ref())?;
    let prompt = materials.build_prompt(&job_description)?;
    debug!("Prompt is {} bytes", prompt.len());

    info!("Generating cover letter from job description");
    let raw = match config.mode {
        GenerationMode::Unstructured => {
            let provider = resolve_provider(config)?;
            let content = llm::complete(&provider, &prompt, config).await?;
            payload::parse_raw_response(&content)?
        }
        GenerationMode::Structured => structured::complete(&prompt, config).await?,
    };

    let letter = payload::validate(raw)?;
    info!(
        "Letter '{}' validated ({} words)",
        letter.filename(),
        letter.word_count()
    );
    Ok(letter)
}

/// Write the configured artifacts for `letter`.
///
/// The text file (if any) is written first, then the PDF unless skipped.
/// The PDF goes to `config.pdf_path` or `<output_dir>/<filename>.pdf`.
pub fn write_outputs(
    letter: &CoverLetter,
    config: &CoverLetterConfig,
) -> Result<OutputArtifacts, CoverLetterError> {
    let pdf_path = (!config.skip_pdf).then(|| {
        config
            .pdf_path
            .clone()
            .unwrap_or_else(|| letter.default_pdf_path(&config.output_dir))
    });

    let text_path = match (&config.text_path, config.write_text) {
        (Some(path), _) => Some(path.clone()),
        (None, true) => Some(match pdf_path {
            Some(ref pdf) => sibling_text_path(pdf),
            None => letter.default_text_path(&config.output_dir),
        }),
        (None, false) => None,
    };

    if let Some(ref path) = text_path {
        render::write_text_file(letter.letter(), path)?;
    }

    let page_count = match pdf_path {
        Some(ref path) => render::write_pdf(letter.letter(), path, &config.page, letter.filename())?,
        None => 0,
    };

    Ok(OutputArtifacts {
        pdf_path,
        text_path,
        page_count,
    })
}

/// Generate a letter and write its artifacts.
pub async fn generate_to_files(
    job_input: impl AsRef<str>,
    config: &CoverLetterConfig,
) -> Result<(CoverLetter, OutputArtifacts), CoverLetterError> {
    let letter = generate_letter(job_input, config).await?;
    let artifacts = write_outputs(&letter, config)?;
    Ok((letter, artifacts))
}

/// Synchronous wrapper around [`generate_to_files`].
///
/// Creates a current-thread tokio runtime internally.
pub fn generate_sync(
    job_input: impl AsRef<str>,
    config: &CoverLetterConfig,
) -> Result<(CoverLetter, OutputArtifacts), CoverLetterError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CoverLetterError::InvalidConfig(format!("Failed to create tokio runtime: {e}")))?
        .block_on(generate_to_files(job_input, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Instantiate a named provider with the given model.
fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, CoverLetterError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        CoverLetterError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Injected provider** (`config.provider`).
/// 2. **Named provider** (`config.provider_name`) with `config.model`.
/// 3. **`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`** when both are set.
/// 4. **OpenAI** when `OPENAI_API_KEY` is set, with `config.model`.
/// 5. **Full auto-detection** (`ProviderFactory::from_env`).
fn resolve_provider(config: &CoverLetterConfig) -> Result<Arc<dyn LLMProvider>, CoverLetterError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        return create_provider(name, &config.model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            return create_provider("openai", &config.model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| CoverLetterError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}
