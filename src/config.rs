//! Configuration types for cover-letter generation.
//!
//! All behaviour is controlled through [`CoverLetterConfig`], built via its
//! [`CoverLetterConfigBuilder`]. One struct carries the generation knobs
//! (model, provider, mode), the locations of the reference materials and the
//! output settings, so the CLI is a flat mapping from flags to setters.

use crate::error::CoverLetterError;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Chat-completions base URL used by structured mode.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Configuration for one generation run.
///
/// # Example
/// ```rust
/// use covergen::{CoverLetterConfig, GenerationMode};
///
/// let config = CoverLetterConfig::builder()
///     .model("gpt-4o-mini")
///     .mode(GenerationMode::Structured)
///     .output_dir("letters")
///     .build()
///     .unwrap();
/// assert_eq!(config.model, "gpt-4o-mini");
/// ```
#[derive(Clone)]
pub struct CoverLetterConfig {
    /// LLM model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// edgequake-llm provider name (e.g. "openai", "anthropic", "ollama").
    /// Unstructured mode only. If None, the provider is auto-detected.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// How the model is asked for the (filename, letter) pair. Default: Unstructured.
    pub mode: GenerationMode,

    /// Base URL of the OpenAI-compatible API used by structured mode.
    pub api_base: String,

    /// API key for structured mode. If None, read from `OPENAI_API_KEY` at call time.
    pub api_key: Option<String>,

    /// Sampling temperature. Default: 0.7.
    pub temperature: f32,

    /// Maximum output tokens. Default: 1024, well above a 180-word letter
    /// wrapped in JSON.
    pub max_tokens: usize,

    /// Upper bound on the single LLM round-trip, in seconds. Default: 120.
    pub api_timeout_secs: u64,

    /// Directory holding `summary.txt`, `sample_letter.txt` and optionally
    /// `prompt_template.txt`. Default: `materials`.
    pub materials_dir: PathBuf,

    /// Explicit candidate summary path; overrides `materials_dir/summary.txt`.
    pub summary_path: Option<PathBuf>,

    /// Explicit sample letter path; overrides `materials_dir/sample_letter.txt`.
    pub sample_letter_path: Option<PathBuf>,

    /// Explicit prompt template path. When None, `materials_dir/prompt_template.txt`
    /// is used if it exists, else the built-in template.
    pub template_path: Option<PathBuf>,

    /// Root directory for default output paths. Default: `cover_letters`.
    pub output_dir: PathBuf,

    /// Explicit PDF path; overrides `<output_dir>/<filename>.pdf`.
    pub pdf_path: Option<PathBuf>,

    /// Explicit plain-text path.
    pub text_path: Option<PathBuf>,

    /// Also write the letter as a `.txt` sibling of the PDF. Default: false.
    pub write_text: bool,

    /// Skip PDF generation entirely. Default: false.
    pub skip_pdf: bool,

    /// Page size, margins and typography of the rendered PDF.
    pub page: PageSetup,
}

impl Default for CoverLetterConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            provider_name: None,
            provider: None,
            mode: GenerationMode::default(),
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            temperature: 0.7,
            max_tokens: 1024,
            api_timeout_secs: 120,
            materials_dir: PathBuf::from("materials"),
            summary_path: None,
            sample_letter_path: None,
            template_path: None,
            output_dir: PathBuf::from("cover_letters"),
            pdf_path: None,
            text_path: None,
            write_text: false,
            skip_pdf: false,
            page: PageSetup::default(),
        }
    }
}

impl fmt::Debug for CoverLetterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoverLetterConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("mode", &self.mode)
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("materials_dir", &self.materials_dir)
            .field("summary_path", &self.summary_path)
            .field("sample_letter_path", &self.sample_letter_path)
            .field("template_path", &self.template_path)
            .field("output_dir", &self.output_dir)
            .field("pdf_path", &self.pdf_path)
            .field("text_path", &self.text_path)
            .field("write_text", &self.write_text)
            .field("skip_pdf", &self.skip_pdf)
            .field("page", &self.page)
            .finish()
    }
}

impl CoverLetterConfig {
    /// Create a new builder for `CoverLetterConfig`.
    pub fn builder() -> CoverLetterConfigBuilder {
        CoverLetterConfigBuilder {
            config: Self::default(),
        }
    }

    /// Resolved summary path.
    pub fn summary_file(&self) -> PathBuf {
        self.summary_path
            .clone()
            .unwrap_or_else(|| self.materials_dir.join("summary.txt"))
    }

    /// Resolved sample-letter path.
    pub fn sample_letter_file(&self) -> PathBuf {
        self.sample_letter_path
            .clone()
            .unwrap_or_else(|| self.materials_dir.join("sample_letter.txt"))
    }

    /// The implicit template location inside the materials directory.
    pub fn implicit_template_file(&self) -> PathBuf {
        self.materials_dir.join("prompt_template.txt")
    }
}

/// Builder for [`CoverLetterConfig`].
#[derive(Debug)]
pub struct CoverLetterConfigBuilder {
    config: CoverLetterConfig,
}

impl CoverLetterConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn mode(mut self, mode: GenerationMode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn api_base(mut self, url: impl Into<String>) -> Self {
        self.config.api_base = url.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn materials_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.materials_dir = dir.into();
        self
    }

    pub fn summary_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.summary_path = Some(path.into());
        self
    }

    pub fn sample_letter_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.sample_letter_path = Some(path.into());
        self
    }

    pub fn template_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.template_path = Some(path.into());
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn pdf_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdf_path = Some(path.into());
        self
    }

    pub fn text_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.text_path = Some(path.into());
        self
    }

    pub fn write_text(mut self, v: bool) -> Self {
        self.config.write_text = v;
        self
    }

    pub fn skip_pdf(mut self, v: bool) -> Self {
        self.config.skip_pdf = v;
        self
    }

    pub fn page(mut self, page: PageSetup) -> Self {
        self.config.page = page;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<CoverLetterConfig, CoverLetterError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(CoverLetterError::InvalidConfig("Model must not be empty".into()));
        }
        if c.max_tokens == 0 {
            return Err(CoverLetterError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.api_timeout_secs == 0 {
            return Err(CoverLetterError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        if c.skip_pdf && c.pdf_path.is_some() {
            return Err(CoverLetterError::InvalidConfig(
                "pdf_path has no effect when skip_pdf is set".into(),
            ));
        }
        c.page.validate()?;
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How the model is asked to return the (filename, letter) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationMode {
    /// Plain completion through the edgequake-llm provider; the reply is
    /// parsed as JSON after stripping code fences. Works with any provider.
    #[default]
    Unstructured,
    /// OpenAI-compatible `json_schema` response format; the API itself
    /// constrains the reply to the two-field schema and reports refusals.
    Structured,
}

// ── Page setup ───────────────────────────────────────────────────────────

/// Page size, margins and typography for the PDF writer. All lengths in points.
///
/// The defaults reproduce a plain business letter: US Letter, one-inch
/// margins, Times-Roman 12 pt on 14 pt leading.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSetup {
    pub width_pt: f32,
    pub height_pt: f32,
    pub margin_pt: f32,
    pub font_size_pt: f32,
    pub line_height_pt: f32,
    /// Vertical gap inserted between paragraphs.
    pub paragraph_spacing_pt: f32,
    /// Optional hard cap on characters per line, on top of the width limit.
    pub max_columns: Option<usize>,
}

impl Default for PageSetup {
    fn default() -> Self {
        Self {
            width_pt: 612.0,
            height_pt: 792.0,
            margin_pt: 72.0,
            font_size_pt: 12.0,
            line_height_pt: 14.0,
            paragraph_spacing_pt: 14.0,
            max_columns: Some(95),
        }
    }
}

impl PageSetup {
    /// A4 portrait with the same margins and typography as the default.
    pub fn a4() -> Self {
        Self {
            width_pt: 595.28,
            height_pt: 841.89,
            ..Self::default()
        }
    }

    /// Horizontal space available for text.
    pub fn usable_width_pt(&self) -> f32 {
        self.width_pt - 2.0 * self.margin_pt
    }

    pub fn validate(&self) -> Result<(), CoverLetterError> {
        if self.usable_width_pt() <= 0.0 || self.height_pt <= 2.0 * self.margin_pt {
            return Err(CoverLetterError::InvalidConfig(format!(
                "Margins of {}pt leave no room on a {}×{}pt page",
                self.margin_pt, self.width_pt, self.height_pt
            )));
        }
        if self.font_size_pt <= 0.0 || self.line_height_pt <= 0.0 {
            return Err(CoverLetterError::InvalidConfig(
                "Font size and line height must be positive".into(),
            ));
        }
        if self.paragraph_spacing_pt < 0.0 {
            return Err(CoverLetterError::InvalidConfig(
                "Paragraph spacing must not be negative".into(),
            ));
        }
        if self.max_columns == Some(0) {
            return Err(CoverLetterError::InvalidConfig(
                "max_columns must be ≥ 1".into(),
            ));
        }
        Ok(())
    }
}

/// Sibling `.txt` path for a PDF path.
pub fn sibling_text_path(pdf_path: &Path) -> PathBuf {
    pdf_path.with_extension("txt")
}
