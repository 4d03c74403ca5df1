//! Result types produced by a generation run.

use std::path::{Path, PathBuf};

/// A validated cover letter.
///
/// Only [`crate::pipeline::payload::validate`] constructs one, so holding a
/// `CoverLetter` means `filename` is a safe, extension-less identifier
/// (`[A-Za-z0-9_]+`) and `letter` is non-empty and trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverLetter {
    pub(crate) filename: String,
    pub(crate) letter: String,
}

impl CoverLetter {
    /// Filesystem-safe base name, without extension.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Letter body.
    pub fn letter(&self) -> &str {
        &self.letter
    }

    /// Word count of the body, as the prompt's 120–180 word band counts it.
    pub fn word_count(&self) -> usize {
        self.letter.split_whitespace().count()
    }

    /// `<output_dir>/<filename>.pdf`.
    pub fn default_pdf_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(format!("{}.pdf", self.filename))
    }

    /// `<output_dir>/<filename>.txt`.
    pub fn default_text_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(format!("{}.txt", self.filename))
    }
}

/// Files written for a letter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputArtifacts {
    /// PDF path, or None when PDF generation was skipped.
    pub pdf_path: Option<PathBuf>,
    /// Plain-text path, when requested.
    pub text_path: Option<PathBuf>,
    /// Pages in the written PDF (0 when skipped).
    pub page_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letter() -> CoverLetter {
        CoverLetter {
            filename: "Acme_Software_Engineer".into(),
            letter: "Dear Hiring Team,\n\nI am applying.".into(),
        }
    }

    #[test]
    fn default_paths_use_filename() {
        let l = letter();
        assert_eq!(
            l.default_pdf_path(Path::new("out")),
            PathBuf::from("out/Acme_Software_Engineer.pdf")
        );
        assert_eq!(
            l.default_text_path(Path::new("out")),
            PathBuf::from("out/Acme_Software_Engineer.txt")
        );
    }

    #[test]
    fn word_count_ignores_line_breaks() {
        assert_eq!(letter().word_count(), 6);
    }
}
