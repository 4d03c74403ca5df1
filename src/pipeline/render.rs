//! PDF rendering and file output.
//!
//! [`render_pdf`] turns a [`LaidOutDocument`] into PDF bytes with printpdf,
//! using the builtin Times-Roman font so no font file has to ship with the
//! binary. Files are written atomically (temp file + rename) after creating
//! any missing parent directories, so an interrupted run never leaves a
//! half-written PDF at the target path.

use crate::config::PageSetup;
use crate::error::CoverLetterError;
use crate::pipeline::layout::{self, LaidOutDocument};
use printpdf::{BuiltinFont, Mm, PdfDocument};
use std::path::Path;
use tracing::{debug, error, info};

const MM_PER_PT: f32 = 25.4 / 72.0;

fn mm(pt: f32) -> Mm {
    Mm(pt * MM_PER_PT)
}

/// Serialise a laid-out document to PDF bytes.
pub fn render_pdf(
    doc: &LaidOutDocument,
    setup: &PageSetup,
    title: &str,
) -> Result<Vec<u8>, CoverLetterError> {
    let (pdf, first_page, first_layer) =
        PdfDocument::new(title, mm(setup.width_pt), mm(setup.height_pt), "Page 1");
    let font = pdf
        .add_builtin_font(BuiltinFont::TimesRoman)
        .map_err(|e| CoverLetterError::PdfRenderFailed(e.to_string()))?;

    let mut first = Some((first_page, first_layer));
    for (i, page) in doc.pages.iter().enumerate() {
        let (page_idx, layer_idx) = match first.take() {
            Some(indices) => indices,
            None => pdf.add_page(
                mm(setup.width_pt),
                mm(setup.height_pt),
                format!("Page {}", i + 1),
            ),
        };
        let layer = pdf.get_page(page_idx).get_layer(layer_idx);
        for line in &page.lines {
            layer.use_text(
                line.text.as_str(),
                setup.font_size_pt,
                mm(line.x_pt),
                mm(line.y_pt),
                &font,
            );
        }
    }

    pdf.save_to_bytes()
        .map_err(|e| CoverLetterError::PdfRenderFailed(e.to_string()))
}

/// Lay out `letter_text` and write it as a PDF to `path`. Returns the page count.
pub fn write_pdf(
    letter_text: &str,
    path: &Path,
    setup: &PageSetup,
    title: &str,
) -> Result<usize, CoverLetterError> {
    info!("Generating PDF: {}", path.display());
    let doc = layout::layout_letter(letter_text, setup);
    debug!(
        "Laid out {} lines on {} page(s)",
        doc.lines().count(),
        doc.page_count()
    );
    let bytes = render_pdf(&doc, setup, title).inspect_err(|e| error!("{}", e))?;
    write_atomic(path, &bytes)?;
    info!("✓ Saved {}", path.display());
    Ok(doc.page_count())
}

/// Write the raw letter text (UTF-8, unwrapped) to `path`.
pub fn write_text_file(letter_text: &str, path: &Path) -> Result<(), CoverLetterError> {
    write_atomic(path, letter_text.as_bytes())?;
    info!("✓ Saved text to {}", path.display());
    Ok(())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), CoverLetterError> {
    replace_file(path, bytes).inspect_err(|e| error!("{}", e))
}

/// Write to a sibling temp file, then rename over `path`.
fn replace_file(path: &Path, bytes: &[u8]) -> Result<(), CoverLetterError> {
    let fail = |source| CoverLetterError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(fail)?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    std::fs::write(&tmp_path, bytes).map_err(fail)?;
    std::fs::rename(&tmp_path, path).map_err(|e| {
        std::fs::remove_file(&tmp_path).ok();
        fail(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const LETTER: &str = "Dear Hiring Team,\n\nI'm applying for the Software Engineer role at Acme Corp.\n\nBest regards,\nJane Doe";

    #[test]
    fn render_produces_pdf_bytes() {
        let setup = PageSetup::default();
        let doc = layout::layout_letter(LETTER, &setup);
        let bytes = render_pdf(&doc, &setup, "Acme_Software_Engineer").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn unencodable_text_still_renders() {
        let setup = PageSetup::default();
        let doc = layout::layout_letter("日本語 and 🚀", &setup);
        assert_eq!(doc.lines().next().map(|l| l.text.as_str()), Some("??? and ?"));
        assert!(render_pdf(&doc, &setup, "Acme").unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn write_pdf_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/Acme.pdf");
        let pages = write_pdf(LETTER, &path, &PageSetup::default(), "Acme").unwrap();
        assert_eq!(pages, 1);
        assert!(path.is_file());
        assert!(!dir.path().join("nested/deeper/Acme.pdf.tmp").exists());
    }

    #[test]
    fn write_text_is_raw() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/Acme.txt");
        write_text_file(LETTER, &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), LETTER);
    }

    #[test]
    fn write_into_a_file_as_directory_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let err = write_text_file(LETTER, &blocker.join("Acme.txt")).unwrap_err();
        assert!(matches!(err, CoverLetterError::OutputWriteFailed { .. }));
    }
}
