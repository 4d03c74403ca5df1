//! Offline integration tests for covergen.
//!
//! Exercises the public API from materials to files on disk. The model is
//! replaced by edgequake-llm's `MockProvider` (unstructured mode) or a
//! one-shot HTTP stub speaking the chat-completions protocol (structured
//! mode), so no API key or network access is needed.
//!
//! Run with:
//!   cargo test --test pipeline

use covergen::pipeline::{input, layout, payload};
use covergen::{
    generate_to_files, write_outputs, CoverLetterConfig, CoverLetterError, ErrorKind,
    GenerationMode, PageSetup,
};
use edgequake_llm::MockProvider;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

// ── Test helpers ─────────────────────────────────────────────────────────────

const JOB: &str = "Software Engineer at Acme Corp, Austin";

const ACME_LETTER: &str = "Dear Hiring Team,\n\n\
I am excited to apply for the Software Engineer role at Acme Corp in Austin. For six years I have \
built backend services and data pipelines in Rust and Go, and I would enjoy bringing that work to \
your team.\n\n\
At my current company I moved our nightly batch jobs to an event-driven pipeline on Kafka and \
PostgreSQL, so customers saw order updates within minutes. I also mentor newer engineers and help \
keep our code reviews clear and kind.\n\n\
I value simple designs, careful testing and close work with product partners. I studied computer \
science at the University of Texas at Austin and would be glad to keep growing in the city. I would \
welcome the chance to talk about how I can help Acme Corp ship reliable software.\n\n\
Best regards,\nAlex Rivera";

fn materials_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("materials")
}

fn acme_payload_json() -> String {
    serde_json::json!({ "filename": "Acme_Software_Engineer", "letter": ACME_LETTER }).to_string()
}

fn page_count(pdf: &std::path::Path) -> usize {
    let bytes = std::fs::read(pdf).unwrap();
    lopdf::Document::load_mem(&bytes).unwrap().get_pages().len()
}

/// Serve one chat-completions reply whose message content is `content`.
async fn stub_model(content: String) -> (String, JoinHandle<String>) {
    let body = serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }],
        "usage": { "prompt_tokens": 800, "completion_tokens": 220 }
    })
    .to_string();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 8192];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let headers = String::from_utf8_lossy(&buf[..pos]).to_lowercase();
                let len = headers
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= pos + 4 + len {
                    break;
                }
            }
        }
        let reply = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(reply.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&buf).into_owned()
    });
    (format!("http://{addr}/v1"), handle)
}

fn stub_config(api_base: &str, output_dir: &std::path::Path) -> CoverLetterConfig {
    CoverLetterConfig::builder()
        .mode(GenerationMode::Structured)
        .api_base(api_base)
        .api_key("sk-test")
        .api_timeout_secs(10)
        .materials_dir(materials_dir())
        .output_dir(output_dir)
        .build()
        .unwrap()
}

// ── Prompt ───────────────────────────────────────────────────────────────────

#[test]
fn prompt_carries_job_description_and_rules() {
    let config = CoverLetterConfig::builder()
        .materials_dir(materials_dir())
        .build()
        .unwrap();
    let materials = input::ReferenceMaterials::load(&config).unwrap();
    let prompt = materials.build_prompt(JOB).unwrap();

    assert!(prompt.contains(JOB));
    assert!(prompt.contains("120-180 words"));
    assert!(prompt.contains("companyName_title"));
    assert!(prompt.contains(&materials.summary));
    assert!(prompt.contains(&materials.sample_letter));
    assert!(!prompt.contains("{summary}"));
}

#[test]
fn job_description_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("acme.txt");
    std::fs::write(&path, format!("  {JOB}\n")).unwrap();
    let jd = input::resolve_job_description(path.to_str().unwrap()).unwrap();
    assert_eq!(jd, JOB);
}

// ── Payload ──────────────────────────────────────────────────────────────────

#[test]
fn scenario_acme_payload_validates() {
    let letter = payload::parse_and_validate(&acme_payload_json()).unwrap();
    assert_eq!(letter.filename(), "Acme_Software_Engineer");
    assert!((120..=180).contains(&letter.word_count()), "{}", letter.word_count());
}

#[test]
fn fenced_and_plain_payloads_agree() {
    let plain = payload::parse_and_validate(&acme_payload_json()).unwrap();
    let fenced =
        payload::parse_and_validate(&format!("```json\n{}\n```", acme_payload_json())).unwrap();
    assert_eq!(plain, fenced);
}

#[test]
fn unsafe_filenames_are_rejected_before_any_write() {
    let dir = TempDir::new().unwrap();
    for name in ["Acme Corp_Role", "../Acme", "Acme\\Role", "Acmé_Role", "Acme-Role"] {
        let raw = serde_json::json!({ "filename": name, "letter": "Hello" }).to_string();
        let err = payload::parse_and_validate(&raw).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation, "{name}: {err}");
    }
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn extension_is_stripped() {
    let raw = r#"{"filename": "CoverLetter.pdf", "letter": "Hello"}"#;
    assert_eq!(payload::parse_and_validate(raw).unwrap().filename(), "CoverLetter");
}

#[test]
fn space_in_filename_reports_underscore_rule() {
    let raw = r#"{"filename": "Acme Corp_Role", "letter": "Hello"}"#;
    let err = payload::parse_and_validate(raw).unwrap_err();
    assert!(matches!(err, CoverLetterError::FilenameContainsSpace { .. }));
    assert!(err.to_string().contains("underscores"));
}

// ── Output ───────────────────────────────────────────────────────────────────

#[test]
fn pdf_pages_match_layout_and_rewrites_are_stable() {
    let dir = TempDir::new().unwrap();
    let letter = payload::parse_and_validate(&acme_payload_json()).unwrap();
    let config = CoverLetterConfig::builder()
        .output_dir(dir.path())
        .write_text(true)
        .build()
        .unwrap();

    let first = write_outputs(&letter, &config).unwrap();
    let second = write_outputs(&letter, &config).unwrap();
    assert_eq!(first, second);

    let pdf = first.pdf_path.unwrap();
    assert_eq!(pdf, dir.path().join("Acme_Software_Engineer.pdf"));
    assert_eq!(page_count(&pdf), 1);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("Acme_Software_Engineer.txt")).unwrap(),
        ACME_LETTER
    );

    let doc = layout::layout_letter(ACME_LETTER, &config.page);
    assert_eq!(doc.paragraphs().len(), 5);
    assert_eq!(doc, layout::layout_letter(ACME_LETTER, &config.page));
}

#[test]
fn long_letter_spans_several_pdf_pages() {
    let dir = TempDir::new().unwrap();
    let body = (0..40)
        .map(|i| format!("Paragraph {i}: I enjoy building reliable backend systems with care."))
        .collect::<Vec<_>>()
        .join("\n\n");
    let raw = serde_json::json!({ "filename": "Long_Letter", "letter": body }).to_string();
    let letter = payload::parse_and_validate(&raw).unwrap();

    let setup = PageSetup::a4();
    let config = CoverLetterConfig::builder()
        .output_dir(dir.path())
        .page(setup.clone())
        .build()
        .unwrap();
    let artifacts = write_outputs(&letter, &config).unwrap();

    let expected = layout::layout_letter(&body, &setup).page_count();
    assert!(expected > 1);
    assert_eq!(artifacts.page_count, expected);
    assert_eq!(page_count(artifacts.pdf_path.as_ref().unwrap()), expected);
}

// ── End to end with a mock provider (unstructured mode) ─────────────────────

async fn mock_config(reply: String, output_dir: &std::path::Path) -> CoverLetterConfig {
    let mock = MockProvider::new();
    mock.add_response(reply).await;
    CoverLetterConfig::builder()
        .provider(Arc::new(mock))
        // An injected provider wins over a named one.
        .provider_name("no-such-provider")
        .materials_dir(materials_dir())
        .output_dir(output_dir)
        .build()
        .unwrap()
}

#[tokio::test]
async fn fenced_mock_reply_becomes_a_pdf() {
    let out = TempDir::new().unwrap();
    let reply = format!(
        "```json\n{}\n```",
        serde_json::json!({ "filename": "Acme_Software_Engineer.pdf", "letter": ACME_LETTER })
    );
    let config = mock_config(reply, out.path()).await;
    assert_eq!(config.mode, GenerationMode::Unstructured);

    let (letter, artifacts) = generate_to_files(JOB, &config).await.unwrap();

    assert_eq!(letter.filename(), "Acme_Software_Engineer");
    assert_eq!(letter.letter(), ACME_LETTER);
    let pdf = out.path().join("Acme_Software_Engineer.pdf");
    assert_eq!(artifacts.pdf_path.as_deref(), Some(pdf.as_path()));
    assert_eq!(page_count(&pdf), artifacts.page_count);
}

#[tokio::test]
async fn prose_mock_reply_is_a_format_error() {
    let out = TempDir::new().unwrap();
    let config = mock_config("Sure! Here is your cover letter: Dear...".into(), out.path()).await;

    let err = generate_to_files(JOB, &config).await.unwrap_err();
    assert!(matches!(err, CoverLetterError::InvalidJson { .. }));
    assert_eq!(err.kind(), ErrorKind::Format);
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn truncated_fence_from_mock_still_parses() {
    let out = TempDir::new().unwrap();
    let reply = format!("```json\n{}", acme_payload_json());
    let config = mock_config(reply, out.path()).await;

    let (letter, _) = generate_to_files(JOB, &config).await.unwrap();
    assert_eq!(letter.filename(), "Acme_Software_Engineer");
}

// ── End to end with a stub model (structured mode) ──────────────────────────

#[tokio::test]
async fn generate_to_files_against_stub_model() {
    let out = TempDir::new().unwrap();
    let (base, server) = stub_model(acme_payload_json()).await;

    let (letter, artifacts) = generate_to_files(JOB, &stub_config(&base, out.path()))
        .await
        .unwrap();

    assert_eq!(letter.filename(), "Acme_Software_Engineer");
    assert_eq!(letter.letter(), ACME_LETTER);
    assert!(out.path().join("Acme_Software_Engineer.pdf").is_file());
    assert_eq!(artifacts.text_path, None);

    let request = server.await.unwrap();
    assert!(request.contains("Software Engineer at Acme Corp, Austin"));
}

#[tokio::test]
async fn invalid_model_filename_writes_nothing() {
    let out = TempDir::new().unwrap();
    let bad = serde_json::json!({ "filename": "Acme Corp_Role", "letter": ACME_LETTER }).to_string();
    let (base, server) = stub_model(bad).await;

    let err = generate_to_files(JOB, &stub_config(&base, out.path()))
        .await
        .unwrap_err();
    assert!(matches!(err, CoverLetterError::FilenameContainsSpace { .. }));
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
    server.await.unwrap();
}

#[tokio::test]
async fn missing_materials_fail_without_calling_the_model() {
    let empty = TempDir::new().unwrap();
    let config = CoverLetterConfig::builder()
        .mode(GenerationMode::Structured)
        .api_base("http://127.0.0.1:9/v1")
        .api_key("sk-test")
        .materials_dir(empty.path())
        .output_dir(empty.path().join("out"))
        .build()
        .unwrap();

    let err = generate_to_files(JOB, &config).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(!empty.path().join("out").exists());
}
