//! Exit behaviour of the `segment_document` driver.

use std::io::Write;
use std::process::Command;

use zone_oxide::geometry::Rect;
use zone_oxide::model::{Chunk, Document, Page};
use zone_oxide::pipeline::JsonCharacterExtractor;

// ============================================================================
// Helper Functions for Creating Mock Data
// ============================================================================

fn dump_file() -> tempfile::NamedTempFile {
    let doc = Document::from_pages(vec![Page::new(0, Rect::new(0.0, 0.0, 600.0, 800.0))
        .with_chunks(vec![
            Chunk::new(Rect::new(40.0, 40.0, 60.0, 10.0), "Title"),
            Chunk::new(Rect::new(40.0, 300.0, 60.0, 10.0), "Body"),
        ])]);
    let json = JsonCharacterExtractor::new().to_json(&doc).unwrap();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

fn driver() -> Command {
    Command::new(env!("CARGO_BIN_EXE_segment_document"))
}

// ============================================================================
// Model Loading
// ============================================================================

#[test]
fn test_missing_model_is_fatal() {
    let dump = dump_file();
    let output = driver()
        .arg("--model")
        .arg("/nonexistent/zone_oxide_model.json")
        .arg(dump.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Model unavailable"), "stderr: {}", stderr);
}

#[test]
fn test_no_model_runs_structure_only() {
    let dump = dump_file();
    let output = driver().arg(dump.path()).output().unwrap();

    assert!(output.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary[0]["zones"].as_array().map(Vec::len), Some(2));
    assert!(summary[0]["zones"][0]["label"].is_null());
}

#[test]
fn test_unreadable_input_fails_run() {
    let output = driver()
        .arg("/nonexistent/zone_oxide_dump.json")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(summary[0]["error"].is_string());
}

#[test]
fn test_usage_error() {
    let output = driver().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}
