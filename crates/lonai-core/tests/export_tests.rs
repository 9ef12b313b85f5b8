use chrono::{TimeZone, Utc};
use lonai_core::research::TraceStep;
use lonai_core::{ExportError, ExportFormat, ReportExporter, ResearchRecord, SourceReference};
use tempfile::TempDir;

fn sample_record() -> ResearchRecord {
    let mut record = ResearchRecord::new(
        "What is <quantum> computing?",
        "en",
        "## Summary\n\nQuantum computers use **qubits**.\n\n- superposition\n- entanglement",
    )
    .with_sources(vec![
        SourceReference::new("https://example.com/qubits", "Qubits explained").unwrap(),
        SourceReference::new("https://example.org/intro", "").unwrap(),
    ])
    .with_trace(vec![TraceStep::new("search", "2 results")])
    .with_backend("openai", "gpt-4o");
    record.created_at = Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 0).unwrap();
    record
}

#[test]
fn test_json_export_round_trips() {
    let record = sample_record();
    let bytes = ReportExporter::render(&record, ExportFormat::Json).unwrap();
    let parsed: ResearchRecord = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(parsed, record);
}

#[test]
fn test_export_is_deterministic() {
    let record = sample_record();
    for format in [ExportFormat::Markdown, ExportFormat::Html, ExportFormat::Json] {
        let first = ReportExporter::render(&record, format).unwrap();
        let second = ReportExporter::render(&record, format).unwrap();
        assert_eq!(first, second, "{format} output differs between runs");
    }
}

#[test]
fn test_markdown_contains_query_response_and_sources() {
    let markdown = String::from_utf8(ReportExporter::render(&sample_record(), ExportFormat::Markdown).unwrap()).unwrap();

    assert!(markdown.starts_with("# What is <quantum> computing?"));
    assert!(markdown.contains("*Generated: 2025-06-01 08:30:00 UTC*"));
    assert!(markdown.contains("Quantum computers use **qubits**."));
    assert!(markdown.contains("1. [Qubits explained](https://example.com/qubits)"));
    assert!(markdown.contains("2. [https://example.org/intro](https://example.org/intro)"));
}

#[test]
fn test_html_is_escaped_and_formatted() {
    let html = String::from_utf8(ReportExporter::render(&sample_record(), ExportFormat::Html).unwrap()).unwrap();

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("What is &lt;quantum&gt; computing?"));
    assert!(!html.contains("<quantum>"));
    assert!(html.contains("<strong>qubits</strong>"));
    assert!(html.contains("<li>superposition</li>"));
    assert!(html.contains(r#"href="https://example.com/qubits""#));
    assert!(!html.contains("{{"));
}

#[test]
fn test_write_creates_directory_and_file() {
    let temp = TempDir::new().unwrap();
    let exporter = ReportExporter::with_output_dir(temp.path().join("reports/nested"));
    let record = sample_record();

    let path = exporter.write(&record, ExportFormat::Html).unwrap();

    assert!(path.exists());
    assert!(path.starts_with(exporter.output_dir()));
    assert_eq!(path.extension().and_then(|e| e.to_str()), Some("html"));
    let file_name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(file_name.starts_with("20250601_083000_What_is_quantum_computing"));

    let written = std::fs::read(&path).unwrap();
    assert_eq!(written, ReportExporter::render(&record, ExportFormat::Html).unwrap());
}

#[test]
fn test_write_twice_is_byte_identical() {
    let temp = TempDir::new().unwrap();
    let exporter = ReportExporter::with_output_dir(temp.path());
    let record = sample_record();

    let first_path = exporter.write(&record, ExportFormat::Markdown).unwrap();
    let first = std::fs::read(&first_path).unwrap();
    let second_path = exporter.write(&record, ExportFormat::Markdown).unwrap();
    let second = std::fs::read(&second_path).unwrap();

    assert_eq!(first_path, second_path);
    assert_eq!(first, second);
}

#[test]
fn test_unsupported_format() {
    let err = "pdf".parse::<ExportFormat>().unwrap_err();
    assert!(matches!(&err, ExportError::UnsupportedFormat(f) if f == "pdf"));
    assert!(err.to_string().contains("pdf"));
}

#[test]
fn test_write_into_unwritable_location_fails() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("not-a-dir");
    std::fs::write(&blocker, "file").unwrap();

    let exporter = ReportExporter::with_output_dir(&blocker);
    assert!(matches!(
        exporter.write(&sample_record(), ExportFormat::Json),
        Err(ExportError::Io { .. })
    ));
}
