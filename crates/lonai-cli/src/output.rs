//! Terminal output helpers.
//!
//! Results go to stdout; errors and warnings go to stderr.

use std::io::{self, BufRead, Write};

use lonai_core::{ResearchOutcome, ResearchRecord};

const QUERY_COLUMN_WIDTH: usize = 60;

pub fn header(title: &str) {
    println!();
    println!("{title}");
    println!("{}", "=".repeat(title.chars().count()));
    println!();
}

pub fn info(message: &str) {
    println!("ℹ {message}");
}

pub fn success(message: &str) {
    println!("✓ {message}");
}

pub fn warning(message: &str) {
    eprintln!("⚠ {message}");
}

pub fn error(message: &str) {
    eprintln!("✗ {message}");
}

/// Prints `message` and reads one trimmed line from stdin.
///
/// Returns `None` at end of input.
pub fn prompt(message: &str) -> io::Result<Option<String>> {
    print!("{message} ");
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Prints a research outcome: the report, its sources and where it went.
pub fn outcome(outcome: &ResearchOutcome) {
    let record = &outcome.record;

    println!();
    println!("Research Result");
    println!("{}", "-".repeat(15));
    println!("Query: {}", record.query);
    println!();
    println!("{}", record.response.trim());

    sources(record);

    println!();
    if outcome.saved {
        success(&format!("Saved to history: {}", record.id));
    }
    if let Some(path) = &outcome.report_path {
        success(&format!("Report exported to: {}", path.display()));
    }
    for message in &outcome.warnings {
        warning(message);
    }
}

/// Prints just the report text, for chat.
pub fn response(record: &ResearchRecord) {
    println!();
    println!("{}", record.response.trim());
    sources(record);
}

fn sources(record: &ResearchRecord) {
    if record.sources.is_empty() {
        return;
    }

    println!();
    println!("Sources:");
    for (i, source) in record.sources.iter().enumerate() {
        println!("  {}. {} <{}>", i + 1, source.display_title(), source.url);
    }
}

/// Prints records as a numbered table.
pub fn history(records: &[ResearchRecord], offset: usize) {
    if records.is_empty() {
        warning("No research history found.");
        return;
    }

    println!("{:<4} {:<36} {:<20} Query", "#", "ID", "Created (UTC)");
    for (i, record) in records.iter().enumerate() {
        println!(
            "{:<4} {:<36} {:<20} {}",
            offset + i + 1,
            record.id,
            record.created_at.format("%Y-%m-%d %H:%M:%S"),
            record.title(QUERY_COLUMN_WIDTH)
        );
    }
}

/// Prints one record with its metadata and trace.
pub fn record(record: &ResearchRecord) {
    header(&record.title(QUERY_COLUMN_WIDTH));

    println!("ID:       {}", record.id);
    println!("Created:  {}", record.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("Language: {}", record.language);
    if let (Some(provider), Some(model)) = (&record.provider, &record.model) {
        println!("Backend:  {provider} / {model}");
    }
    if let Some(format) = record.export_format {
        println!("Exported: {format}");
    }
    if !record.trace.is_empty() {
        println!("Trace:");
        for step in &record.trace {
            println!("  - {}: {}", step.step, step.detail);
        }
    }

    println!();
    println!("{}", record.response.trim());
    sources(record);
}
