//! Report rendering and export.
//!
//! [`ReportExporter::render`] is a pure function of the record: the same
//! record and format always produce byte-identical output. Timestamps are
//! taken from the record itself, never from the clock.

mod html;
mod markdown;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::config::ExportConfig;
use crate::research::ResearchRecord;
use crate::validate::sanitize_filename;

/// Errors that can occur while exporting a report.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Unsupported export format '{0}' (expected markdown, html or json)")]
    UnsupportedFormat(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExportError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Output format of an exported report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Markdown,
    Html,
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "markdown",
            ExportFormat::Html => "html",
            ExportFormat::Json => "json",
        }
    }

    /// File extension used when writing the report.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Html => "html",
            ExportFormat::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            "html" => Ok(ExportFormat::Html),
            "json" => Ok(ExportFormat::Json),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Renders research records and writes them to the export directory.
pub struct ReportExporter {
    output_dir: PathBuf,
}

impl ReportExporter {
    /// Creates an exporter writing into the configured output directory.
    pub fn new(config: &ExportConfig) -> Self {
        Self::with_output_dir(&config.output_dir)
    }

    /// Creates an exporter writing into `dir`.
    pub fn with_output_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Renders `record` in `format`.
    pub fn render(record: &ResearchRecord, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
        match format {
            ExportFormat::Markdown => Ok(markdown::render(record).into_bytes()),
            ExportFormat::Html => Ok(html::render(record).into_bytes()),
            ExportFormat::Json => Ok(serde_json::to_vec_pretty(record)?),
        }
    }

    /// File name a record is exported under.
    ///
    /// `<YYYYmmdd_HHMMSS>_<query>_<id prefix>.<ext>`
    pub fn file_name(record: &ResearchRecord, format: ExportFormat) -> String {
        let id_prefix: String = record.id.chars().filter(|c| *c != '-').take(8).collect();
        format!(
            "{}_{}_{}.{}",
            record.created_at.format("%Y%m%d_%H%M%S"),
            sanitize_filename(&record.query),
            id_prefix,
            format.extension()
        )
    }

    /// Renders `record` and writes it into the output directory.
    ///
    /// Returns the path of the written report.
    pub fn write(&self, record: &ResearchRecord, format: ExportFormat) -> Result<PathBuf, ExportError> {
        let bytes = Self::render(record, format)?;

        if !self.output_dir.exists() {
            fs::create_dir_all(&self.output_dir).map_err(|e| ExportError::io(&self.output_dir, e))?;
        }

        let path = self.output_dir.join(Self::file_name(record, format));
        fs::write(&path, bytes).map_err(|e| ExportError::io(&path, e))?;

        tracing::info!(path = %path.display(), format = %format, "report exported");
        Ok(path)
    }
}
