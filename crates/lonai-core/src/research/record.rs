use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::export::ExportFormat;
use crate::validate::{validate_source_url, ValidationError};

/// Identifier of a persisted research record.
pub type RecordId = String;

/// The persisted outcome of one research query.
///
/// Records are immutable once created, apart from `export_format`, which
/// the store updates when the record is exported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchRecord {
    /// Unique identifier, generated at creation
    pub id: RecordId,
    /// The research question as asked
    pub query: String,
    /// Language tag the report was written in
    pub language: String,
    /// Final report text produced by the agent
    pub response: String,
    /// Sources cited by the agent, in the order it reported them
    pub sources: Vec<SourceReference>,
    /// When the record was created
    pub created_at: DateTime<Utc>,
    /// Format the record was last exported to
    #[serde(default)]
    pub export_format: Option<ExportFormat>,
    /// Provider that produced the response
    #[serde(default)]
    pub provider: Option<String>,
    /// Model that produced the response
    #[serde(default)]
    pub model: Option<String>,
    /// Sub-task trace reported by the agent
    #[serde(default)]
    pub trace: Vec<TraceStep>,
}

impl ResearchRecord {
    /// Creates a new record stamped with the current time.
    pub fn new(
        query: impl Into<String>,
        language: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            query: query.into(),
            language: language.into(),
            response: response.into(),
            sources: Vec::new(),
            created_at: Utc::now(),
            export_format: None,
            provider: None,
            model: None,
            trace: Vec::new(),
        }
    }

    pub fn with_sources(mut self, sources: Vec<SourceReference>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_trace(mut self, trace: Vec<TraceStep>) -> Self {
        self.trace = trace;
        self
    }

    /// Records which backend produced the response.
    pub fn with_backend(mut self, provider: impl Into<String>, model: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self.model = Some(model.into());
        self
    }

    /// Returns the first line of the query, shortened for list views.
    pub fn title(&self, max_chars: usize) -> String {
        let first_line = self.query.lines().next().unwrap_or_default().trim();
        if first_line.chars().count() <= max_chars {
            return first_line.to_string();
        }
        let truncated: String = first_line.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

/// A web source referenced by a research record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReference {
    pub url: String,
    pub title: String,
}

impl SourceReference {
    /// Creates a source after checking that `url` is a well-formed http(s) URL.
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Result<Self, ValidationError> {
        let url = url.into();
        validate_source_url(&url)?;
        Ok(Self {
            url,
            title: title.into(),
        })
    }

    /// Title to show, falling back to the URL when the title is blank.
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.url
        } else {
            self.title.trim()
        }
    }
}

/// One step of the agent's sub-task trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceStep {
    /// Short step name, e.g. `search`
    pub step: String,
    /// Free-form detail about what the step did
    pub detail: String,
}

impl TraceStep {
    pub fn new(step: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_has_unique_id() {
        let a = ResearchRecord::new("q", "en", "r");
        let b = ResearchRecord::new("q", "en", "r");
        assert_ne!(a.id, b.id);
        assert!(a.export_format.is_none());
    }

    #[test]
    fn test_title_truncation() {
        let record = ResearchRecord::new("What is quantum computing?\nMore detail", "en", "r");
        assert_eq!(record.title(80), "What is quantum computing?");
        assert_eq!(record.title(10), "What is...");
    }

    #[test]
    fn test_source_rejects_malformed_url() {
        assert!(SourceReference::new("not a url", "x").is_err());
        assert!(SourceReference::new("ftp://example.com/file", "x").is_err());
        assert!(SourceReference::new("https://example.com/a", "A").is_ok());
    }

    #[test]
    fn test_display_title_falls_back_to_url() {
        let source = SourceReference::new("https://example.com", "  ").unwrap();
        assert_eq!(source.display_title(), "https://example.com");
    }
}
