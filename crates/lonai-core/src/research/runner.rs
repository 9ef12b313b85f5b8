use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::agent::{AgentError, AgentFramework, AgentOutput, AgentRequest};
use crate::config::{Config, SUPPORTED_LANGUAGES};
use crate::export::{ExportError, ExportFormat, ReportExporter};
use crate::research::ResearchRecord;
use crate::storage::{RecordStore, StorageError};
use crate::validate::{contains_cjk, validate_query};

/// Errors that can occur during research.
#[derive(Debug, Error)]
pub enum ResearchError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Unsupported language '{0}'. Supported: en, zh")]
    InvalidLanguage(String),

    #[error("Upstream service error: {0}")]
    Upstream(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

/// Parameters of one research call.
#[derive(Debug, Clone, PartialEq)]
pub struct ResearchRequest {
    pub query: String,
    /// Report language; the configured language when `None`
    pub language: Option<String>,
    /// Persist the record
    pub save: bool,
    /// Write a report file
    pub export: bool,
    /// Report format name; the configured default when `None`
    pub format: Option<String>,
}

impl ResearchRequest {
    /// A request that saves the record and does not export.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            language: None,
            save: true,
            export: false,
            format: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_save(mut self, save: bool) -> Self {
        self.save = save;
        self
    }

    pub fn with_export(mut self, format: Option<String>) -> Self {
        self.export = true;
        self.format = format;
        self
    }
}

/// Result of a successful research call.
///
/// Save and export problems do not fail the call; they end up in `warnings`.
#[derive(Debug, Clone)]
pub struct ResearchOutcome {
    pub record: ResearchRecord,
    pub saved: bool,
    pub report_path: Option<PathBuf>,
    pub warnings: Vec<String>,
}

/// Drives the agent and wires its output into storage and export.
pub struct Orchestrator<A: AgentFramework> {
    agent: A,
    store: Box<dyn RecordStore>,
    exporter: ReportExporter,
    language: String,
    default_format: ExportFormat,
    timeout: Duration,
}

impl<A: AgentFramework> Orchestrator<A> {
    /// Creates an orchestrator using the language, timeout and default
    /// export format from `config`.
    pub fn new(
        config: &Config,
        agent: A,
        store: Box<dyn RecordStore>,
        exporter: ReportExporter,
    ) -> Self {
        Self {
            agent,
            store,
            exporter,
            language: config.language.clone(),
            default_format: config.export.default_format,
            timeout: config.timeout,
        }
    }

    /// Overrides the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    pub fn exporter(&self) -> &ReportExporter {
        &self.exporter
    }

    /// Format used when a request does not name one.
    pub fn default_format(&self) -> ExportFormat {
        self.default_format
    }

    /// Researches one question.
    pub async fn research(&self, request: ResearchRequest) -> Result<ResearchOutcome, ResearchError> {
        let query = validate_query(&request.query)
            .map_err(|e| ResearchError::InvalidQuery(e.to_string()))?
            .to_string();
        let language = self.resolve_language(&query, request.language.as_deref())?;

        info!(query = %query, language = %language, "starting research");

        let output = self
            .run_agent(&AgentRequest::new(query.clone(), language.clone()))
            .await?;

        if output.response.trim().is_empty() {
            return Err(ResearchError::Upstream(
                "agent returned an empty response".to_string(),
            ));
        }

        let mut record = ResearchRecord::new(query, language, output.response)
            .with_sources(output.sources)
            .with_trace(output.trace);
        if let (Some(provider), Some(model)) = (output.provider, output.model) {
            record = record.with_backend(provider, model);
        }

        let mut warnings = Vec::new();

        // Export first so the saved record carries the export marker
        let mut report_path = None;
        if request.export {
            match self.export_new(&mut record, request.format.as_deref()) {
                Ok(path) => report_path = Some(path),
                Err(e) => {
                    warn!(error = %e, "export failed");
                    warnings.push(format!("Export failed: {e}"));
                }
            }
        }

        let mut saved = false;
        if request.save {
            match self.store.save(&record) {
                Ok(id) => {
                    info!(id = %id, "research saved");
                    saved = true;
                }
                Err(e) => {
                    warn!(error = %e, "saving research failed");
                    warnings.push(format!("Save failed: {e}"));
                }
            }
        }

        info!(id = %record.id, sources = record.sources.len(), "research complete");

        Ok(ResearchOutcome {
            record,
            saved,
            report_path,
            warnings,
        })
    }

    /// Researches each query in turn. A failed query does not stop the batch.
    pub async fn batch(
        &self,
        queries: &[String],
        language: Option<&str>,
        save: bool,
    ) -> Vec<Result<ResearchOutcome, ResearchError>> {
        let mut results = Vec::with_capacity(queries.len());

        for (i, query) in queries.iter().enumerate() {
            info!(index = i + 1, total = queries.len(), "batch query");

            let mut request = ResearchRequest::new(query.as_str()).with_save(save);
            if let Some(lang) = language {
                request = request.with_language(lang);
            }

            let result = self.research(request).await;
            if let Err(e) = &result {
                warn!(query = %query, error = %e, "batch query failed");
            }
            results.push(result);
        }

        results
    }

    /// Lists stored records, newest first.
    pub fn history(&self, limit: usize, offset: usize) -> Result<Vec<ResearchRecord>, ResearchError> {
        Ok(self.store.list(limit, offset)?)
    }

    /// Finds stored records whose query contains `keyword`, newest first,
    /// paged like [`Orchestrator::history`].
    pub fn search_history(
        &self,
        keyword: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<ResearchRecord>, ResearchError> {
        if limit == 0 {
            return Err(StorageError::InvalidArgument(
                "limit must be a positive integer".to_string(),
            )
            .into());
        }

        Ok(self
            .store
            .search(keyword)?
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect())
    }

    pub fn get(&self, id: &str) -> Result<ResearchRecord, ResearchError> {
        Ok(self.store.get(id)?)
    }

    pub fn delete(&self, id: &str) -> Result<(), ResearchError> {
        Ok(self.store.delete(id)?)
    }

    /// Exports a stored record and marks it as exported.
    pub fn export_record(&self, id: &str, format: ExportFormat) -> Result<PathBuf, ResearchError> {
        let mut record = self.store.get(id)?;
        record.export_format = Some(format);

        let path = self.exporter.write(&record, format)?;
        self.store.mark_exported(&record.id, format)?;

        Ok(path)
    }

    fn resolve_language(&self, query: &str, requested: Option<&str>) -> Result<String, ResearchError> {
        let language = match requested.map(str::trim).filter(|l| !l.is_empty()) {
            Some(lang) => lang.to_lowercase(),
            None if contains_cjk(query) => "zh".to_string(),
            None => self.language.clone(),
        };

        if !SUPPORTED_LANGUAGES.contains(&language.as_str()) {
            return Err(ResearchError::InvalidLanguage(language));
        }
        Ok(language)
    }

    /// Runs the agent, retrying once after a timeout or a retryable failure.
    async fn run_agent(&self, request: &AgentRequest) -> Result<AgentOutput, ResearchError> {
        let first = match self.attempt(request).await {
            Ok(output) => return Ok(output),
            Err(Attempt::TimedOut) => format!("timed out after {}s", self.timeout.as_secs()),
            Err(Attempt::Failed(e)) if e.is_retryable() => e.to_string(),
            Err(Attempt::Failed(e)) => return Err(ResearchError::Upstream(e.to_string())),
        };

        warn!(error = %first, "agent attempt failed, retrying once");

        match self.attempt(request).await {
            Ok(output) => Ok(output),
            Err(Attempt::TimedOut) => Err(ResearchError::Upstream(format!(
                "timed out after {}s",
                self.timeout.as_secs()
            ))),
            Err(Attempt::Failed(e)) => Err(ResearchError::Upstream(e.to_string())),
        }
    }

    async fn attempt(&self, request: &AgentRequest) -> Result<AgentOutput, Attempt> {
        match timeout(self.timeout, self.agent.run(request)).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(Attempt::Failed(e)),
            Err(_) => Err(Attempt::TimedOut),
        }
    }

    fn export_new(&self, record: &mut ResearchRecord, format: Option<&str>) -> Result<PathBuf, ExportError> {
        let format = match format {
            Some(name) => name.parse()?,
            None => self.default_format,
        };

        record.export_format = Some(format);
        let written = self.exporter.write(record, format);
        if written.is_err() {
            record.export_format = None;
        }
        written
    }
}

enum Attempt {
    TimedOut,
    Failed(AgentError),
}

