//! Core library for Lonai, a command-line research assistant.
//!
//! A research call searches the web, has an LLM synthesize a sourced
//! report, stores the result as a [`ResearchRecord`] and optionally
//! exports it as Markdown, HTML or JSON.

pub mod agent;
pub mod config;
pub mod export;
pub mod llm;
pub mod research;
pub mod search;
pub mod storage;
pub mod validate;

pub use agent::{AgentError, AgentFramework, AgentOutput, AgentRequest, SearchAgent};
pub use config::{Config, ConfigError};
pub use export::{ExportError, ExportFormat, ReportExporter};
pub use research::{
    Orchestrator, ResearchError, ResearchOutcome, ResearchRecord, ResearchRequest,
    SourceReference,
};
pub use storage::{FileStore, RecordStore, StorageError};
