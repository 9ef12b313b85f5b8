//! Research records and the orchestrator that produces them.

mod record;
mod runner;

pub use record::{RecordId, ResearchRecord, SourceReference, TraceStep};
pub use runner::{Orchestrator, ResearchError, ResearchOutcome, ResearchRequest};
