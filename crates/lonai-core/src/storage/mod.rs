mod error;
mod file;

pub use error::StorageError;
pub use file::FileStore;

use crate::export::ExportFormat;
use crate::research::{RecordId, ResearchRecord};

/// Trait for research record storage backends.
///
/// Records are append-only: saving never overwrites an existing record,
/// and the only in-place change is the export marker.
pub trait RecordStore: Send + Sync {
    /// Appends a record and returns its id.
    fn save(&self, record: &ResearchRecord) -> Result<RecordId, StorageError>;

    /// Loads a record by id.
    fn get(&self, id: &str) -> Result<ResearchRecord, StorageError>;

    /// Lists records newest first, skipping `offset` and returning at most `limit`.
    fn list(&self, limit: usize, offset: usize) -> Result<Vec<ResearchRecord>, StorageError>;

    /// Finds records whose query contains `keyword`, ignoring case, newest first.
    fn search(&self, keyword: &str) -> Result<Vec<ResearchRecord>, StorageError>;

    /// Deletes a record.
    fn delete(&self, id: &str) -> Result<(), StorageError>;

    /// Records the format a record was exported to.
    fn mark_exported(&self, id: &str, format: ExportFormat) -> Result<(), StorageError>;

    /// Number of stored records.
    fn count(&self) -> Result<usize, StorageError>;
}
