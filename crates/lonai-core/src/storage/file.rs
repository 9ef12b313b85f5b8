use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::StorageConfig;
use crate::export::ExportFormat;
use crate::research::{RecordId, ResearchRecord};

use super::error::StorageError;
use super::RecordStore;

/// File-based record store.
///
/// Records live in a single JSON Lines log, one record per line, in
/// insertion order:
/// ```text
/// data/research/
///   records.jsonl        # append-only record log
/// ```
///
/// `save` appends one line with a single write. `delete` and
/// `mark_exported` rewrite the log through a temporary file and a rename,
/// leaving unreadable lines in place.
/// Writers in separate processes are not serialized.
pub struct FileStore {
    config: StorageConfig,
}

impl FileStore {
    /// Creates a store with the given configuration.
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    /// Creates a store in `dir` with the default log file name.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(StorageConfig::in_dir(dir))
    }

    /// Returns the path to the record log.
    pub fn records_path(&self) -> PathBuf {
        self.config.records_path()
    }

    /// Ensures the data directory exists.
    fn ensure_data_dir(&self) -> Result<(), StorageError> {
        let dir = &self.config.data_dir;
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|e| StorageError::write(dir, e))?;
        }
        Ok(())
    }

    /// Reads the raw log; empty when nothing has been saved yet.
    fn read_log(&self) -> Result<String, StorageError> {
        let path = self.records_path();
        if !path.exists() {
            return Ok(String::new());
        }
        fs::read_to_string(&path).map_err(|e| StorageError::read(&path, e))
    }

    /// Loads every record in insertion order.
    fn load_all(&self) -> Result<Vec<ResearchRecord>, StorageError> {
        Ok(parse_log(&self.records_path(), &self.read_log()?))
    }

    /// Rewrites the log, replacing the record `id` with the result of
    /// `edit` or dropping it when `edit` returns `None`.
    ///
    /// All other lines, unreadable ones included, are copied through as-is.
    fn rewrite_record<F>(&self, id: &str, edit: F) -> Result<(), StorageError>
    where
        F: FnOnce(ResearchRecord) -> Option<ResearchRecord>,
    {
        let content = self.read_log()?;
        let mut edit = Some(edit);
        let mut rewritten = String::with_capacity(content.len());

        for line in content.lines().filter(|l| !l.trim().is_empty()) {
            if edit.is_some() {
                if let Ok(record) = serde_json::from_str::<ResearchRecord>(line) {
                    if record.id == id {
                        if let Some(updated) = edit.take().and_then(|f| f(record)) {
                            rewritten.push_str(&serde_json::to_string(&updated)?);
                            rewritten.push('\n');
                        }
                        continue;
                    }
                }
            }
            rewritten.push_str(line);
            rewritten.push('\n');
        }

        if edit.is_some() {
            return Err(StorageError::NotFound(id.to_string()));
        }

        self.ensure_data_dir()?;
        let path = self.records_path();
        let tmp = path.with_extension("jsonl.tmp");
        fs::write(&tmp, rewritten).map_err(|e| StorageError::write(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| StorageError::write(&path, e))?;

        Ok(())
    }

    fn newest_first(mut records: Vec<ResearchRecord>) -> Vec<ResearchRecord> {
        // Reverse first so that records sharing a timestamp keep
        // last-inserted-first order through the stable sort.
        records.reverse();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }
}

fn parse_log(path: &Path, content: &str) -> Vec<ResearchRecord> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(i, line)| match serde_json::from_str(line) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(path = %path.display(), line = i + 1, error = %e, "skipping unreadable record");
                None
            }
        })
        .collect()
}

fn validate_record(record: &ResearchRecord) -> Result<(), StorageError> {
    if record.id.trim().is_empty() {
        return Err(StorageError::InvalidRecord("id is empty".to_string()));
    }
    if record.query.trim().is_empty() {
        return Err(StorageError::InvalidRecord("query is empty".to_string()));
    }
    if record.response.trim().is_empty() {
        return Err(StorageError::InvalidRecord("response is empty".to_string()));
    }
    Ok(())
}

impl RecordStore for FileStore {
    fn save(&self, record: &ResearchRecord) -> Result<RecordId, StorageError> {
        validate_record(record)?;

        let path = self.records_path();
        let content = self.read_log()?;
        let existing = parse_log(&path, &content);
        if existing.iter().any(|r| r.id == record.id) {
            return Err(StorageError::DuplicateId(record.id.clone()));
        }
        if let Some(newest) = existing.iter().map(|r| r.created_at).max() {
            if record.created_at < newest {
                return Err(StorageError::InvalidRecord(format!(
                    "created_at {} is earlier than the newest stored record ({})",
                    record.created_at, newest
                )));
            }
        }

        self.ensure_data_dir()?;

        let mut line = String::new();
        if !content.is_empty() && !content.ends_with('\n') {
            // The last append was cut short; start a fresh line after it
            line.push('\n');
        }
        line.push_str(&serde_json::to_string(record)?);
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| StorageError::write(&path, e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| StorageError::write(&path, e))?;

        tracing::info!(id = %record.id, path = %path.display(), "research record saved");
        Ok(record.id.clone())
    }

    fn get(&self, id: &str) -> Result<ResearchRecord, StorageError> {
        self.load_all()?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    fn list(&self, limit: usize, offset: usize) -> Result<Vec<ResearchRecord>, StorageError> {
        if limit == 0 {
            return Err(StorageError::InvalidArgument(
                "limit must be a positive integer".to_string(),
            ));
        }

        Ok(Self::newest_first(self.load_all()?)
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect())
    }

    fn search(&self, keyword: &str) -> Result<Vec<ResearchRecord>, StorageError> {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            return Err(StorageError::InvalidArgument(
                "search keyword cannot be empty".to_string(),
            ));
        }

        Ok(Self::newest_first(self.load_all()?)
            .into_iter()
            .filter(|r| r.query.to_lowercase().contains(&keyword))
            .collect())
    }

    fn delete(&self, id: &str) -> Result<(), StorageError> {
        self.rewrite_record(id, |_| None)?;

        tracing::info!(id, "research record deleted");
        Ok(())
    }

    fn mark_exported(&self, id: &str, format: ExportFormat) -> Result<(), StorageError> {
        self.rewrite_record(id, |mut record| {
            record.export_format = Some(format);
            Some(record)
        })
    }

    fn count(&self) -> Result<usize, StorageError> {
        Ok(self.load_all()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_skips_bad_lines() {
        let record = ResearchRecord::new("q", "en", "r");
        let content = format!(
            "{}\nnot json\n\n{}\n",
            serde_json::to_string(&record).unwrap(),
            serde_json::to_string(&ResearchRecord::new("q2", "en", "r2")).unwrap()
        );

        let records = parse_log(Path::new("records.jsonl"), &content);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], record);
    }

    #[test]
    fn test_validate_record() {
        assert!(validate_record(&ResearchRecord::new("q", "en", "r")).is_ok());
        assert!(matches!(
            validate_record(&ResearchRecord::new("  ", "en", "r")),
            Err(StorageError::InvalidRecord(_))
        ));
        assert!(matches!(
            validate_record(&ResearchRecord::new("q", "en", "")),
            Err(StorageError::InvalidRecord(_))
        ));
    }
}
