//! Input validation and sanitizing helpers.

use thiserror::Error;

use crate::config::DEFAULT_FILENAME_LENGTH;

/// Validation failures for user-supplied values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Query cannot be empty")]
    EmptyQuery,

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Trims a research query and rejects it when nothing is left.
pub fn validate_query(query: &str) -> Result<&str, ValidationError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyQuery);
    }
    Ok(trimmed)
}

/// Checks that `url` parses and uses http or https.
pub fn validate_source_url(url: &str) -> Result<(), ValidationError> {
    let parsed = url::Url::parse(url).map_err(|e| ValidationError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ValidationError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{scheme}'"),
        }),
    }
}

/// Returns true when the text contains CJK unified ideographs.
pub fn contains_cjk(text: &str) -> bool {
    text.chars().any(|c| ('\u{4e00}'..='\u{9fff}').contains(&c))
}

/// Turns arbitrary text into a file-name fragment.
///
/// Keeps alphanumerics (including non-ASCII letters), collapses everything
/// else into single underscores, and limits the result to
/// `DEFAULT_FILENAME_LENGTH` characters.
pub fn sanitize_filename(text: &str) -> String {
    let mut out = String::new();
    let mut last_was_sep = true;

    for c in text.chars() {
        if c.is_alphanumeric() {
            out.push(c);
            last_was_sep = false;
        } else if !last_was_sep {
            out.push('_');
            last_was_sep = true;
        }
    }

    let limited: String = out.chars().take(DEFAULT_FILENAME_LENGTH).collect();
    let trimmed = limited.trim_matches('_');

    if trimmed.is_empty() {
        "unnamed".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_query() {
        assert_eq!(validate_query("  hello  "), Ok("hello"));
        assert_eq!(validate_query(""), Err(ValidationError::EmptyQuery));
        assert_eq!(validate_query(" \n\t "), Err(ValidationError::EmptyQuery));
    }

    #[test]
    fn test_contains_cjk() {
        assert!(contains_cjk("最新的AI发展趋势"));
        assert!(!contains_cjk("latest AI trends"));
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("What is quantum computing?"), "What_is_quantum_computing");
        assert_eq!(sanitize_filename("a / b \\ c"), "a_b_c");
        assert_eq!(sanitize_filename("???"), "unnamed");
        assert_eq!(sanitize_filename(&"x".repeat(80)).len(), DEFAULT_FILENAME_LENGTH);
    }
}
