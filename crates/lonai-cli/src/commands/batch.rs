use std::fs;
use std::path::Path;

use color_eyre::eyre::{bail, Result, WrapErr};

use crate::app::Researcher;
use crate::cli::BatchArgs;
use crate::output;
use crate::progress::Spinner;

/// Reads one query per non-empty line.
fn read_queries(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

pub async fn run(app: &Researcher, args: BatchArgs) -> Result<()> {
    let queries = read_queries(&args.file)?;
    if queries.is_empty() {
        output::warning("No queries found in file.");
        return Ok(());
    }

    output::header("Batch Research");
    output::info(&format!(
        "Processing {} queries from {}",
        queries.len(),
        args.file.display()
    ));

    let spinner = Spinner::start(&format!("Processing {} queries...", queries.len()));
    let results = app
        .batch(&queries, args.lang.as_deref(), !args.no_save)
        .await;
    spinner.finish();

    println!();
    let mut failed = 0;
    for (i, (query, result)) in queries.iter().zip(&results).enumerate() {
        match result {
            Ok(outcome) => {
                output::success(&format!("{}. {query} ({})", i + 1, outcome.record.id));
                for message in &outcome.warnings {
                    output::warning(&format!("   {message}"));
                }
            }
            Err(e) => {
                failed += 1;
                output::error(&format!("{}. {query}: {e}", i + 1));
            }
        }
    }

    println!();
    output::info(&format!(
        "Completed {} of {} queries.",
        queries.len() - failed,
        queries.len()
    ));

    if failed > 0 {
        bail!("{failed} of {} queries failed", queries.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_queries_skips_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "quantum computing\n\n   \n  climate change  ").unwrap();

        let queries = read_queries(file.path()).unwrap();
        assert_eq!(queries, vec!["quantum computing", "climate change"]);
    }

    #[test]
    fn test_read_queries_missing_file() {
        assert!(read_queries(Path::new("/definitely/not/here.txt")).is_err());
    }
}
