use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "lonai")]
#[command(version, about = "AI research assistant: web search plus LLM synthesis", long_about = None)]
pub struct Cli {
    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Research a question and print the report
    Research(ResearchArgs),
    /// Ask questions one after another
    Chat(ChatArgs),
    /// Browse, search, export or delete saved research
    History(HistoryArgs),
    /// Research every query in a file, one per line
    Batch(BatchArgs),
    /// Show the active configuration with secrets masked
    Config,
}

#[derive(Args)]
pub struct ResearchArgs {
    /// The research question; prompted for when omitted
    pub query: Vec<String>,

    /// Report language (auto-detected from the query when omitted)
    #[arg(short, long, value_parser = ["en", "zh"])]
    pub lang: Option<String>,

    /// Do not save the result to history
    #[arg(long)]
    pub no_save: bool,

    /// Export a formatted report
    #[arg(short, long)]
    pub export: bool,

    /// Export format: markdown, html or json
    #[arg(short, long)]
    pub format: Option<String>,
}

#[derive(Args)]
pub struct ChatArgs {
    /// Prompt for each question even when stdin is not a terminal
    #[arg(short, long)]
    pub interactive: bool,

    /// Report language
    #[arg(short, long, value_parser = ["en", "zh"])]
    pub lang: Option<String>,
}

#[derive(Args)]
pub struct HistoryArgs {
    /// Number of records to show
    #[arg(short = 'n', long, default_value_t = 10)]
    pub limit: usize,

    /// Number of newest records to skip
    #[arg(long, default_value_t = 0)]
    pub offset: usize,

    /// Only show records whose query contains this text
    #[arg(short, long)]
    pub search: Option<String>,

    /// Print one record in full
    #[arg(long, value_name = "ID")]
    pub show: Option<String>,

    /// Delete a record
    #[arg(long, value_name = "ID")]
    pub delete: Option<String>,

    /// Export a record as a report
    #[arg(long, value_name = "ID")]
    pub export: Option<String>,

    /// Format for --export
    #[arg(short, long, requires = "export")]
    pub format: Option<String>,
}

#[derive(Args)]
pub struct BatchArgs {
    /// File with one query per line
    pub file: PathBuf,

    /// Report language
    #[arg(short, long, value_parser = ["en", "zh"])]
    pub lang: Option<String>,

    /// Do not save results to history
    #[arg(long)]
    pub no_save: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_research_args() {
        let cli = Cli::try_parse_from([
            "lonai", "research", "what", "is", "rust", "--lang", "zh", "--export", "--format", "html",
        ])
        .unwrap();

        let Commands::Research(args) = cli.command else {
            panic!("expected research command");
        };
        assert_eq!(args.query.join(" "), "what is rust");
        assert_eq!(args.lang.as_deref(), Some("zh"));
        assert!(args.export);
        assert!(!args.no_save);
        assert_eq!(args.format.as_deref(), Some("html"));
    }

    #[test]
    fn test_unknown_language_rejected() {
        assert!(Cli::try_parse_from(["lonai", "research", "q", "--lang", "fr"]).is_err());
    }

    #[test]
    fn test_history_defaults() {
        let cli = Cli::try_parse_from(["lonai", "-v", "history"]).unwrap();
        assert!(cli.verbose);
        let Commands::History(args) = cli.command else {
            panic!("expected history command");
        };
        assert_eq!(args.limit, 10);
        assert_eq!(args.offset, 0);
        assert!(args.search.is_none());
    }

    #[test]
    fn test_history_format_requires_export() {
        assert!(Cli::try_parse_from(["lonai", "history", "--format", "json"]).is_err());
        assert!(Cli::try_parse_from(["lonai", "history", "--export", "abc", "--format", "json"]).is_ok());
    }
}
