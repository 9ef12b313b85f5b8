use std::io::{IsTerminal, Write};

use color_eyre::eyre::Result;
use lonai_core::ResearchRequest;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::app::Researcher;
use crate::cli::ChatArgs;
use crate::output;
use crate::progress::Spinner;

/// What to do with one line of chat input.
#[derive(Debug, PartialEq, Eq)]
enum ChatInput<'a> {
    Skip,
    Exit,
    Help,
    Question(&'a str),
}

fn classify(line: &str) -> ChatInput<'_> {
    let trimmed = line.trim();
    match trimmed.to_lowercase().as_str() {
        "" => ChatInput::Skip,
        "exit" | "quit" | "q" => ChatInput::Exit,
        "help" => ChatInput::Help,
        _ => ChatInput::Question(trimmed),
    }
}

fn print_help() {
    output::info("Commands:");
    output::info("  - Type any question to research it");
    output::info("  - 'exit', 'quit' or 'q' to leave");
    output::info("  - 'help' to show this message");
}

pub async fn run(app: &Researcher, args: ChatArgs) -> Result<()> {
    output::header("Interactive Research Chat");
    output::info("Type 'exit' or 'quit' to end the session.");
    output::info("Type 'help' for available commands.");

    let show_prompt = args.interactive || std::io::stdin().is_terminal();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        if show_prompt {
            print!("\nYour question: ");
            std::io::stdout().flush()?;
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let question = match classify(&line) {
            ChatInput::Skip => continue,
            ChatInput::Exit => {
                output::success("Goodbye!");
                break;
            }
            ChatInput::Help => {
                print_help();
                continue;
            }
            ChatInput::Question(question) => question,
        };

        let mut request = ResearchRequest::new(question);
        if let Some(lang) = &args.lang {
            request = request.with_language(lang.as_str());
        }

        let spinner = Spinner::start("Researching...");
        let result = app.research(request).await;
        spinner.finish();

        match result {
            Ok(outcome) => {
                output::response(&outcome.record);
                for message in &outcome.warnings {
                    output::warning(message);
                }
            }
            Err(e) => output::error(&format!("Research failed: {e}")),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify("   "), ChatInput::Skip);
        assert_eq!(classify("EXIT"), ChatInput::Exit);
        assert_eq!(classify(" q "), ChatInput::Exit);
        assert_eq!(classify("quit"), ChatInput::Exit);
        assert_eq!(classify("Help"), ChatInput::Help);
        assert_eq!(
            classify("  what is rust?  "),
            ChatInput::Question("what is rust?")
        );
    }
}
