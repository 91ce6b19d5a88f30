//! Interactive console session.

use super::{build_orchestrator, transcript_source};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::session::Session;
use console::style;
use std::io::{self, BufRead, Write};
use tracing::debug;

/// Words that end the session.
const QUIT_WORDS: &[&str] = &["quit", "exit"];

/// Word that starts credential re-entry.
const KEY_WORD: &str = "key";

/// What one console line asks for.
#[derive(Debug, PartialEq, Eq)]
enum ChatInput {
    Quit,
    Key,
    Utterance,
}

impl ChatInput {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        if QUIT_WORDS.iter().any(|w| line.eq_ignore_ascii_case(w)) {
            ChatInput::Quit
        } else if line.eq_ignore_ascii_case(KEY_WORD) {
            ChatInput::Key
        } else {
            ChatInput::Utterance
        }
    }
}

/// Run the interactive chat command.
pub async fn run_chat(api_key: Option<&str>, settings: Settings) -> anyhow::Result<()> {
    preflight::check(Operation::Chat, &settings, api_key)?;

    println!("\n{}", style("Clipwise").bold().cyan());
    println!(
        "{}\n",
        style("Enter your question with the YouTube URL, 'key' to change API key, or 'quit' to exit.").dim()
    );

    let mut session = match settings.resolve_api_key(api_key) {
        Some(key) => match Session::validate(&key, &settings.model).await {
            Ok(session) => Some(session),
            Err(e) => {
                Output::error(&format!("{}", e));
                None
            }
        },
        None => None,
    };
    if session.is_none() {
        session = prompt_for_session(&settings).await?;
    }
    let Some(mut session) = session else {
        return Ok(());
    };
    Output::success(&format!("API key validated ({})", session.masked_credential()));

    let transcripts = transcript_source(&settings)?;
    let mut orchestrator = build_orchestrator(&session, &transcripts, &settings)?;

    loop {
        let Some(input) = read_line(&format!("{} ", style("You:").green().bold()))? else {
            break;
        };

        match ChatInput::parse(&input) {
            ChatInput::Quit => break,
            ChatInput::Key => match prompt_for_session(&settings).await? {
                Some(new_session) => {
                    session = new_session;
                    Output::success(&format!(
                        "API key validated ({})",
                        session.masked_credential()
                    ));
                    orchestrator = build_orchestrator(&session, &transcripts, &settings)?;
                }
                None => Output::info("Keeping the current API key."),
            },
            ChatInput::Utterance => {
                // Each answer is awaited before the next line is read, so the
                // console never has two requests in flight.
                let spinner = Output::spinner("Processing...");
                let outcome = orchestrator.handle(&input).await;
                spinner.finish_and_clear();

                match outcome {
                    Ok(answer) => Output::answer(&answer),
                    Err(e) if e.is_validation() => Output::warning(&format!("{}", e)),
                    Err(e) => Output::error(&format!("Error: {}", e)),
                }
            }
        }
    }

    Output::info("Goodbye!");
    Ok(())
}

/// Ask for an API key until one validates. Returns `None` on EOF or a quit word.
async fn prompt_for_session(settings: &Settings) -> anyhow::Result<Option<Session>> {
    loop {
        let Some(key) = read_line("Enter your OpenAI API key: ")? else {
            return Ok(None);
        };
        if QUIT_WORDS.iter().any(|w| key.trim().eq_ignore_ascii_case(w)) {
            return Ok(None);
        }

        let spinner = Output::spinner("Validating API key...");
        let result = Session::validate(&key, &settings.model).await;
        spinner.finish_and_clear();

        match result {
            Ok(session) => return Ok(Some(session)),
            Err(e) => Output::error(&format!("{}", e)),
        }
    }
}

/// Print a prompt and read one line. Returns `None` at end of input.
fn read_line(prompt: &str) -> io::Result<Option<String>> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    let read = io::stdin().lock().read_line(&mut input)?;
    if read == 0 {
        debug!("stdin closed");
        return Ok(None);
    }

    Ok(Some(input.trim_end_matches(['\r', '\n']).to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_words() {
        assert_eq!(ChatInput::parse("quit"), ChatInput::Quit);
        assert_eq!(ChatInput::parse("  EXIT \n"), ChatInput::Quit);
        assert_eq!(ChatInput::parse("Key"), ChatInput::Key);
    }

    #[test]
    fn test_everything_else_is_an_utterance() {
        for line in ["", "   ", "summarize: https://youtu.be/dQw4w9WgXcQ", "key points please"] {
            assert_eq!(ChatInput::parse(line), ChatInput::Utterance, "line: {:?}", line);
        }
    }
}
