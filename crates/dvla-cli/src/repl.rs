//! Interactive REPL.
//!
//! Uses `rustyline` for readline-style editing with persistent history. Each
//! line goes through the same single-event stream as `dvla ask`.

use std::sync::Arc;

use anyhow::Result;
use futures_util::StreamExt;
use rustyline::config::Configurer;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tracing::debug;

use dvla_agent::{stream_chat, AgentLoop};
use dvla_core::events::{ChatRequest, StreamEvent};

use crate::helpers;

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

/// Run the interactive REPL loop against one conversation.
pub async fn run(agent: Arc<AgentLoop>, conversation_id: &str) -> Result<()> {
    helpers::print_banner(agent.store().welcome());

    let mut editor = create_editor()?;

    loop {
        let input = match editor.readline("You: ") {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted)
            | Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }
        if is_exit_command(trimmed) {
            println!("\nGoodbye!");
            break;
        }

        let _ = editor.add_history_entry(&input);

        debug!(conversation = conversation_id, input = trimmed, "processing input");
        helpers::print_thinking();

        let request = ChatRequest::new(trimmed).with_conversation(conversation_id);
        let event = Box::pin(stream_chat(agent.clone(), request))
            .next()
            .await
            .unwrap_or_else(|| StreamEvent::error("no event produced"));

        helpers::clear_thinking();
        let text = event.payload_text().unwrap_or_default();
        if event.is_error() {
            eprintln!("\nError: {text}\n");
        } else {
            helpers::print_response(&text);
        }
    }

    save_history(&mut editor);
    Ok(())
}

fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded REPL history from {}", history_path.display());
    }

    Ok(editor)
}

fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

fn history_path() -> std::path::PathBuf {
    dvla_core::utils::get_data_path()
        .join("history")
        .join("cli_history")
}

fn is_exit_command(input: &str) -> bool {
    let lower = input.to_lowercase();
    EXIT_COMMANDS.contains(&lower.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_commands() {
        assert!(is_exit_command("exit"));
        assert!(is_exit_command("QUIT"));
        assert!(is_exit_command("/exit"));
        assert!(is_exit_command(":q"));
        assert!(!is_exit_command("show my transactions"));
        assert!(!is_exit_command(""));
    }

    #[test]
    fn history_path_under_data_dir() {
        let path = history_path();
        assert!(path.to_string_lossy().contains(".dvla"));
        assert!(path.ends_with("history/cli_history"));
    }
}
