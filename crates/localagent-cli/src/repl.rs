//! Interactive REPL on top of `rustyline`.
//!
//! History lives only for the session. A failed turn is reported and the
//! prompt comes back; only `exit`, `quit`, Ctrl-C or Ctrl-D end the loop.

use std::io::{self, Write};

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::debug;

use localagent_agent::Agent;

use crate::helpers;

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit"];

/// Run the interactive REPL on stdin/stdout.
pub async fn run(agent: &Agent) -> Result<()> {
    let mut editor = DefaultEditor::new()?;
    let mut stdout = io::stdout();
    run_session(agent, || read_input(&mut editor), &mut stdout).await
}

/// Drive the loop with any line source and sink.
///
/// `next_line` returns `Ok(None)` when input ends (EOF or interrupt). A read
/// error ends the session with that error.
pub async fn run_session<F, W>(agent: &Agent, mut next_line: F, out: &mut W) -> Result<()>
where
    F: FnMut() -> Result<Option<String>>,
    W: Write,
{
    while let Some(line) = next_line()? {
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if is_exit_command(input) {
            writeln!(out, "\nGoodbye! 👋")?;
            break;
        }

        debug!(input_len = input.len(), "processing input");
        helpers::print_thinking();
        let outcome = agent.run(input).await;
        helpers::clear_thinking();

        match outcome {
            Ok(answer) => writeln!(out, "{}\n", helpers::format_answer(&answer))?,
            Err(e) => writeln!(out, "{}\n", helpers::format_error(&e.to_string()))?,
        }
        out.flush()?;
    }
    Ok(())
}

fn read_input(editor: &mut DefaultEditor) -> Result<Option<String>> {
    match editor.readline("You: ") {
        Ok(line) => {
            if !line.trim().is_empty() {
                let _ = editor.add_history_entry(line.as_str());
            }
            Ok(Some(line))
        }
        Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
        Err(e) => Err(e).context("failed to read input"),
    }
}

/// Check if input is an exit command.
fn is_exit_command(input: &str) -> bool {
    let lower = input.trim().to_lowercase();
    EXIT_COMMANDS.contains(&lower.as_str())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
