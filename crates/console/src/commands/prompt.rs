//! Interactive terminal prompts.

use std::io::{self, BufRead, Write};

use crate::services::Confirm;

/// Whether an answer counts as a yes. Anything else, including an empty
/// line, is a no.
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Read one line from stdin after printing `prompt` to stderr.
pub fn read_line(prompt: &str) -> io::Result<String> {
    let mut stderr = io::stderr();
    write!(stderr, "{}", prompt)?;
    stderr.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// y/N confirmation on the terminal.
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        match read_line(&format!("{} [y/N] ", prompt)) {
            Ok(answer) => is_yes(&answer),
            Err(e) => {
                tracing::warn!("Could not read confirmation: {}", e);
                false
            }
        }
    }
}
