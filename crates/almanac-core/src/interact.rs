use std::io::{self, BufRead, Write};

use anyhow::Context;

/// Synchronous user-dialog capability. Validation messages, delete
/// confirmation, and edit prompts all go through this seam so command flows
/// stay deterministic under test.
pub trait Interact {
    fn alert(&mut self, message: &str);

    fn confirm(&mut self, prompt: &str) -> anyhow::Result<bool>;

    /// Asks for a line of text, offering `default` as the starting value.
    /// `None` means the user cancelled (end of input).
    fn request_text(&mut self, prompt: &str, default: &str) -> anyhow::Result<Option<String>>;
}

/// Console dialogs: prompts on stderr, answers from stdin.
#[derive(Debug, Default)]
pub struct ConsoleInteract;

impl ConsoleInteract {
    fn read_line(&self) -> anyhow::Result<Option<String>> {
        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .context("failed reading response from stdin")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

impl Interact for ConsoleInteract {
    fn alert(&mut self, message: &str) {
        eprintln!("{message}");
    }

    fn confirm(&mut self, prompt: &str) -> anyhow::Result<bool> {
        eprint!("{prompt} [y/N] ");
        io::stderr().flush().ok();

        let Some(answer) = self.read_line()? else {
            return Ok(false);
        };
        Ok(matches!(
            answer.trim().to_ascii_lowercase().as_str(),
            "y" | "yes"
        ))
    }

    fn request_text(&mut self, prompt: &str, default: &str) -> anyhow::Result<Option<String>> {
        eprint!("{prompt} [{default}]: ");
        io::stderr().flush().ok();
        self.read_line()
    }
}
