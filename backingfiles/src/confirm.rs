//! Confirmation before destroying existing drives.

use std::io::{BufRead, Write};

use backingfiles_shared::errors::BackingfilesResult;

/// Answers a yes/no question.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> BackingfilesResult<bool>;
}

/// Prompts on stderr and reads one answer line from stdin.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> BackingfilesResult<bool> {
        let mut stderr = std::io::stderr();
        write!(stderr, "{} (yes/cancel) ", prompt)?;
        stderr.flush()?;

        let mut answer = String::new();
        std::io::stdin().lock().read_line(&mut answer)?;
        Ok(is_affirmative(&answer))
    }
}

/// Only answers starting with `y` or `Y` count as yes.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim_start().chars().next(), Some('y' | 'Y'))
}
