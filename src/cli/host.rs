//! Terminal implementations of the session host seams.

use std::time::{Duration, Instant};

use crate::cli::{output, prompt_passphrase};
use crate::errors::{FortError, Result};
use crate::session::{CredentialPrompt, IdleSignal, PromptReply};

/// Asks for the master passphrase on the terminal.
///
/// `FORT_PASSPHRASE` is used instead when set. A blank entry counts as
/// cancelling the prompt.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    pub fn new() -> Self {
        Self
    }
}

impl CredentialPrompt for TerminalPrompt {
    fn request_passphrase(&mut self) -> Result<PromptReply> {
        match prompt_passphrase("Master passphrase") {
            Ok(pass) if pass.is_empty() => Ok(PromptReply::Cancelled),
            Ok(pass) => Ok(PromptReply::Submitted(pass)),
            Err(FortError::CommandFailed(msg)) => {
                output::warning(&msg);
                Ok(PromptReply::Cancelled)
            }
            Err(e) => Err(e),
        }
    }
}

/// Idle time measured as time since the last line typed into the session.
#[derive(Debug, Clone, Copy)]
pub struct InputIdle {
    last_input: Instant,
}

impl InputIdle {
    pub fn new() -> Self {
        Self {
            last_input: Instant::now(),
        }
    }

    /// Record user activity.
    pub fn touch(&mut self) {
        self.last_input = Instant::now();
    }

    /// Pretend the last input happened `ago` in the past.
    pub fn backdate(&mut self, ago: Duration) {
        self.last_input = Instant::now()
            .checked_sub(ago)
            .unwrap_or(self.last_input);
    }
}

impl Default for InputIdle {
    fn default() -> Self {
        Self::new()
    }
}

impl IdleSignal for InputIdle {
    fn current_idle_duration(&mut self) -> Option<Duration> {
        Some(self.last_input.elapsed())
    }
}
