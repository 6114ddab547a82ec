//! Session layer: the lock state machine and the host seams it uses.
//!
//! The host (terminal session, tests) supplies an `IdleSignal` and a
//! `CredentialPrompt`, translates its own events into `HostEvent`s and
//! carries out the `Effect`s it gets back.

pub mod machine;

use std::fmt;
use std::time::Duration;

use zeroize::Zeroizing;

use crate::errors::Result;

pub use machine::{Effect, HostEvent, LockStateMachine, Transition};

/// Source of the user's current idle time.
pub trait IdleSignal {
    /// `None` when the idle time cannot be determined.
    fn current_idle_duration(&mut self) -> Option<Duration>;
}

/// Convert a raw millisecond reading where negative means failure.
pub fn idle_from_millis(millis: i64) -> Option<Duration> {
    u64::try_from(millis).ok().map(Duration::from_millis)
}

/// An idle source that never knows the idle time. Auto-lock is off.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleUnavailable;

impl IdleSignal for IdleUnavailable {
    fn current_idle_duration(&mut self) -> Option<Duration> {
        None
    }
}

/// Answer of a `CredentialPrompt`.
pub enum PromptReply {
    /// The user entered a passphrase.
    Submitted(Zeroizing<String>),
    /// The user dismissed the prompt.
    Cancelled,
    /// The prompt is shown asynchronously; the answer arrives later as
    /// `HostEvent::PassphraseSubmitted` or `HostEvent::PromptCancelled`.
    Pending,
}

impl fmt::Debug for PromptReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submitted(_) => f.write_str("Submitted(..)"),
            Self::Cancelled => f.write_str("Cancelled"),
            Self::Pending => f.write_str("Pending"),
        }
    }
}

/// Host modal that asks the user for the master passphrase.
pub trait CredentialPrompt {
    fn request_passphrase(&mut self) -> Result<PromptReply>;
}
