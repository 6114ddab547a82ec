//! The lock/unlock state machine.
//!
//! | From     | Event                    | Success  | Failure                         |
//! |----------|--------------------------|----------|---------------------------------|
//! | Unlocked | `Minimized`              | Locked   | stay Unlocked, `ShowError`      |
//! | Locked   | `Restored`               | Unlocked | stay Locked, `ForceMinimize`    |
//! | Unlocked | `IdleTick` past threshold| Locked   | n/a                             |
//!
//! Every call is synchronous. `handle` never panics and never returns
//! an error; failures are kept in `last_error` and reported as effects.

use std::fmt;
use std::fs;
use std::time::Duration;

use tracing::{debug, warn};
use zeroize::Zeroizing;

use super::{CredentialPrompt, IdleSignal, PromptReply};
use crate::config::ConfigProvider;
use crate::crypto::keys::SessionKey;
use crate::crypto::passphrase::PassphraseValidator;
use crate::errors::{FortError, Result};
use crate::vault::cipher::{VaultCipher, VaultState};
use crate::vault::store::RecordStore;

/// Events the host feeds into the machine.
pub enum HostEvent {
    /// The host just started and wants the vault opened.
    Started,
    /// The host was hidden or the user asked to lock.
    Minimized,
    /// The host was brought back and wants the records again.
    Restored,
    /// Periodic tick used to poll the idle signal.
    IdleTick,
    /// The user asked to close the host.
    CloseRequested,
    /// Answer to a prompt that replied `Pending`.
    PassphraseSubmitted(Zeroizing<String>),
    /// A `Pending` prompt was dismissed by the user.
    PromptCancelled,
}

impl fmt::Debug for HostEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started => f.write_str("Started"),
            Self::Minimized => f.write_str("Minimized"),
            Self::Restored => f.write_str("Restored"),
            Self::IdleTick => f.write_str("IdleTick"),
            Self::CloseRequested => f.write_str("CloseRequested"),
            Self::PassphraseSubmitted(_) => f.write_str("PassphraseSubmitted(..)"),
            Self::PromptCancelled => f.write_str("PromptCancelled"),
        }
    }
}

/// Things the host must do after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Drop every displayed record.
    ClearRecords,
    /// Records were (re)loaded; show this many.
    ShowRecords(usize),
    /// Hide the host. Feeding `Minimized` back in afterwards is harmless.
    ForceMinimize,
    /// Close the pending passphrase prompt.
    DismissPrompt,
    /// Tell the user something went wrong.
    ShowError(String),
    /// Terminate the host.
    Exit,
}

/// Result of handling one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: VaultState,
    pub effects: Vec<Effect>,
}

/// Why a passphrase prompt is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptPurpose {
    Startup,
    Restore,
}

/// Drives `VaultCipher` and `RecordStore` in response to host events.
pub struct LockStateMachine<P, I> {
    cipher: VaultCipher,
    validator: PassphraseValidator,
    store: RecordStore,
    session_key: Option<SessionKey>,
    state: VaultState,
    prompt: P,
    idle: I,
    idle_threshold: Option<Duration>,
    minimize_on_close: bool,
    pending_prompt: Option<PromptPurpose>,
    last_error: Option<String>,
}

impl<P: CredentialPrompt, I: IdleSignal> LockStateMachine<P, I> {
    /// Build a machine for the vault described by `config`.
    ///
    /// The data directory is created if missing. The initial state is
    /// read from the vault on disk.
    pub fn new(config: &impl ConfigProvider, prompt: P, idle: I) -> Result<Self> {
        let data_dir = config.data_dir();
        fs::create_dir_all(&data_dir)?;

        let cipher = VaultCipher::new(&data_dir);
        let state = cipher.state();
        debug!(dir = %data_dir.display(), %state, "lock state machine created");

        Ok(Self {
            validator: PassphraseValidator::new(&data_dir),
            store: RecordStore::new(&data_dir),
            cipher,
            session_key: None,
            state,
            prompt,
            idle,
            idle_threshold: config.idle_threshold(),
            minimize_on_close: config.minimize_on_close(),
            pending_prompt: None,
            last_error: None,
        })
    }

    /// Replace the passphrase validator, e.g. with a cheaper bcrypt cost.
    pub fn with_validator(mut self, validator: PassphraseValidator) -> Self {
        self.validator = validator;
        self
    }

    // ------------------------------------------------------------------
    // Event handling
    // ------------------------------------------------------------------

    /// Process one host event.
    pub fn handle(&mut self, event: HostEvent) -> Transition {
        debug!(?event, state = %self.state, "handling host event");

        let effects = match event {
            HostEvent::Started => self.on_started(),
            HostEvent::Minimized => self.on_minimized(),
            HostEvent::Restored => self.on_restored(),
            HostEvent::IdleTick => self.on_idle_tick(),
            HostEvent::CloseRequested => self.on_close_requested(),
            HostEvent::PassphraseSubmitted(passphrase) => self.on_passphrase(&passphrase),
            HostEvent::PromptCancelled => self.on_prompt_cancelled(),
        };

        Transition {
            state: self.state,
            effects,
        }
    }

    fn on_started(&mut self) -> Vec<Effect> {
        if self.state == VaultState::Unlocked && self.session_key.is_some() {
            return Vec::new();
        }
        self.request_credentials(PromptPurpose::Startup)
    }

    fn on_minimized(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();

        if self.pending_prompt.take().is_some() {
            effects.push(Effect::DismissPrompt);
        }

        if self.state == VaultState::Unlocked {
            match self.lock() {
                Ok(()) => effects.push(Effect::ClearRecords),
                Err(e) => effects.push(self.report(e)),
            }
        }

        effects
    }

    fn on_restored(&mut self) -> Vec<Effect> {
        if self.state == VaultState::Unlocked {
            return Vec::new();
        }
        self.request_credentials(PromptPurpose::Restore)
    }

    fn on_idle_tick(&mut self) -> Vec<Effect> {
        if self.state != VaultState::Unlocked {
            return Vec::new();
        }
        let Some(threshold) = self.idle_threshold else {
            return Vec::new();
        };
        let Some(idle) = self.idle.current_idle_duration() else {
            return Vec::new();
        };
        if idle < threshold {
            return Vec::new();
        }

        debug!(idle_ms = idle.as_millis() as u64, "idle threshold reached");
        let mut effects = vec![Effect::ForceMinimize];
        effects.extend(self.on_minimized());
        effects
    }

    fn on_close_requested(&mut self) -> Vec<Effect> {
        if self.minimize_on_close {
            let mut effects = vec![Effect::ForceMinimize];
            effects.extend(self.on_minimized());
            return effects;
        }

        let mut effects = self.on_minimized();
        effects.push(Effect::Exit);
        effects
    }

    fn on_passphrase(&mut self, passphrase: &str) -> Vec<Effect> {
        match self.pending_prompt.take() {
            Some(purpose) => self.attempt_login(purpose, passphrase),
            None => {
                debug!("ignoring passphrase without a pending prompt");
                Vec::new()
            }
        }
    }

    fn on_prompt_cancelled(&mut self) -> Vec<Effect> {
        match self.pending_prompt.take() {
            Some(purpose) => self.login_failed(purpose, None),
            None => Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Prompt flow
    // ------------------------------------------------------------------

    /// Open the passphrase prompt unless one is already in flight.
    fn request_credentials(&mut self, purpose: PromptPurpose) -> Vec<Effect> {
        if self.pending_prompt.is_some() {
            debug!("passphrase prompt already open");
            return Vec::new();
        }

        self.pending_prompt = Some(purpose);
        match self.prompt.request_passphrase() {
            Ok(PromptReply::Pending) => Vec::new(),
            Ok(PromptReply::Submitted(passphrase)) => {
                self.pending_prompt = None;
                self.attempt_login(purpose, &passphrase)
            }
            Ok(PromptReply::Cancelled) => {
                self.pending_prompt = None;
                self.login_failed(purpose, None)
            }
            Err(e) => {
                self.pending_prompt = None;
                self.login_failed(purpose, Some(e))
            }
        }
    }

    fn attempt_login(&mut self, purpose: PromptPurpose, passphrase: &str) -> Vec<Effect> {
        match self.bootstrap(passphrase) {
            Ok(count) => vec![Effect::ShowRecords(count)],
            Err(e) => self.login_failed(purpose, Some(e)),
        }
    }

    fn login_failed(&mut self, purpose: PromptPurpose, error: Option<FortError>) -> Vec<Effect> {
        let mut effects = Vec::new();
        if let Some(e) = error {
            effects.push(self.report(e));
        }
        effects.push(match purpose {
            PromptPurpose::Startup => Effect::Exit,
            PromptPurpose::Restore => Effect::ForceMinimize,
        });
        effects
    }

    fn report(&mut self, error: FortError) -> Effect {
        let message = error.to_string();
        warn!(error = %message, "vault operation failed");
        self.last_error = Some(message.clone());
        Effect::ShowError(message)
    }

    // ------------------------------------------------------------------
    // Direct operations
    // ------------------------------------------------------------------

    /// Make `passphrase` the master passphrase of a fresh vault and
    /// open it. Returns the number of records loaded.
    ///
    /// Refused when a credential already exists or when encrypted
    /// records are present without one.
    pub fn setup_first_run(&mut self, passphrase: &str) -> Result<usize> {
        if self.validator.is_configured() {
            return Err(FortError::State(
                "a master passphrase already exists".into(),
            ));
        }
        if self.cipher.state() == VaultState::Locked {
            return Err(FortError::State(
                "found encrypted records without a passphrase credential".into(),
            ));
        }

        self.validator.setup(passphrase)?;
        debug!("master passphrase created");
        self.bootstrap(passphrase)
    }

    /// Open the vault with `passphrase` and load the records.
    ///
    /// Never creates a credential: without one the passphrase is
    /// rejected as a missing credential. Returns the number of records
    /// loaded.
    pub fn bootstrap(&mut self, passphrase: &str) -> Result<usize> {
        if let Err(e) = self.validator.validate(passphrase) {
            self.session_key = None;
            return Err(e);
        }

        let key = SessionKey::from_passphrase(passphrase)?;
        if self.cipher.state() == VaultState::Locked {
            if let Err(e) = self.cipher.unlock(&key) {
                self.session_key = None;
                self.state = VaultState::Locked;
                return Err(e);
            }
        }

        self.session_key = Some(key);
        self.state = VaultState::Unlocked;
        self.last_error = None;

        let report = self.store.load_report()?;
        Ok(report.loaded)
    }

    /// Encrypt the vault and forget the key and the records.
    pub fn lock(&mut self) -> Result<()> {
        if self.state == VaultState::Locked {
            return Err(FortError::State("vault is already locked".into()));
        }
        let key = self
            .session_key
            .as_ref()
            .ok_or_else(|| FortError::State("no active session".into()))?;

        self.cipher.lock(key)?;

        self.session_key = None;
        self.store.clear();
        self.state = VaultState::Locked;
        Ok(())
    }

    /// Replace the master passphrase. Only allowed while unlocked.
    ///
    /// The session key is re-derived so the next lock uses the new one.
    pub fn change_passphrase(&mut self, current: &str, new: &str) -> Result<()> {
        if self.state != VaultState::Unlocked || self.session_key.is_none() {
            return Err(FortError::State(
                "the vault must be unlocked to change the passphrase".into(),
            ));
        }

        let key = SessionKey::from_passphrase(new)?;
        self.validator.change_passphrase(current, new)?;
        self.session_key = Some(key);
        debug!("master passphrase changed");
        Ok(())
    }

    /// Re-read the state from disk.
    ///
    /// If the vault was locked behind our back, the key and records
    /// are dropped.
    pub fn refresh(&mut self) -> VaultState {
        self.state = self.cipher.state();
        if self.state == VaultState::Locked {
            self.session_key = None;
            self.store.clear();
        }
        self.state
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn state(&self) -> VaultState {
        self.state
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Mutable record access; fails unless an unlocked session exists.
    pub fn store_mut(&mut self) -> Result<&mut RecordStore> {
        if self.state != VaultState::Unlocked || self.session_key.is_none() {
            return Err(FortError::State("the vault is locked".into()));
        }
        Ok(&mut self.store)
    }

    pub fn validator(&self) -> &PassphraseValidator {
        &self.validator
    }

    pub fn has_session(&self) -> bool {
        self.session_key.is_some()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_prompt_open(&self) -> bool {
        self.pending_prompt.is_some()
    }

    pub fn prompt_mut(&mut self) -> &mut P {
        &mut self.prompt
    }

    pub fn idle_mut(&mut self) -> &mut I {
        &mut self.idle
    }
}

// ── Tests ────────────────────────────────────────────────────────────
