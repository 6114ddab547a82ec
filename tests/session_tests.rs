//! Integration tests for the lock state machine.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use fort::config::StaticConfig;
use fort::crypto::PassphraseValidator;
use fort::errors::Result;
use fort::session::{
    idle_from_millis, CredentialPrompt, Effect, HostEvent, IdleSignal, LockStateMachine,
    PromptReply,
};
use fort::vault::{RecordDraft, VaultState};
use tempfile::TempDir;
use zeroize::Zeroizing;

const PASS: &str = "correcthorsebattery";

/// Always answers with the same passphrase.
struct FixedPrompt(&'static str);

impl CredentialPrompt for FixedPrompt {
    fn request_passphrase(&mut self) -> Result<PromptReply> {
        Ok(PromptReply::Submitted(Zeroizing::new(self.0.to_string())))
    }
}

/// Idle reading the test can change between ticks (milliseconds, -1 = failure).
#[derive(Clone)]
struct SharedIdle(Rc<Cell<i64>>);

impl IdleSignal for SharedIdle {
    fn current_idle_duration(&mut self) -> Option<Duration> {
        idle_from_millis(self.0.get())
    }
}

fn setup(
    dir: &TempDir,
    minutes: u32,
) -> (LockStateMachine<FixedPrompt, SharedIdle>, Rc<Cell<i64>>) {
    let config = StaticConfig {
        idle_interval_minutes: minutes,
        ..StaticConfig::new(dir.path())
    };
    let idle = Rc::new(Cell::new(0));
    PassphraseValidator::with_cost(dir.path(), 4)
        .setup(PASS)
        .unwrap();
    let mut machine = LockStateMachine::new(&config, FixedPrompt(PASS), SharedIdle(idle.clone()))
        .unwrap()
        .with_validator(PassphraseValidator::with_cost(dir.path(), 4));

    let t = machine.handle(HostEvent::Started);
    assert_eq!(t.state, VaultState::Unlocked);
    machine
        .store_mut()
        .unwrap()
        .add_draft(RecordDraft {
            title: "bank".into(),
            username: "alice".into(),
            password: "p1".into(),
            ..RecordDraft::default()
        })
        .unwrap();

    (machine, idle)
}

#[test]
fn idle_past_three_minutes_forces_minimize_and_locks() {
    let dir = TempDir::new().unwrap();
    let (mut machine, idle) = setup(&dir, 3);

    idle.set(181_000);
    let t = machine.handle(HostEvent::IdleTick);

    assert_eq!(t.state, VaultState::Locked);
    assert_eq!(t.effects[0], Effect::ForceMinimize);
    assert!(dir.path().join("fort.iv").exists());
    assert!(machine.store().is_empty());
}

#[test]
fn idle_failure_sentinel_never_locks() {
    let dir = TempDir::new().unwrap();
    let (mut machine, idle) = setup(&dir, 1);

    idle.set(-1);
    for _ in 0..5 {
        let t = machine.handle(HostEvent::IdleTick);
        assert_eq!(t.state, VaultState::Unlocked);
        assert!(t.effects.is_empty());
    }
    assert!(!dir.path().join("fort.iv").exists());
}

#[test]
fn restore_after_idle_lock_brings_records_back() {
    let dir = TempDir::new().unwrap();
    let (mut machine, idle) = setup(&dir, 3);

    idle.set(200_000);
    machine.handle(HostEvent::IdleTick);
    idle.set(0);

    let t = machine.handle(HostEvent::Restored);
    assert_eq!(t.state, VaultState::Unlocked);
    assert_eq!(t.effects, vec![Effect::ShowRecords(1)]);
    assert_eq!(machine.store().records()[0].password, "p1");
}

#[test]
fn idle_ticks_while_locked_are_ignored() {
    let dir = TempDir::new().unwrap();
    let (mut machine, idle) = setup(&dir, 3);
    machine.handle(HostEvent::Minimized);

    idle.set(10_000_000);
    let t = machine.handle(HostEvent::IdleTick);
    assert_eq!(t.state, VaultState::Locked);
    assert!(t.effects.is_empty());
}

#[test]
fn wrong_passphrase_on_restore_keeps_vault_locked() {
    let dir = TempDir::new().unwrap();
    let (mut machine, _idle) = setup(&dir, 3);
    machine.handle(HostEvent::Minimized);
    drop(machine);

    let config = StaticConfig::new(dir.path());
    let mut intruder = LockStateMachine::new(
        &config,
        FixedPrompt("not the passphrase"),
        SharedIdle(Rc::new(Cell::new(0))),
    )
    .unwrap()
    .with_validator(PassphraseValidator::with_cost(dir.path(), 4));

    assert_eq!(intruder.state(), VaultState::Locked);
    let t = intruder.handle(HostEvent::Restored);

    assert_eq!(t.state, VaultState::Locked);
    assert!(t.effects.contains(&Effect::ForceMinimize));
    assert!(dir.path().join("fort.iv").exists());
    assert!(intruder.last_error().is_some());
}

#[test]
fn startup_on_locked_vault_without_credential_exits_untouched() {
    let dir = TempDir::new().unwrap();
    let (mut machine, _idle) = setup(&dir, 3);
    machine.handle(HostEvent::Minimized);
    drop(machine);
    std::fs::remove_file(dir.path().join("fort.pph")).unwrap();

    let config = StaticConfig::new(dir.path());
    let mut machine = LockStateMachine::new(
        &config,
        FixedPrompt("any passphrase at all"),
        SharedIdle(Rc::new(Cell::new(0))),
    )
    .unwrap()
    .with_validator(PassphraseValidator::with_cost(dir.path(), 4));

    let t = machine.handle(HostEvent::Started);

    assert_eq!(t.state, VaultState::Locked);
    assert_eq!(t.effects.last(), Some(&Effect::Exit));
    assert_eq!(
        machine.last_error(),
        Some("Passphrase validation failed: missing credential")
    );
    assert!(!dir.path().join("fort.pph").exists());
    assert!(dir.path().join("fort.iv").exists());
}
