//! Multiplayer timers and relay diagnostics, on a paused clock.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use sword_duel::adapter::protocol::{LogEvent, OpponentCharacterEvent};
use sword_duel::adapter::{EngineEvent, Inbound, MemoryStore, RecordingEngine};
use sword_duel::core::SimpleRng;
use sword_duel::input::ScriptedKeys;
use sword_duel::session::{
    MultiplayerState, Orchestrator, RoomId, SessionConfig, SessionEnd, SessionState, Terminal,
};
use sword_duel::term::{MemoryConsole, MemoryScreen};
use sword_duel::types::GameMode;

fn hosted() -> SessionState {
    let room = RoomId::generate(&mut SimpleRng::new(7));
    SessionState::new(GameMode::Multiplayer).with_multiplayer(MultiplayerState::hosting(room, 3))
}

fn run_parts(
    state: SessionState,
) -> (Orchestrator<RecordingEngine, MemoryConsole>, MemoryConsole) {
    let console = MemoryConsole::new();
    let orch = Orchestrator::new(
        RecordingEngine::new(),
        console.clone(),
        Box::new(MemoryStore::new()),
        Terminal::new(
            ScriptedKeys::non_interactive(),
            MemoryScreen::new(80, 24).non_interactive(),
        ),
        SessionConfig::instant(),
        state,
    );
    (orch, console)
}

fn peer(is_computer: bool) -> Inbound {
    Inbound::Event(EngineEvent::OpponentCharacter(OpponentCharacterEvent {
        character: "brutus".into(),
        is_computer,
    }))
}

fn log(message: &str) -> Inbound {
    Inbound::Event(EngineEvent::Log(LogEvent {
        level: "warn".into(),
        message: message.into(),
    }))
}

fn count(console: &MemoryConsole, needle: &str) -> usize {
    console.texts().iter().filter(|t| t.contains(needle)).count()
}

#[tokio::test(start_paused = true)]
async fn waiting_host_is_warned_once() {
    let (mut orch, console) = run_parts(hosted());
    let (_tx, rx) = mpsc::unbounded_channel();

    let end = orch
        .run(rx, tokio::time::sleep(Duration::from_secs(900)))
        .await
        .unwrap();
    assert_eq!(end, SessionEnd::Interrupted);
    assert_eq!(count(&console, "Still waiting for an opponent"), 1);
}

#[tokio::test(start_paused = true)]
async fn joined_peer_cancels_the_waiting_warning() {
    let (mut orch, console) = run_parts(hosted());
    let (tx, rx) = mpsc::unbounded_channel();
    tx.send(peer(true)).unwrap();

    orch.run(rx, tokio::time::sleep(Duration::from_secs(900)))
        .await
        .unwrap();
    assert_eq!(count(&console, "Still waiting"), 0);
    assert_eq!(count(&console, "computer opponent"), 1);
}

#[tokio::test(start_paused = true)]
async fn idle_human_peer_times_out() {
    let (mut orch, console) = run_parts(hosted());
    let (tx, rx) = mpsc::unbounded_channel();
    tx.send(peer(false)).unwrap();

    let start = Instant::now();
    let end = orch
        .run(rx, tokio::time::sleep(Duration::from_secs(3600)))
        .await
        .unwrap();
    assert_eq!(end, SessionEnd::TimedOut);
    assert!(!end.is_failure());
    assert_eq!(start.elapsed(), SessionConfig::default().move_timeout);
    assert_eq!(count(&console, "No moves for 10 minutes"), 1);
}

#[tokio::test(start_paused = true)]
async fn computer_fallback_never_times_out() {
    let (mut orch, _console) = run_parts(hosted());
    let (tx, rx) = mpsc::unbounded_channel();
    tx.send(peer(true)).unwrap();

    let end = orch
        .run(rx, tokio::time::sleep(Duration::from_secs(3600)))
        .await
        .unwrap();
    assert_eq!(end, SessionEnd::Interrupted);
}

#[tokio::test(start_paused = true)]
async fn relay_failures_trigger_one_advisory() {
    let (mut orch, console) = run_parts(hosted());
    let (tx, rx) = mpsc::unbounded_channel();
    for message in [
        "TURN allocation failed",
        "ICE connection state: failed",
        "gathering complete",
        "relay server timeout",
        "relay error",
    ] {
        tx.send(log(message)).unwrap();
    }

    orch.run(rx, tokio::time::sleep(Duration::from_secs(10)))
        .await
        .unwrap();
    assert_eq!(count(&console, "Repeated relay failures"), 1);
    assert_eq!(orch.state().multiplayer.relay.failures(), 4);
}

#[tokio::test(start_paused = true)]
async fn relay_probe_reports_early_failures() {
    let (mut orch, console) = run_parts(hosted());
    let (tx, rx) = mpsc::unbounded_channel();
    tx.send(log("TURN allocation failed")).unwrap();

    orch.run(rx, tokio::time::sleep(Duration::from_secs(60)))
        .await
        .unwrap();
    assert_eq!(count(&console, "Relay connectivity problems"), 1);
    assert_eq!(count(&console, "Repeated relay failures"), 0);
}

#[tokio::test(start_paused = true)]
async fn single_player_ignores_transport_logs() {
    let (mut orch, console) = run_parts(SessionState::new(GameMode::Single));
    let (tx, rx) = mpsc::unbounded_channel();
    for _ in 0..5 {
        tx.send(log("TURN allocation failed")).unwrap();
    }

    orch.run(rx, tokio::time::sleep(Duration::from_secs(1000)))
        .await
        .unwrap();
    assert!(console.texts().is_empty());
}
