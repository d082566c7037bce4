//! Event orchestrator - the session loop.
//!
//! One `select!` loop interleaves engine events, the open prompt, session
//! timers and shutdown. A prompt runs as a future that owns the terminal
//! (key source + screen) and hands it back when it resolves, so engine
//! events keep being handled while the player is choosing. Console output
//! produced meanwhile is held until the prompt closes.

use std::future::Future;
use std::ops::ControlFlow;
use std::pin::Pin;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::adapter::protocol::{
    NameEvent, OpponentCharacterEvent, RoundEvent, SetupEvent, StartEvent,
};
use crate::adapter::{
    BusFault, Engine, EngineError, EngineEvent, Inbound, KvStore, SetupRequest, CHARACTER_KEY,
    PLAYER_NAME_KEY,
};
use crate::config::SessionConfig;
use crate::core::catalog::{character_items, move_items};
use crate::core::combat::{damage_breakdown, outcome_lines, round_chunks, GameOutcome};
use crate::core::status::{health_lines, tactical_lines};
use crate::input::KeySource;
use crate::multiplayer::PeerKind;
use crate::pacing::Pacer;
use crate::state::{SessionState, SetupKind};
use crate::term::{
    frame_box, select, Choice, ChoiceVia, Outcome, Output, Prompt, Screen, SelectError,
    SelectOptions,
};
use crate::types::{GameMode, Line, Tone};

pub const DEFAULT_PLAYER_NAME: &str = "Player";

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Victory,
    Defeat,
    RoomFull,
    /// Multiplayer move timeout expired.
    TimedOut,
    /// Escape or Ctrl-C inside a prompt.
    Aborted,
    /// SIGINT outside of a prompt.
    Interrupted,
    /// The engine link closed before the game was over.
    EngineClosed,
}

impl SessionEnd {
    /// Whether the process should exit with a failure status.
    pub fn is_failure(&self) -> bool {
        matches!(self, SessionEnd::EngineClosed)
    }
}

/// The interactive terminal: where keys come from and frames go.
pub struct Terminal {
    pub keys: Box<dyn KeySource>,
    pub screen: Box<dyn Screen>,
}

impl Terminal {
    pub fn new(keys: impl KeySource + 'static, screen: impl Screen + 'static) -> Self {
        Self {
            keys: Box::new(keys),
            screen: Box::new(screen),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptKind {
    Character,
    Move,
}

struct PromptDone {
    kind: PromptKind,
    terminal: Terminal,
    result: Result<Outcome>,
}

type PromptFuture = Pin<Box<dyn Future<Output = PromptDone>>>;

pub struct Orchestrator<E: Engine, C: Output> {
    engine: E,
    console: C,
    store: Box<dyn KvStore>,
    config: SessionConfig,
    state: SessionState,
    terminal: Option<Terminal>,
    prompt: Option<PromptFuture>,
    move_deadline: Option<Instant>,
    peer_deadline: Option<Instant>,
    relay_probe: Option<Instant>,
}

impl<E: Engine, C: Output> Orchestrator<E, C> {
    pub fn new(
        engine: E,
        console: C,
        store: Box<dyn KvStore>,
        terminal: Terminal,
        config: SessionConfig,
        state: SessionState,
    ) -> Self {
        Self {
            engine,
            console,
            store,
            config,
            state,
            terminal: Some(terminal),
            prompt: None,
            move_deadline: None,
            peer_deadline: None,
            relay_probe: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn store(&self) -> &dyn KvStore {
        self.store.as_ref()
    }

    /// Hands the engine back once the session is over.
    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Run until the session ends.
    ///
    /// `shutdown` resolving (e.g. on SIGINT) ends the session gracefully.
    pub async fn run(
        &mut self,
        mut events: mpsc::UnboundedReceiver<Inbound>,
        shutdown: impl Future<Output = ()>,
    ) -> Result<SessionEnd> {
        self.state.engine_created();
        self.arm_waiting_timers();
        tokio::pin!(shutdown);

        loop {
            let flow = tokio::select! {
                biased;

                _ = &mut shutdown => {
                    tracing::info!("shutdown requested");
                    ControlFlow::Break(SessionEnd::Interrupted)
                }
                done = next_prompt(&mut self.prompt) => self.on_prompt_done(done)?,
                inbound = events.recv() => match inbound {
                    Some(Inbound::Event(event)) => self.on_event(event).await?,
                    Some(Inbound::Fault(fault)) => self.on_fault(fault),
                    None => self.on_fault(BusFault::Closed),
                },
                _ = sleep_until(self.move_deadline) => self.on_move_timeout(),
                _ = sleep_until(self.peer_deadline) => self.on_peer_timeout(),
                _ = sleep_until(self.relay_probe) => self.on_relay_probe(),
            };

            if let ControlFlow::Break(end) = flow {
                self.teardown(end);
                return Ok(end);
            }
        }
    }

    fn teardown(&mut self, end: SessionEnd) {
        // Dropping an open prompt releases its screen lease.
        self.prompt = None;
        self.console.release();
        self.engine.disconnect();
        tracing::info!(?end, rounds = self.state.round(), "session ended");
    }

    fn say(&mut self, tone: Tone, text: impl Into<String>) {
        self.console.emit(&Line::new(tone, text));
    }

    fn engine_flow(&mut self, result: Result<(), EngineError>) -> ControlFlow<SessionEnd> {
        match result {
            Ok(()) => ControlFlow::Continue(()),
            Err(err) => {
                tracing::warn!(error = %err, "engine send failed");
                self.say(Tone::Bad, format!("Lost contact with the engine: {err}"));
                ControlFlow::Break(SessionEnd::EngineClosed)
            }
        }
    }

    // ============== Timers ==============

    fn arm_waiting_timers(&mut self) {
        if self.state.mode() == GameMode::Multiplayer && self.state.multiplayer.hosting {
            let now = Instant::now();
            self.peer_deadline = Some(now + self.config.peer_connect_timeout);
            self.relay_probe = Some(now + self.config.relay_probe);
        }
    }

    fn rearm_move_timeout(&mut self) {
        if self.state.multiplayer.has_human_peer() {
            self.move_deadline = Some(Instant::now() + self.config.move_timeout);
        }
    }

    fn on_move_timeout(&mut self) -> ControlFlow<SessionEnd> {
        self.move_deadline = None;
        let minutes = self.config.move_timeout.as_secs() / 60;
        tracing::warn!(minutes, "multiplayer move timeout");
        self.say(
            Tone::Bad,
            format!("No moves for {minutes} minutes. Ending the multiplayer session."),
        );
        ControlFlow::Break(SessionEnd::TimedOut)
    }

    fn on_peer_timeout(&mut self) -> ControlFlow<SessionEnd> {
        self.peer_deadline = None;
        let mp = &mut self.state.multiplayer;
        if !mp.peer_connected() && !mp.peer_timeout_warned {
            mp.peer_timeout_warned = true;
            let room = mp
                .room_id
                .as_ref()
                .map(|r| r.to_string())
                .unwrap_or_default();
            self.say(
                Tone::Warn,
                format!("Still waiting for an opponent to join room {room}. Keep waiting or share the code again."),
            );
        }
        ControlFlow::Continue(())
    }

    fn on_relay_probe(&mut self) -> ControlFlow<SessionEnd> {
        self.relay_probe = None;
        let mp = &self.state.multiplayer;
        if !mp.peer_connected() && mp.relay.failures() > 0 && !mp.relay.warned() {
            self.say(
                Tone::Warn,
                "Relay connectivity problems detected while waiting. A restrictive network may block the peer connection.",
            );
        }
        ControlFlow::Continue(())
    }

    // ============== Prompts ==============

    fn open_prompt(&mut self, kind: PromptKind, prompt: Prompt) {
        let Some(mut terminal) = self.terminal.take() else {
            tracing::warn!(?kind, "terminal busy, prompt dropped");
            return;
        };
        let options = SelectOptions {
            confirm_delay: self.config.confirm_delay,
        };
        self.console.hold();
        self.prompt = Some(Box::pin(async move {
            let result = select(
                terminal.keys.as_mut(),
                terminal.screen.as_mut(),
                &prompt,
                &options,
            )
            .await;
            PromptDone {
                kind,
                terminal,
                result,
            }
        }));
    }

    fn request_move_prompt(&mut self) {
        if !self.state.try_begin_prompt() {
            tracing::debug!("move prompt already open, request ignored");
            return;
        }
        let Some(view) = self.state.view() else {
            self.state.cancel_prompt();
            tracing::warn!("move requested before any engine state");
            return;
        };
        let last_mine = self.state.last_round().map(|(mine, _)| mine);
        let bonuses = last_mine
            .map(|m| m.next_round_bonus.as_slice())
            .unwrap_or_default();
        let items = match move_items(&view.moves, bonuses) {
            Ok(items) => items,
            Err(err) => {
                self.state.cancel_prompt();
                tracing::warn!(error = %err, "cannot build move list");
                self.say(Tone::Bad, format!("Cannot offer moves: {err}"));
                return;
            }
        };
        let preamble = tactical_lines(view, last_mine, self.config.health_bar_len);
        let header = format!("Round {}: choose your move", self.state.round() + 1);
        self.open_prompt(PromptKind::Move, Prompt::new(header, items).with_preamble(preamble));
    }

    fn fallback_notice(&mut self, choice: &Choice) {
        if choice.via == ChoiceVia::Fallback {
            self.say(
                Tone::Dim,
                format!("Auto-selected {} (no interactive input)", choice.item.name),
            );
        }
    }

    fn on_prompt_done(&mut self, done: PromptDone) -> Result<ControlFlow<SessionEnd>> {
        self.terminal = Some(done.terminal);
        self.console.release();
        if done.kind == PromptKind::Move {
            self.state.cancel_prompt();
        }

        let outcome = match done.result {
            Ok(outcome) => outcome,
            Err(err) if err.downcast_ref::<SelectError>().is_some() => {
                tracing::warn!(error = %err, "prompt could not open");
                self.say(Tone::Bad, format!("Prompt unavailable: {err}"));
                return Ok(ControlFlow::Continue(()));
            }
            Err(err) => return Err(err),
        };

        let choice = match outcome {
            Outcome::Chosen(choice) => choice,
            Outcome::Aborted => {
                self.say(Tone::Dim, "Leaving the duel.");
                return Ok(ControlFlow::Break(SessionEnd::Aborted));
            }
        };
        self.fallback_notice(&choice);

        Ok(match done.kind {
            PromptKind::Character => {
                self.store.set(CHARACTER_KEY, choice.item.id.clone());
                self.send_setup(choice.item.id)
            }
            PromptKind::Move => {
                tracing::info!(move_id = %choice.item.id, "move chosen");
                let sent = self.engine.input_move(&choice.item.id);
                let flow = self.engine_flow(sent);
                if flow.is_continue() {
                    self.state.move_dispatched();
                    self.rearm_move_timeout();
                }
                flow
            }
        })
    }

    fn send_setup(&mut self, character: String) -> ControlFlow<SessionEnd> {
        let request = SetupRequest {
            mode: self.state.mode(),
            room_id: self
                .state
                .multiplayer
                .room_id
                .as_ref()
                .map(|r| r.to_string()),
            name: self
                .store
                .get(PLAYER_NAME_KEY)
                .unwrap_or_else(|| DEFAULT_PLAYER_NAME.to_string()),
            character,
        };
        tracing::info!(character = %request.character, mode = request.mode.as_str(), "engine setup");
        let sent = self.engine.setup(request);
        self.engine_flow(sent)
    }

    // ============== Engine events ==============

    fn on_fault(&mut self, fault: BusFault) -> ControlFlow<SessionEnd> {
        match fault {
            BusFault::Malformed(msg) => {
                self.say(Tone::Bad, format!("Engine sent a malformed message: {msg}"));
                ControlFlow::Continue(())
            }
            BusFault::Closed => {
                self.say(Tone::Bad, "The engine connection closed.");
                ControlFlow::Break(SessionEnd::EngineClosed)
            }
        }
    }

    async fn on_event(&mut self, event: EngineEvent) -> Result<ControlFlow<SessionEnd>> {
        tracing::debug!(event = event.name().as_str(), phase = ?self.state.phase(), "handling event");
        let flow = match event {
            EngineEvent::Start(start) => self.on_start(start),
            EngineEvent::Setup(setup) => self.on_setup(setup),
            EngineEvent::Round(round) => self.on_round(round).await,
            EngineEvent::MyMove(ack) => {
                if self.state.accept_move_ack(&ack.id) {
                    self.say(Tone::Info, "Processing move...");
                } else {
                    tracing::debug!(id = %ack.id, "duplicate move acknowledgement ignored");
                }
                ControlFlow::Continue(())
            }
            EngineEvent::OpponentsMove => {
                let who = self.state.opponent_name().unwrap_or("Your opponent").to_string();
                self.say(Tone::Dim, format!("{who} has chosen a move."));
                ControlFlow::Continue(())
            }
            EngineEvent::Victory => self.on_game_over(GameOutcome::Victory),
            EngineEvent::Defeat => self.on_game_over(GameOutcome::Defeat),
            EngineEvent::RoomFull => {
                let room = self
                    .state
                    .multiplayer
                    .room_id
                    .as_ref()
                    .map(|r| r.to_string())
                    .unwrap_or_default();
                self.say(Tone::Bad, format!("Room {room} is full."));
                self.state.finish();
                ControlFlow::Break(SessionEnd::RoomFull)
            }
            EngineEvent::Name(NameEvent { name }) => {
                self.say(Tone::Info, format!("Your opponent is {name}."));
                self.state.set_opponent_name(name);
                ControlFlow::Continue(())
            }
            EngineEvent::OpponentCharacter(oc) => self.on_opponent_character(oc),
            EngineEvent::Log(log) => {
                tracing::debug!(level = %log.level, message = %log.message, "engine transport log");
                if self.state.multiplayer.room_id.is_some()
                    && self.state.multiplayer.relay.observe(&log.message)
                {
                    self.say(
                        Tone::Warn,
                        "Repeated relay failures. The peer connection may not be possible on this network.",
                    );
                }
                ControlFlow::Continue(())
            }
        };
        Ok(flow)
    }

    fn on_start(&mut self, start: StartEvent) -> ControlFlow<SessionEnd> {
        self.state.on_start();
        let cached = self.store.get(CHARACTER_KEY);

        if let Some(slug) = cached
            .as_deref()
            .filter(|s| start.characters.iter().any(|c| c.slug == *s))
        {
            let slug = slug.to_string();
            self.say(Tone::Dim, format!("Fighting as {slug} again."));
            return self.send_setup(slug);
        }

        match character_items(&start.characters) {
            Ok(items) => {
                self.open_prompt(PromptKind::Character, Prompt::new("Choose your fighter", items));
                ControlFlow::Continue(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "no usable character roster, engine picks");
                self.send_setup(cached.unwrap_or_default())
            }
        }
    }

    fn on_setup(&mut self, setup: SetupEvent) -> ControlFlow<SessionEnd> {
        if self.state.on_setup(setup.state) == SetupKind::Initial {
            if let Some(view) = self.state.view() {
                let text = format!("{} vs {}", view.me.name, view.opponent.name);
                self.say(Tone::Accent, text);
            }
        }
        self.request_move_prompt();
        ControlFlow::Continue(())
    }

    async fn on_round(&mut self, round: RoundEvent) -> ControlFlow<SessionEnd> {
        let RoundEvent {
            my_round_data,
            opponents_round_data,
            state,
        } = round;
        let mut chunks = round_chunks(
            self.state.round() + 1,
            &my_round_data,
            &opponents_round_data,
        );
        self.state
            .record_round(my_round_data, opponents_round_data, state);
        if let Some(view) = self.state.view() {
            chunks.push(health_lines(view, self.config.health_bar_len));
        }

        Pacer::new(self.config.pacing)
            .reveal(&mut self.console, &chunks)
            .await;
        self.rearm_move_timeout();

        if self.state.both_alive() {
            self.request_move_prompt();
        } else {
            tracing::debug!("a combatant is down, awaiting outcome");
        }
        ControlFlow::Continue(())
    }

    fn on_opponent_character(&mut self, oc: OpponentCharacterEvent) -> ControlFlow<SessionEnd> {
        let kind = PeerKind::from_is_computer(oc.is_computer);
        self.state.multiplayer.peer = Some(kind);
        self.peer_deadline = None;
        self.relay_probe = None;
        match kind {
            PeerKind::Human => {
                self.say(Tone::Good, format!("Opponent connected, fighting as {}.", oc.character));
                self.rearm_move_timeout();
            }
            PeerKind::Computer => {
                self.say(
                    Tone::Info,
                    format!("Facing a computer opponent ({}).", oc.character),
                );
            }
        }
        ControlFlow::Continue(())
    }

    fn on_game_over(&mut self, outcome: GameOutcome) -> ControlFlow<SessionEnd> {
        self.state.finish();
        self.move_deadline = None;

        let mut lines = Vec::new();
        if let Some((mine, theirs)) = self.state.last_round() {
            lines.push(Line::blank());
            lines.push(Line::new(Tone::Accent, "Final round"));
            lines.extend(damage_breakdown(mine, theirs));
        }
        if let Some(view) = self.state.view() {
            lines.extend(health_lines(view, self.config.health_bar_len));
        }
        let block = outcome_lines(outcome, self.state.round(), self.state.opponent_name());
        let border = match outcome {
            GameOutcome::Victory => Tone::Good,
            GameOutcome::Defeat => Tone::Bad,
        };
        lines.push(Line::blank());
        lines.extend(frame_box(&block, 24, border));
        self.console.emit_all(&lines);

        ControlFlow::Break(match outcome {
            GameOutcome::Victory => SessionEnd::Victory,
            GameOutcome::Defeat => SessionEnd::Defeat,
        })
    }
}

async fn next_prompt(slot: &mut Option<PromptFuture>) -> PromptDone {
    match slot {
        Some(fut) => {
            let done = fut.await;
            *slot = None;
            done
        }
        None => std::future::pending().await,
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
