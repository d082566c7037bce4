//! Session state - phase tracking and the bookkeeping the orchestrator
//! consults before acting on an engine event.

use crate::multiplayer::MultiplayerState;
use crate::types::{EngineView, GameMode, RoundSnapshot};

/// Lifecycle of one game session.
///
/// `Idle → AwaitingEngineStart → SettingUp → AwaitingMove → RoundResolving
/// → (AwaitingMove | GameOver)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    AwaitingEngineStart,
    SettingUp,
    AwaitingMove,
    RoundResolving,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupKind {
    Initial,
    Subsequent,
}

#[derive(Debug, Clone)]
pub struct SessionState {
    phase: Phase,
    mode: GameMode,
    game_started: bool,
    initial_setup_complete: bool,
    waiting_for_move: bool,
    round: u32,
    last_round_data: Option<RoundSnapshot>,
    last_opponents_round_data: Option<RoundSnapshot>,
    last_move_ack: Option<String>,
    view: Option<EngineView>,
    opponent_name: Option<String>,
    pub multiplayer: MultiplayerState,
}

impl SessionState {
    pub fn new(mode: GameMode) -> Self {
        Self {
            phase: Phase::Idle,
            mode,
            game_started: false,
            initial_setup_complete: false,
            waiting_for_move: false,
            round: 0,
            last_round_data: None,
            last_opponents_round_data: None,
            last_move_ack: None,
            view: None,
            opponent_name: None,
            multiplayer: MultiplayerState::default(),
        }
    }

    pub fn with_multiplayer(mut self, multiplayer: MultiplayerState) -> Self {
        self.multiplayer = multiplayer;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn game_started(&self) -> bool {
        self.game_started
    }

    pub fn initial_setup_complete(&self) -> bool {
        self.initial_setup_complete
    }

    pub fn waiting_for_move(&self) -> bool {
        self.waiting_for_move
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn view(&self) -> Option<&EngineView> {
        self.view.as_ref()
    }

    pub fn last_round(&self) -> Option<(&RoundSnapshot, &RoundSnapshot)> {
        self.last_round_data
            .as_ref()
            .zip(self.last_opponents_round_data.as_ref())
    }

    pub fn opponent_name(&self) -> Option<&str> {
        self.opponent_name
            .as_deref()
            .or_else(|| self.view.as_ref().map(|v| v.opponent.name.as_str()))
    }

    pub fn set_opponent_name(&mut self, name: String) {
        self.opponent_name = Some(name);
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn engine_created(&mut self) {
        if self.phase == Phase::Idle {
            self.phase = Phase::AwaitingEngineStart;
        }
    }

    pub fn on_start(&mut self) {
        self.game_started = true;
        self.phase = Phase::SettingUp;
    }

    pub fn on_setup(&mut self, view: EngineView) -> SetupKind {
        self.view = Some(view);
        self.phase = Phase::AwaitingMove;
        if self.initial_setup_complete {
            SetupKind::Subsequent
        } else {
            self.initial_setup_complete = true;
            SetupKind::Initial
        }
    }

    /// Claim the move prompt. `false` when one is already open.
    pub fn try_begin_prompt(&mut self) -> bool {
        if self.waiting_for_move || self.is_over() {
            return false;
        }
        self.waiting_for_move = true;
        true
    }

    /// The prompt closed without a move being sent.
    pub fn cancel_prompt(&mut self) {
        self.waiting_for_move = false;
    }

    pub fn move_dispatched(&mut self) {
        self.waiting_for_move = false;
        self.phase = Phase::RoundResolving;
    }

    /// Record a move acknowledgement. Returns `false` for a repeat of the
    /// last one.
    pub fn accept_move_ack(&mut self, id: &str) -> bool {
        if self.last_move_ack.as_deref() == Some(id) {
            return false;
        }
        self.last_move_ack = Some(id.to_string());
        true
    }

    /// Cache a resolved round. The acknowledged move is cleared so the same
    /// move can be picked again next round.
    pub fn record_round(
        &mut self,
        mine: RoundSnapshot,
        theirs: RoundSnapshot,
        view: Option<EngineView>,
    ) {
        self.round += 1;
        self.last_round_data = Some(mine);
        self.last_opponents_round_data = Some(theirs);
        self.last_move_ack = None;
        if let Some(view) = view {
            self.view = Some(view);
        }
        if self.both_alive() {
            self.phase = Phase::AwaitingMove;
        }
    }

    /// Both combatants have health left. Unknown without an engine view,
    /// which counts as alive.
    pub fn both_alive(&self) -> bool {
        self.view
            .as_ref()
            .map_or(true, |v| v.me.is_alive() && v.opponent.is_alive())
    }

    pub fn finish(&mut self) {
        self.phase = Phase::GameOver;
        self.waiting_for_move = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Combatant;

    fn view(me: i32, opp: i32) -> EngineView {
        EngineView {
            me: Combatant {
                name: "You".into(),
                health: me,
                max_health: 10,
                ..Combatant::default()
            },
            opponent: Combatant {
                name: "Rival".into(),
                health: opp,
                max_health: 10,
                ..Combatant::default()
            },
            moves: vec![],
        }
    }

    #[test]
    fn lifecycle() {
        let mut s = SessionState::new(GameMode::Single);
        assert_eq!(s.phase(), Phase::Idle);
        s.engine_created();
        assert_eq!(s.phase(), Phase::AwaitingEngineStart);
        assert!(!s.game_started());
        s.on_start();
        assert!(s.game_started());
        assert_eq!(s.phase(), Phase::SettingUp);
        assert_eq!(s.on_setup(view(10, 10)), SetupKind::Initial);
        assert_eq!(s.on_setup(view(10, 10)), SetupKind::Subsequent);
        assert_eq!(s.phase(), Phase::AwaitingMove);
        assert!(s.try_begin_prompt());
        assert!(s.waiting_for_move());
        s.move_dispatched();
        assert!(!s.waiting_for_move());
        assert_eq!(s.phase(), Phase::RoundResolving);
        s.record_round(RoundSnapshot::default(), RoundSnapshot::default(), Some(view(5, 0)));
        assert_eq!(s.phase(), Phase::RoundResolving);
        assert!(!s.both_alive());
        s.finish();
        assert!(s.is_over());
    }

    #[test]
    fn one_prompt_at_a_time() {
        let mut s = SessionState::new(GameMode::Single);
        assert!(s.try_begin_prompt());
        assert!(!s.try_begin_prompt());
        s.cancel_prompt();
        assert!(s.try_begin_prompt());
        s.finish();
        assert!(!s.try_begin_prompt());
    }

    #[test]
    fn duplicate_ack_suppressed_until_next_round() {
        let mut s = SessionState::new(GameMode::Single);
        assert!(s.accept_move_ack("thrust"));
        assert!(!s.accept_move_ack("thrust"));
        s.record_round(RoundSnapshot::default(), RoundSnapshot::default(), None);
        assert!(s.accept_move_ack("thrust"));
        assert_eq!(s.round(), 1);
        assert!(s.last_round().is_some());
    }

    #[test]
    fn opponent_name_prefers_announced() {
        let mut s = SessionState::new(GameMode::Multiplayer);
        assert_eq!(s.opponent_name(), None);
        s.on_setup(view(10, 10));
        assert_eq!(s.opponent_name(), Some("Rival"));
        s.set_opponent_name("Zed".into());
        assert_eq!(s.opponent_name(), Some("Zed"));
    }
}
