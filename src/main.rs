//! Sword duel terminal front-end.
//!
//! Connects to a duel engine over TCP, asks for a game mode and a player
//! name, then hands control to the session orchestrator.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use sword_duel::adapter::{EngineConfig, EventBus, KvStore, MemoryStore, TcpEngine, PLAYER_NAME_KEY};
use sword_duel::core::SimpleRng;
use sword_duel::input::{read_or_default, CrosstermKeys, StdinLines};
use sword_duel::logging;
use sword_duel::session::{
    ctrl_c, unless_interrupted, MultiplayerState, Orchestrator, RoomId, SessionConfig, SessionEnd,
    SessionState, Terminal, DEFAULT_PLAYER_NAME,
};
use sword_duel::term::{
    install_panic_hook, restore_terminal, select, ChoiceVia, Outcome, Output, Prompt, SelectOptions,
    StdoutConsole, TerminalRenderer,
};
use sword_duel::types::{GameMode, Line, SelectableItem, Tone};

/// How long the queued `disconnect` may take to reach the engine on exit.
const ENGINE_CLOSE_LIMIT: Duration = Duration::from_millis(500);
const RUNTIME_SHUTDOWN_LIMIT: Duration = Duration::from_millis(100);

#[derive(Debug, Parser)]
#[command(name = "sword-duel", version, about = "Play a sword duel in the terminal")]
struct Cli {
    /// Join an existing multiplayer room by its 5 character code.
    #[arg(long, value_name = "ROOM_ID")]
    join: Option<String>,
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match run(cli) {
        Ok(end) if end.is_failure() => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            restore_terminal();
            tracing::error!(error = %format!("{err:#}"), "fatal");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<SessionEnd> {
    let join = cli
        .join
        .as_deref()
        .map(RoomId::parse)
        .transpose()
        .context("invalid --join room id")?;

    let _log_guard = logging::init()?;
    install_panic_hook();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building async runtime")?;
    let end = runtime.block_on(play(join));
    // An interrupted name prompt leaves a blocking stdin read behind.
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN_LIMIT);
    end
}

fn mode_items() -> Vec<SelectableItem> {
    vec![
        SelectableItem::new(GameMode::Single.as_str(), "Single player", "modes")
            .with_description("Duel a computer opponent"),
        SelectableItem::new(GameMode::Multiplayer.as_str(), "Host multiplayer", "modes")
            .with_description("Create a room and share its code"),
    ]
}

async fn play(join: Option<RoomId>) -> Result<SessionEnd> {
    // Listen before the first blocking step so Ctrl-C never kills the process.
    let interrupt = ctrl_c();
    tokio::pin!(interrupt);

    let config = SessionConfig::from_env();
    let mut console = StdoutConsole::new();
    let mut keys = CrosstermKeys::new();
    let mut screen = TerminalRenderer::new();
    let mut store = MemoryStore::new();

    let multiplayer = match join {
        Some(room) => {
            console.emit(&Line::new(Tone::Info, format!("Joining room {room}")));
            Some(MultiplayerState::joining(room, config.relay_failure_threshold))
        }
        None => {
            let prompt = Prompt::new("Choose a game mode", mode_items());
            let options = SelectOptions {
                confirm_delay: config.confirm_delay,
            };
            let picked = unless_interrupted(
                interrupt.as_mut(),
                select(&mut keys, &mut screen, &prompt, &options),
            )
            .await;
            let choice = match picked.transpose()? {
                None => return Ok(SessionEnd::Interrupted),
                Some(Outcome::Chosen(choice)) => choice,
                Some(Outcome::Aborted) => return Ok(SessionEnd::Aborted),
            };
            if choice.via == ChoiceVia::Fallback {
                console.emit(&Line::new(
                    Tone::Dim,
                    format!("Auto-selected {} (no interactive input)", choice.item.name),
                ));
            }
            match GameMode::from_str(&choice.item.id) {
                Some(GameMode::Multiplayer) => {
                    let room = RoomId::generate(&mut SimpleRng::from_clock());
                    console.emit(&Line::new(
                        Tone::Accent,
                        format!("Room code: {room}. Share it with your opponent."),
                    ));
                    Some(MultiplayerState::hosting(room, config.relay_failure_threshold))
                }
                _ => None,
            }
        }
    };

    console.emit(&Line::plain(format!("Your name [{DEFAULT_PLAYER_NAME}]:")));
    let mut lines = StdinLines::new();
    let Some(name) = unless_interrupted(
        interrupt.as_mut(),
        read_or_default(&mut lines, DEFAULT_PLAYER_NAME),
    )
    .await
    .transpose()?
    else {
        return Ok(SessionEnd::Interrupted);
    };
    store.set(PLAYER_NAME_KEY, name);

    let state = match multiplayer {
        Some(mp) => SessionState::new(GameMode::Multiplayer).with_multiplayer(mp),
        None => SessionState::new(GameMode::Single),
    };

    let engine_config = EngineConfig::from_env();
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let mut bus = EventBus::new();
    bus.forward_into(tx);
    let Some(connected) =
        unless_interrupted(interrupt.as_mut(), TcpEngine::connect(&engine_config, bus)).await
    else {
        return Ok(SessionEnd::Interrupted);
    };
    let engine = connected
        .with_context(|| format!("connecting to the duel engine at {}", engine_config.address()))?;
    tracing::info!(peer = %engine.peer(), mode = state.mode().as_str(), "engine connected");

    let mut orchestrator = Orchestrator::new(
        engine,
        console,
        Box::new(store),
        Terminal::new(keys, screen),
        config,
        state,
    );
    let end = orchestrator.run(rx, interrupt.as_mut()).await;
    orchestrator.into_engine().close(ENGINE_CLOSE_LIMIT).await;
    end
}
