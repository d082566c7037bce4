//! Engine link over a loopback TCP socket.

use std::io::BufRead;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use sword_duel::adapter::protocol::{MyMoveEvent, StartEvent};
use sword_duel::adapter::{
    BusFault, Engine, EngineConfig, EngineError, EngineEvent, EventBus, Inbound, SetupRequest,
    TcpEngine,
};
use sword_duel::types::{CharacterSummary, GameMode};

const ENGINE_LINES: &[&str] = &[
    r#"{"type":"start","characters":[{"slug":"ada","name":"Ada","health":20}]}"#,
    r#"{"type":"mystery","payload":1}"#,
    "not json at all",
    "",
    r#"{"type":"myMove","id":"lunge"}"#,
];

async fn fake_engine() -> (TcpListener, EngineConfig) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let config = EngineConfig {
        host: "127.0.0.1".into(),
        port: listener.local_addr().unwrap().port(),
        log_path: None,
    };
    (listener, config)
}

#[tokio::test]
async fn events_in_and_inputs_out() {
    let (listener, config) = fake_engine().await;
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (read, mut write) = stream.into_split();
        for line in ENGINE_LINES {
            write.write_all(line.as_bytes()).await.unwrap();
            write.write_all(b"\n").await.unwrap();
        }
        // Collect until the client shuts its side down after `disconnect`.
        let mut lines = BufReader::new(read).lines();
        let mut received = Vec::new();
        while let Some(line) = lines.next_line().await.unwrap() {
            received.push(line);
        }
        received
    });

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut bus = EventBus::new();
    bus.forward_into(tx);
    let mut engine = TcpEngine::connect(&config, bus).await.unwrap();
    assert_eq!(engine.peer().port(), config.port);

    assert_eq!(
        rx.recv().await,
        Some(Inbound::Event(EngineEvent::Start(StartEvent {
            characters: vec![CharacterSummary {
                slug: "ada".into(),
                name: "Ada".into(),
                description: None,
                health: 20,
            }],
        })))
    );
    // The unknown event type is dropped quietly; the garbage line is not.
    assert!(matches!(
        rx.recv().await,
        Some(Inbound::Fault(BusFault::Malformed(_)))
    ));
    assert_eq!(
        rx.recv().await,
        Some(Inbound::Event(EngineEvent::MyMove(MyMoveEvent {
            id: "lunge".into()
        })))
    );

    engine
        .setup(SetupRequest {
            mode: GameMode::Single,
            room_id: None,
            name: "Cass".into(),
            character: "ada".into(),
        })
        .unwrap();
    engine.input_move("lunge").unwrap();
    engine.disconnect();

    let received: Vec<Value> = server
        .await
        .unwrap()
        .iter()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(
        received,
        vec![
            json!({"type": "setup", "mode": "single", "name": "Cass", "character": "ada"}),
            json!({"type": "inputMove", "move": "lunge"}),
            json!({"type": "disconnect"}),
        ]
    );

    // Server hung up.
    assert_eq!(rx.recv().await, Some(Inbound::Fault(BusFault::Closed)));
    assert!(matches!(
        engine.input_move("parry"),
        Err(EngineError::Disconnected)
    ));
}

#[tokio::test]
async fn multiplayer_setup_carries_room() {
    let (listener, config) = fake_engine().await;
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut lines = BufReader::new(stream).lines();
        lines.next_line().await.unwrap()
    });

    let mut engine = TcpEngine::connect(&config, EventBus::new()).await.unwrap();
    engine
        .setup(SetupRequest {
            mode: GameMode::Multiplayer,
            room_id: Some("K7Q2Z".into()),
            name: "Cass".into(),
            character: "bea".into(),
        })
        .unwrap();

    let line = server.await.unwrap().unwrap();
    let value: Value = serde_json::from_str(&line).unwrap();
    assert_eq!(value["mode"], "multiplayer");
    assert_eq!(value["roomId"], "K7Q2Z");
    engine.disconnect();
}

#[tokio::test]
async fn unreachable_engine_is_a_connect_error() {
    let (listener, config) = fake_engine().await;
    drop(listener);

    let err = match TcpEngine::connect(&config, EventBus::new()).await {
        Ok(_) => panic!("connected to a closed port"),
        Err(err) => err,
    };
    assert!(matches!(err, EngineError::Connect { .. }));
    assert!(err.to_string().contains(&config.address()));
}

#[test]
fn close_delivers_disconnect_before_the_runtime_drops() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let config = EngineConfig {
        host: "127.0.0.1".into(),
        port: listener.local_addr().unwrap().port(),
        log_path: None,
    };
    let server = std::thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        std::io::BufReader::new(stream)
            .lines()
            .map(|line| line.unwrap())
            .collect::<Vec<_>>()
    });

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    runtime.block_on(async {
        let mut engine = TcpEngine::connect(&config, EventBus::new()).await.unwrap();
        engine.input_move("thrust").unwrap();
        engine.close(Duration::from_secs(2)).await;
    });
    drop(runtime);

    let received: Vec<Value> = server
        .join()
        .unwrap()
        .iter()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(
        received,
        vec![
            json!({"type": "inputMove", "move": "thrust"}),
            json!({"type": "disconnect"}),
        ]
    );
}

#[tokio::test]
async fn close_after_disconnect_sends_it_once() {
    let (listener, config) = fake_engine().await;
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut lines = BufReader::new(stream).lines();
        let mut received = Vec::new();
        while let Some(line) = lines.next_line().await.unwrap() {
            received.push(line);
        }
        received
    });

    let mut engine = TcpEngine::connect(&config, EventBus::new()).await.unwrap();
    engine.disconnect();
    engine.close(Duration::from_secs(2)).await;

    assert_eq!(server.await.unwrap(), vec![r#"{"type":"disconnect"}"#]);
}
