//! Engine link - TCP client speaking the line-delimited JSON protocol.

use std::cell::RefCell;
use std::net::SocketAddr;
use std::rc::Rc;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::bus::{BusFault, EventBus};
use crate::protocol::{decode_event, encode_input, EngineInput, ProtocolError, SetupRequest};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to connect to engine at {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("engine link is closed")]
    Disconnected,
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Commands the front-end sends to the engine.
pub trait Engine {
    fn setup(&mut self, request: SetupRequest) -> Result<(), EngineError>;
    fn input_move(&mut self, move_id: &str) -> Result<(), EngineError>;
    fn disconnect(&mut self);
}

/// Engine link configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub host: String,
    pub port: u16,
    /// Append every line sent and received to this file.
    pub log_path: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            log_path: None,
        }
    }
}

impl EngineConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("DUEL_ENGINE_HOST")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);
        let port = env::var("DUEL_ENGINE_PORT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);
        let log_path = env::var("DUEL_ENGINE_LOG_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Self {
            host,
            port,
            log_path,
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug)]
enum WireRecord {
    Sent(String),
    Received(String),
}

fn spawn_wire_log(path: String) -> mpsc::UnboundedSender<WireRecord> {
    let (tx, mut rx) = mpsc::unbounded_channel::<WireRecord>();
    tokio::spawn(async move {
        use tokio::fs::OpenOptions;

        let mut file = match OpenOptions::new().create(true).append(true).open(&path).await {
            Ok(f) => f,
            Err(err) => {
                tracing::warn!(%path, error = %err, "cannot open engine wire log");
                return;
            }
        };
        while let Some(rec) = rx.recv().await {
            let line = match rec {
                WireRecord::Sent(l) => format!(">> {l}\n"),
                WireRecord::Received(l) => format!("<< {l}\n"),
            };
            if file.write_all(line.as_bytes()).await.is_err() {
                break;
            }
        }
        let _ = file.flush().await;
    });
    tx
}

/// Live TCP link. Incoming lines are decoded and dispatched through the
/// [`EventBus`] by a reader task; outgoing messages go through a writer task.
pub struct TcpEngine {
    out_tx: Option<mpsc::UnboundedSender<EngineInput>>,
    writer: Option<JoinHandle<()>>,
    peer: SocketAddr,
}

impl TcpEngine {
    pub async fn connect(config: &EngineConfig, mut bus: EventBus) -> Result<Self, EngineError> {
        let addr = config.address();
        let stream = TcpStream::connect(&addr)
            .await
            .map_err(|source| EngineError::Connect {
                addr: addr.clone(),
                source,
            })?;
        let peer = stream.peer_addr().map_err(|source| EngineError::Connect {
            addr: addr.clone(),
            source,
        })?;
        tracing::info!(%peer, "connected to engine");

        let wire_log = config.log_path.clone().map(spawn_wire_log);
        let (reader, mut writer) = stream.into_split();

        let read_log = wire_log.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(reader).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim();
                        if line.is_empty() {
                            continue;
                        }
                        if let Some(log) = read_log.as_ref() {
                            let _ = log.send(WireRecord::Received(line.to_string()));
                        }
                        match decode_event(line) {
                            Ok(event) => {
                                tracing::debug!(event = event.name().as_str(), "engine event");
                                bus.dispatch(&event);
                            }
                            Err(ProtocolError::UnknownEvent(kind)) => {
                                tracing::debug!(%kind, "ignoring unknown engine event");
                            }
                            Err(err) => {
                                tracing::warn!(error = %err, "malformed engine line");
                                bus.fault(&BusFault::Malformed(err.to_string()));
                            }
                        }
                    }
                    Ok(None) => break,
                    Err(err) => {
                        tracing::warn!(error = %err, "engine read failed");
                        break;
                    }
                }
            }
            tracing::info!("engine link closed");
            bus.fault(&BusFault::Closed);
        });

        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<EngineInput>();
        let writer = tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                let is_disconnect = matches!(msg, EngineInput::Disconnect);
                let line = match encode_input(&msg) {
                    Ok(line) => line,
                    Err(err) => {
                        tracing::warn!(error = %err, "cannot encode engine input");
                        continue;
                    }
                };
                if let Some(log) = wire_log.as_ref() {
                    let _ = log.send(WireRecord::Sent(line.clone()));
                }
                let mut bytes = line.into_bytes();
                bytes.push(b'\n');
                if writer.write_all(&bytes).await.is_err() || writer.flush().await.is_err() {
                    break;
                }
                if is_disconnect {
                    let _ = writer.shutdown().await;
                    break;
                }
            }
        });

        Ok(Self {
            out_tx: Some(out_tx),
            writer: Some(writer),
            peer,
        })
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Sends `disconnect` (unless already sent) and waits up to `limit` for
    /// the writer task to flush everything queued before it.
    ///
    /// [`Engine::disconnect`] only queues the message. Call this before the
    /// runtime goes away or the queue is lost.
    pub async fn close(mut self, limit: Duration) {
        self.disconnect();
        let Some(writer) = self.writer.take() else {
            return;
        };
        match tokio::time::timeout(limit, writer).await {
            Ok(Ok(())) => tracing::debug!(peer = %self.peer, "engine writer drained"),
            Ok(Err(err)) => tracing::warn!(error = %err, "engine writer task failed"),
            Err(_) => tracing::warn!(?limit, "engine writer did not drain in time"),
        }
    }

    fn send(&self, input: EngineInput) -> Result<(), EngineError> {
        let tx = self.out_tx.as_ref().ok_or(EngineError::Disconnected)?;
        tx.send(input).map_err(|_| EngineError::Disconnected)
    }
}

impl Engine for TcpEngine {
    fn setup(&mut self, request: SetupRequest) -> Result<(), EngineError> {
        self.send(EngineInput::Setup(request))
    }

    fn input_move(&mut self, move_id: &str) -> Result<(), EngineError> {
        self.send(EngineInput::InputMove {
            move_id: move_id.to_string(),
        })
    }

    fn disconnect(&mut self) {
        if self.out_tx.is_some() {
            let _ = self.send(EngineInput::Disconnect);
            self.out_tx = None;
        }
    }
}

/// Records inputs instead of sending them; clones share the record.
#[derive(Debug, Clone, Default)]
pub struct RecordingEngine {
    sent: Rc<RefCell<Vec<EngineInput>>>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<EngineInput> {
        self.sent.borrow().clone()
    }

    pub fn moves(&self) -> Vec<String> {
        self.sent
            .borrow()
            .iter()
            .filter_map(|i| match i {
                EngineInput::InputMove { move_id } => Some(move_id.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Engine for RecordingEngine {
    fn setup(&mut self, request: SetupRequest) -> Result<(), EngineError> {
        self.sent.borrow_mut().push(EngineInput::Setup(request));
        Ok(())
    }

    fn input_move(&mut self, move_id: &str) -> Result<(), EngineError> {
        self.sent.borrow_mut().push(EngineInput::InputMove {
            move_id: move_id.to_string(),
        });
        Ok(())
    }

    fn disconnect(&mut self) {
        self.sent.borrow_mut().push(EngineInput::Disconnect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.address(), "127.0.0.1:7878");
        assert!(config.log_path.is_none());
    }

    #[test]
    fn test_recording_engine_shares_record() {
        let mut engine = RecordingEngine::new();
        let view = engine.clone();
        engine.input_move("thrust").unwrap();
        engine.disconnect();
        assert_eq!(view.moves(), vec!["thrust"]);
        assert_eq!(view.sent().last(), Some(&EngineInput::Disconnect));
    }

    #[tokio::test]
    async fn test_connect_refused_is_connect_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let config = EngineConfig {
            host: "127.0.0.1".into(),
            port,
            log_path: None,
        };
        let err = TcpEngine::connect(&config, EventBus::new()).await.err().unwrap();
        assert!(matches!(err, EngineError::Connect { .. }));
    }
}
