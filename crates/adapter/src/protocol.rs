//! Protocol module - JSON message types for the engine link
//!
//! Every message is one JSON object per line with a `type` tag. Field names
//! are camelCase on the wire.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{CharacterSummary, EngineView, GameMode, RoundData};

// ============== Engine -> Client Events ==============

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartEvent {
    #[serde(default)]
    pub characters: Vec<CharacterSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupEvent {
    pub state: EngineView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundEvent {
    pub my_round_data: RoundData,
    pub opponents_round_data: RoundData,
    #[serde(default)]
    pub state: Option<EngineView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyMoveEvent {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameEvent {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpponentCharacterEvent {
    pub character: String,
    #[serde(default)]
    pub is_computer: bool,
}

/// Transport diagnostics forwarded by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
    #[serde(default)]
    pub level: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EngineEvent {
    Start(StartEvent),
    Setup(SetupEvent),
    Round(RoundEvent),
    MyMove(MyMoveEvent),
    OpponentsMove,
    Victory,
    Defeat,
    RoomFull,
    Name(NameEvent),
    OpponentCharacter(OpponentCharacterEvent),
    Log(LogEvent),
}

/// Event names, used as subscription keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventName {
    Start,
    Setup,
    Round,
    MyMove,
    OpponentsMove,
    Victory,
    Defeat,
    RoomFull,
    Name,
    OpponentCharacter,
    Log,
}

impl EventName {
    pub const ALL: [EventName; 11] = [
        EventName::Start,
        EventName::Setup,
        EventName::Round,
        EventName::MyMove,
        EventName::OpponentsMove,
        EventName::Victory,
        EventName::Defeat,
        EventName::RoomFull,
        EventName::Name,
        EventName::OpponentCharacter,
        EventName::Log,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::Start => "start",
            EventName::Setup => "setup",
            EventName::Round => "round",
            EventName::MyMove => "myMove",
            EventName::OpponentsMove => "opponentsMove",
            EventName::Victory => "victory",
            EventName::Defeat => "defeat",
            EventName::RoomFull => "roomFull",
            EventName::Name => "name",
            EventName::OpponentCharacter => "opponentCharacter",
            EventName::Log => "log",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|n| n.as_str() == s)
    }
}

impl EngineEvent {
    pub fn name(&self) -> EventName {
        match self {
            EngineEvent::Start(_) => EventName::Start,
            EngineEvent::Setup(_) => EventName::Setup,
            EngineEvent::Round(_) => EventName::Round,
            EngineEvent::MyMove(_) => EventName::MyMove,
            EngineEvent::OpponentsMove => EventName::OpponentsMove,
            EngineEvent::Victory => EventName::Victory,
            EngineEvent::Defeat => EventName::Defeat,
            EngineEvent::RoomFull => EventName::RoomFull,
            EngineEvent::Name(_) => EventName::Name,
            EngineEvent::OpponentCharacter(_) => EventName::OpponentCharacter,
            EngineEvent::Log(_) => EventName::Log,
        }
    }
}

// ============== Client -> Engine Messages ==============

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupRequest {
    pub mode: GameMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    pub name: String,
    pub character: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EngineInput {
    Setup(SetupRequest),
    InputMove {
        #[serde(rename = "move")]
        move_id: String,
    },
    Disconnect,
}

// ============== Message Parsing ==============

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("unknown engine event `{0}`")]
    UnknownEvent(String),
    #[error("malformed engine message: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Decode one line from the engine.
///
/// An unrecognized `type` is reported separately from a known event with a
/// bad payload, so callers can log the former quietly.
pub fn decode_event(line: &str) -> Result<EngineEvent, ProtocolError> {
    match serde_json::from_str::<EngineEvent>(line) {
        Ok(event) => Ok(event),
        Err(err) => {
            #[derive(Deserialize)]
            struct TypeOnly<'a> {
                #[serde(rename = "type", borrow)]
                msg_type: Option<&'a str>,
            }
            let msg_type = serde_json::from_str::<TypeOnly>(line)?
                .msg_type
                .unwrap_or("unknown");
            if EventName::from_str(msg_type).is_none() {
                return Err(ProtocolError::UnknownEvent(msg_type.to_string()));
            }
            Err(ProtocolError::Malformed(err))
        }
    }
}

/// Encode one message for the engine, without the trailing newline.
pub fn encode_input(input: &EngineInput) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(input)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_unit_and_payload_events() {
        assert_eq!(decode_event(r#"{"type":"victory"}"#).unwrap(), EngineEvent::Victory);
        assert_eq!(
            decode_event(r#"{"type":"myMove","id":"thrust"}"#).unwrap(),
            EngineEvent::MyMove(MyMoveEvent { id: "thrust".into() })
        );
        let ev = decode_event(r#"{"type":"opponentCharacter","character":"zed","isComputer":true}"#)
            .unwrap();
        assert_eq!(ev.name(), EventName::OpponentCharacter);
    }

    #[test]
    fn decodes_round_without_state() {
        let line = r#"{"type":"round",
            "myRoundData":{"myMove":{"id":"a","name":"A"},"opponentMove":{"id":"b","name":"B"},
                "result":{"name":"Hit"},"score":3,"totalScore":3},
            "opponentsRoundData":{"myMove":{"id":"b","name":"B"},"opponentMove":{"id":"a","name":"A"},
                "result":{"name":"Hit"},"totalScore":0}}"#;
        let EngineEvent::Round(round) = decode_event(line).unwrap() else {
            panic!("expected round");
        };
        assert_eq!(round.my_round_data.total_score, 3);
        assert!(round.state.is_none());
        assert!(!round.opponents_round_data.attempted_hit());
    }

    #[test]
    fn unknown_type_versus_bad_payload() {
        assert!(matches!(
            decode_event(r#"{"type":"dance"}"#),
            Err(ProtocolError::UnknownEvent(t)) if t == "dance"
        ));
        assert!(matches!(
            decode_event(r#"{"type":"myMove"}"#),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(decode_event("not json"), Err(ProtocolError::Malformed(_))));
    }

    #[test]
    fn encodes_inputs() {
        let line = encode_input(&EngineInput::InputMove {
            move_id: "parry".into(),
        })
        .unwrap();
        assert_eq!(line, r#"{"type":"inputMove","move":"parry"}"#);

        let line = encode_input(&EngineInput::Setup(SetupRequest {
            mode: GameMode::Single,
            room_id: None,
            name: "Ann".into(),
            character: "ann".into(),
        }))
        .unwrap();
        let v: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(v["type"], "setup");
        assert_eq!(v["mode"], "single");
        assert!(v.get("roomId").is_none());
    }

    #[test]
    fn event_names_round_trip_strings() {
        for name in EventName::ALL {
            assert_eq!(EventName::from_str(name.as_str()), Some(name));
        }
    }
}
