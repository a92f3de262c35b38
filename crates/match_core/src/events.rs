//! Wire protocol: typed events and the inbound envelope.
//!
//! Inbound messages arrive as `{"event": <name>, "data": <payload>}` JSON
//! text. [`ClientEvent::parse`] validates the payload once at this boundary
//! and hands the session a typed value; handlers never see raw JSON. Every
//! malformed message maps to a [`ProtocolError`] whose display text is sent
//! back to the offender in an `error` event.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProtocolError;
use crate::types::{MatchOutcome, Side};

/// The token a mover submits instead of a move to concede the game.
pub const RESIGN: &str = "resign";

/// Raw inbound envelope, before per-event validation.
#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: Option<Value>,
}

/// A validated inbound event with its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// A player asks to take a seat.
    JoinRequest { name: String, author: String },
    /// A seated player confirms readiness.
    ReadyConfirm,
    /// The mover's chosen action: a move notation or [`RESIGN`].
    MoveSubmit(String),
    /// Any connection asks for a view snapshot.
    ViewQuery,
}

impl ClientEvent {
    /// Parse and validate one inbound text frame.
    pub fn parse(text: &str) -> Result<ClientEvent, ProtocolError> {
        let envelope: Envelope = serde_json::from_str(text)
            .map_err(|e| ProtocolError::Malformed(e.to_string()))?;

        match envelope.event.as_str() {
            "join-request" => {
                let data = envelope.data.unwrap_or(Value::Null);
                let name = require_string_field(&data, "name")?;
                let author = require_string_field(&data, "author")?;
                Ok(ClientEvent::JoinRequest { name, author })
            }
            "ready-confirm" => Ok(ClientEvent::ReadyConfirm),
            "move-submit" => match envelope.data {
                Some(Value::String(notation)) => Ok(ClientEvent::MoveSubmit(notation)),
                _ => Err(ProtocolError::InvalidPayload(
                    "move-submit expects a move notation string.",
                )),
            },
            "view-query" => Ok(ClientEvent::ViewQuery),
            other => Err(ProtocolError::UnknownEvent(other.to_string())),
        }
    }
}

fn require_string_field(data: &Value, field: &'static str) -> Result<String, ProtocolError> {
    data.get(field)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or(ProtocolError::MissingField(field))
}

/// Both clocks as shown to observers, in whole seconds.
///
/// Field names follow the side encoding: `b*` for Black, `w*` for White.
/// Byoyomi values are the projected remainders and may be negative for an
/// overdrawn mover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockPanel {
    pub btime: u64,
    pub wtime: u64,
    pub bbyoyomi: i64,
    pub wbyoyomi: i64,
}

/// An outbound event, serialized as `{"event": ..., "data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// A rejected request, with the reason, to one client.
    Error { message: String },
    /// Acknowledges a successful join.
    Info { message: String },
    /// Asks a seated player to confirm readiness.
    ReadyCheck,
    /// Both players confirmed; the game begins.
    MatchStart,
    /// Asks the side to move for its move. Remaining times are in
    /// milliseconds, `position` is the canonical position text.
    MoveRequest {
        position: String,
        btime: u64,
        wtime: u64,
        byoyomi: u64,
    },
    /// The game ended; broadcast with the cause and the winner, if any.
    Termination {
        outcome: MatchOutcome,
        winner: Option<Side>,
    },
    /// Read-only snapshot for observers: rendering, move history, clocks.
    ViewSnapshot {
        svg: String,
        kif: String,
        timelimit: ClockPanel,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_join_request() {
        let event =
            ClientEvent::parse(r#"{"event":"join-request","data":{"name":"iris","author":"nn"}}"#)
                .unwrap();
        assert_eq!(
            event,
            ClientEvent::JoinRequest {
                name: "iris".to_string(),
                author: "nn".to_string()
            }
        );
    }

    #[test]
    fn test_join_request_missing_name() {
        let err =
            ClientEvent::parse(r#"{"event":"join-request","data":{"author":"nn"}}"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "You sent a request but name field was None."
        );
    }

    #[test]
    fn test_join_request_missing_author() {
        let err =
            ClientEvent::parse(r#"{"event":"join-request","data":{"name":"iris"}}"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "You sent a request but author field was None."
        );
    }

    #[test]
    fn test_join_request_without_data() {
        let err = ClientEvent::parse(r#"{"event":"join-request"}"#).unwrap_err();
        assert_eq!(err, ProtocolError::MissingField("name"));
    }

    #[test]
    fn test_join_request_non_string_field() {
        let err = ClientEvent::parse(r#"{"event":"join-request","data":{"name":3,"author":"nn"}}"#)
            .unwrap_err();
        assert_eq!(err, ProtocolError::MissingField("name"));
    }

    #[test]
    fn test_parse_ready_confirm_ignores_data() {
        let event = ClientEvent::parse(r#"{"event":"ready-confirm","data":{"x":1}}"#).unwrap();
        assert_eq!(event, ClientEvent::ReadyConfirm);
        let bare = ClientEvent::parse(r#"{"event":"ready-confirm"}"#).unwrap();
        assert_eq!(bare, ClientEvent::ReadyConfirm);
    }

    #[test]
    fn test_parse_move_submit() {
        let event = ClientEvent::parse(r#"{"event":"move-submit","data":"4e4d"}"#).unwrap();
        assert_eq!(event, ClientEvent::MoveSubmit("4e4d".to_string()));
    }

    #[test]
    fn test_move_submit_requires_string() {
        let err = ClientEvent::parse(r#"{"event":"move-submit","data":{"move":"4e4d"}}"#)
            .unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidPayload(_)));
    }

    #[test]
    fn test_parse_view_query() {
        let event = ClientEvent::parse(r#"{"event":"view-query"}"#).unwrap();
        assert_eq!(event, ClientEvent::ViewQuery);
    }

    #[test]
    fn test_unknown_event() {
        let err = ClientEvent::parse(r#"{"event":"teleport","data":null}"#).unwrap_err();
        assert_eq!(err, ProtocolError::UnknownEvent("teleport".to_string()));
    }

    #[test]
    fn test_malformed_json() {
        let err = ClientEvent::parse("not json at all").unwrap_err();
        assert!(matches!(err, ProtocolError::Malformed(_)));
    }

    #[test]
    fn test_server_event_wire_shape() {
        let json = serde_json::to_value(&ServerEvent::MoveRequest {
            position: "startpos".to_string(),
            btime: 600000,
            wtime: 598000,
            byoyomi: 30000,
        })
        .unwrap();
        assert_eq!(json["event"], "move-request");
        assert_eq!(json["data"]["btime"], 600000);
        assert_eq!(json["data"]["position"], "startpos");
    }

    #[test]
    fn test_termination_wire_shape() {
        let json = serde_json::to_value(&ServerEvent::Termination {
            outcome: MatchOutcome::Timeout,
            winner: Some(Side::White),
        })
        .unwrap();
        assert_eq!(json["event"], "termination");
        assert_eq!(json["data"]["outcome"], "timeout");
        assert_eq!(json["data"]["winner"], "white");

        let draw = serde_json::to_value(&ServerEvent::Termination {
            outcome: MatchOutcome::Repetition,
            winner: None,
        })
        .unwrap();
        assert_eq!(draw["data"]["winner"], Value::Null);
    }

    #[test]
    fn test_unit_variant_wire_shape() {
        let json = serde_json::to_string(&ServerEvent::MatchStart).unwrap();
        assert_eq!(json, r#"{"event":"match-start"}"#);
    }

    #[test]
    fn test_server_event_round_trip() {
        let event = ServerEvent::ViewSnapshot {
            svg: "<svg/>".to_string(),
            kif: "1 4e4d".to_string(),
            timelimit: ClockPanel {
                btime: 598,
                wtime: 600,
                bbyoyomi: 30,
                wbyoyomi: 30,
            },
        };
        let text = serde_json::to_string(&event).unwrap();
        let back: ServerEvent = serde_json::from_str(&text).unwrap();
        assert_eq!(event, back);
    }
}
