//! Wire protocol between clients and the relay server.
//!
//! Messages are JSON with an internal `type` tag naming the event
//! (`draw`, `clear`, `boardState`, `currentUsers`):
//!
//! ```json
//! { "type": "draw", "x0": 0, "y0": 0, "x1": 10, "y1": 10, "color": "#000", "size": 2 }
//! { "type": "clear" }
//! { "type": "boardState", "segments": [ ... ] }
//! { "type": "currentUsers", "count": 3 }
//! ```
//!
//! Delivery is fire-and-forget: no acks, no retries, no ordering guarantee
//! beyond the transport's.

use crate::segment::Segment;
use serde::{Deserialize, Serialize};

/// Messages sent to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// One drawn segment, relayed immediately.
    Draw {
        #[serde(flatten)]
        segment: Segment,
    },
    /// Ask the server to blank the board for everyone.
    Clear,
}

/// Messages received from the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// The full ordered board history; replayed in full on receipt.
    BoardState { segments: Vec<Segment> },
    /// A segment drawn by another client.
    Draw {
        #[serde(flatten)]
        segment: Segment,
    },
    /// Blank the board (sent to everyone, including the requester).
    Clear,
    /// Number of currently connected clients.
    CurrentUsers { count: usize },
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    fn seg() -> Segment {
        Segment::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0), "#000", 2.0)
    }

    #[test]
    fn test_draw_payload_is_flat() {
        let msg = ClientMessage::Draw { segment: seg() };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "draw");
        // Segment fields sit beside the tag, not nested.
        assert_eq!(json["x0"], 0.0);
        assert_eq!(json["x1"], 10.0);
        assert_eq!(json["color"], "#000");
        assert!(json.get("segment").is_none());
    }

    #[test]
    fn test_clear_has_no_payload() {
        let json = serde_json::to_string(&ClientMessage::Clear).unwrap();
        assert_eq!(json, r#"{"type":"clear"}"#);
    }

    #[test]
    fn test_board_state_tag() {
        let msg = ServerMessage::BoardState {
            segments: vec![seg(), seg()],
        };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "boardState");
        assert_eq!(json["segments"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_current_users_tag() {
        let json = serde_json::to_string(&ServerMessage::CurrentUsers { count: 3 }).unwrap();
        assert_eq!(json, r#"{"type":"currentUsers","count":3}"#);
    }

    #[test]
    fn test_server_draw_roundtrip() {
        let msg = ServerMessage::Draw { segment: seg() };
        let json = serde_json::to_string(&msg).unwrap();
        let back: ServerMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn test_malformed_message_is_an_error() {
        assert!(serde_json::from_str::<ServerMessage>(r#"{"type":"nope"}"#).is_err());
        assert!(serde_json::from_str::<ServerMessage>("not json").is_err());
    }
}
