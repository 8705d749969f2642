//! Wire protocol between clients and the relay.
//!
//! Every frame is a JSON text message tagged by `type` with camelCase
//! fields. Shape mutations travel inside `chat` frames as a JSON-encoded
//! [`ShapeMessage`] envelope, which the relay validates but otherwise passes
//! through.

use crate::shapes::{Shape, ShapeId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors decoding wire messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid message: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown envelope type: {0}")]
    UnknownType(String),
}

/// Messages sent to the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Join a room.
    JoinRoom { room_id: String },
    /// Leave a room.
    LeaveRoom { room_id: String },
    /// Pointer position in world coordinates.
    CursorMove { room_id: String, x: f64, y: f64 },
    /// Shape mutation; `message` is an encoded [`ShapeMessage`].
    Chat { room_id: String, message: String },
}

impl ClientMessage {
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Roster entry for a connected user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub user_id: String,
    pub name: String,
}

/// Messages received from the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Another user's pointer moved.
    CursorMove {
        user_id: String,
        name: String,
        x: f64,
        y: f64,
    },
    /// A shape mutation from another connection.
    Chat { room_id: String, message: String },
    /// Full roster of the room.
    UserList { users: Vec<RosterEntry> },
}

impl ServerMessage {
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// A shape mutation as carried by `chat` frames and applied to storage.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeMessage {
    Create(Shape),
    Update(Shape),
    Delete(ShapeId),
    Clear,
}

/// Creation envelopes carry no `type` key.
#[derive(Serialize, Deserialize)]
struct CreateEnvelope {
    shape: Shape,
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TaggedEnvelope {
    Update { shape: Shape },
    Delete { id: ShapeId },
    Clear,
}

impl ShapeMessage {
    /// Encode as the JSON envelope string.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        let json = match self {
            ShapeMessage::Create(shape) => serde_json::to_string(&CreateEnvelope {
                shape: shape.clone(),
            })?,
            ShapeMessage::Update(shape) => serde_json::to_string(&TaggedEnvelope::Update {
                shape: shape.clone(),
            })?,
            ShapeMessage::Delete(id) => {
                serde_json::to_string(&TaggedEnvelope::Delete { id: id.clone() })?
            }
            ShapeMessage::Clear => serde_json::to_string(&TaggedEnvelope::Clear)?,
        };
        Ok(json)
    }

    /// Decode a JSON envelope string.
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(text)?;
        let tag = value.get("type").map(|t| match t {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });
        match tag.as_deref() {
            None => {
                let CreateEnvelope { shape } = serde_json::from_value(value)?;
                Ok(ShapeMessage::Create(shape))
            }
            Some("update" | "delete" | "clear") => {
                Ok(match serde_json::from_value::<TaggedEnvelope>(value)? {
                    TaggedEnvelope::Update { shape } => ShapeMessage::Update(shape),
                    TaggedEnvelope::Delete { id } => ShapeMessage::Delete(id),
                    TaggedEnvelope::Clear => ShapeMessage::Clear,
                })
            }
            Some(other) => Err(ProtocolError::UnknownType(other.to_string())),
        }
    }

    /// Apply to a plain shape list: create upserts, update replaces if
    /// present, delete removes, clear empties.
    pub fn apply_to(&self, shapes: &mut Vec<Shape>) {
        match self {
            ShapeMessage::Create(shape) => {
                match shapes.iter_mut().find(|s| s.id() == shape.id()) {
                    Some(existing) => *existing = shape.clone(),
                    None => shapes.push(shape.clone()),
                }
            }
            ShapeMessage::Update(shape) => {
                if let Some(existing) = shapes.iter_mut().find(|s| s.id() == shape.id()) {
                    *existing = shape.clone();
                }
            }
            ShapeMessage::Delete(id) => shapes.retain(|s| s.id() != id),
            ShapeMessage::Clear => shapes.clear(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ShapeMessage::Create(_) => "create",
            ShapeMessage::Update(_) => "update",
            ShapeMessage::Delete(_) => "delete",
            ShapeMessage::Clear => "clear",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Rectangle;
    use kurbo::Point;

    fn rect() -> Shape {
        Shape::Rectangle(Rectangle::new(Point::new(10.0, 10.0), 40.0, 30.0))
    }

    #[test]
    fn test_client_message_wire_format() {
        let msg = ClientMessage::JoinRoom {
            room_id: "r1".to_string(),
        };
        assert_eq!(msg.to_json().unwrap(), r#"{"type":"join_room","roomId":"r1"}"#);

        let msg = ClientMessage::CursorMove {
            room_id: "r1".to_string(),
            x: 1.5,
            y: 2.0,
        };
        let value: Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert_eq!(value["type"], "cursor_move");
        assert_eq!(value["roomId"], "r1");
        assert_eq!(value["x"], 1.5);
    }

    #[test]
    fn test_server_message_parse() {
        let json = r#"{"type":"user_list","users":[{"userId":"u1","name":"Ada"}]}"#;
        match ServerMessage::from_json(json).unwrap() {
            ServerMessage::UserList { users } => {
                assert_eq!(users.len(), 1);
                assert_eq!(users[0].user_id, "u1");
                assert_eq!(users[0].name, "Ada");
            }
            other => panic!("unexpected {other:?}"),
        }

        let json = r#"{"type":"cursor_move","userId":"u2","name":"Bo","x":3,"y":4}"#;
        assert!(matches!(
            ServerMessage::from_json(json).unwrap(),
            ServerMessage::CursorMove { x, .. } if (x - 3.0).abs() < f64::EPSILON
        ));
    }

    #[test]
    fn test_malformed_frames_rejected() {
        assert!(ClientMessage::from_json("not json").is_err());
        assert!(ClientMessage::from_json(r#"{"type":"dance"}"#).is_err());
        assert!(ClientMessage::from_json(r#"{"type":"join_room"}"#).is_err());
    }

    #[test]
    fn test_create_envelope_has_no_type() {
        let shape = rect();
        let encoded = ShapeMessage::Create(shape.clone()).encode().unwrap();
        let value: Value = serde_json::from_str(&encoded).unwrap();
        assert!(value.get("type").is_none());
        assert_eq!(value["shape"]["type"], "rect");
        assert_eq!(ShapeMessage::decode(&encoded).unwrap(), ShapeMessage::Create(shape));
    }

    #[test]
    fn test_tagged_envelopes() {
        let shape = rect();
        let update = ShapeMessage::decode(
            &ShapeMessage::Update(shape.clone()).encode().unwrap(),
        )
        .unwrap();
        assert_eq!(update, ShapeMessage::Update(shape));

        let delete = ShapeMessage::decode(r#"{"type":"delete","id":"abc"}"#).unwrap();
        assert_eq!(delete, ShapeMessage::Delete(ShapeId::from("abc")));

        let clear = ShapeMessage::decode(r#"{"type":"clear"}"#).unwrap();
        assert_eq!(clear, ShapeMessage::Clear);
    }

    #[test]
    fn test_invalid_envelopes() {
        assert!(matches!(
            ShapeMessage::decode(r#"{"type":"explode"}"#),
            Err(ProtocolError::UnknownType(t)) if t == "explode"
        ));
        assert!(ShapeMessage::decode(r#"{"type":"delete"}"#).is_err());
        assert!(ShapeMessage::decode(r#"{"shape":{"type":"hexagon"}}"#).is_err());
        assert!(ShapeMessage::decode("[1,2]").is_err());
    }

    #[test]
    fn test_apply_to_list() {
        let a = rect();
        let mut shapes = Vec::new();
        ShapeMessage::Create(a.clone()).apply_to(&mut shapes);
        ShapeMessage::Create(a.clone()).apply_to(&mut shapes);
        assert_eq!(shapes.len(), 1);

        let moved = a.translated(5.0, 5.0);
        ShapeMessage::Update(moved.clone()).apply_to(&mut shapes);
        assert_eq!(shapes[0], moved);

        let stranger = rect();
        ShapeMessage::Update(stranger.clone()).apply_to(&mut shapes);
        assert_eq!(shapes.len(), 1);

        ShapeMessage::Delete(stranger.id().clone()).apply_to(&mut shapes);
        assert_eq!(shapes.len(), 1);
        ShapeMessage::Delete(a.id().clone()).apply_to(&mut shapes);
        assert!(shapes.is_empty());

        shapes.push(a);
        ShapeMessage::Clear.apply_to(&mut shapes);
        assert!(shapes.is_empty());
    }
}
