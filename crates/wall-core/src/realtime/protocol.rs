//! Phoenix channel frames spoken by Supabase Realtime.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::models::{Note, NoteId};
use crate::store::ChangeEvent;
use crate::{Error, Result};

pub const EVENT_JOIN: &str = "phx_join";
pub const EVENT_LEAVE: &str = "phx_leave";
pub const EVENT_REPLY: &str = "phx_reply";
pub const EVENT_ERROR: &str = "phx_error";
pub const EVENT_CLOSE: &str = "phx_close";
pub const EVENT_HEARTBEAT: &str = "heartbeat";
pub const EVENT_POSTGRES_CHANGES: &str = "postgres_changes";
pub const PHOENIX_TOPIC: &str = "phoenix";

/// One Phoenix channel frame (JSON serializer v1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoenixMessage {
    pub topic: String,
    pub event: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(rename = "ref", default)]
    pub msg_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_ref: Option<String>,
}

impl PhoenixMessage {
    /// Join `topic` subscribing to every row change of `schema.table`.
    pub fn join(topic: &str, schema: &str, table: &str, access_token: &str, msg_ref: &str) -> Self {
        Self {
            topic: topic.to_string(),
            event: EVENT_JOIN.to_string(),
            payload: json!({
                "config": {
                    "broadcast": { "ack": false, "self": false },
                    "presence": { "key": "" },
                    "postgres_changes": [
                        { "event": "*", "schema": schema, "table": table }
                    ],
                    "private": false
                },
                "access_token": access_token
            }),
            msg_ref: Some(msg_ref.to_string()),
            join_ref: Some(msg_ref.to_string()),
        }
    }

    pub fn leave(topic: &str, msg_ref: &str, join_ref: &str) -> Self {
        Self {
            topic: topic.to_string(),
            event: EVENT_LEAVE.to_string(),
            payload: json!({}),
            msg_ref: Some(msg_ref.to_string()),
            join_ref: Some(join_ref.to_string()),
        }
    }

    pub fn heartbeat(msg_ref: &str) -> Self {
        Self {
            topic: PHOENIX_TOPIC.to_string(),
            event: EVENT_HEARTBEAT.to_string(),
            payload: json!({}),
            msg_ref: Some(msg_ref.to_string()),
            join_ref: None,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Monotonic message reference counter, one per connection.
#[derive(Debug, Default)]
pub struct RefCounter(u64);

impl RefCounter {
    pub fn next_ref(&mut self) -> String {
        self.0 += 1;
        self.0.to_string()
    }
}

/// What an inbound frame means for the subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// The server accepted our join.
    Joined,
    /// The server refused our join.
    JoinRejected(String),
    /// The server closed or errored our channel.
    ChannelClosed,
    /// A row change for the subscribed table.
    Change(ChangeEvent),
    /// Heartbeat replies, presence, system notices and the like.
    Ignored,
}

/// Interpret a frame received on the socket.
pub fn classify(message: &PhoenixMessage, topic: &str, join_ref: &str) -> Result<Inbound> {
    if message.topic != topic {
        return Ok(Inbound::Ignored);
    }

    match message.event.as_str() {
        EVENT_REPLY if message.msg_ref.as_deref() == Some(join_ref) => {
            let status = message.payload.get("status").and_then(Value::as_str);
            if status == Some("ok") {
                Ok(Inbound::Joined)
            } else {
                let reason = message
                    .payload
                    .pointer("/response/reason")
                    .and_then(Value::as_str)
                    .unwrap_or("join refused");
                Ok(Inbound::JoinRejected(reason.to_string()))
            }
        }
        EVENT_ERROR | EVENT_CLOSE => Ok(Inbound::ChannelClosed),
        EVENT_POSTGRES_CHANGES => {
            let data = message.payload.get("data").unwrap_or(&Value::Null);
            parse_change(data).map(|change| change.map_or(Inbound::Ignored, Inbound::Change))
        }
        // Legacy realtime servers emit the change type as the event name.
        "INSERT" | "DELETE" | "UPDATE" => parse_change(&message.payload)
            .map(|change| change.map_or(Inbound::Ignored, Inbound::Change)),
        _ => Ok(Inbound::Ignored),
    }
}

/// Map a change payload (`type`, `record`, `old_record`) to a change event.
///
/// Updates are not part of the note lifecycle and yield `None`.
pub fn parse_change(data: &Value) -> Result<Option<ChangeEvent>> {
    let change_type = data
        .get("type")
        .or_else(|| data.get("eventType"))
        .and_then(Value::as_str)
        .unwrap_or_default();

    match change_type {
        "INSERT" => {
            let record = data
                .get("record")
                .or_else(|| data.get("new"))
                .cloned()
                .ok_or_else(|| Error::Realtime("INSERT change without record".to_string()))?;
            let note: Note = serde_json::from_value(record)?;
            Ok(Some(ChangeEvent::Inserted(note)))
        }
        "DELETE" => {
            let id = data
                .get("old_record")
                .or_else(|| data.get("old"))
                .and_then(|old| old.get("id"))
                .cloned()
                .ok_or_else(|| Error::Realtime("DELETE change without old_record.id".to_string()))?;
            let id: NoteId = serde_json::from_value(id)?;
            Ok(Some(ChangeEvent::Deleted(id)))
        }
        _ => Ok(None),
    }
}
