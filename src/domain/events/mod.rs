use std::fmt;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::domain::models::MessageStatus;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EventType {
    #[serde(rename = "message.created")]
    MessageCreated,
    #[serde(rename = "message.status.updated")]
    MessageStatusUpdated,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::MessageCreated => "message.created",
            EventType::MessageStatusUpdated => "message.status.updated",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "message.created" => Some(EventType::MessageCreated),
            "message.status.updated" => Some(EventType::MessageStatusUpdated),
            _ => None,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something that happened. Immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub id: Uuid,
    pub event_type: EventType,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn new<P: Serialize>(event_type: EventType, payload: &P) -> anyhow::Result<Self> {
        let payload = serde_json::to_value(payload)
            .with_context(|| format!("cannot serialize payload of {event_type}"))?;
        Ok(Self {
            id: Uuid::new_v4(),
            event_type,
            payload,
            created_at: Utc::now(),
        })
    }

    pub fn payload_as<P: DeserializeOwned>(&self) -> anyhow::Result<P> {
        serde_json::from_value(self.payload.clone()).with_context(|| {
            format!(
                "cannot deserialize payload of {} event {}",
                self.event_type, self.id
            )
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageCreatedPayload {
    pub message_id: Uuid,
    pub owner: String,
    pub contact: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageStatusUpdatedPayload {
    pub message_id: Uuid,
    pub owner: String,
    pub previous: MessageStatus,
    pub current: MessageStatus,
}
