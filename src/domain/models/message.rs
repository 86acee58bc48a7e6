use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::events::{Event, EventType};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Pending,
    Sent,
    Delivered,
    Failed,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Pending => "pending",
            MessageStatus::Sent => "sent",
            MessageStatus::Delivered => "delivered",
            MessageStatus::Failed => "failed",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(MessageStatus::Pending),
            "sent" => Some(MessageStatus::Sent),
            "delivered" => Some(MessageStatus::Delivered),
            "failed" => Some(MessageStatus::Failed),
            _ => None,
        }
    }

    /// Whether the device still has to pick this message up.
    pub fn is_outstanding(&self) -> bool {
        matches!(self, MessageStatus::Pending)
    }

    pub fn can_transition_to(&self, next: MessageStatus) -> bool {
        matches!(
            (self, next),
            (MessageStatus::Pending, MessageStatus::Sent)
                | (MessageStatus::Pending, MessageStatus::Failed)
                | (MessageStatus::Sent, MessageStatus::Delivered)
                | (MessageStatus::Sent, MessageStatus::Failed)
        )
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outbound SMS queued for the owner's phone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: Uuid,
    /// Phone number of the device that sends the SMS.
    pub owner: String,
    /// Recipient phone number.
    pub contact: String,
    pub content: String,
    pub status: MessageStatus,
    pub request_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Message {
    pub fn pending(owner: String, contact: String, content: String, request_url: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner,
            contact,
            content,
            status: MessageStatus::Pending,
            request_url,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Audit trail entry: one per (message, event) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageEventEntry {
    pub id: Uuid,
    pub message_id: Uuid,
    pub event_id: Uuid,
    pub event_type: EventType,
    pub recorded_at: DateTime<Utc>,
}

impl MessageEventEntry {
    pub fn record(message_id: Uuid, event: &Event) -> Self {
        Self {
            id: Uuid::new_v4(),
            message_id,
            event_id: event.id,
            event_type: event.event_type,
            recorded_at: Utc::now(),
        }
    }
}
