use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ListenerStatus {
    Pending,
    Success,
    Failed,
}

impl ListenerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListenerStatus::Pending => "pending",
            ListenerStatus::Success => "success",
            ListenerStatus::Failed => "failed",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(ListenerStatus::Pending),
            "success" => Some(ListenerStatus::Success),
            "failed" => Some(ListenerStatus::Failed),
            _ => None,
        }
    }
}

/// One delivery attempt of an event to a named listener.
///
/// Rows are appended per attempt and never rewritten by a later attempt;
/// the newest row for an `(event_id, listener_name)` pair is its current outcome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventListenerLog {
    pub id: Uuid,
    pub event_id: Uuid,
    pub listener_name: String,
    pub status: ListenerStatus,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EventListenerLog {
    pub fn pending(event_id: Uuid, listener_name: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            event_id,
            listener_name: listener_name.to_string(),
            status: ListenerStatus::Pending,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn succeed(&mut self) {
        self.status = ListenerStatus::Success;
        self.error = None;
        self.updated_at = Utc::now();
    }

    pub fn fail(&mut self, error: String) {
        self.status = ListenerStatus::Failed;
        self.error = Some(error);
        self.updated_at = Utc::now();
    }
}
