use poem_openapi::Enum;

use crate::domain::{events::EventType, models::MessageStatus};

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum MessageStatusKind {
    #[oai(rename = "pending")]
    Pending,
    #[oai(rename = "sent")]
    Sent,
    #[oai(rename = "delivered")]
    Delivered,
    #[oai(rename = "failed")]
    Failed,
}

impl From<MessageStatusKind> for MessageStatus {
    fn from(value: MessageStatusKind) -> Self {
        match value {
            MessageStatusKind::Pending => MessageStatus::Pending,
            MessageStatusKind::Sent => MessageStatus::Sent,
            MessageStatusKind::Delivered => MessageStatus::Delivered,
            MessageStatusKind::Failed => MessageStatus::Failed,
        }
    }
}

impl From<MessageStatus> for MessageStatusKind {
    fn from(value: MessageStatus) -> Self {
        match value {
            MessageStatus::Pending => MessageStatusKind::Pending,
            MessageStatus::Sent => MessageStatusKind::Sent,
            MessageStatus::Delivered => MessageStatusKind::Delivered,
            MessageStatus::Failed => MessageStatusKind::Failed,
        }
    }
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum EventTypeKind {
    #[oai(rename = "message.created")]
    MessageCreated,
    #[oai(rename = "message.status.updated")]
    MessageStatusUpdated,
}

impl From<EventType> for EventTypeKind {
    fn from(value: EventType) -> Self {
        match value {
            EventType::MessageCreated => EventTypeKind::MessageCreated,
            EventType::MessageStatusUpdated => EventTypeKind::MessageStatusUpdated,
        }
    }
}
