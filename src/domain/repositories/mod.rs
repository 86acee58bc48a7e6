use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    events::Event,
    models::{EventListenerLog, Message, MessageEventEntry, MessageStatus},
    value_objects::OutstandingFilter,
};

#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn create(&self, message: Message) -> anyhow::Result<Message>;

    async fn get(&self, message_id: Uuid) -> anyhow::Result<Option<Message>>;

    /// Pending messages of the filtered owner, oldest first.
    async fn find_outstanding(
        &self,
        filter: &OutstandingFilter,
        limit: u32,
    ) -> anyhow::Result<Vec<Message>>;

    /// Moves a message to `next` only if it is still in `expected`.
    /// Returns `None` when the message is missing or its status moved on.
    async fn update_status(
        &self,
        message_id: Uuid,
        expected: MessageStatus,
        next: MessageStatus,
    ) -> anyhow::Result<Option<Message>>;

    /// Appends an audit entry. Returns `false` when the (message, event)
    /// pair was already recorded.
    async fn log_event(&self, entry: MessageEventEntry) -> anyhow::Result<bool>;

    async fn list_events(&self, message_id: Uuid) -> anyhow::Result<Vec<MessageEventEntry>>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: Event) -> anyhow::Result<Event>;

    async fn get(&self, event_id: Uuid) -> anyhow::Result<Option<Event>>;
}

#[async_trait]
pub trait EventListenerLogRepository: Send + Sync {
    async fn create(&self, log: EventListenerLog) -> anyhow::Result<EventListenerLog>;

    async fn update(&self, log: &EventListenerLog) -> anyhow::Result<()>;

    /// Every attempt recorded for the event, oldest first.
    async fn list_by_event(&self, event_id: Uuid) -> anyhow::Result<Vec<EventListenerLog>>;
}
