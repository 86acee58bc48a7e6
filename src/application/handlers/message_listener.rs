use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::{
    application::services::event_dispatcher::{EventHandler, EventListener, Subscription},
    domain::{
        events::{Event, EventType, MessageCreatedPayload, MessageStatusUpdatedPayload},
        models::{ListenerStatus, MessageEventEntry},
        repositories::{EventListenerLogRepository, MessageRepository},
    },
};

pub const MESSAGE_LISTENER: &str = "MessageListener";

/// Keeps each message's audit trail in step with its lifecycle events.
pub struct MessageListener {
    message_repo: Arc<dyn MessageRepository>,
    log_repo: Arc<dyn EventListenerLogRepository>,
}

impl MessageListener {
    pub fn new(
        message_repo: Arc<dyn MessageRepository>,
        log_repo: Arc<dyn EventListenerLogRepository>,
    ) -> Self {
        Self {
            message_repo,
            log_repo,
        }
    }

    async fn already_processed(&self, event: &Event) -> anyhow::Result<bool> {
        let logs = self.log_repo.list_by_event(event.id).await?;
        Ok(logs
            .iter()
            .any(|log| log.listener_name == MESSAGE_LISTENER && log.status == ListenerStatus::Success))
    }

    async fn on_message_created(&self, event: &Event) -> anyhow::Result<()> {
        let payload: MessageCreatedPayload = event.payload_as()?;
        self.record(payload.message_id, event).await
    }

    async fn on_message_status_updated(&self, event: &Event) -> anyhow::Result<()> {
        let payload: MessageStatusUpdatedPayload = event.payload_as()?;
        self.record(payload.message_id, event).await
    }

    async fn record(&self, message_id: Uuid, event: &Event) -> anyhow::Result<()> {
        let message = self
            .message_repo
            .get(message_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("message {message_id} not found"))?;

        let recorded = self
            .message_repo
            .log_event(MessageEventEntry::record(message.id, event))
            .await?;
        if !recorded {
            debug!(message_id = %message.id, event_id = %event.id, "Audit entry already present");
        }
        Ok(())
    }
}

#[async_trait]
impl EventHandler for MessageListener {
    fn name(&self) -> &str {
        MESSAGE_LISTENER
    }

    async fn handle(&self, event: &Event) -> anyhow::Result<()> {
        if self.already_processed(event).await? {
            debug!(event_id = %event.id, event_type = %event.event_type, "Event already processed");
            return Ok(());
        }

        match event.event_type {
            EventType::MessageCreated => self.on_message_created(event).await,
            EventType::MessageStatusUpdated => self.on_message_status_updated(event).await,
        }
    }
}

impl EventListener for MessageListener {
    fn registrations(self: Arc<Self>) -> Vec<Subscription> {
        vec![
            Subscription {
                event_type: EventType::MessageCreated,
                handler: self.clone(),
            },
            Subscription {
                event_type: EventType::MessageStatusUpdated,
                handler: self,
            },
        ]
    }
}
