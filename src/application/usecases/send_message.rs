use std::sync::Arc;

use tracing::{error, info, warn};

use crate::{
    application::services::event_dispatcher::EventDispatcher,
    domain::{
        errors::DomainError,
        events::{Event, EventType, MessageCreatedPayload},
        models::Message,
        repositories::MessageRepository,
    },
};

pub struct SendMessageUseCase {
    message_repo: Arc<dyn MessageRepository>,
    dispatcher: Arc<EventDispatcher>,
}

#[derive(Debug, Clone)]
pub struct SendMessageRequest {
    pub owner: String,
    pub contact: String,
    pub content: String,
    pub request_url: String,
}

impl SendMessageUseCase {
    pub fn new(message_repo: Arc<dyn MessageRepository>, dispatcher: Arc<EventDispatcher>) -> Self {
        Self {
            message_repo,
            dispatcher,
        }
    }

    /// Persists a pending message and announces it with `message.created`.
    ///
    /// Listener failures never surface here; only storage failures do.
    pub async fn execute(&self, request: SendMessageRequest) -> Result<Message, DomainError> {
        let message = Message::pending(
            request.owner,
            request.contact,
            request.content,
            request.request_url,
        );

        let message = self.message_repo.create(message).await.map_err(|err| {
            error!(error = ?err, "Cannot store message");
            DomainError::Persistence(err.context("cannot store message"))
        })?;

        let event = Event::new(
            EventType::MessageCreated,
            &MessageCreatedPayload {
                message_id: message.id,
                owner: message.owner.clone(),
                contact: message.contact.clone(),
            },
        )
        .map_err(|err| {
            error!(message_id = %message.id, error = ?err, "Cannot encode message.created payload");
            DomainError::Internal(err.context("cannot encode message.created payload"))
        })?;

        let report = self.dispatcher.publish(event).await.inspect_err(|err| {
            error!(message_id = %message.id, error = %err, "Cannot publish message.created");
        })?;

        let failed = report.failures().count();
        if failed > 0 {
            warn!(
                message_id = %message.id,
                event_id = %report.event.id,
                failed,
                "Some listeners failed to process message.created"
            );
        }

        info!(message_id = %message.id, owner = %message.owner, "Message added to queue");
        Ok(message)
    }
}
