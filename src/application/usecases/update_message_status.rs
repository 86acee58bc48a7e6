use std::sync::Arc;

use tracing::{error, info};
use uuid::Uuid;

use crate::{
    application::services::event_dispatcher::EventDispatcher,
    domain::{
        errors::DomainError,
        events::{Event, EventType, MessageStatusUpdatedPayload},
        models::{Message, MessageStatus},
        repositories::MessageRepository,
    },
};

pub struct UpdateMessageStatusUseCase {
    message_repo: Arc<dyn MessageRepository>,
    dispatcher: Arc<EventDispatcher>,
}

pub struct UpdateMessageStatusRequest {
    pub owner: String,
    pub message_id: Uuid,
    pub status: MessageStatus,
}

impl UpdateMessageStatusUseCase {
    pub fn new(message_repo: Arc<dyn MessageRepository>, dispatcher: Arc<EventDispatcher>) -> Self {
        Self {
            message_repo,
            dispatcher,
        }
    }

    pub async fn execute(&self, request: UpdateMessageStatusRequest) -> Result<Message, DomainError> {
        let message = self
            .message_repo
            .get(request.message_id)
            .await
            .map_err(|err| {
                error!(message_id = %request.message_id, error = ?err, "Cannot load message");
                DomainError::Persistence(err.context("cannot load message"))
            })?
            .ok_or_else(|| DomainError::NotFound(format!("message {}", request.message_id)))?;

        if message.owner != request.owner {
            return Err(DomainError::Forbidden(
                "message belongs to another device".to_string(),
            ));
        }

        let previous = message.status;
        if !previous.can_transition_to(request.status) {
            return Err(DomainError::InvalidTransition {
                from: previous,
                to: request.status,
            });
        }

        let updated = self
            .message_repo
            .update_status(message.id, previous, request.status)
            .await
            .map_err(|err| {
                error!(message_id = %message.id, error = ?err, "Cannot update message status");
                DomainError::Persistence(err.context("cannot update message status"))
            })?
            .ok_or_else(|| {
                DomainError::Conflict(format!(
                    "message {} is no longer {previous}",
                    message.id
                ))
            })?;

        let event = Event::new(
            EventType::MessageStatusUpdated,
            &MessageStatusUpdatedPayload {
                message_id: updated.id,
                owner: updated.owner.clone(),
                previous,
                current: updated.status,
            },
        )
        .map_err(|err| {
            error!(message_id = %updated.id, error = ?err, "Cannot encode message.status.updated payload");
            DomainError::Internal(err.context("cannot encode message.status.updated payload"))
        })?;
        // Status is already committed here; a publish failure still returns Persistence.
        self.dispatcher.publish(event).await?;

        info!(
            message_id = %updated.id,
            from = %previous,
            to = %updated.status,
            "Message status updated"
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::{
        application::services::event_dispatcher::{EventDispatcherConfig, EventHandler},
        domain::{
            models::MessageEventEntry, repositories::EventRepository,
            value_objects::OutstandingFilter,
        },
        infrastructure::repositories::in_memory::{
            InMemoryEventListenerLogRepository, InMemoryEventRepository,
            InMemoryMessageRepository,
        },
    };

    const OWNER: &str = "+18005550100";

    /// Lets another writer win the race between `get` and `update_status`.
    struct RacingRepository {
        inner: InMemoryMessageRepository,
    }

    #[async_trait]
    impl MessageRepository for RacingRepository {
        async fn create(&self, message: Message) -> anyhow::Result<Message> {
            self.inner.create(message).await
        }

        async fn get(&self, message_id: Uuid) -> anyhow::Result<Option<Message>> {
            let found = self.inner.get(message_id).await?;
            self.inner
                .update_status(message_id, MessageStatus::Pending, MessageStatus::Failed)
                .await?;
            Ok(found)
        }

        async fn find_outstanding(
            &self,
            filter: &OutstandingFilter,
            limit: u32,
        ) -> anyhow::Result<Vec<Message>> {
            self.inner.find_outstanding(filter, limit).await
        }

        async fn update_status(
            &self,
            message_id: Uuid,
            expected: MessageStatus,
            next: MessageStatus,
        ) -> anyhow::Result<Option<Message>> {
            self.inner.update_status(message_id, expected, next).await
        }

        async fn log_event(&self, entry: MessageEventEntry) -> anyhow::Result<bool> {
            self.inner.log_event(entry).await
        }

        async fn list_events(&self, message_id: Uuid) -> anyhow::Result<Vec<MessageEventEntry>> {
            self.inner.list_events(message_id).await
        }
    }

    struct UnavailableEventRepository;

    #[async_trait]
    impl EventRepository for UnavailableEventRepository {
        async fn create(&self, _event: Event) -> anyhow::Result<Event> {
            anyhow::bail!("event store offline")
        }

        async fn get(&self, _event_id: Uuid) -> anyhow::Result<Option<Event>> {
            Ok(None)
        }
    }

    struct Counter(std::sync::atomic::AtomicUsize);

    #[async_trait]
    impl EventHandler for Counter {
        fn name(&self) -> &str {
            "Counter"
        }

        async fn handle(&self, _event: &Event) -> anyhow::Result<()> {
            self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        }
    }

    fn dispatcher() -> Arc<EventDispatcher> {
        Arc::new(EventDispatcher::new(
            Arc::new(InMemoryEventRepository::new()),
            Arc::new(InMemoryEventListenerLogRepository::new()),
            EventDispatcherConfig::default(),
        ))
    }

    async fn seed(repo: &dyn MessageRepository) -> Message {
        repo.create(Message::pending(
            OWNER.to_string(),
            "+18005550199".to_string(),
            "hello".to_string(),
            "/api/messages/send".to_string(),
        ))
        .await
        .unwrap()
    }

    fn request(message_id: Uuid, owner: &str, status: MessageStatus) -> UpdateMessageStatusRequest {
        UpdateMessageStatusRequest {
            owner: owner.to_string(),
            message_id,
            status,
        }
    }

    #[tokio::test]
    async fn sent_message_leaves_the_outstanding_queue_and_is_announced() {
        let repo = Arc::new(InMemoryMessageRepository::new());
        let message = seed(repo.as_ref()).await;
        let dispatcher = dispatcher();
        let counter = Arc::new(Counter(Default::default()));
        dispatcher
            .subscribe(EventType::MessageStatusUpdated, counter.clone())
            .await;
        let usecase = UpdateMessageStatusUseCase::new(repo.clone(), dispatcher);

        let updated = usecase
            .execute(request(message.id, OWNER, MessageStatus::Sent))
            .await
            .unwrap();

        assert_eq!(updated.status, MessageStatus::Sent);
        let filter = OutstandingFilter {
            owner: OWNER.to_string(),
        };
        assert!(repo.find_outstanding(&filter, 10).await.unwrap().is_empty());
        assert_eq!(counter.0.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rejects_invalid_transition() {
        let repo = Arc::new(InMemoryMessageRepository::new());
        let message = seed(repo.as_ref()).await;
        let usecase = UpdateMessageStatusUseCase::new(repo, dispatcher());

        let err = usecase
            .execute(request(message.id, OWNER, MessageStatus::Delivered))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DomainError::InvalidTransition {
                from: MessageStatus::Pending,
                to: MessageStatus::Delivered
            }
        ));
    }

    #[tokio::test]
    async fn rejects_other_owner_and_unknown_message() {
        let repo = Arc::new(InMemoryMessageRepository::new());
        let message = seed(repo.as_ref()).await;
        let usecase = UpdateMessageStatusUseCase::new(repo, dispatcher());

        let err = usecase
            .execute(request(message.id, "+18005550111", MessageStatus::Sent))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let err = usecase
            .execute(request(Uuid::new_v4(), OWNER, MessageStatus::Sent))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn concurrent_change_is_a_conflict() {
        let repo = Arc::new(RacingRepository {
            inner: InMemoryMessageRepository::new(),
        });
        let message = seed(repo.as_ref()).await;
        let usecase = UpdateMessageStatusUseCase::new(repo, dispatcher());

        let err = usecase
            .execute(request(message.id, OWNER, MessageStatus::Sent))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn failed_publish_reports_persistence_but_keeps_new_status() {
        let repo = Arc::new(InMemoryMessageRepository::new());
        let message = seed(repo.as_ref()).await;
        let dispatcher = Arc::new(EventDispatcher::new(
            Arc::new(UnavailableEventRepository),
            Arc::new(InMemoryEventListenerLogRepository::new()),
            EventDispatcherConfig::default(),
        ));
        let usecase = UpdateMessageStatusUseCase::new(repo.clone(), dispatcher);

        let err = usecase
            .execute(request(message.id, OWNER, MessageStatus::Sent))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Persistence(_)));

        let stored = repo.get(message.id).await.unwrap().unwrap();
        assert_eq!(stored.status, MessageStatus::Sent);

        let err = usecase
            .execute(request(message.id, OWNER, MessageStatus::Sent))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));
    }
}
