use std::sync::Arc;

use crate::{
    application::{
        handlers::message_listener::MessageListener,
        services::{
            event_dispatcher::{EventDispatcher, EventDispatcherConfig},
            jwt::JwtServiceConfig,
            validator::MessageValidator,
        },
        usecases::{
            get_outstanding::GetOutstandingMessagesUseCase,
            list_message_events::ListMessageEventsUseCase, send_message::SendMessageUseCase,
            update_message_status::UpdateMessageStatusUseCase,
        },
    },
    domain::repositories::{EventListenerLogRepository, EventRepository, MessageRepository},
    infrastructure::repositories::{
        in_memory::{
            InMemoryEventListenerLogRepository, InMemoryEventRepository,
            InMemoryMessageRepository,
        },
        postgres::{
            PgPool, PostgresEventListenerLogRepository, PostgresEventRepository,
            PostgresMessageRepository,
        },
    },
    presentation::http::endpoints::root::ApiState,
};

#[derive(Clone)]
pub struct Repositories {
    pub messages: Arc<dyn MessageRepository>,
    pub events: Arc<dyn EventRepository>,
    pub listener_logs: Arc<dyn EventListenerLogRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            messages: Arc::new(InMemoryMessageRepository::new()),
            events: Arc::new(InMemoryEventRepository::new()),
            listener_logs: Arc::new(InMemoryEventListenerLogRepository::new()),
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            messages: PostgresMessageRepository::new(pool.clone()),
            events: PostgresEventRepository::new(pool.clone()),
            listener_logs: PostgresEventListenerLogRepository::new(pool),
        }
    }
}

/// Everything the process needs, wired once at startup.
pub struct Container {
    pub repositories: Repositories,
    pub dispatcher: Arc<EventDispatcher>,
    pub state: Arc<ApiState>,
}

impl Container {
    pub async fn build(
        repositories: Repositories,
        jwt_config: JwtServiceConfig,
        dispatcher_config: EventDispatcherConfig,
    ) -> Self {
        let dispatcher = Arc::new(EventDispatcher::new(
            repositories.events.clone(),
            repositories.listener_logs.clone(),
            dispatcher_config,
        ));

        let message_listener = Arc::new(MessageListener::new(
            repositories.messages.clone(),
            repositories.listener_logs.clone(),
        ));
        dispatcher.register(message_listener).await;

        let state = Arc::new(ApiState {
            send_message_usecase: Arc::new(SendMessageUseCase::new(
                repositories.messages.clone(),
                dispatcher.clone(),
            )),
            get_outstanding_usecase: Arc::new(GetOutstandingMessagesUseCase::new(
                repositories.messages.clone(),
            )),
            update_message_status_usecase: Arc::new(UpdateMessageStatusUseCase::new(
                repositories.messages.clone(),
                dispatcher.clone(),
            )),
            list_message_events_usecase: Arc::new(ListMessageEventsUseCase::new(
                repositories.messages.clone(),
            )),
            validator: MessageValidator::new(),
            jwt_config,
        });

        Self {
            repositories,
            dispatcher,
            state,
        }
    }
}
