use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::{
    errors::DomainError,
    events::{Event, EventType},
    models::{EventListenerLog, ListenerStatus},
    repositories::{EventListenerLogRepository, EventRepository},
};

/// Reacts to a published event.
///
/// `name` identifies the handler in the delivery log, so it must be stable
/// across restarts and unique among the handlers of one event type.
#[async_trait]
pub trait EventHandler: Send + Sync {
    fn name(&self) -> &str;

    async fn handle(&self, event: &Event) -> anyhow::Result<()>;
}

pub struct Subscription {
    pub event_type: EventType,
    pub handler: Arc<dyn EventHandler>,
}

/// A component that exposes its own subscription table.
///
/// The wiring code builds the listener first and then hands the table to
/// [`EventDispatcher::register`], so listeners never see the dispatcher.
pub trait EventListener: Send + Sync {
    fn registrations(self: Arc<Self>) -> Vec<Subscription>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub listener_name: String,
    pub status: ListenerStatus,
    pub error: Option<String>,
    /// False when the delivery log does not hold this outcome.
    pub recorded: bool,
}

#[derive(Debug, Clone)]
pub struct DispatchReport {
    pub event: Event,
    pub deliveries: Vec<Delivery>,
}

impl DispatchReport {
    pub fn failures(&self) -> impl Iterator<Item = &Delivery> {
        self.deliveries
            .iter()
            .filter(|delivery| delivery.status != ListenerStatus::Success || !delivery.recorded)
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventDispatcherConfig {
    pub handler_timeout: Option<Duration>,
}

pub struct EventDispatcher {
    event_repo: Arc<dyn EventRepository>,
    log_repo: Arc<dyn EventListenerLogRepository>,
    subscriptions: RwLock<HashMap<EventType, Vec<Arc<dyn EventHandler>>>>,
    config: EventDispatcherConfig,
}

impl EventDispatcher {
    pub fn new(
        event_repo: Arc<dyn EventRepository>,
        log_repo: Arc<dyn EventListenerLogRepository>,
        config: EventDispatcherConfig,
    ) -> Self {
        Self {
            event_repo,
            log_repo,
            subscriptions: RwLock::new(HashMap::new()),
            config,
        }
    }

    pub async fn subscribe(&self, event_type: EventType, handler: Arc<dyn EventHandler>) {
        let mut subscriptions = self.subscriptions.write().await;
        let handlers = subscriptions.entry(event_type).or_default();

        if handlers
            .iter()
            .any(|existing| existing.name() == handler.name())
        {
            warn!(
                event_type = %event_type,
                listener = handler.name(),
                "Handler already subscribed, ignoring"
            );
            return;
        }

        info!(
            event_type = %event_type,
            listener = handler.name(),
            position = handlers.len(),
            "Subscribed handler"
        );
        handlers.push(handler);
    }

    pub async fn register<L: EventListener>(&self, listener: Arc<L>) {
        for subscription in listener.registrations() {
            self.subscribe(subscription.event_type, subscription.handler)
                .await;
        }
    }

    /// Stores the event, then delivers it to every subscribed handler.
    ///
    /// Only a failed store write is an error. Handler failures end up in the
    /// delivery log and in the returned report.
    pub async fn publish(&self, event: Event) -> Result<DispatchReport, DomainError> {
        let event_type = event.event_type;
        let event = self
            .event_repo
            .create(event)
            .await
            .with_context(|| format!("cannot store {event_type} event"))?;

        debug!(event_id = %event.id, event_type = %event.event_type, "Event stored");
        Ok(self.dispatch(event).await)
    }

    /// Runs the fan-out again for an event that is already stored.
    pub async fn redispatch(&self, event_id: Uuid) -> Result<DispatchReport, DomainError> {
        let event = self
            .event_repo
            .get(event_id)
            .await
            .with_context(|| format!("cannot load event {event_id}"))?
            .ok_or_else(|| DomainError::NotFound(format!("event {event_id}")))?;

        info!(event_id = %event.id, event_type = %event.event_type, "Redispatching event");
        Ok(self.dispatch(event).await)
    }

    async fn dispatch(&self, event: Event) -> DispatchReport {
        // Clone the list out so no lock is held while handlers run.
        let handlers = {
            let subscriptions = self.subscriptions.read().await;
            subscriptions
                .get(&event.event_type)
                .cloned()
                .unwrap_or_default()
        };

        if handlers.is_empty() {
            debug!(event_id = %event.id, event_type = %event.event_type, "No handlers subscribed");
        }

        let mut deliveries = Vec::with_capacity(handlers.len());
        for handler in handlers {
            deliveries.push(self.deliver(&event, handler.as_ref()).await);
        }

        DispatchReport { event, deliveries }
    }

    async fn deliver(&self, event: &Event, handler: &dyn EventHandler) -> Delivery {
        let listener_name = handler.name().to_string();

        let mut log = match self
            .log_repo
            .create(EventListenerLog::pending(event.id, &listener_name))
            .await
        {
            Ok(log) => log,
            Err(err) => {
                let reason = format!("cannot record delivery: {err:#}");
                error!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    listener = %listener_name,
                    error = %reason,
                    "Handler skipped"
                );
                return Delivery {
                    listener_name,
                    status: ListenerStatus::Failed,
                    error: Some(reason),
                    recorded: false,
                };
            }
        };

        let outcome = match self.config.handler_timeout {
            Some(limit) => match tokio::time::timeout(limit, handler.handle(event)).await {
                Ok(result) => result,
                Err(_) => Err(anyhow::anyhow!("handler timed out after {limit:?}")),
            },
            None => handler.handle(event).await,
        };

        match outcome {
            Ok(()) => {
                debug!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    listener = %listener_name,
                    "Handler succeeded"
                );
                log.succeed();
            }
            Err(err) => {
                let reason = format!("{err:#}");
                warn!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    listener = %listener_name,
                    error = %reason,
                    "Handler failed"
                );
                log.fail(reason);
            }
        }

        let recorded = match self.log_repo.update(&log).await {
            Ok(()) => true,
            Err(err) => {
                let reason = format!("{err:#}");
                error!(
                    event_id = %event.id,
                    log_id = %log.id,
                    listener = %listener_name,
                    outcome = log.status.as_str(),
                    error = %reason,
                    "Cannot record delivery outcome, log row left pending"
                );
                false
            }
        };

        Delivery {
            listener_name,
            status: log.status,
            error: log.error,
            recorded,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::infrastructure::repositories::in_memory::{
        InMemoryEventListenerLogRepository, InMemoryEventRepository,
    };

    type Journal = Arc<Mutex<Vec<String>>>;

    struct RecordingHandler {
        name: &'static str,
        fails: bool,
        journal: Journal,
    }

    #[async_trait]
    impl EventHandler for RecordingHandler {
        fn name(&self) -> &str {
            self.name
        }

        async fn handle(&self, _event: &Event) -> anyhow::Result<()> {
            self.journal.lock().unwrap().push(self.name.to_string());
            if self.fails {
                anyhow::bail!("{} is degraded", self.name);
            }
            Ok(())
        }
    }

    struct SlowHandler;

    #[async_trait]
    impl EventHandler for SlowHandler {
        fn name(&self) -> &str {
            "slow"
        }

        async fn handle(&self, _event: &Event) -> anyhow::Result<()> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }
    }

    struct BrokenEventRepository;

    #[async_trait]
    impl EventRepository for BrokenEventRepository {
        async fn create(&self, _event: Event) -> anyhow::Result<Event> {
            anyhow::bail!("disk full")
        }

        async fn get(&self, _event_id: Uuid) -> anyhow::Result<Option<Event>> {
            Ok(None)
        }
    }

    struct BrokenLogRepository;

    #[async_trait]
    impl EventListenerLogRepository for BrokenLogRepository {
        async fn create(&self, _log: EventListenerLog) -> anyhow::Result<EventListenerLog> {
            anyhow::bail!("log table locked")
        }

        async fn update(&self, _log: &EventListenerLog) -> anyhow::Result<()> {
            anyhow::bail!("log table locked")
        }

        async fn list_by_event(&self, _event_id: Uuid) -> anyhow::Result<Vec<EventListenerLog>> {
            Ok(Vec::new())
        }
    }

    /// Accepts pending rows but cannot store outcomes.
    #[derive(Default)]
    struct OutcomeLossLogRepository {
        inner: InMemoryEventListenerLogRepository,
    }

    #[async_trait]
    impl EventListenerLogRepository for OutcomeLossLogRepository {
        async fn create(&self, log: EventListenerLog) -> anyhow::Result<EventListenerLog> {
            self.inner.create(log).await
        }

        async fn update(&self, _log: &EventListenerLog) -> anyhow::Result<()> {
            anyhow::bail!("connection reset")
        }

        async fn list_by_event(&self, event_id: Uuid) -> anyhow::Result<Vec<EventListenerLog>> {
            self.inner.list_by_event(event_id).await
        }
    }

    fn handler(name: &'static str, fails: bool, journal: &Journal) -> Arc<dyn EventHandler> {
        Arc::new(RecordingHandler {
            name,
            fails,
            journal: journal.clone(),
        })
    }

    fn created_event() -> Event {
        Event::new(EventType::MessageCreated, &json!({ "id": "m1" })).unwrap()
    }

    fn dispatcher(
        events: Arc<InMemoryEventRepository>,
        logs: Arc<InMemoryEventListenerLogRepository>,
    ) -> EventDispatcher {
        EventDispatcher::new(events, logs, EventDispatcherConfig::default())
    }

    #[tokio::test]
    async fn failing_handler_does_not_stop_the_others() {
        let events = Arc::new(InMemoryEventRepository::new());
        let logs = Arc::new(InMemoryEventListenerLogRepository::new());
        let dispatcher = dispatcher(events.clone(), logs.clone());
        let journal = Journal::default();

        dispatcher
            .subscribe(EventType::MessageCreated, handler("A", false, &journal))
            .await;
        dispatcher
            .subscribe(EventType::MessageCreated, handler("B", true, &journal))
            .await;

        let report = dispatcher.publish(created_event()).await.unwrap();

        assert_eq!(*journal.lock().unwrap(), vec!["A", "B"]);
        assert_eq!(events.count().await, 1);

        let rows = logs.list_by_event(report.event.id).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].listener_name, "A");
        assert_eq!(rows[0].status, ListenerStatus::Success);
        assert_eq!(rows[1].listener_name, "B");
        assert_eq!(rows[1].status, ListenerStatus::Failed);
        assert_eq!(rows[1].error.as_deref(), Some("B is degraded"));

        assert_eq!(report.failures().count(), 1);
        assert!(report.deliveries.iter().all(|delivery| delivery.recorded));
    }

    #[tokio::test]
    async fn handlers_run_in_registration_order() {
        let dispatcher = dispatcher(
            Arc::new(InMemoryEventRepository::new()),
            Arc::new(InMemoryEventListenerLogRepository::new()),
        );
        let journal = Journal::default();

        for name in ["third", "first", "second"] {
            dispatcher
                .subscribe(EventType::MessageCreated, handler(name, false, &journal))
                .await;
        }
        dispatcher.publish(created_event()).await.unwrap();

        assert_eq!(*journal.lock().unwrap(), vec!["third", "first", "second"]);
    }

    #[tokio::test]
    async fn duplicate_subscription_is_ignored() {
        let dispatcher = dispatcher(
            Arc::new(InMemoryEventRepository::new()),
            Arc::new(InMemoryEventListenerLogRepository::new()),
        );
        let journal = Journal::default();
        let a = handler("A", false, &journal);

        dispatcher.subscribe(EventType::MessageCreated, a.clone()).await;
        dispatcher.subscribe(EventType::MessageCreated, a).await;

        let report = dispatcher.publish(created_event()).await.unwrap();
        assert_eq!(report.deliveries.len(), 1);
        assert_eq!(journal.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn only_matching_event_type_is_delivered() {
        let logs = Arc::new(InMemoryEventListenerLogRepository::new());
        let dispatcher = dispatcher(Arc::new(InMemoryEventRepository::new()), logs.clone());
        let journal = Journal::default();

        dispatcher
            .subscribe(EventType::MessageStatusUpdated, handler("A", false, &journal))
            .await;

        let report = dispatcher.publish(created_event()).await.unwrap();

        assert!(report.deliveries.is_empty());
        assert!(journal.lock().unwrap().is_empty());
        assert!(logs.list_by_event(report.event.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn store_failure_is_returned_and_nothing_is_delivered() {
        let logs = Arc::new(InMemoryEventListenerLogRepository::new());
        let dispatcher = EventDispatcher::new(
            Arc::new(BrokenEventRepository),
            logs.clone(),
            EventDispatcherConfig::default(),
        );
        let journal = Journal::default();
        dispatcher
            .subscribe(EventType::MessageCreated, handler("A", false, &journal))
            .await;

        let event = created_event();
        let event_id = event.id;
        let err = dispatcher.publish(event).await.unwrap_err();

        assert!(matches!(err, DomainError::Persistence(_)));
        assert!(err.to_string().contains("disk full"));
        assert!(journal.lock().unwrap().is_empty());
        assert!(logs.list_by_event(event_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn handler_is_skipped_when_pending_row_cannot_be_written() {
        let dispatcher = EventDispatcher::new(
            Arc::new(InMemoryEventRepository::new()),
            Arc::new(BrokenLogRepository),
            EventDispatcherConfig::default(),
        );
        let journal = Journal::default();
        dispatcher
            .subscribe(EventType::MessageCreated, handler("A", false, &journal))
            .await;

        let report = dispatcher.publish(created_event()).await.unwrap();

        assert!(journal.lock().unwrap().is_empty());
        assert_eq!(report.deliveries[0].status, ListenerStatus::Failed);
    }

    #[tokio::test]
    async fn unrecorded_outcome_is_flagged_in_the_report() {
        let logs = Arc::new(OutcomeLossLogRepository::default());
        let dispatcher = EventDispatcher::new(
            Arc::new(InMemoryEventRepository::new()),
            logs.clone(),
            EventDispatcherConfig::default(),
        );
        let journal = Journal::default();
        dispatcher
            .subscribe(EventType::MessageCreated, handler("A", false, &journal))
            .await;

        let report = dispatcher.publish(created_event()).await.unwrap();

        assert_eq!(*journal.lock().unwrap(), vec!["A"]);
        assert_eq!(report.deliveries[0].status, ListenerStatus::Success);
        assert!(!report.deliveries[0].recorded);
        assert_eq!(report.failures().count(), 1);

        let rows = logs.list_by_event(report.event.id).await.unwrap();
        assert_eq!(rows[0].status, ListenerStatus::Pending);
    }

    #[tokio::test]
    async fn slow_handler_is_recorded_as_failed() {
        let logs = Arc::new(InMemoryEventListenerLogRepository::new());
        let dispatcher = EventDispatcher::new(
            Arc::new(InMemoryEventRepository::new()),
            logs.clone(),
            EventDispatcherConfig {
                handler_timeout: Some(Duration::from_millis(50)),
            },
        );
        dispatcher
            .subscribe(EventType::MessageCreated, Arc::new(SlowHandler))
            .await;

        let report = dispatcher.publish(created_event()).await.unwrap();

        let rows = logs.list_by_event(report.event.id).await.unwrap();
        assert_eq!(rows[0].status, ListenerStatus::Failed);
        assert!(rows[0].error.as_deref().unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn redispatch_appends_new_attempts() {
        let events = Arc::new(InMemoryEventRepository::new());
        let logs = Arc::new(InMemoryEventListenerLogRepository::new());
        let dispatcher = dispatcher(events.clone(), logs.clone());
        let journal = Journal::default();
        dispatcher
            .subscribe(EventType::MessageCreated, handler("B", true, &journal))
            .await;

        let first = dispatcher.publish(created_event()).await.unwrap();
        let second = dispatcher.redispatch(first.event.id).await.unwrap();

        assert_eq!(second.event, first.event);
        assert_eq!(events.count().await, 1);
        let rows = logs.list_by_event(first.event.id).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.status == ListenerStatus::Failed));
    }

    #[tokio::test]
    async fn redispatch_of_unknown_event_is_not_found() {
        let dispatcher = dispatcher(
            Arc::new(InMemoryEventRepository::new()),
            Arc::new(InMemoryEventListenerLogRepository::new()),
        );

        let err = dispatcher.redispatch(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }
}
