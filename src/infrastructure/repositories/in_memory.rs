use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    events::Event,
    models::{EventListenerLog, Message, MessageEventEntry, MessageStatus},
    repositories::{EventListenerLogRepository, EventRepository, MessageRepository},
    value_objects::OutstandingFilter,
};

#[derive(Default)]
pub struct InMemoryMessageRepository {
    // Insertion order doubles as the tie-breaker for equal timestamps.
    messages: Arc<RwLock<Vec<Message>>>,
    events: Arc<RwLock<Vec<MessageEventEntry>>>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn create(&self, message: Message) -> anyhow::Result<Message> {
        let mut messages = self.messages.write().await;
        if messages.iter().any(|m| m.id == message.id) {
            anyhow::bail!("message {} already exists", message.id);
        }
        messages.push(message.clone());
        Ok(message)
    }

    async fn get(&self, message_id: Uuid) -> anyhow::Result<Option<Message>> {
        let messages = self.messages.read().await;
        Ok(messages.iter().find(|m| m.id == message_id).cloned())
    }

    async fn find_outstanding(
        &self,
        filter: &OutstandingFilter,
        limit: u32,
    ) -> anyhow::Result<Vec<Message>> {
        let messages = self.messages.read().await;
        let mut outstanding: Vec<Message> = messages
            .iter()
            .filter(|m| m.owner == filter.owner && m.status.is_outstanding())
            .cloned()
            .collect();
        outstanding.sort_by_key(|m| m.created_at);
        outstanding.truncate(limit as usize);
        Ok(outstanding)
    }

    async fn update_status(
        &self,
        message_id: Uuid,
        expected: MessageStatus,
        next: MessageStatus,
    ) -> anyhow::Result<Option<Message>> {
        let mut messages = self.messages.write().await;
        match messages
            .iter_mut()
            .find(|m| m.id == message_id && m.status == expected)
        {
            Some(message) => {
                message.status = next;
                message.updated_at = Utc::now();
                Ok(Some(message.clone()))
            }
            None => Ok(None),
        }
    }

    async fn log_event(&self, entry: MessageEventEntry) -> anyhow::Result<bool> {
        let mut events = self.events.write().await;
        if events
            .iter()
            .any(|e| e.message_id == entry.message_id && e.event_id == entry.event_id)
        {
            return Ok(false);
        }
        events.push(entry);
        Ok(true)
    }

    async fn list_events(&self, message_id: Uuid) -> anyhow::Result<Vec<MessageEventEntry>> {
        let events = self.events.read().await;
        Ok(events
            .iter()
            .filter(|e| e.message_id == message_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryEventRepository {
    events: Arc<RwLock<HashMap<Uuid, Event>>>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.events.read().await.len()
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn create(&self, event: Event) -> anyhow::Result<Event> {
        let mut events = self.events.write().await;
        if events.contains_key(&event.id) {
            anyhow::bail!("event {} already exists", event.id);
        }
        events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn get(&self, event_id: Uuid) -> anyhow::Result<Option<Event>> {
        let events = self.events.read().await;
        Ok(events.get(&event_id).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryEventListenerLogRepository {
    logs: Arc<RwLock<Vec<EventListenerLog>>>,
}

impl InMemoryEventListenerLogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventListenerLogRepository for InMemoryEventListenerLogRepository {
    async fn create(&self, log: EventListenerLog) -> anyhow::Result<EventListenerLog> {
        let mut logs = self.logs.write().await;
        logs.push(log.clone());
        Ok(log)
    }

    async fn update(&self, log: &EventListenerLog) -> anyhow::Result<()> {
        let mut logs = self.logs.write().await;
        let existing = logs
            .iter_mut()
            .find(|l| l.id == log.id)
            .ok_or_else(|| anyhow::anyhow!("event listener log {} not found", log.id))?;
        existing.status = log.status;
        existing.error = log.error.clone();
        existing.updated_at = log.updated_at;
        Ok(())
    }

    async fn list_by_event(&self, event_id: Uuid) -> anyhow::Result<Vec<EventListenerLog>> {
        let logs = self.logs.read().await;
        Ok(logs
            .iter()
            .filter(|l| l.event_id == event_id)
            .cloned()
            .collect())
    }
}
