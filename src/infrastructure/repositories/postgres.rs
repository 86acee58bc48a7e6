use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Pool, Postgres};
use uuid::Uuid;

use crate::domain::{
    events::{Event, EventType},
    models::{EventListenerLog, ListenerStatus, Message, MessageEventEntry, MessageStatus},
    repositories::{EventListenerLogRepository, EventRepository, MessageRepository},
    value_objects::OutstandingFilter,
};

pub type PgPool = Pool<Postgres>;

const MESSAGE_COLUMNS: &str =
    "id, owner, contact, content, status, request_url, created_at, updated_at";

#[derive(Clone)]
pub struct PostgresMessageRepository {
    pool: PgPool,
}

impl PostgresMessageRepository {
    pub fn new(pool: PgPool) -> Arc<Self> {
        Arc::new(Self { pool })
    }
}

#[async_trait]
impl MessageRepository for PostgresMessageRepository {
    async fn create(&self, message: Message) -> anyhow::Result<Message> {
        let record = sqlx::query_as::<_, MessageRecord>(&format!(
            r#"
            INSERT INTO messages (
                id, owner, contact, content, status, request_url, created_at, updated_at
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(message.id)
        .bind(&message.owner)
        .bind(&message.contact)
        .bind(&message.content)
        .bind(message.status.as_str())
        .bind(&message.request_url)
        .bind(message.created_at)
        .bind(message.updated_at)
        .fetch_one(&self.pool)
        .await?;

        record.try_into()
    }

    async fn get(&self, message_id: Uuid) -> anyhow::Result<Option<Message>> {
        let record = sqlx::query_as::<_, MessageRecord>(&format!(
            r#"SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = $1"#
        ))
        .bind(message_id)
        .fetch_optional(&self.pool)
        .await?;

        record.map(Message::try_from).transpose()
    }

    async fn find_outstanding(
        &self,
        filter: &OutstandingFilter,
        limit: u32,
    ) -> anyhow::Result<Vec<Message>> {
        let rows = sqlx::query_as::<_, MessageRecord>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE owner = $1
              AND status = $2
            ORDER BY created_at ASC, seq ASC
            LIMIT $3
            "#
        ))
        .bind(&filter.owner)
        .bind(MessageStatus::Pending.as_str())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Message::try_from).collect()
    }

    async fn update_status(
        &self,
        message_id: Uuid,
        expected: MessageStatus,
        next: MessageStatus,
    ) -> anyhow::Result<Option<Message>> {
        let record = sqlx::query_as::<_, MessageRecord>(&format!(
            r#"
            UPDATE messages
            SET status = $3,
                updated_at = $4
            WHERE id = $1
              AND status = $2
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(message_id)
        .bind(expected.as_str())
        .bind(next.as_str())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        record.map(Message::try_from).transpose()
    }

    async fn log_event(&self, entry: MessageEventEntry) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO message_events (id, message_id, event_id, event_type, recorded_at)
            VALUES ($1,$2,$3,$4,$5)
            ON CONFLICT (message_id, event_id) DO NOTHING
            "#,
        )
        .bind(entry.id)
        .bind(entry.message_id)
        .bind(entry.event_id)
        .bind(entry.event_type.as_str())
        .bind(entry.recorded_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_events(&self, message_id: Uuid) -> anyhow::Result<Vec<MessageEventEntry>> {
        let rows = sqlx::query_as::<_, MessageEventRecord>(
            r#"
            SELECT id, message_id, event_id, event_type, recorded_at
            FROM message_events
            WHERE message_id = $1
            ORDER BY recorded_at ASC, seq ASC
            "#,
        )
        .bind(message_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(MessageEventEntry::try_from).collect()
    }
}

#[derive(Clone)]
pub struct PostgresEventRepository {
    pool: PgPool,
}

impl PostgresEventRepository {
    pub fn new(pool: PgPool) -> Arc<Self> {
        Arc::new(Self { pool })
    }
}

#[async_trait]
impl EventRepository for PostgresEventRepository {
    async fn create(&self, event: Event) -> anyhow::Result<Event> {
        sqlx::query(
            r#"
            INSERT INTO events (id, event_type, payload, created_at)
            VALUES ($1,$2,$3,$4)
            "#,
        )
        .bind(event.id)
        .bind(event.event_type.as_str())
        .bind(&event.payload)
        .bind(event.created_at)
        .execute(&self.pool)
        .await?;
        Ok(event)
    }

    async fn get(&self, event_id: Uuid) -> anyhow::Result<Option<Event>> {
        let record = sqlx::query_as::<_, EventRecord>(
            r#"SELECT id, event_type, payload, created_at FROM events WHERE id = $1"#,
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        record.map(Event::try_from).transpose()
    }
}

#[derive(Clone)]
pub struct PostgresEventListenerLogRepository {
    pool: PgPool,
}

impl PostgresEventListenerLogRepository {
    pub fn new(pool: PgPool) -> Arc<Self> {
        Arc::new(Self { pool })
    }
}

#[async_trait]
impl EventListenerLogRepository for PostgresEventListenerLogRepository {
    async fn create(&self, log: EventListenerLog) -> anyhow::Result<EventListenerLog> {
        sqlx::query(
            r#"
            INSERT INTO event_listener_logs (
                id, event_id, listener_name, status, error, created_at, updated_at
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7)
            "#,
        )
        .bind(log.id)
        .bind(log.event_id)
        .bind(&log.listener_name)
        .bind(log.status.as_str())
        .bind(&log.error)
        .bind(log.created_at)
        .bind(log.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(log)
    }

    async fn update(&self, log: &EventListenerLog) -> anyhow::Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE event_listener_logs
            SET status = $2,
                error = $3,
                updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(log.id)
        .bind(log.status.as_str())
        .bind(&log.error)
        .bind(log.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            anyhow::bail!("event listener log {} not found", log.id);
        }
        Ok(())
    }

    async fn list_by_event(&self, event_id: Uuid) -> anyhow::Result<Vec<EventListenerLog>> {
        let rows = sqlx::query_as::<_, EventListenerLogRecord>(
            r#"
            SELECT id, event_id, listener_name, status, error, created_at, updated_at
            FROM event_listener_logs
            WHERE event_id = $1
            ORDER BY seq ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(EventListenerLog::try_from).collect()
    }
}

#[derive(FromRow)]
struct MessageRecord {
    id: Uuid,
    owner: String,
    contact: String,
    content: String,
    status: String,
    request_url: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MessageRecord> for Message {
    type Error = anyhow::Error;

    fn try_from(value: MessageRecord) -> Result<Self, Self::Error> {
        let status = MessageStatus::from_str(&value.status)
            .ok_or_else(|| anyhow::anyhow!("unknown message status {}", value.status))?;
        Ok(Self {
            id: value.id,
            owner: value.owner,
            contact: value.contact,
            content: value.content,
            status,
            request_url: value.request_url,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

#[derive(FromRow)]
struct MessageEventRecord {
    id: Uuid,
    message_id: Uuid,
    event_id: Uuid,
    event_type: String,
    recorded_at: DateTime<Utc>,
}

impl TryFrom<MessageEventRecord> for MessageEventEntry {
    type Error = anyhow::Error;

    fn try_from(value: MessageEventRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            message_id: value.message_id,
            event_id: value.event_id,
            event_type: event_type_from_str(&value.event_type)?,
            recorded_at: value.recorded_at,
        })
    }
}

#[derive(FromRow)]
struct EventRecord {
    id: Uuid,
    event_type: String,
    payload: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl TryFrom<EventRecord> for Event {
    type Error = anyhow::Error;

    fn try_from(value: EventRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            event_type: event_type_from_str(&value.event_type)?,
            payload: value.payload,
            created_at: value.created_at,
        })
    }
}

#[derive(FromRow)]
struct EventListenerLogRecord {
    id: Uuid,
    event_id: Uuid,
    listener_name: String,
    status: String,
    error: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EventListenerLogRecord> for EventListenerLog {
    type Error = anyhow::Error;

    fn try_from(value: EventListenerLogRecord) -> Result<Self, Self::Error> {
        let status = ListenerStatus::from_str(&value.status)
            .ok_or_else(|| anyhow::anyhow!("unknown listener status {}", value.status))?;
        Ok(Self {
            id: value.id,
            event_id: value.event_id,
            listener_name: value.listener_name,
            status,
            error: value.error,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

fn event_type_from_str(value: &str) -> anyhow::Result<EventType> {
    EventType::from_str(value).ok_or_else(|| anyhow::anyhow!("unknown event type {value}"))
}
