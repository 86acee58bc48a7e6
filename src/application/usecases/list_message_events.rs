use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{
    errors::DomainError, models::MessageEventEntry, repositories::MessageRepository,
};

pub struct ListMessageEventsUseCase {
    repo: Arc<dyn MessageRepository>,
}

impl ListMessageEventsUseCase {
    pub fn new(repo: Arc<dyn MessageRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        message_id: Uuid,
        owner: &str,
    ) -> Result<Vec<MessageEventEntry>, DomainError> {
        let message = self
            .repo
            .get(message_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("message {message_id}")))?;

        if message.owner != owner {
            return Err(DomainError::Forbidden(
                "message belongs to another device".to_string(),
            ));
        }

        Ok(self.repo.list_events(message_id).await?)
    }
}
