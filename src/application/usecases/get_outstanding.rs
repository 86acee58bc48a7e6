use std::sync::Arc;

use tracing::{debug, error};

use crate::domain::{
    errors::DomainError,
    models::Message,
    repositories::MessageRepository,
    value_objects::{OutstandingFilter, Take},
};

pub struct GetOutstandingMessagesUseCase {
    repo: Arc<dyn MessageRepository>,
}

pub struct GetOutstandingRequest {
    pub owner: String,
    pub take: Take,
}

impl GetOutstandingMessagesUseCase {
    pub fn new(repo: Arc<dyn MessageRepository>) -> Self {
        Self { repo }
    }

    /// Oldest pending messages of the owner first, never more than `take`.
    pub async fn execute(
        &self,
        request: GetOutstandingRequest,
    ) -> Result<Vec<Message>, DomainError> {
        let filter = OutstandingFilter {
            owner: request.owner,
        };

        let messages = self
            .repo
            .find_outstanding(&filter, request.take.get())
            .await
            .map_err(|err| {
                error!(owner = %filter.owner, error = ?err, "Cannot fetch outstanding messages");
                DomainError::Persistence(err.context("cannot fetch outstanding messages"))
            })?;

        debug!(owner = %filter.owner, count = messages.len(), "Fetched outstanding messages");
        Ok(messages)
    }
}
