use std::fmt;

use thiserror::Error;

use crate::domain::models::MessageStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {0}")]
    NotFound(String),
    #[error("Operation not allowed: {0}")]
    Forbidden(String),
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
    #[error("Cannot move message from {from} to {to}")]
    InvalidTransition {
        from: MessageStatus,
        to: MessageStatus,
    },
    #[error("Conflicting update: {0}")]
    Conflict(String),
    #[error("Persistence failure: {0:#}")]
    Persistence(#[from] anyhow::Error),
    #[error("Internal failure: {0:#}")]
    Internal(anyhow::Error),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
