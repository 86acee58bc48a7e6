use std::collections::HashMap;

use poem::{IntoResponse, http::StatusCode};
use poem_openapi::payload::Json;
use tracing::warn;

use crate::{
    domain::{
        errors::{DomainError, ValidationError},
        models::{Message, MessageEventEntry},
    },
    presentation::http::responses::{
        ErrorResponseDto, MessageDto, MessageEventDto, STATUS_ERROR, ValidationErrorResponseDto,
    },
};

pub fn map_message(message: &Message) -> MessageDto {
    MessageDto {
        id: message.id,
        owner: message.owner.clone(),
        contact: message.contact.clone(),
        content: message.content.clone(),
        status: message.status.into(),
        request_url: message.request_url.clone(),
        created_at: message.created_at.to_rfc3339(),
        updated_at: message.updated_at.to_rfc3339(),
    }
}

pub fn map_event_entry(entry: &MessageEventEntry) -> MessageEventDto {
    MessageEventDto {
        id: entry.id,
        message_id: entry.message_id,
        event_id: entry.event_id,
        event_type: entry.event_type.into(),
        recorded_at: entry.recorded_at.to_rfc3339(),
    }
}

/// Groups problems by field, keeping the order they were reported in.
pub fn map_validation_errors(errors: &[ValidationError]) -> HashMap<String, Vec<String>> {
    let mut fields: HashMap<String, Vec<String>> = HashMap::new();
    for error in errors {
        fields
            .entry(error.field.to_string())
            .or_default()
            .push(error.message.clone());
    }
    fields
}

pub fn validation_error(context: &str, errors: &[ValidationError]) -> poem::Error {
    warn!(context, errors = %DomainError::Validation(errors.to_vec()), "Rejected request");
    let body = ValidationErrorResponseDto {
        status: STATUS_ERROR.to_string(),
        message: context.to_string(),
        data: map_validation_errors(errors),
    };
    poem::Error::from_response(
        Json(body)
            .with_status(StatusCode::UNPROCESSABLE_ENTITY)
            .into_response(),
    )
}

/// Translates a use case failure into an HTTP error with a JSON envelope.
///
/// Persistence details stay in the logs; the client only sees a generic 500.
pub fn domain_error(err: DomainError) -> poem::Error {
    let (status, message) = match &err {
        DomainError::Validation(errors) => return validation_error("validation errors", errors),
        DomainError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        DomainError::Forbidden(_) => (StatusCode::FORBIDDEN, err.to_string()),
        DomainError::InvalidTransition { .. } | DomainError::Conflict(_) => {
            (StatusCode::CONFLICT, err.to_string())
        }
        DomainError::Persistence(_) | DomainError::Internal(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal server error".to_string(),
        ),
    };

    let body = ErrorResponseDto {
        status: STATUS_ERROR.to_string(),
        message,
    };
    poem::Error::from_response(Json(body).with_status(status).into_response())
}

pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}
