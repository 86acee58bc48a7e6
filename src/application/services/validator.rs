use crate::{
    application::usecases::send_message::SendMessageRequest,
    domain::{errors::ValidationError, models::MessageStatus, value_objects::Take},
};

pub const MAX_CONTENT_LENGTH: usize = 1024;

/// Field-level checks run before any use case is called. Pure: no I/O.
#[derive(Debug, Clone, Default)]
pub struct MessageValidator;

impl MessageValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_send(
        &self,
        request: &SendMessageRequest,
        caller: &str,
    ) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if !is_phone_number(&request.owner) {
            errors.push(ValidationError::new("from", "must be a valid phone number"));
        } else if request.owner != caller {
            errors.push(ValidationError::new(
                "from",
                "must be the phone number of the authenticated device",
            ));
        }

        if !is_phone_number(&request.contact) {
            errors.push(ValidationError::new("to", "must be a valid phone number"));
        }

        let length = request.content.chars().count();
        if request.content.trim().is_empty() {
            errors.push(ValidationError::new("content", "must not be empty"));
        } else if length > MAX_CONTENT_LENGTH {
            errors.push(ValidationError::new(
                "content",
                format!("must be at most {MAX_CONTENT_LENGTH} characters, got {length}"),
            ));
        }

        errors
    }

    pub fn validate_outstanding(&self, take: Option<u32>) -> Vec<ValidationError> {
        match take {
            Some(value) if !(Take::MIN..=Take::MAX).contains(&value) => vec![ValidationError::new(
                "take",
                format!("must be between {} and {}", Take::MIN, Take::MAX),
            )],
            _ => Vec::new(),
        }
    }

    pub fn validate_status_update(&self, status: MessageStatus) -> Vec<ValidationError> {
        if status == MessageStatus::Pending {
            return vec![ValidationError::new(
                "status",
                "a message cannot be moved back to pending",
            )];
        }
        Vec::new()
    }
}

fn is_phone_number(value: &str) -> bool {
    let digits = value.strip_prefix('+').unwrap_or(value);
    (7..=15).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit())
}
