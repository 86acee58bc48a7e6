use std::collections::HashMap;

use poem_openapi::Object;
use uuid::Uuid;

use crate::presentation::models::{EventTypeKind, MessageStatusKind};

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_ERROR: &str = "error";

#[derive(Object, Debug)]
pub struct MessageDto {
    pub id: Uuid,
    pub owner: String,
    pub contact: String,
    pub content: String,
    pub status: MessageStatusKind,
    pub request_url: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Object, Debug)]
pub struct MessageEventDto {
    pub id: Uuid,
    pub message_id: Uuid,
    pub event_id: Uuid,
    pub event_type: EventTypeKind,
    pub recorded_at: String,
}

#[derive(Object, Debug)]
pub struct MessageResponseDto {
    pub status: String,
    pub message: String,
    pub data: MessageDto,
}

#[derive(Object, Debug)]
pub struct MessagesResponseDto {
    pub status: String,
    pub message: String,
    pub data: Vec<MessageDto>,
}

#[derive(Object, Debug)]
pub struct MessageEventsResponseDto {
    pub status: String,
    pub message: String,
    pub data: Vec<MessageEventDto>,
}

/// Body of a 422 response: every offending field with its problems.
#[derive(Object, Debug)]
pub struct ValidationErrorResponseDto {
    pub status: String,
    pub message: String,
    pub data: HashMap<String, Vec<String>>,
}

#[derive(Object, Debug)]
pub struct ErrorResponseDto {
    pub status: String,
    pub message: String,
}
