use std::sync::Arc;

use poem_openapi::Tags;

use crate::application::{
    services::{jwt::JwtServiceConfig, validator::MessageValidator},
    usecases::{
        get_outstanding::GetOutstandingMessagesUseCase,
        list_message_events::ListMessageEventsUseCase, send_message::SendMessageUseCase,
        update_message_status::UpdateMessageStatusUseCase,
    },
};

#[derive(Clone)]
pub struct ApiState {
    pub send_message_usecase: Arc<SendMessageUseCase>,
    pub get_outstanding_usecase: Arc<GetOutstandingMessagesUseCase>,
    pub update_message_status_usecase: Arc<UpdateMessageStatusUseCase>,
    pub list_message_events_usecase: Arc<ListMessageEventsUseCase>,
    pub validator: MessageValidator,
    pub jwt_config: JwtServiceConfig,
}

/// Enum of API sections (tags)
#[derive(Tags)]
pub enum EndpointsTags {
    Health,
    Messages,
}
