use std::sync::Arc;

use poem::Request;
use poem_openapi::{
    OpenApi,
    param::{Path, Query},
    payload::Json,
};
use uuid::Uuid;

use crate::{
    application::usecases::{
        get_outstanding::GetOutstandingRequest, send_message::SendMessageRequest,
        update_message_status::UpdateMessageStatusRequest,
    },
    domain::value_objects::Take,
    presentation::http::{
        endpoints::root::{ApiState, EndpointsTags},
        mappers::{domain_error, map_event_entry, map_message, pluralize, validation_error},
        requests::{SendMessageRequestDto, UpdateMessageStatusRequestDto},
        responses::{
            MessageEventsResponseDto, MessageResponseDto, MessagesResponseDto, STATUS_SUCCESS,
        },
        security::JwtAuth,
    },
};

#[derive(Clone)]
pub struct MessagesEndpoints {
    state: Arc<ApiState>,
}

impl MessagesEndpoints {
    pub fn new(state: Arc<ApiState>) -> Self {
        Self { state }
    }
}

#[OpenApi]
impl MessagesEndpoints {
    /// Queue a new SMS for the authenticated phone to send.
    #[oai(path = "/messages/send", method = "post", tag = EndpointsTags::Messages)]
    pub async fn send_message(
        &self,
        req: &Request,
        auth: JwtAuth,
        request: Json<SendMessageRequestDto>,
    ) -> poem::Result<Json<MessageResponseDto>> {
        let device = auth.into_device(&self.state.jwt_config)?;
        let payload = SendMessageRequest {
            owner: request.from.clone(),
            contact: request.to.clone(),
            content: request.content.clone(),
            request_url: req.original_uri().to_string(),
        };

        let errors = self.state.validator.validate_send(&payload, &device.owner);
        if !errors.is_empty() {
            return Err(validation_error(
                "validation errors while sending message",
                &errors,
            ));
        }

        let message = self
            .state
            .send_message_usecase
            .execute(payload)
            .await
            .map_err(domain_error)?;

        Ok(Json(MessageResponseDto {
            status: STATUS_SUCCESS.to_string(),
            message: "message added to queue".to_string(),
            data: map_message(&message),
        }))
    }

    /// Oldest pending messages the phone still has to send.
    #[oai(path = "/messages/outstanding", method = "get", tag = EndpointsTags::Messages)]
    pub async fn outstanding_messages(
        &self,
        auth: JwtAuth,
        take: Query<Option<u32>>,
    ) -> poem::Result<Json<MessagesResponseDto>> {
        let device = auth.into_device(&self.state.jwt_config)?;

        let errors = self.state.validator.validate_outstanding(take.0);
        if !errors.is_empty() {
            return Err(validation_error(
                "validation errors while fetching outstanding messages",
                &errors,
            ));
        }

        let messages = self
            .state
            .get_outstanding_usecase
            .execute(GetOutstandingRequest {
                owner: device.owner,
                take: take.0.map(Take::new).unwrap_or_default(),
            })
            .await
            .map_err(domain_error)?;

        Ok(Json(MessagesResponseDto {
            status: STATUS_SUCCESS.to_string(),
            message: format!(
                "fetched {} {}",
                messages.len(),
                pluralize("message", messages.len())
            ),
            data: messages.iter().map(map_message).collect(),
        }))
    }

    /// Report the delivery progress of a message.
    #[oai(
        path = "/messages/:message_id/status",
        method = "put",
        tag = EndpointsTags::Messages
    )]
    pub async fn update_message_status(
        &self,
        auth: JwtAuth,
        message_id: Path<Uuid>,
        request: Json<UpdateMessageStatusRequestDto>,
    ) -> poem::Result<Json<MessageResponseDto>> {
        let device = auth.into_device(&self.state.jwt_config)?;
        let status = request.status.into();

        let errors = self.state.validator.validate_status_update(status);
        if !errors.is_empty() {
            return Err(validation_error(
                "validation errors while updating message status",
                &errors,
            ));
        }

        let message = self
            .state
            .update_message_status_usecase
            .execute(UpdateMessageStatusRequest {
                owner: device.owner,
                message_id: message_id.0,
                status,
            })
            .await
            .map_err(domain_error)?;

        Ok(Json(MessageResponseDto {
            status: STATUS_SUCCESS.to_string(),
            message: format!("message status updated to {}", message.status),
            data: map_message(&message),
        }))
    }

    /// Lifecycle events recorded for a message, oldest first.
    #[oai(
        path = "/messages/:message_id/events",
        method = "get",
        tag = EndpointsTags::Messages
    )]
    pub async fn message_events(
        &self,
        auth: JwtAuth,
        message_id: Path<Uuid>,
    ) -> poem::Result<Json<MessageEventsResponseDto>> {
        let device = auth.into_device(&self.state.jwt_config)?;

        let entries = self
            .state
            .list_message_events_usecase
            .execute(message_id.0, &device.owner)
            .await
            .map_err(domain_error)?;

        Ok(Json(MessageEventsResponseDto {
            status: STATUS_SUCCESS.to_string(),
            message: format!(
                "fetched {} {}",
                entries.len(),
                pluralize("event", entries.len())
            ),
            data: entries.iter().map(map_event_entry).collect(),
        }))
    }
}
