use poem_openapi::Object;

use crate::presentation::models::MessageStatusKind;

/// Field rules live in `MessageValidator` so that every broken field is
/// reported at once in the 422 envelope.
#[derive(Object, Debug)]
pub struct SendMessageRequestDto {
    pub from: String,
    pub to: String,
    pub content: String,
}

#[derive(Object, Debug)]
pub struct UpdateMessageStatusRequestDto {
    pub status: MessageStatusKind,
}
