pub mod get_outstanding;
pub mod list_message_events;
pub mod send_message;
pub mod update_message_status;
