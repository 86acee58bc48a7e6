pub mod event_listener_log;
pub mod message;

pub use event_listener_log::{EventListenerLog, ListenerStatus};
pub use message::{Message, MessageEventEntry, MessageStatus};
