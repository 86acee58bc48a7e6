pub mod event_dispatcher;
pub mod jwt;
pub mod validator;
