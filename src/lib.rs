use std::sync::Arc;

use poem::{Endpoint, EndpointExt, Route, middleware::Tracing};
use poem_openapi::OpenApiService;

use crate::presentation::http::endpoints::{
    health::HealthEndpoints, messages::MessagesEndpoints, root::ApiState,
};

pub mod application;
pub mod config;
pub mod container;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

/// The API under `/api` and its Swagger UI at `/`.
pub fn build_app(state: Arc<ApiState>, server_url: &str) -> impl Endpoint + use<> {
    let api_service = OpenApiService::new(
        (HealthEndpoints, MessagesEndpoints::new(state)),
        "SMS Gateway API",
        env!("CARGO_PKG_VERSION"),
    )
    .server(format!("{server_url}/api"));
    let ui = api_service.swagger_ui();

    Route::new()
        .nest("/api", api_service)
        .nest("/", ui)
        .with(Tracing)
}
