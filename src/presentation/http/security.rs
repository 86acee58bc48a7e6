use poem::{Error as PoemError, Result as PoemResult, http::StatusCode};
use poem_openapi::SecurityScheme;
use poem_openapi::auth::Bearer;
use tracing::debug;

use crate::application::services::jwt::{JwtService, JwtServiceConfig};

#[derive(SecurityScheme)]
#[oai(ty = "bearer", bearer_format = "JWT")]
pub struct JwtAuth(pub Bearer);

/// The phone the request comes from. Messages it sends are owned by it.
pub struct AuthenticatedDevice {
    pub owner: String,
}

impl JwtAuth {
    pub fn into_device(self, config: &JwtServiceConfig) -> PoemResult<AuthenticatedDevice> {
        let service = JwtService::new(config.clone());
        match service.verify(&self.0.token) {
            Ok(claims) => Ok(AuthenticatedDevice { owner: claims.sub }),
            Err(err) => {
                debug!(error = %err, "Rejected bearer token");
                Err(PoemError::from_string(
                    "invalid or expired token",
                    StatusCode::UNAUTHORIZED,
                ))
            }
        }
    }
}
