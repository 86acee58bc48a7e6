use std::env::var;
use std::time::Duration;

use dotenvy::dotenv;

use crate::application::services::jwt::JwtServiceConfig;

const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_JWT_EXPIRATION_SECONDS: u64 = 86_400;

pub struct Config {
    pub port: u16,
    pub scheme: String,
    pub host: String,
    /// In-memory storage is used when unset.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub jwt: JwtServiceConfig,
    pub handler_timeout: Option<Duration>,
}

impl Config {
    pub fn try_parse() -> Result<Config, &'static str> {
        let _ = dotenv();
        Self::from_lookup(|key| var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Config, &'static str> {
        let jwt_expiration = match lookup("JWT_EXPIRATION_SECONDS") {
            Some(value) => value
                .parse::<u64>()
                .map_err(|_| "An error occured while parsing JWT_EXPIRATION_SECONDS env param")?,
            None => DEFAULT_JWT_EXPIRATION_SECONDS,
        };

        let handler_timeout = match lookup("HANDLER_TIMEOUT_SECONDS") {
            Some(value) => Some(Duration::from_secs(value.parse::<u64>().map_err(|_| {
                "An error occured while parsing HANDLER_TIMEOUT_SECONDS env param"
            })?)),
            None => None,
        };

        Ok(Config {
            port: lookup("PORT")
                .ok_or("An error occured while getting PORT env param")?
                .parse::<u16>()
                .map_err(|_| "An error occured while parsing PORT env param")?,
            scheme: lookup("SCHEME").ok_or("An error occured while getting SCHEME env param")?,
            host: lookup("HOST").ok_or("An error occured while getting HOST env param")?,
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            database_max_connections: match lookup("DATABASE_MAX_CONNECTIONS") {
                Some(value) => value.parse::<u32>().map_err(|_| {
                    "An error occured while parsing DATABASE_MAX_CONNECTIONS env param"
                })?,
                None => DEFAULT_DATABASE_MAX_CONNECTIONS,
            },
            jwt: JwtServiceConfig {
                secret: lookup("JWT_SECRET")
                    .ok_or("An error occured while getting JWT_SECRET env param")?,
                expiration: Duration::from_secs(jwt_expiration),
            },
            handler_timeout,
        })
    }

    pub fn server_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }
}
