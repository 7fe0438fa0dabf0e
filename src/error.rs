//! Error types shared by the vendor client, the shadow store and the bootstrap code.

use rocket::serde::json::serde_json;
use thiserror::Error;

/// Any failure talking to the charger cloud or the shadow store.
///
/// Gateway-facing operations return this instead of swallowing the failure;
/// the controller decides which safe default applies.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("authentication failed: {message}")]
    Auth { message: String },

    #[error("API error: {message}")]
    Api { message: String },

    #[error("malformed response: {message}")]
    Malformed { message: String },

    #[error("device `{name}` not found")]
    DeviceNotFound { name: String },

    #[error("shadow for thing `{thing_name}` not found")]
    ShadowNotFound { thing_name: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl UpstreamError {
    pub fn auth<S: Into<String>>(message: S) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file `{path}`: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for `{field}`: {message}")]
    Invalid { field: String, message: String },
}

impl ConfigError {
    pub fn invalid<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Top-level failure of a process invocation.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("server error: {0}")]
    Rocket(#[from] Box<rocket::Error>),
}

impl From<rocket::Error> for AppError {
    fn from(error: rocket::Error) -> Self {
        Self::Rocket(Box::new(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            UpstreamError::auth("bad password").to_string(),
            "authentication failed: bad password"
        );
        assert_eq!(
            UpstreamError::DeviceNotFound {
                name: "Garage".to_string()
            }
            .to_string(),
            "device `Garage` not found"
        );
        assert_eq!(
            ConfigError::invalid("schedule.timezone", "unknown timezone `Mars/Base`").to_string(),
            "invalid config value for `schedule.timezone`: unknown timezone `Mars/Base`"
        );
    }
}
