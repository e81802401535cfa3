use crate::config::ConfigError;
use crate::event_handler::Response;
use thiserror::Error;

/// Failures while building a response. None of these reach the host: each
/// one becomes a 5xx [`Response`].
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("configuration unavailable: {0}")]
    ConfigUnavailable(String),
}

impl HandlerError {
    pub fn status_code(&self) -> u16 {
        match self {
            HandlerError::ConfigUnavailable(_) => 503,
        }
    }

    pub fn into_response(self) -> Response {
        Response::error(self.status_code(), self.to_string())
    }
}

impl From<ConfigError> for HandlerError {
    fn from(err: ConfigError) -> Self {
        HandlerError::ConfigUnavailable(err.to_string())
    }
}
