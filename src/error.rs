//! Domain-specific error types for daydream

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Main error type for the daydream pipeline and its HTTP surface
#[derive(Error, Debug)]
pub enum DaydreamError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Provider error: {message}")]
    Provider { message: String },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DaydreamError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for DaydreamError {
    fn from(err: anyhow::Error) -> Self {
        DaydreamError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for DaydreamError {
    fn from(err: serde_json::Error) -> Self {
        DaydreamError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for DaydreamError {
    fn from(err: reqwest::Error) -> Self {
        DaydreamError::Provider {
            message: format!("HTTP request failed: {}", err),
        }
    }
}

// io and csv failures only happen while loading config and seed files
impl From<std::io::Error> for DaydreamError {
    fn from(err: std::io::Error) -> Self {
        DaydreamError::Config {
            message: err.to_string(),
        }
    }
}

impl From<csv::Error> for DaydreamError {
    fn from(err: csv::Error) -> Self {
        DaydreamError::Config {
            message: format!("Seed file parse error: {}", err),
        }
    }
}

impl From<toml::de::Error> for DaydreamError {
    fn from(err: toml::de::Error) -> Self {
        DaydreamError::Config {
            message: format!("Config file parse error: {}", err),
        }
    }
}

/// Only failures raised before a stream opens are rendered through here.
impl IntoResponse for DaydreamError {
    fn into_response(self) -> Response {
        let status = match &self {
            DaydreamError::Validation { .. } => StatusCode::BAD_REQUEST,
            DaydreamError::Provider { .. } => StatusCode::BAD_GATEWAY,
            DaydreamError::Config { .. }
            | DaydreamError::Transport { .. }
            | DaydreamError::Serialization { .. }
            | DaydreamError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = match self {
            DaydreamError::Validation { message } => message,
            other => other.to_string(),
        };
        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            body,
        )
            .into_response()
    }
}

/// Result type alias for daydream operations
pub type Result<T> = std::result::Result<T, DaydreamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request_with_bare_message() {
        let resp = DaydreamError::validation("Missing apiKey or turns").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn provider_maps_to_bad_gateway() {
        let resp = DaydreamError::provider("upstream 500").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn display_includes_category() {
        let err = DaydreamError::config("seed file is empty");
        assert_eq!(err.to_string(), "Configuration error: seed file is empty");
    }
}
