use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while proxying an asset
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Missing file ID")]
    MissingIdentifier,

    /// Path segment that does not decode to a UTF-8 identifier
    #[error("Invalid file ID")]
    InvalidIdentifier,

    #[error("API key not configured")]
    MissingCredential,

    #[error("Upstream rejected request: {status}")]
    UpstreamRejected { status: StatusCode, status_text: String },

    /// Built with the request URL stripped, since it carries the credential
    #[error("Upstream transport failure: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Invalid upstream URL: {0}")]
    InvalidUpstreamUrl(String),
}

impl ProxyError {
    pub fn transport(error: reqwest::Error) -> Self {
        ProxyError::Transport(error.without_url())
    }

    /// Status code sent to the caller
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MissingIdentifier | ProxyError::InvalidIdentifier => StatusCode::BAD_REQUEST,
            ProxyError::UpstreamRejected { status, .. } => *status,
            ProxyError::MissingCredential
            | ProxyError::Transport(_)
            | ProxyError::InvalidUpstreamUrl(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent to the caller. Never contains upstream bodies or the
    /// credential.
    pub fn public_message(&self) -> String {
        match self {
            ProxyError::MissingIdentifier
            | ProxyError::InvalidIdentifier
            | ProxyError::MissingCredential => self.to_string(),
            ProxyError::UpstreamRejected { status_text, .. } => {
                format!("Failed to fetch asset: {}", status_text)
            }
            ProxyError::Transport(_) | ProxyError::InvalidUpstreamUrl(_) => {
                "Failed to fetch asset".to_string()
            }
        }
    }

    /// Label for the request outcome metric
    pub fn outcome(&self) -> &'static str {
        match self {
            ProxyError::MissingIdentifier => "missing_identifier",
            ProxyError::InvalidIdentifier => "invalid_identifier",
            ProxyError::MissingCredential => "missing_credential",
            ProxyError::UpstreamRejected { .. } => "upstream_rejected",
            ProxyError::Transport(_) | ProxyError::InvalidUpstreamUrl(_) => "transport_error",
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorResponse {
                error: self.public_message(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ProxyError::MissingIdentifier.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ProxyError::InvalidIdentifier.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ProxyError::InvalidIdentifier.public_message(), "Invalid file ID");
        assert_eq!(
            ProxyError::MissingCredential.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let rejected = ProxyError::UpstreamRejected {
            status: StatusCode::FORBIDDEN,
            status_text: "Forbidden".to_string(),
        };
        assert_eq!(rejected.status(), StatusCode::FORBIDDEN);
        assert_eq!(rejected.public_message(), "Failed to fetch asset: Forbidden");
    }

    #[test]
    fn test_internal_errors_stay_generic() {
        let error = ProxyError::InvalidUpstreamUrl("https://x/?key=secret".to_string());
        assert_eq!(error.public_message(), "Failed to fetch asset");
        assert_eq!(error.outcome(), "transport_error");
    }
}
