use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{json, Value};
use std::sync::Arc;
use strum_macros::AsRefStr;

use super::routes::SubscribeError;

pub type WebResult<T> = core::result::Result<T, Error>;

#[derive(Debug, AsRefStr, thiserror::Error)]
pub enum Error {
    #[error("request origin is not allowed: {0}")]
    OriginNotAllowed(String),

    #[error("subscribe error: {0}")]
    Subscribe(#[from] SubscribeError),
}

impl Error {
    pub fn status_code_and_client_error(&self) -> (StatusCode, ClientError) {
        use ClientError::*;

        match self {
            Error::OriginNotAllowed(_) => (StatusCode::FORBIDDEN, OriginNotAllowed),
            Error::Subscribe(sub_er) => match sub_er {
                SubscribeError::MethodNotAllowed(_) => {
                    (StatusCode::METHOD_NOT_ALLOWED, MethodNotAllowed)
                }
                SubscribeError::DataParsing(_) => (StatusCode::BAD_REQUEST, EmailRequired),
                SubscribeError::UpstreamRejected { status, details } => {
                    (*status, KlaviyoApi(details.clone()))
                }
                SubscribeError::UpstreamTransport(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, KlaviyoUnreachable)
                }
            },
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::debug!("{:<12} - into_response(Error: {self:?})", "INTO_RESP");

        // Construct a response
        let mut res = StatusCode::INTERNAL_SERVER_ERROR.into_response();

        // Insert the Error into response so that it can be retrieved later.
        res.extensions_mut().insert(Arc::new(self));

        res
    }
}

/// What the caller gets to see.
/// Never carries internal causes or configuration, only fixed messages and
/// the error body Klaviyo itself returned.
#[derive(Debug, AsRefStr)]
pub enum ClientError {
    MethodNotAllowed,
    EmailRequired,
    OriginNotAllowed,
    KlaviyoApi(Value),
    KlaviyoUnreachable,
}

impl ClientError {
    pub fn message(&self) -> &'static str {
        match self {
            ClientError::MethodNotAllowed => "Method Not Allowed",
            ClientError::EmailRequired => "Email is required.",
            ClientError::OriginNotAllowed => "Origin Not Allowed",
            ClientError::KlaviyoApi(_) => "Klaviyo API Error",
            ClientError::KlaviyoUnreachable => "Internal server error connecting to Klaviyo.",
        }
    }

    /// JSON body of the error response.
    pub fn body(&self) -> Value {
        match self {
            ClientError::KlaviyoApi(details) => json!({
                "message": self.message(),
                "details": details,
            }),
            _ => json!({ "message": self.message() }),
        }
    }
}
