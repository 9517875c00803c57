use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    Json,
};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::{
    klaviyo_client::{self, UpstreamResult},
    web::{
        types::{DataParsingError, SubscriptionRequest},
        WebResult,
    },
    AppState,
};

const SUBSCRIBE_SUCCESS_MSG: &str = "Subscription successful.";

// ###################################
// ->   ERROR
// ###################################
#[derive(Debug, thiserror::Error)]
pub enum SubscribeError {
    #[error("method not allowed: {0}")]
    MethodNotAllowed(Method),
    #[error("data parsing error: {0}")]
    DataParsing(#[from] DataParsingError),

    #[error("Klaviyo rejected the subscription with status: {status}")]
    UpstreamRejected { status: StatusCode, details: Value },
    #[error("failed to reach Klaviyo: {0}")]
    UpstreamTransport(#[from] klaviyo_client::Error),
}

// ###################################
// ->   API
// ###################################
/// Validates a newsletter signup and forwards it to Klaviyo.
/// Preflight requests never get here, they're answered by the CORS layer.
#[tracing::instrument(
    name = "Forwarding a newsletter signup",
    skip(app_state, body),
    fields(subscriber_email = tracing::field::Empty)
)]
pub async fn subscribe(
    State(app_state): State<AppState>,
    method: Method,
    body: Bytes,
) -> WebResult<(StatusCode, Json<Value>)> {
    if method != Method::POST {
        return Err(SubscribeError::MethodNotAllowed(method).into());
    }

    let subscriber = SubscriptionRequest::parse_json(&body).map_err(SubscribeError::DataParsing)?;
    tracing::Span::current().record(
        "subscriber_email",
        tracing::field::display(&subscriber.email),
    );

    match app_state.klaviyo_client.subscribe(&subscriber).await {
        UpstreamResult::Accepted => {
            info!("SUCCESS");
            Ok((
                StatusCode::ACCEPTED,
                Json(json!({ "message": SUBSCRIBE_SUCCESS_MSG })),
            ))
        }
        UpstreamResult::Rejected { status, body } => {
            warn!("{:<12} - Klaviyo rejected the subscription: {status}", "KLAVIYO");
            Err(SubscribeError::UpstreamRejected {
                status,
                details: body,
            }
            .into())
        }
        UpstreamResult::TransportFailure { cause } => {
            error!("{:<12} - Klaviyo call failed: {cause:?}", "KLAVIYO");
            Err(SubscribeError::UpstreamTransport(cause).into())
        }
    }
}
