use axum::http::{header::ORIGIN, HeaderMap, Method, StatusCode, Uri};
use serde::Serialize;
use serde_json::json;
use tracing::info;

use super::error::ClientError;
use crate::web::Error;

/// Emits a structured line describing how a request was answered.
/// Internal error causes only end up here, never in the response.
pub fn log_request(
    req_id: Option<String>,
    req_method: Method,
    uri: Uri,
    req_headers: &HeaderMap,
    status_code: StatusCode,
    web_error: Option<&Error>,
    client_status_and_error: Option<(StatusCode, ClientError)>,
) {
    let timestamp = chrono::Utc::now().to_rfc3339();
    let req_method = req_method.to_string();
    let uri = uri.to_string();
    let origin = req_headers
        .get(ORIGIN)
        .map(|o| String::from_utf8_lossy(o.as_bytes()).into_owned());
    let client_error_type = client_status_and_error
        .as_ref()
        .map(|(_, ce)| ce.as_ref().to_string());
    let status_code = client_status_and_error
        .map(|(sc, _)| sc.as_u16())
        .unwrap_or(status_code.as_u16());
    let web_error_type = web_error.map(|we| we.as_ref().to_string());
    let web_error_detail = web_error.map(|we| we.to_string());

    let logline = LogLine {
        timestamp,
        req_id,
        req_method,
        uri,
        origin,
        status_code,
        client_error_type,
        web_error_type,
        web_error_detail,
    };

    info!("LOGLINE: {}", json!(logline));
}

#[derive(Serialize)]
struct LogLine {
    timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    req_id: Option<String>,

    req_method: String,
    uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    origin: Option<String>,
    status_code: u16,

    #[serde(skip_serializing_if = "Option::is_none")]
    client_error_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    web_error_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    web_error_detail: Option<String>,
}
