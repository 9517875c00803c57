use std::sync::Arc;

use axum::{
    http::{header::ALLOW, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};

use crate::web::{cors::ALLOWED_METHODS, log, Error, REQUEST_ID_HEADER};

/// Turns a `web::Error` stored in the response extensions into the JSON body the caller sees
/// and logs one line per request.
/// Headers set by inner layers (CORS) are carried over to the new response.
pub async fn response_mapper(
    req_method: Method,
    uri: Uri,
    req_headers: HeaderMap,
    resp: Response,
) -> Response {
    let req_id = req_headers
        .get(REQUEST_ID_HEADER)
        .and_then(|id| id.to_str().ok())
        .map(str::to_string);

    let web_error = resp.extensions().get::<Arc<Error>>().map(|er| &**er);
    let client_status_and_error = web_error.map(Error::status_code_and_client_error);

    let err_resp = client_status_and_error.as_ref().map(|(status, cl_err)| {
        let mut err_resp = (*status, Json(cl_err.body())).into_response();

        let headers = err_resp.headers_mut();
        for (name, value) in resp.headers() {
            if !headers.contains_key(name) {
                headers.append(name.clone(), value.clone());
            }
        }
        if *status == StatusCode::METHOD_NOT_ALLOWED {
            headers.insert(ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
        }

        err_resp
    });

    log::log_request(
        req_id,
        req_method,
        uri,
        &req_headers,
        resp.status(),
        web_error,
        client_status_and_error,
    );

    err_resp.unwrap_or(resp)
}
