use std::time::Duration;

use axum::{
    body::Body,
    http::{HeaderName, Request, Response},
    middleware, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::Span;

use crate::{App, AppState, Result};

use super::{midware, routes::routes, REQUEST_ID_HEADER};

/// Serves the relay on the listener bound by `App::build_from_config`
/// until `axum::serve` stops, which only happens on an IO error.
pub async fn serve(app: App) -> Result<()> {
    let App {
        app_state,
        listener,
    } = app;

    axum::serve(listener, router(app_state)).await?;

    Ok(())
}

/// The relay's routes wrapped in the request id, tracing and response mapping layers.
///
/// Requests pass the layers top to bottom and responses bottom to top, so the
/// response mapper sees every response (including CORS decorated errors) before
/// `x-request-id` is copied onto it.
pub fn router(app_state: AppState) -> Router {
    let x_request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            let req_id = req
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|id| id.to_str().ok())
                .unwrap_or_default()
                .to_string();

            tracing::info_span!(
                "relay",
                req_id = %req_id,
                method = %req.method(),
                path = req.uri().path(),
            )
        })
        .on_request(())
        .on_response(|res: &Response<Body>, latency: Duration, _span: &Span| {
            let status = res.status();
            if status.is_server_error() {
                tracing::error!(%status, ?latency, "request failed");
            } else if status.is_client_error() {
                tracing::warn!(%status, ?latency, "request rejected");
            } else {
                tracing::info!(%status, ?latency, "request served");
            }
        });

    routes(app_state).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
            .layer(trace_layer)
            .layer(middleware::map_response(midware::response_mapper))
            .layer(PropagateRequestIdLayer::new(x_request_id)),
    )
}
