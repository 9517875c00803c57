//! Contains all the routes that this application can handle.

mod subscribe;

// re-export errors
pub use subscribe::SubscribeError;

use crate::{web::cors::cors_policy, AppState};

use axum::{
    http::StatusCode,
    middleware,
    routing::{any, get},
    Router,
};

async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// All the routes of the server
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .merge(subscribe_routes(app_state))
        .route("/health-check", get(health_check))
}

/// SUBSCRIBE - Routes guarded by the CORS policy.
/// `/api/klaviyo-subscribe` is the path storefront snippets already post to.
/// Every method is routed to the handler so it can answer with its own 405.
fn subscribe_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/subscribe", any(subscribe::subscribe))
        .route("/api/klaviyo-subscribe", any(subscribe::subscribe))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            cors_policy,
        ))
        .with_state(app_state)
}
