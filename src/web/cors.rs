//! Cross-origin policy for the subscribe routes.
//!
//! Allowed origins are reflected back in `Access-Control-Allow-Origin`, never a wildcard.
//! Any other origin just doesn't get the header (the browser then blocks the response),
//! unless the policy is configured to reject unknown origins outright.

use std::collections::HashSet;

use axum::{
    extract::{Request, State},
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN, VARY,
        },
        HeaderMap, HeaderValue, Method, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::{config::CorsConfig, web, AppState};

pub const ALLOWED_METHODS: &str = "POST, OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginDecision {
    Allowed,
    Denied,
    /// No `Origin` header, e.g. a server-to-server call.
    Absent,
}

#[derive(Debug, Clone)]
pub struct OriginPolicy {
    allowed_origins: HashSet<String>,
    reject_unknown: bool,
}

impl OriginPolicy {
    pub fn new<I, S>(allowed_origins: I, reject_unknown: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        OriginPolicy {
            allowed_origins: allowed_origins.into_iter().map(Into::into).collect(),
            reject_unknown,
        }
    }

    pub fn from_config(config: &CorsConfig) -> Self {
        Self::new(
            config.allowed_origins.iter().cloned(),
            config.reject_unknown_origins,
        )
    }

    /// Exact, case-sensitive match against the allowed set.
    pub fn decide(&self, origin: Option<&HeaderValue>) -> OriginDecision {
        let Some(origin) = origin else {
            return OriginDecision::Absent;
        };

        match origin.to_str() {
            Ok(origin) if self.allowed_origins.contains(origin) => OriginDecision::Allowed,
            _ => OriginDecision::Denied,
        }
    }

    pub fn rejects_unknown(&self) -> bool {
        self.reject_unknown
    }
}

/// Middleware applying the `OriginPolicy` and answering preflight requests.
///
/// `Access-Control-Allow-Methods` and `Access-Control-Allow-Headers` are set on every
/// response that leaves this layer, error responses included.
pub async fn cors_policy(
    State(app_state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let policy = &app_state.origin_policy;
    let origin = req.headers().get(ORIGIN).cloned();
    let decision = policy.decide(origin.as_ref());

    if decision == OriginDecision::Denied {
        let origin = origin
            .as_ref()
            .map(|o| String::from_utf8_lossy(o.as_bytes()).into_owned())
            .unwrap_or_default();
        warn!("{:<12} - Origin not allowed: {origin}", "CORS");

        if policy.rejects_unknown() {
            let mut resp = web::Error::OriginNotAllowed(origin).into_response();
            set_cors_headers(resp.headers_mut(), None);
            return resp;
        }
    }

    let mut resp = if *req.method() == Method::OPTIONS {
        debug!("{:<12} - Answering preflight request", "CORS");
        StatusCode::OK.into_response()
    } else {
        next.run(req).await
    };

    let allow_origin = origin.filter(|_| decision == OriginDecision::Allowed);
    set_cors_headers(resp.headers_mut(), allow_origin);

    resp
}

fn set_cors_headers(headers: &mut HeaderMap, allow_origin: Option<HeaderValue>) {
    if let Some(origin) = allow_origin {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    }
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    headers.append(VARY, HeaderValue::from_static("Origin"));
}
