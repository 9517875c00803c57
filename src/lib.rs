//! A small HTTP service relaying newsletter signups from a storefront to Klaviyo.

pub mod app;
pub mod config;
mod error;
pub mod klaviyo_client;
mod utils;
pub mod web;

pub use app::{serve, App, AppState};
pub use error::{Error, Result};
pub use klaviyo_client::KlaviyoClient;

use tracing_subscriber::EnvFilter;

const DEFAULT_DBG_FILTER: &str = "signup_relay=debug,tower_http=debug,info";
const DEFAULT_PRODUCTION_FILTER: &str = "info";

/// Human readable logs for local development. `RUST_LOG` overrides the default filter.
pub fn init_dbg_tracing() {
    tracing_subscriber::fmt()
        .without_time()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DBG_FILTER)),
        )
        .compact()
        .init();
}

/// JSON logs, one object per line.
pub fn init_production_tracing() {
    tracing_subscriber::fmt()
        .json()
        .with_current_span(true)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_PRODUCTION_FILTER)),
        )
        .init();
}
