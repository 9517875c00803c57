pub use crate::web::serve::serve;

use std::{net::SocketAddr, sync::Arc};

use derive_more::Deref;
use tokio::net::TcpListener;
use tracing::info;

use crate::{config::AppConfig, web::cors::OriginPolicy, KlaviyoClient, Result};

// ###################################
// ->  Structs
// ###################################
pub struct App {
    pub app_state: AppState,
    pub listener: TcpListener,
}
impl App {
    pub fn new(app_state: AppState, listener: TcpListener) -> Self {
        App {
            app_state,
            listener,
        }
    }

    pub async fn build_from_config(config: AppConfig) -> Result<Self> {
        let klaviyo_client = KlaviyoClient::from_config(&config.klaviyo_config)?;
        let origin_policy = OriginPolicy::from_config(&config.cors_config);
        if config.cors_config.allowed_origins.is_empty() {
            tracing::warn!("{:<20} - no allowed origins configured", "CORS:");
        }

        let app_state = AppState::new(klaviyo_client, origin_policy);

        let addr = SocketAddr::from((config.net_config.host, config.net_config.app_port));
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        info!("{:<20} - {}", "Listening on:", addr);

        let app = App::new(app_state, listener);
        Ok(app)
    }
}

pub struct InternalState {
    pub klaviyo_client: KlaviyoClient,
    pub origin_policy: OriginPolicy,
}

/// Application state containing all global data, read-only once built.
/// It implements `Deref` to easily access the fields on `InternalState`
/// Uses an `Arc` so it can be cloned around.
#[derive(Clone, Deref)]
pub struct AppState(Arc<InternalState>);

impl AppState {
    pub fn new(klaviyo_client: KlaviyoClient, origin_policy: OriginPolicy) -> Self {
        AppState(Arc::new(InternalState {
            klaviyo_client,
            origin_policy,
        }))
    }
}
