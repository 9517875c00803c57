use crate::klaviyo_client;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("klaviyo client error: {0}")]
    KlaviyoClient(#[from] klaviyo_client::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
