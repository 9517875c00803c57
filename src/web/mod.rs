pub mod cors;
mod error;
mod log;
pub mod midware;
pub mod routes;
pub mod serve;
pub mod types;

pub use error::{ClientError, Error, WebResult};

pub const REQUEST_ID_HEADER: &str = "x-request-id";
