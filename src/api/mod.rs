//! Remote order-service API: HTTP transport, response envelope and error taxonomy.

pub mod envelope;
pub mod error;
pub mod order_api;

pub use error::RemoteError;
pub use order_api::OrderApi;
