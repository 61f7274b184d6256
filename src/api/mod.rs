//! Marketplace backend access: JSON transport and the REST client.

mod client;
mod error;
pub mod transport;

pub use client::MarketplaceClient;
pub use error::RequestError;

/// Returns the api module name for smoke checks.
pub fn module_name() -> &'static str {
    "api"
}
