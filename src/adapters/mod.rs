//! Resolver adapters
//!
//! Each adapter wraps one third-party resolver site and knows how to
//! turn a post URL into the raw (possibly packed) markup payload.

use crate::error::Result;
use async_trait::async_trait;

pub mod snapinsta;

pub use snapinsta::{SnapInstaClient, SNAPINSTA_BASE};

/// Trait for resolver-site gateways.
///
/// A gateway owns the outbound connection and header construction; the
/// decode/extract pipeline only ever sees the payload string it hands
/// back. Handles are passed explicitly, never held as process globals.
#[async_trait]
pub trait ResolverGateway: Send + Sync {
    /// Unique identifier for this resolver (e.g. "snapinsta")
    fn resolver_id(&self) -> &'static str;

    /// Run the resolver's full call sequence for `url` and return the
    /// raw payload.
    ///
    /// # Returns
    /// * `Ok(String)` - raw markup, plain or packed
    /// * `Err(VerificationRejected)` - the resolver declared the URL invalid
    /// * `Err(PayloadMissing)` - the search response carried no data
    /// * `Err(...)` - network or JSON errors
    async fn fetch_payload(&self, url: &str) -> Result<String>;
}
