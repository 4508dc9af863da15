use crate::error::Result;
use async_trait::async_trait;
use catalog::Episode;
use serde::Serialize;

/// Catalog search capability.
///
/// Implementations normalize their own payloads, so callers always receive
/// `Episode`s with provider-prefixed ids. Authentication stays internal to
/// each provider.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Stable provider name used in logs and error messages
    fn name(&self) -> &str;

    /// False when the provider cannot be queried at all (missing credentials)
    fn is_available(&self) -> bool {
        true
    }

    /// Episodes matching a category or keyword query, at most `limit`
    async fn search_by_category(&self, term: &str, limit: usize) -> Result<Vec<Episode>>;
}

/// Name and availability of one provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderStatus {
    pub name: String,
    pub available: bool,
}
