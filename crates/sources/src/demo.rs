use crate::error::Result;
use crate::provider::CatalogProvider;
use async_trait::async_trait;
use catalog::{DemoCatalog, Episode};

/// Offline provider over the built-in demo catalog.
///
/// Always available. A query with no keyword match returns an empty list;
/// the aggregator's final fallback covers that case with the full catalog.
#[derive(Debug, Clone, Default)]
pub struct DemoProvider {
    catalog: DemoCatalog,
}

impl DemoProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(catalog: DemoCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &DemoCatalog {
        &self.catalog
    }
}

#[async_trait]
impl CatalogProvider for DemoProvider {
    fn name(&self) -> &str {
        "demo"
    }

    async fn search_by_category(&self, term: &str, limit: usize) -> Result<Vec<Episode>> {
        Ok(self.catalog.search(term, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_demo_provider_search() {
        let provider = DemoProvider::new();
        assert!(provider.is_available());

        let episodes = provider.search_by_category("Comedy", 20).await.unwrap();
        assert!(episodes.iter().any(|e| e.id == "demo:3"));

        let none = provider.search_by_category("Underwater Basket", 20).await.unwrap();
        assert!(none.is_empty());
    }
}
