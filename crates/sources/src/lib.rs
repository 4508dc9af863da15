//! # Sources Crate
//!
//! Catalog providers and the aggregator that combines them into one
//! episode pool.
//!
//! ## Components
//!
//! ### Providers
//! - **SpotifyProvider**: streaming-platform catalog (shows, then episodes)
//! - **ListenNotesProvider**: podcast-database episode search
//! - **DemoProvider**: offline catalog, always available
//!
//! ### CatalogAggregator
//! Queries providers in priority order with timeouts, merges and
//! de-duplicates their answers, and falls back to the demo catalog when
//! nothing comes back.
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::{CatalogAggregator, DemoProvider, SpotifyProvider};
//! use catalog::{search_terms_for, DemoCatalog, Mood, Theme};
//!
//! let aggregator = CatalogAggregator::new()
//!     .add_provider(SpotifyProvider::new(std::env::var("TOKEN").ok()))
//!     .add_provider(DemoProvider::new())
//!     .with_demo_fallback(DemoCatalog::new());
//!
//! let terms = search_terms_for(&[Mood::Bored], &[Theme::Laugh]);
//! let pool = aggregator.search(&terms, 30).await?;
//! ```

pub mod aggregator;
pub mod demo;
pub mod error;
pub mod listen_notes;
pub mod provider;
pub mod spotify;

pub use aggregator::{AggregatorConfig, CatalogAggregator, FALLBACK_QUERY};
pub use demo::DemoProvider;
pub use error::{AggregateError, ProviderError, Result};
pub use listen_notes::ListenNotesProvider;
pub use provider::{CatalogProvider, ProviderStatus};
pub use spotify::SpotifyProvider;
