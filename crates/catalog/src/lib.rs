//! # Catalog Crate
//!
//! Domain model and pure lookup logic for podcast recommendation.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Episode, Mood, Theme, VibeSelection, feedback records)
//! - **categories**: Mood/theme to catalog taxonomy mapping and search terms
//! - **normalize**: Raw provider records into `Episode`s
//! - **demo**: Offline demo catalog
//! - **error**: Error types for catalog records
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::{categories_for, search_terms_for, Mood, Theme};
//!
//! let set = categories_for(&[Mood::Curious], &[Theme::Learn]);
//! println!("primary: {:?}", set.primary);
//!
//! // First term is the primary query sent to providers
//! let terms = search_terms_for(&[Mood::Curious], &[Theme::Learn]);
//! assert_eq!(terms[0], "Science");
//! ```

pub mod categories;
pub mod demo;
pub mod error;
pub mod normalize;
pub mod types;

pub use categories::{
    CategoryMapping, CategorySet, categories_for, mood_categories, mood_keywords,
    search_terms_for, theme_categories, theme_keywords,
};
pub use demo::DemoCatalog;
pub use error::{CatalogError, Result};
pub use types::{
    // Type aliases
    EpisodeId,
    // Core types
    Episode,
    ImplicitFeedback,
    PreferenceWeight,
    RatingRecord,
    VibeSelection,
    // Enums
    Mood,
    Theme,
    // Helpers
    SHOW_DEFAULT_MINUTES,
    normalized_title,
};
