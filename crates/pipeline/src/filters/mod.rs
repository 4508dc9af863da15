//! Filter implementations for the episode pipeline.
//!
//! This module contains the concrete filters that can be composed into a
//! FilterPipeline.

pub mod duration_window;

// Re-export for convenience
pub use duration_window::DurationWindowFilter;
