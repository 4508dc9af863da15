//! Server crate for the vibecast recommendation engine.
//!
//! This crate contains the configuration and the orchestrator that
//! coordinates providers, ranking, shuffling and feedback per session.

pub mod config;
pub mod orchestrator;

pub use config::{Config, ENV_PREFIX};
pub use orchestrator::{Recommendation, Recommender, RecommenderError, SessionId};
pub use pipeline::ScoredEpisode;
