//! Feed subsystem: post model and ranking.

pub mod scoring;
pub mod types;

pub use scoring::{neural_score, rank_feed};
pub use types::{HiddenContent, Post};
