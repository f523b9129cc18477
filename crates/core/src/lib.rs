//! Ghost Lab Core - shared Pac-Man ghost domain types
//!
//! This crate provides the small vocabulary every other Ghost Lab crate
//! speaks: the moves an agent can make, the four ghosts, and a scored
//! distribution over directional moves.
//!
//! # Types
//!
//! - [`Move`] - A maze move (four directions plus `Neutral`)
//! - [`Ghost`] - One of the four ghosts
//! - [`MoveDistribution`] - Non-negative scores over the four directional moves

mod error;
mod types;

pub use error::{GhostLabError, Result};
pub use types::{Ghost, Move, MoveDistribution};
