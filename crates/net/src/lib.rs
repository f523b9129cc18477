//! Neural network ghost controller.
//!
//! Turns a scenario's `NeuralNetworkGhostController` handle into something
//! that can pick moves and learn from logged play.
//!
//! # Components
//!
//! - **Network** ([`network`]): sigmoid feedforward net trained by backpropagation
//! - **Features** ([`features`]): per-ghost observation and its 14-wide encoding
//! - **Dataset** ([`dataset`]): CSV decision logs and training matrices
//! - **Selection** ([`selection`]): roulette and greedy move selectors
//! - **Controller** ([`controller`]): ties the above to a scenario handle

pub mod controller;
pub mod dataset;
mod error;
pub mod features;
pub mod network;
pub mod selection;

pub use controller::{ControllerOptions, NeuralGhostController};
pub use dataset::{TrainingData, TrainingLog};
pub use error::{NetError, Result};
pub use features::{GhostObservation, DIRECTION_COUNT, FEATURE_COUNT};
pub use network::{misclassification_rate, NeuralNetwork, TrainingReport};
pub use selection::{selector_for, GreedySelector, MoveSelector, RouletteSelector};
