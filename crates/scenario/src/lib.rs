//! Scenario loading for ghost-controller simulations.
//!
//! A scenario script declares one experiment: search budget, the
//! controllers on each side, the tree-search selection policy and the
//! opponent. This crate turns such a script into an immutable, validated
//! [`SimulationConfig`] for an external runner.
//!
//! # Pipeline
//!
//! - **Lexing** ([`lexer`]): logos-based tokenizer, block comments kept
//! - **Parsing** ([`parser`]): recursive descent into an [`ast::Script`]
//! - **Evaluation** ([`loader`]): bindings, constructor registry, validation
//!
//! # Example
//!
//! ```
//! use ghostlab_scenario::{load_str, Controller, MoveSelection};
//!
//! let scenario = load_str(
//!     "learning",
//!     "/* Learning ghosts. */
//!      nodeExpansionThreshold = 10;
//!      maximumSimulationLength = 100000;
//!      pacManModel = new RandomNonRevPacMan();
//!      ghostModel = new NeuralNetworkGhostController(new RouletteMoveSelectionStrategy(), 5, true);
//!      tasks = [ ghostModel ];
//!      selectionPolicy = new LevineUcbSelectionPolicy(4000);
//!      opponent = new Legacy();",
//! ).unwrap();
//!
//! assert_eq!(scenario.description.as_deref(), Some("Learning ghosts."));
//! assert_eq!(
//!     scenario.config.ghost_model,
//!     Controller::NeuralNetworkGhost {
//!         move_selection: MoveSelection::Roulette,
//!         iterations: 5,
//!         use_pretrained_weights: true,
//!     }
//! );
//! assert_eq!(scenario.config.tasks, vec![scenario.config.ghost_model]);
//! ```

pub mod ast;
pub mod config;
pub mod controller;
mod error;
pub mod lexer;
pub mod loader;
pub mod parser;

pub use config::{Scenario, SimulationConfig};
pub use controller::{Controller, MoveSelection, SelectionPolicy, Side};
pub use error::{Result, ScenarioError};
pub use loader::{load_path, load_str};
