//! Controller, move-selection and selection-policy handles.
//!
//! Each handle names one known variant and carries that variant's typed
//! constructor arguments. Names match the constructors used in scenario
//! scripts, and the serde tags use the same names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the game a controller plays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    PacMan,
    Ghosts,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::PacMan => f.write_str("Pac-Man"),
            Side::Ghosts => f.write_str("ghost"),
        }
    }
}

/// Rule for picking a move from scored directions outside the search tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveSelection {
    /// Weighted-random choice proportional to the scores.
    #[serde(rename = "RouletteMoveSelectionStrategy")]
    Roulette,
    /// Always the highest score.
    #[serde(rename = "GreedyMoveSelectionStrategy")]
    Greedy,
}

impl MoveSelection {
    pub const ALL: [MoveSelection; 2] = [MoveSelection::Roulette, MoveSelection::Greedy];

    pub fn script_name(self) -> &'static str {
        match self {
            MoveSelection::Roulette => "RouletteMoveSelectionStrategy",
            MoveSelection::Greedy => "GreedyMoveSelectionStrategy",
        }
    }

    pub fn from_script_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.script_name() == name)
    }
}

impl fmt::Display for MoveSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "new {}()", self.script_name())
    }
}

/// Tree-search child selection rule.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SelectionPolicy {
    /// UCB variant tuned for score-scaled rewards; the exploration
    /// constant is on the scale of game points.
    #[serde(rename = "LevineUcbSelectionPolicy")]
    LevineUcb {
        #[serde(rename = "explorationConstant")]
        exploration_constant: f64,
    },
    /// Plain UCB1.
    #[serde(rename = "Ucb1SelectionPolicy")]
    Ucb1 {
        #[serde(rename = "explorationConstant")]
        exploration_constant: f64,
    },
}

impl SelectionPolicy {
    pub fn exploration_constant(&self) -> f64 {
        match *self {
            SelectionPolicy::LevineUcb {
                exploration_constant,
            }
            | SelectionPolicy::Ucb1 {
                exploration_constant,
            } => exploration_constant,
        }
    }

    pub fn script_name(&self) -> &'static str {
        match self {
            SelectionPolicy::LevineUcb { .. } => "LevineUcbSelectionPolicy",
            SelectionPolicy::Ucb1 { .. } => "Ucb1SelectionPolicy",
        }
    }

    /// Build a policy from its constructor name and exploration constant.
    pub fn from_script_name(name: &str, exploration_constant: f64) -> Option<Self> {
        match name {
            "LevineUcbSelectionPolicy" => Some(SelectionPolicy::LevineUcb {
                exploration_constant,
            }),
            "Ucb1SelectionPolicy" => Some(SelectionPolicy::Ucb1 {
                exploration_constant,
            }),
            _ => None,
        }
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "new {}({})",
            self.script_name(),
            self.exploration_constant()
        )
    }
}

/// A controller variant plus its constructor arguments.
///
/// The set of variants mirrors the controllers shipped with the Pac-Man
/// vs Ghosts framework and may grow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
#[non_exhaustive]
pub enum Controller {
    // Pac-Man side
    RandomPacMan,
    RandomNonRevPacMan,
    NearestPillPacMan,
    StarterPacMan,

    // Ghost side
    Legacy,
    Legacy2TheReckoning,
    RandomGhosts,
    AggressiveGhosts,
    StarterGhosts,
    /// Learning ghost team driven by a feedforward network.
    #[serde(rename = "NeuralNetworkGhostController")]
    NeuralNetworkGhost {
        #[serde(rename = "moveSelection")]
        move_selection: MoveSelection,
        iterations: u32,
        #[serde(rename = "usePretrainedWeights")]
        use_pretrained_weights: bool,
    },
}

/// Controllers constructed without arguments.
const SIMPLE_CONTROLLERS: [Controller; 9] = [
    Controller::RandomPacMan,
    Controller::RandomNonRevPacMan,
    Controller::NearestPillPacMan,
    Controller::StarterPacMan,
    Controller::Legacy,
    Controller::Legacy2TheReckoning,
    Controller::RandomGhosts,
    Controller::AggressiveGhosts,
    Controller::StarterGhosts,
];

impl Controller {
    /// Constructor name used in scripts.
    pub fn script_name(&self) -> &'static str {
        match self {
            Controller::RandomPacMan => "RandomPacMan",
            Controller::RandomNonRevPacMan => "RandomNonRevPacMan",
            Controller::NearestPillPacMan => "NearestPillPacMan",
            Controller::StarterPacMan => "StarterPacMan",
            Controller::Legacy => "Legacy",
            Controller::Legacy2TheReckoning => "Legacy2TheReckoning",
            Controller::RandomGhosts => "RandomGhosts",
            Controller::AggressiveGhosts => "AggressiveGhosts",
            Controller::StarterGhosts => "StarterGhosts",
            Controller::NeuralNetworkGhost { .. } => "NeuralNetworkGhostController",
        }
    }

    pub fn side(&self) -> Side {
        match self {
            Controller::RandomPacMan
            | Controller::RandomNonRevPacMan
            | Controller::NearestPillPacMan
            | Controller::StarterPacMan => Side::PacMan,
            _ => Side::Ghosts,
        }
    }

    /// Whether the controller updates itself during a run.
    pub fn is_learning(&self) -> bool {
        matches!(self, Controller::NeuralNetworkGhost { .. })
    }

    /// Look up a zero-argument controller by constructor name.
    pub fn simple_from_script_name(name: &str) -> Option<Self> {
        SIMPLE_CONTROLLERS
            .into_iter()
            .find(|c| c.script_name() == name)
    }
}

impl fmt::Display for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Controller::NeuralNetworkGhost {
                move_selection,
                iterations,
                use_pretrained_weights,
            } => write!(
                f,
                "new {}({}, {}, {})",
                self.script_name(),
                move_selection,
                iterations,
                use_pretrained_weights
            ),
            _ => write!(f, "new {}()", self.script_name()),
        }
    }
}
