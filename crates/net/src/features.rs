//! Ghost observation snapshots and their network encoding.

use ghostlab_core::{Ghost, Move};
use serde::{Deserialize, Serialize};

/// Width of [`GhostObservation::features`].
pub const FEATURE_COUNT: usize = 14;

/// Width of [`GhostObservation::direction`].
pub const DIRECTION_COUNT: usize = 4;

/// What one ghost sees at one tick, as reported by the game.
///
/// `avoid_pacman` and `chase_pacman` are the moves that lead away from
/// and towards Pac-Man (Manhattan distance, no reversal), and
/// `distance_to_pacman` is measured the same way.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GhostObservation {
    pub ghost: Ghost,
    pub requires_action: bool,
    pub level_time: u32,
    pub edible_score: u32,
    pub active_power_pills: u32,
    pub pacman_lives: u32,
    pub edible_time: u32,
    pub avoid_pacman: Move,
    pub chase_pacman: Move,
    pub distance_to_pacman: f64,
    pub last_move: Move,
}

impl GhostObservation {
    /// Network input, each entry scaled to roughly [-1, 1].
    ///
    /// Order: level time, edible score, power pills, lives, edible time,
    /// avoid move one-hot, chase move one-hot, distance.
    pub fn features(&self) -> [f64; FEATURE_COUNT] {
        // Edible scores double from 200; log2 of the multiplier fits in [0, 1].
        let multiplier = self.edible_score / 100;
        let edible_score = if multiplier == 0 {
            0.0
        } else {
            f64::from(multiplier).log2() / 5.0
        };

        let avoid = self.avoid_pacman.one_hot();
        let chase = self.chase_pacman.one_hot();

        [
            f64::from(self.level_time) / 4000.0,
            edible_score,
            f64::from(self.active_power_pills) / 4.0,
            f64::from(self.pacman_lives) / 4.0,
            f64::from(self.edible_time) / 200.0,
            avoid[0],
            avoid[1],
            avoid[2],
            avoid[3],
            chase[0],
            chase[1],
            chase[2],
            chase[3],
            self.distance_to_pacman / 100.0,
        ]
    }

    /// Training target: one-hot of the move the ghost actually made.
    pub fn direction(&self) -> [f64; DIRECTION_COUNT] {
        self.last_move.one_hot()
    }
}
