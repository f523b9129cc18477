//! Ghost Lab domain types with enforced invariants.
//!
//! - Move: a maze move, with the four directions indexed 0..4
//! - Ghost: one of the four ghosts
//! - MoveDistribution: non-negative, finite scores over the four directions

use crate::{GhostLabError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A move in the maze.
///
/// `Neutral` means "keep doing whatever you were doing" and is never
/// a scored direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
    Neutral,
}

impl Move {
    /// The four scored directions, in feature/network order.
    pub const DIRECTIONS: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    /// Index of this move in [`Move::DIRECTIONS`], `None` for `Neutral`.
    pub fn direction_index(self) -> Option<usize> {
        match self {
            Move::Up => Some(0),
            Move::Down => Some(1),
            Move::Left => Some(2),
            Move::Right => Some(3),
            Move::Neutral => None,
        }
    }

    /// The move pointing the other way.
    pub fn opposite(self) -> Move {
        match self {
            Move::Up => Move::Down,
            Move::Down => Move::Up,
            Move::Left => Move::Right,
            Move::Right => Move::Left,
            Move::Neutral => Move::Neutral,
        }
    }

    /// One-hot encoding over the four directions. `Neutral` is all zeros.
    pub fn one_hot(self) -> [f64; 4] {
        let mut encoded = [0.0; 4];
        if let Some(i) = self.direction_index() {
            encoded[i] = 1.0;
        }
        encoded
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Move::Up => "UP",
            Move::Down => "DOWN",
            Move::Left => "LEFT",
            Move::Right => "RIGHT",
            Move::Neutral => "NEUTRAL",
        };
        f.write_str(name)
    }
}

impl FromStr for Move {
    type Err = GhostLabError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "UP" => Ok(Move::Up),
            "DOWN" => Ok(Move::Down),
            "LEFT" => Ok(Move::Left),
            "RIGHT" => Ok(Move::Right),
            "NEUTRAL" => Ok(Move::Neutral),
            _ => Err(GhostLabError::UnknownMove(s.to_string())),
        }
    }
}

/// One of the four ghosts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ghost {
    Blinky,
    Pinky,
    Inky,
    Sue,
}

impl fmt::Display for Ghost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Ghost::Blinky => "BLINKY",
            Ghost::Pinky => "PINKY",
            Ghost::Inky => "INKY",
            Ghost::Sue => "SUE",
        };
        f.write_str(name)
    }
}

impl FromStr for Ghost {
    type Err = GhostLabError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "BLINKY" => Ok(Ghost::Blinky),
            "PINKY" => Ok(Ghost::Pinky),
            "INKY" => Ok(Ghost::Inky),
            "SUE" => Ok(Ghost::Sue),
            _ => Err(GhostLabError::UnknownGhost(s.to_string())),
        }
    }
}

/// Scores over the four directional moves.
///
/// Invariant: exactly four entries, all finite and non-negative. Scores
/// need not sum to 1.0 (network outputs are independent sigmoids).
/// Deserialization goes through the same checks as [`MoveDistribution::new`].
///
/// # Example
/// ```
/// use ghostlab_core::{Move, MoveDistribution};
///
/// let scores = MoveDistribution::new(&[0.1, 0.7, 0.1, 0.1]).unwrap();
/// assert_eq!(scores.best_of(&Move::DIRECTIONS), Some(Move::Down));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 4]")]
pub struct MoveDistribution([f64; 4]);

impl MoveDistribution {
    /// Create a distribution from raw scores in direction order.
    ///
    /// # Errors
    /// Returns `GhostLabError::InvalidDistribution` if:
    /// - There are not exactly four scores
    /// - Any score is negative or not finite
    pub fn new(scores: &[f64]) -> Result<Self> {
        let scores: [f64; 4] = scores.try_into().map_err(|_| {
            GhostLabError::InvalidDistribution(format!(
                "expected 4 scores, got {}",
                scores.len()
            ))
        })?;

        if scores.iter().any(|s| !s.is_finite()) {
            return Err(GhostLabError::InvalidDistribution(
                "distribution contains non-finite scores".to_string(),
            ));
        }

        if scores.iter().any(|&s| s < 0.0) {
            return Err(GhostLabError::InvalidDistribution(
                "distribution contains negative scores".to_string(),
            ));
        }

        Ok(Self(scores))
    }

    /// Equal weight on every direction.
    pub fn uniform() -> Self {
        Self([0.25; 4])
    }

    /// Score for a move; `Neutral` always scores zero.
    pub fn get(&self, mv: Move) -> f64 {
        mv.direction_index().map(|i| self.0[i]).unwrap_or(0.0)
    }

    /// Highest-scoring move among `candidates`, first one wins ties.
    pub fn best_of(&self, candidates: &[Move]) -> Option<Move> {
        let mut best: Option<(Move, f64)> = None;
        for &mv in candidates {
            let score = self.get(mv);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((mv, score)),
            }
        }
        best.map(|(mv, _)| mv)
    }

    /// Get a reference to the underlying scores.
    pub fn as_array(&self) -> &[f64; 4] {
        &self.0
    }
}

impl TryFrom<[f64; 4]> for MoveDistribution {
    type Error = GhostLabError;

    fn try_from(scores: [f64; 4]) -> Result<Self> {
        Self::new(&scores)
    }
}

impl Default for MoveDistribution {
    fn default() -> Self {
        Self::uniform()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_index_round_trip() {
        for (i, mv) in Move::DIRECTIONS.iter().enumerate() {
            assert_eq!(mv.direction_index(), Some(i));
        }
        assert_eq!(Move::Neutral.direction_index(), None);
    }

    #[test]
    fn test_one_hot() {
        assert_eq!(Move::Left.one_hot(), [0.0, 0.0, 1.0, 0.0]);
        assert_eq!(Move::Neutral.one_hot(), [0.0; 4]);
    }

    #[test]
    fn test_opposite() {
        assert_eq!(Move::Up.opposite(), Move::Down);
        assert_eq!(Move::Right.opposite(), Move::Left);
        assert_eq!(Move::Neutral.opposite(), Move::Neutral);
    }

    #[test]
    fn test_move_parse() {
        assert_eq!("up".parse::<Move>().unwrap(), Move::Up);
        assert_eq!("RIGHT".parse::<Move>().unwrap(), Move::Right);
        assert!("sideways".parse::<Move>().is_err());
    }

    #[test]
    fn test_ghost_parse_and_display() {
        for ghost in [Ghost::Blinky, Ghost::Pinky, Ghost::Inky, Ghost::Sue] {
            assert_eq!(ghost.to_string().parse::<Ghost>().unwrap(), ghost);
        }
        assert_eq!(
            "clyde".parse::<Ghost>(),
            Err(GhostLabError::UnknownGhost("clyde".to_string()))
        );
    }

    #[test]
    fn test_distribution_new_valid() {
        let dist = MoveDistribution::new(&[0.2, 0.5, 0.0, 0.9]).unwrap();
        assert!((dist.get(Move::Right) - 0.9).abs() < 1e-12);
        assert_eq!(dist.get(Move::Neutral), 0.0);
    }

    #[test]
    fn test_distribution_wrong_length() {
        assert!(MoveDistribution::new(&[0.5, 0.5]).is_err());
    }

    #[test]
    fn test_distribution_negative() {
        assert!(MoveDistribution::new(&[0.5, -0.1, 0.3, 0.3]).is_err());
    }

    #[test]
    fn test_distribution_non_finite() {
        assert!(MoveDistribution::new(&[f64::NAN, 0.1, 0.3, 0.3]).is_err());
        assert!(MoveDistribution::new(&[f64::INFINITY, 0.1, 0.3, 0.3]).is_err());
    }

    #[test]
    fn test_distribution_deserialize_checks_scores() {
        let dist: MoveDistribution = serde_json::from_str("[0.1, 0.2, 0.3, 0.4]").unwrap();
        assert_eq!(dist.as_array(), &[0.1, 0.2, 0.3, 0.4]);
        assert_eq!(serde_json::to_string(&dist).unwrap(), "[0.1,0.2,0.3,0.4]");

        assert!(serde_json::from_str::<MoveDistribution>("[0.1, -0.2, 0.3, 0.4]").is_err());
        assert!(serde_json::from_str::<MoveDistribution>("[0.1, 0.2]").is_err());
    }

    #[test]
    fn test_best_of_respects_candidates() {
        let dist = MoveDistribution::new(&[0.9, 0.1, 0.4, 0.2]).unwrap();
        assert_eq!(dist.best_of(&Move::DIRECTIONS), Some(Move::Up));
        assert_eq!(dist.best_of(&[Move::Left, Move::Right]), Some(Move::Left));
        assert_eq!(dist.best_of(&[]), None);
    }

    #[test]
    fn test_best_of_tie_keeps_first() {
        let dist = MoveDistribution::uniform();
        assert_eq!(dist.best_of(&[Move::Right, Move::Up]), Some(Move::Right));
    }
}
