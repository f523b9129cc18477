//! Move selection over scored directions.
//!
//! The `MoveSelector` trait lets the ghost controller swap strategies:
//! - `RouletteSelector`: weighted-random choice proportional to scores
//! - `GreedySelector`: highest score wins

use crate::error::{NetError, Result};
use ghostlab_core::{Move, MoveDistribution};
use ghostlab_scenario::MoveSelection;
use rand::{Rng, RngCore};

/// Picks one of the `legal` moves given network scores.
pub trait MoveSelector {
    /// # Errors
    /// Returns `NetError::NoLegalMoves` if `legal` is empty.
    fn select(&self, scores: &MoveDistribution, legal: &[Move], rng: &mut dyn RngCore)
        -> Result<Move>;
}

/// Roulette-wheel selection.
///
/// Each legal move gets a slice of the wheel proportional to its score.
/// Zero-score moves are never picked unless every legal move scores zero,
/// in which case the choice is uniform.
#[derive(Clone, Copy, Debug, Default)]
pub struct RouletteSelector;

impl MoveSelector for RouletteSelector {
    fn select(
        &self,
        scores: &MoveDistribution,
        legal: &[Move],
        rng: &mut dyn RngCore,
    ) -> Result<Move> {
        if legal.is_empty() {
            return Err(NetError::NoLegalMoves);
        }

        let weights: Vec<f64> = legal.iter().map(|&mv| scores.get(mv)).collect();
        let sum: f64 = weights.iter().sum();
        if sum <= 0.0 {
            return Ok(legal[rng.gen_range(0..legal.len())]);
        }

        let threshold = rng.gen::<f64>() * sum;
        let mut cumulative = 0.0;
        for (&mv, &weight) in legal.iter().zip(&weights) {
            cumulative += weight;
            if cumulative > threshold {
                return Ok(mv);
            }
        }

        // Rounding can leave the threshold just past the last slice.
        legal
            .iter()
            .zip(&weights)
            .rev()
            .find(|(_, w)| **w > 0.0)
            .map(|(&mv, _)| mv)
            .ok_or(NetError::NoLegalMoves)
    }
}

/// Always the highest-scoring legal move.
#[derive(Clone, Copy, Debug, Default)]
pub struct GreedySelector;

impl MoveSelector for GreedySelector {
    fn select(
        &self,
        scores: &MoveDistribution,
        legal: &[Move],
        _rng: &mut dyn RngCore,
    ) -> Result<Move> {
        scores.best_of(legal).ok_or(NetError::NoLegalMoves)
    }
}

/// Selector for a scenario's move-selection strategy.
pub fn selector_for(strategy: MoveSelection) -> Box<dyn MoveSelector + Send + Sync> {
    match strategy {
        MoveSelection::Roulette => Box::new(RouletteSelector),
        MoveSelection::Greedy => Box::new(GreedySelector),
    }
}
