//! Neural network ghost controller.
//!
//! Built from a scenario's `NeuralNetworkGhostController` handle: the
//! handle picks the move-selection strategy, how many passes `learn`
//! makes over its data, and whether to start from saved weights.

use crate::dataset::TrainingData;
use crate::error::{NetError, Result};
use crate::features::{GhostObservation, DIRECTION_COUNT, FEATURE_COUNT};
use crate::network::{NeuralNetwork, TrainingReport};
use crate::selection::{selector_for, MoveSelector};
use ghostlab_core::{Move, MoveDistribution};
use ghostlab_scenario::{Controller, MoveSelection};
use rand::RngCore;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Construction options not carried by the scenario handle.
#[derive(Clone, Debug)]
pub struct ControllerOptions {
    /// Hidden layer width for a fresh network.
    pub hidden: usize,

    /// Weight initialization seed for a fresh network.
    pub seed: u64,

    /// Weights file, required when the handle asks for pretrained weights.
    pub pretrained_weights: Option<PathBuf>,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            hidden: 10,
            seed: 1,
            pretrained_weights: None,
        }
    }
}

pub struct NeuralGhostController {
    network: NeuralNetwork,
    strategy: MoveSelection,
    selector: Box<dyn MoveSelector + Send + Sync>,
    iterations: u32,
}

impl NeuralGhostController {
    /// Build the runtime controller for a scenario handle.
    ///
    /// # Errors
    /// - `NotNeural` if `controller` is not a `NeuralNetworkGhostController`
    /// - `MissingPretrainedWeights` if the handle asks for pretrained
    ///   weights and `options` has none
    /// - `DimensionMismatch` if the loaded weights do not fit ghost features
    pub fn from_controller(controller: &Controller, options: &ControllerOptions) -> Result<Self> {
        let Controller::NeuralNetworkGhost {
            move_selection,
            iterations,
            use_pretrained_weights,
        } = *controller
        else {
            return Err(NetError::NotNeural(controller.script_name()));
        };

        let network = if use_pretrained_weights {
            let path = options
                .pretrained_weights
                .as_deref()
                .ok_or(NetError::MissingPretrainedWeights)?;
            let network = NeuralNetwork::load(path)?;
            check_ghost_shape(&network)?;
            info!(path = %path.display(), hidden = network.hidden(), "loaded pretrained ghost weights");
            network
        } else {
            if let Some(path) = &options.pretrained_weights {
                warn!(path = %path.display(), "controller does not use pretrained weights; ignoring file");
            }
            NeuralNetwork::new(FEATURE_COUNT, options.hidden, DIRECTION_COUNT, options.seed)
        };

        Ok(Self {
            network,
            strategy: move_selection,
            selector: selector_for(move_selection),
            iterations,
        })
    }

    /// Network scores for each direction.
    pub fn scores(&self, observation: &GhostObservation) -> Result<MoveDistribution> {
        let output = self.network.predict(&observation.features())?;
        Ok(MoveDistribution::new(&output)?)
    }

    /// Pick a move for the observed ghost among `legal`.
    pub fn choose_move(
        &self,
        observation: &GhostObservation,
        legal: &[Move],
        rng: &mut dyn RngCore,
    ) -> Result<Move> {
        let scores = self.scores(observation)?;
        self.selector.select(&scores, legal, rng)
    }

    /// Train on logged decisions for the handle's iteration count.
    pub fn learn(&mut self, data: &TrainingData, learning_rate: f64) -> Result<TrainingReport> {
        self.network
            .train(&data.x, &data.y, learning_rate, self.iterations as usize)
    }

    pub fn network(&self) -> &NeuralNetwork {
        &self.network
    }

    pub fn strategy(&self) -> MoveSelection {
        self.strategy
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.network.save(path)
    }
}

fn check_ghost_shape(network: &NeuralNetwork) -> Result<()> {
    if network.inputs() != FEATURE_COUNT {
        return Err(NetError::DimensionMismatch {
            what: "pretrained network inputs",
            expected: FEATURE_COUNT,
            found: network.inputs(),
        });
    }
    if network.outputs() != DIRECTION_COUNT {
        return Err(NetError::DimensionMismatch {
            what: "pretrained network outputs",
            expected: DIRECTION_COUNT,
            found: network.outputs(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::tests::sample_observation;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn neural(strategy: MoveSelection, pretrained: bool) -> Controller {
        Controller::NeuralNetworkGhost {
            move_selection: strategy,
            iterations: 5,
            use_pretrained_weights: pretrained,
        }
    }

    #[test]
    fn test_not_neural() {
        let err = NeuralGhostController::from_controller(&Controller::Legacy, &ControllerOptions::default())
            .err()
            .unwrap();
        assert!(matches!(err, NetError::NotNeural("Legacy")));
    }

    #[test]
    fn test_fresh_controller() {
        let ctrl = NeuralGhostController::from_controller(
            &neural(MoveSelection::Roulette, false),
            &ControllerOptions::default(),
        )
        .unwrap();
        assert_eq!(ctrl.iterations(), 5);
        assert_eq!(ctrl.strategy(), MoveSelection::Roulette);
        assert_eq!(ctrl.network().inputs(), FEATURE_COUNT);
        assert_eq!(ctrl.network().hidden(), 10);
        assert_eq!(ctrl.network().outputs(), DIRECTION_COUNT);
    }

    #[test]
    fn test_pretrained_requires_file() {
        let result = NeuralGhostController::from_controller(
            &neural(MoveSelection::Roulette, true),
            &ControllerOptions::default(),
        );
        assert!(matches!(result, Err(NetError::MissingPretrainedWeights)));
    }

    #[test]
    fn test_pretrained_loads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ghost.msgpack");
        let saved = NeuralNetwork::new(FEATURE_COUNT, 6, DIRECTION_COUNT, 99);
        saved.save(&path).unwrap();

        let options = ControllerOptions {
            pretrained_weights: Some(path),
            ..Default::default()
        };
        let ctrl =
            NeuralGhostController::from_controller(&neural(MoveSelection::Greedy, true), &options)
                .unwrap();
        assert_eq!(ctrl.network(), &saved);
    }

    #[test]
    fn test_pretrained_shape_checked() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wrong.msgpack");
        NeuralNetwork::new(3, 6, DIRECTION_COUNT, 1).save(&path).unwrap();

        let options = ControllerOptions {
            pretrained_weights: Some(path),
            ..Default::default()
        };
        let result =
            NeuralGhostController::from_controller(&neural(MoveSelection::Greedy, true), &options);
        assert!(matches!(result, Err(NetError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_choose_move_is_legal() {
        let ctrl = NeuralGhostController::from_controller(
            &neural(MoveSelection::Roulette, false),
            &ControllerOptions::default(),
        )
        .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let legal = [Move::Up, Move::Left];
        for _ in 0..50 {
            let mv = ctrl
                .choose_move(&sample_observation(), &legal, &mut rng)
                .unwrap();
            assert!(legal.contains(&mv));
        }
    }

    #[test]
    fn test_greedy_follows_scores() {
        let ctrl = NeuralGhostController::from_controller(
            &neural(MoveSelection::Greedy, false),
            &ControllerOptions::default(),
        )
        .unwrap();
        let obs = sample_observation();
        let expected = ctrl.scores(&obs).unwrap().best_of(&Move::DIRECTIONS).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(
            ctrl.choose_move(&obs, &Move::DIRECTIONS, &mut rng).unwrap(),
            expected
        );
    }

    #[test]
    fn test_learn_runs_handle_iterations() {
        let mut ctrl = NeuralGhostController::from_controller(
            &neural(MoveSelection::Roulette, false),
            &ControllerOptions::default(),
        )
        .unwrap();
        let data = TrainingData::from_observations(&[sample_observation()]).unwrap();
        let report = ctrl.learn(&data, 0.2).unwrap();
        assert!(report.iterations_run <= 5);
        assert!(report.iterations_run >= 1);
    }
}
