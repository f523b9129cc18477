//! Three-layer feedforward network trained by backpropagation.
//!
//! Layout: input layer, one sigmoid hidden layer, sigmoid output layer.
//! Each weight matrix carries its bias in column 0, so `theta1` is
//! `hidden x (inputs + 1)` and `theta2` is `outputs x (hidden + 1)`.
//!
//! Training is per-example gradient descent on squared error:
//!
//! ```text
//! d3 = (t - a3) * a3 * (1 - a3)
//! d2 = (theta2[:, 1..]^T d3) * a2 * (1 - a2)
//! theta += rate * d * [1; a]^T
//! ```

use crate::error::{NetError, Result};
use ndarray::{s, Array1, Array2, ArrayView1, Axis};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::{debug, info};

/// Training stops early once the squared error of the last example falls
/// below this.
pub const MIN_SQUARED_ERROR: f64 = 1e-5;

/// Number of convergence checks spread over a training run.
const CONVERGENCE_CHECKS: usize = 5;

/// Outcome of a training run.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingReport {
    /// Full passes over the data actually performed.
    pub iterations_run: usize,

    /// Squared error of the last example at the last check.
    /// `None` if no iteration ran.
    pub final_error: Option<f64>,

    /// Whether training stopped early below [`MIN_SQUARED_ERROR`].
    pub converged: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NeuralNetwork {
    theta1: Array2<f64>,
    theta2: Array2<f64>,
}

fn sigmoid(a: f64) -> f64 {
    1.0 / (1.0 + (-a).exp())
}

/// sigmoid(theta * [1; activations])
fn layer(theta: &Array2<f64>, activations: ArrayView1<f64>) -> Array1<f64> {
    let mut z = theta.slice(s![.., 1..]).dot(&activations);
    z += &theta.column(0);
    z.mapv_inplace(sigmoid);
    z
}

/// theta += rate * delta * [1; activations]^T
fn update_weights(theta: &mut Array2<f64>, delta: &Array1<f64>, activations: ArrayView1<f64>, rate: f64) {
    theta.column_mut(0).scaled_add(rate, delta);
    let outer = delta
        .view()
        .insert_axis(Axis(1))
        .dot(&activations.insert_axis(Axis(0)));
    theta.slice_mut(s![.., 1..]).scaled_add(rate, &outer);
}

fn check_dim(what: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(NetError::DimensionMismatch {
            what,
            expected,
            found,
        });
    }
    Ok(())
}

impl NeuralNetwork {
    /// Create a network with weights drawn uniformly from [0, 1).
    ///
    /// The same `seed` always yields the same initial weights.
    pub fn new(inputs: usize, hidden: usize, outputs: usize, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let theta1 = Array2::from_shape_fn((hidden, inputs + 1), |_| rng.gen::<f64>());
        let theta2 = Array2::from_shape_fn((outputs, hidden + 1), |_| rng.gen::<f64>());
        Self { theta1, theta2 }
    }

    pub fn inputs(&self) -> usize {
        self.theta1.ncols() - 1
    }

    pub fn hidden(&self) -> usize {
        self.theta1.nrows()
    }

    pub fn outputs(&self) -> usize {
        self.theta2.nrows()
    }

    /// Train on `x` (one example per row) against targets `y`.
    ///
    /// # Errors
    /// Returns `EmptyDataset` for zero rows and `DimensionMismatch` if the
    /// column counts do not match the network or the row counts differ.
    pub fn train(
        &mut self,
        x: &Array2<f64>,
        y: &Array2<f64>,
        learning_rate: f64,
        iterations: usize,
    ) -> Result<TrainingReport> {
        if x.nrows() == 0 {
            return Err(NetError::EmptyDataset);
        }
        check_dim("training inputs", self.inputs(), x.ncols())?;
        check_dim("training targets", self.outputs(), y.ncols())?;
        check_dim("training rows", x.nrows(), y.nrows())?;

        let check_every = (iterations / CONVERGENCE_CHECKS).max(1);
        let mut final_error = None;

        for i in 0..iterations {
            let mut last_error = 0.0;

            for (input, target) in x.rows().into_iter().zip(y.rows()) {
                let a2 = layer(&self.theta1, input);
                let a3 = layer(&self.theta2, a2.view());

                let d3 = (&target - &a3) * &a3 * a3.mapv(|a| 1.0 - a);
                let d2 = self.theta2.slice(s![.., 1..]).t().dot(&d3) * &a2 * a2.mapv(|a| 1.0 - a);

                update_weights(&mut self.theta1, &d2, input, learning_rate);
                update_weights(&mut self.theta2, &d3, a2.view(), learning_rate);

                last_error = (&target - &a3).mapv(|e| e * e).sum();
            }

            if i % check_every == 0 {
                final_error = Some(last_error);
                debug!(iteration = i, error = last_error, "training checkpoint");

                if last_error < MIN_SQUARED_ERROR {
                    info!(iterations = i + 1, error = last_error, "training converged");
                    return Ok(TrainingReport {
                        iterations_run: i + 1,
                        final_error,
                        converged: true,
                    });
                }
            }
        }

        info!(iterations, error = ?final_error, "training finished");
        Ok(TrainingReport {
            iterations_run: iterations,
            final_error,
            converged: false,
        })
    }

    /// Output activations for a single input.
    pub fn predict(&self, input: &[f64]) -> Result<Vec<f64>> {
        check_dim("prediction input", self.inputs(), input.len())?;
        let a2 = layer(&self.theta1, ArrayView1::from(input));
        Ok(layer(&self.theta2, a2.view()).to_vec())
    }

    /// Output activations for every row of `x`.
    pub fn predict_batch(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        check_dim("prediction input", self.inputs(), x.ncols())?;
        let mut out = Array2::zeros((x.nrows(), self.outputs()));
        for (input, mut row) in x.rows().into_iter().zip(out.rows_mut()) {
            let a2 = layer(&self.theta1, input);
            row.assign(&layer(&self.theta2, a2.view()));
        }
        Ok(out)
    }

    /// Write the weights as MessagePack.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        rmp_serde::encode::write_named(&mut writer, self)?;
        Ok(())
    }

    /// Read weights written by [`NeuralNetwork::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let network: Self = rmp_serde::from_read(BufReader::new(file))?;
        if network.theta1.ncols() == 0 {
            return Err(NetError::DimensionMismatch {
                what: "hidden layer weights",
                expected: 1,
                found: 0,
            });
        }
        check_dim("output layer weights", network.hidden() + 1, network.theta2.ncols())?;
        Ok(network)
    }
}

fn argmax(row: ArrayView1<f64>) -> usize {
    row.iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Fraction of rows whose highest prediction is not the highest target.
pub fn misclassification_rate(targets: &Array2<f64>, predictions: &Array2<f64>) -> Result<f64> {
    if targets.nrows() == 0 {
        return Err(NetError::EmptyDataset);
    }
    check_dim("prediction rows", targets.nrows(), predictions.nrows())?;
    check_dim("prediction columns", targets.ncols(), predictions.ncols())?;

    let wrong = targets
        .rows()
        .into_iter()
        .zip(predictions.rows())
        .filter(|(t, p)| argmax(*t) != argmax(*p))
        .count();
    Ok(wrong as f64 / targets.nrows() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_shapes() {
        let net = NeuralNetwork::new(14, 10, 4, 1);
        assert_eq!(net.inputs(), 14);
        assert_eq!(net.hidden(), 10);
        assert_eq!(net.outputs(), 4);
    }

    #[test]
    fn test_same_seed_same_weights() {
        assert_eq!(NeuralNetwork::new(3, 4, 2, 7), NeuralNetwork::new(3, 4, 2, 7));
        assert_ne!(NeuralNetwork::new(3, 4, 2, 7), NeuralNetwork::new(3, 4, 2, 8));
    }

    #[test]
    fn test_predict_range() {
        let net = NeuralNetwork::new(3, 4, 2, 1);
        let out = net.predict(&[0.1, -0.5, 0.9]).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|&v| v > 0.0 && v < 1.0));
    }

    #[test]
    fn test_predict_wrong_width() {
        let net = NeuralNetwork::new(3, 4, 2, 1);
        assert!(matches!(
            net.predict(&[0.1]),
            Err(NetError::DimensionMismatch { expected: 3, found: 1, .. })
        ));
    }

    #[test]
    fn test_predict_batch_matches_predict() {
        let net = NeuralNetwork::new(2, 3, 2, 5);
        let x = array![[0.0, 1.0], [1.0, 0.0], [0.5, 0.5]];
        let batch = net.predict_batch(&x).unwrap();
        for (i, row) in x.rows().into_iter().enumerate() {
            let single = net.predict(row.as_slice().unwrap()).unwrap();
            for (a, b) in single.iter().zip(batch.row(i)) {
                assert!((a - b).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_training_reduces_error() {
        // Output copies the first input; the second input is noise.
        let x = array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
        let y = array![[1.0, 0.0], [1.0, 0.0], [0.0, 1.0], [0.0, 1.0]];

        let mut net = NeuralNetwork::new(2, 4, 2, 3);
        let before = misclassification_rate(&y, &net.predict_batch(&x).unwrap()).unwrap();
        let error_before: f64 = (&y - &net.predict_batch(&x).unwrap()).mapv(|e| e * e).sum();

        let report = net.train(&x, &y, 0.5, 2000).unwrap();
        let error_after: f64 = (&y - &net.predict_batch(&x).unwrap()).mapv(|e| e * e).sum();
        let after = misclassification_rate(&y, &net.predict_batch(&x).unwrap()).unwrap();

        assert!(report.iterations_run > 0);
        assert!(error_after < error_before);
        assert!(after <= before);
        assert_eq!(after, 0.0);
    }

    #[test]
    fn test_zero_iterations() {
        let x = array![[0.0, 1.0]];
        let y = array![[1.0]];
        let mut net = NeuralNetwork::new(2, 2, 1, 1);
        let report = net.train(&x, &y, 0.2, 0).unwrap();
        assert_eq!(report.iterations_run, 0);
        assert_eq!(report.final_error, None);
        assert!(!report.converged);
    }

    #[test]
    fn test_train_rejects_bad_shapes() {
        let mut net = NeuralNetwork::new(2, 2, 1, 1);
        let x = Array2::<f64>::zeros((0, 2));
        let y = Array2::<f64>::zeros((0, 1));
        assert!(matches!(net.train(&x, &y, 0.2, 10), Err(NetError::EmptyDataset)));

        let x = array![[0.0, 1.0, 2.0]];
        let y = array![[1.0]];
        assert!(net.train(&x, &y, 0.2, 10).is_err());

        let x = array![[0.0, 1.0], [1.0, 1.0]];
        let y = array![[1.0]];
        assert!(net.train(&x, &y, 0.2, 10).is_err());
    }

    #[test]
    fn test_converges_on_trivial_target() {
        // Targets at the sigmoid's midpoint are reachable almost exactly.
        let x = array![[0.0]];
        let y = array![[0.5]];
        let mut net = NeuralNetwork::new(1, 1, 1, 1);
        let report = net.train(&x, &y, 1.0, 10_000).unwrap();
        assert!(report.converged);
        assert!(report.iterations_run < 10_000);
        assert!(report.final_error.unwrap() < MIN_SQUARED_ERROR);
    }

    #[test]
    fn test_misclassification_rate() {
        let targets = array![[1.0, 0.0], [0.0, 1.0], [0.0, 1.0], [1.0, 0.0]];
        let predictions = array![[0.9, 0.1], [0.2, 0.8], [0.7, 0.3], [0.6, 0.4]];
        let rate = misclassification_rate(&targets, &predictions).unwrap();
        assert!((rate - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weights.msgpack");
        let net = NeuralNetwork::new(3, 5, 2, 11);
        net.save(&path).unwrap();

        let loaded = NeuralNetwork::load(&path).unwrap();
        assert_eq!(loaded, net);
        assert_eq!(
            loaded.predict(&[0.2, 0.4, 0.6]).unwrap(),
            net.predict(&[0.2, 0.4, 0.6]).unwrap()
        );
    }

    #[test]
    fn test_load_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weights.msgpack");
        std::fs::write(&path, b"not msgpack").unwrap();
        assert!(NeuralNetwork::load(&path).is_err());
    }
}
