//! CSV training logs.
//!
//! One row per decision: the [`FEATURE_COUNT`] feature columns followed
//! by the [`DIRECTION_COUNT`] one-hot direction columns. No header.

use crate::error::{NetError, Result};
use crate::features::{GhostObservation, DIRECTION_COUNT, FEATURE_COUNT};
use ndarray::Array2;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

/// Appends ghost decisions to a CSV log.
pub struct TrainingLog<W: Write> {
    writer: csv::Writer<W>,
    rows: usize,
}

impl TrainingLog<File> {
    /// Create (or truncate) a log file.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_writer(File::create(path.as_ref())?))
    }
}

impl<W: Write> TrainingLog<W> {
    pub fn from_writer(writer: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(writer),
            rows: 0,
        }
    }

    /// Log an observation if the ghost had a decision to make.
    ///
    /// Returns whether a row was written. Ghosts in a corridor have only
    /// one way to go, so those ticks carry no training signal.
    pub fn record(&mut self, observation: &GhostObservation) -> Result<bool> {
        if !observation.requires_action {
            return Ok(false);
        }

        let features = observation.features();
        let direction = observation.direction();
        self.writer.write_record(
            features
                .iter()
                .chain(direction.iter())
                .map(|v| v.to_string()),
        )?;
        self.rows += 1;
        Ok(true)
    }

    /// Rows written so far.
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and hand back the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| NetError::Io(e.into_error()))
    }
}

/// Inputs and targets, one example per row.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingData {
    pub x: Array2<f64>,
    pub y: Array2<f64>,
}

impl TrainingData {
    /// Build directly from observations, keeping the same decision ticks
    /// [`TrainingLog::record`] would write.
    pub fn from_observations(observations: &[GhostObservation]) -> Result<Self> {
        let observations: Vec<&GhostObservation> = observations
            .iter()
            .filter(|obs| obs.requires_action)
            .collect();
        if observations.is_empty() {
            return Err(NetError::EmptyDataset);
        }

        let n = observations.len();
        let mut x = Array2::zeros((n, FEATURE_COUNT));
        let mut y = Array2::zeros((n, DIRECTION_COUNT));
        for (i, obs) in observations.iter().enumerate() {
            for (j, v) in obs.features().into_iter().enumerate() {
                x[[i, j]] = v;
            }
            for (j, v) in obs.direction().into_iter().enumerate() {
                y[[i, j]] = v;
            }
        }
        Ok(Self { x, y })
    }

    /// Read a ghost log from disk.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_csv_reader(File::open(path.as_ref())?, DIRECTION_COUNT)
    }

    /// Read a headerless CSV; the last `outputs` columns are targets.
    ///
    /// # Errors
    /// Returns `EmptyDataset` if there are no rows and `DimensionMismatch`
    /// if a row is narrower than `outputs + 1` or differs in width from the
    /// first row.
    pub fn from_csv_reader(reader: impl Read, outputs: usize) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut values = Vec::new();
        let mut width = None;
        let mut rows = 0;

        for record in rdr.deserialize::<Vec<f64>>() {
            let row = record?;
            match width {
                None => {
                    if row.len() <= outputs {
                        return Err(NetError::DimensionMismatch {
                            what: "training log columns",
                            expected: outputs + 1,
                            found: row.len(),
                        });
                    }
                    width = Some(row.len());
                }
                Some(w) if w != row.len() => {
                    return Err(NetError::DimensionMismatch {
                        what: "training log columns",
                        expected: w,
                        found: row.len(),
                    });
                }
                Some(_) => {}
            }
            values.extend(row);
            rows += 1;
        }

        let Some(width) = width else {
            return Err(NetError::EmptyDataset);
        };

        let all = Array2::from_shape_vec((rows, width), values).map_err(|_| {
            NetError::DimensionMismatch {
                what: "training log shape",
                expected: rows * width,
                found: 0,
            }
        })?;
        let inputs = width - outputs;
        debug!(rows, inputs, outputs, "read training log");

        Ok(Self {
            x: all.slice(ndarray::s![.., ..inputs]).to_owned(),
            y: all.slice(ndarray::s![.., inputs..]).to_owned(),
        })
    }

    pub fn len(&self) -> usize {
        self.x.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.x.nrows() == 0
    }
}
