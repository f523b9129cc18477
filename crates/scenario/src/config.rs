//! Simulation configuration record.
//!
//! A `SimulationConfig` is built once per scenario load and handed to the
//! simulation runner by value. It is never mutated after validation.

use crate::controller::{Controller, SelectionPolicy, Side};
use crate::error::{Result, ScenarioError};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Parameters of one simulation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    /// Visit count at which a search-tree node is expanded.
    pub node_expansion_threshold: u32,

    /// Upper bound on steps simulated per rollout.
    pub maximum_simulation_length: u32,

    /// Rollouts per decision; `None` leaves the choice to the runner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulation_count: Option<u32>,

    /// Controller for the Pac-Man side.
    pub pac_man_model: Controller,

    /// Controller for the ghost side.
    pub ghost_model: Controller,

    /// Controllers actively managed or trained during the run.
    #[serde(default)]
    pub tasks: Vec<Controller>,

    /// Tree-search child selection rule.
    pub selection_policy: SelectionPolicy,

    /// Adversary controller.
    pub opponent: Controller,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            node_expansion_threshold: 10,
            maximum_simulation_length: 250,
            simulation_count: None,
            pac_man_model: Controller::RandomNonRevPacMan,
            ghost_model: Controller::Legacy,
            tasks: Vec::new(),
            selection_policy: SelectionPolicy::LevineUcb {
                exploration_constant: 4000.0,
            },
            opponent: Controller::Legacy,
        }
    }
}

impl SimulationConfig {
    /// Create a default config with a fixed rollout count.
    pub fn with_simulation_count(simulation_count: u32) -> Self {
        Self {
            simulation_count: Some(simulation_count),
            ..Default::default()
        }
    }

    /// Check every range and side constraint.
    ///
    /// # Errors
    /// Returns `ScenarioError::InvalidParameter` naming the first offending
    /// option.
    pub fn validate(&self) -> Result<()> {
        if self.node_expansion_threshold == 0 {
            return Err(ScenarioError::invalid(
                "nodeExpansionThreshold",
                "must be at least 1",
            ));
        }
        if self.maximum_simulation_length == 0 {
            return Err(ScenarioError::invalid(
                "maximumSimulationLength",
                "must be at least 1",
            ));
        }
        if self.simulation_count == Some(0) {
            return Err(ScenarioError::invalid(
                "simulationCount",
                "must be at least 1",
            ));
        }

        let c = self.selection_policy.exploration_constant();
        if !c.is_finite() || c < 0.0 {
            return Err(ScenarioError::invalid(
                "selectionPolicy",
                format!("exploration constant {} must be finite and non-negative", c),
            ));
        }

        check_controller("pacManModel", &self.pac_man_model, Side::PacMan)?;
        check_controller("ghostModel", &self.ghost_model, Side::Ghosts)?;
        check_controller("opponent", &self.opponent, Side::Ghosts)?;
        for task in &self.tasks {
            check_controller("tasks", task, Side::Ghosts)?;
        }

        Ok(())
    }

    /// Pretty JSON rendering, the same shape [`crate::load_path`] accepts.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Render as script statements that load back to an equal config.
    pub fn to_script(&self) -> String {
        let mut out = String::new();
        // Infallible: writing to a String.
        let _ = writeln!(out, "nodeExpansionThreshold = {};", self.node_expansion_threshold);
        let _ = writeln!(out, "maximumSimulationLength = {};", self.maximum_simulation_length);
        if let Some(count) = self.simulation_count {
            let _ = writeln!(out, "simulationCount = {};", count);
        }
        let _ = writeln!(out, "pacManModel = {};", self.pac_man_model);
        let _ = writeln!(out, "ghostModel = {};", self.ghost_model);
        if !self.tasks.is_empty() {
            let tasks: Vec<String> = self.tasks.iter().map(ToString::to_string).collect();
            let _ = writeln!(out, "tasks = [ {} ];", tasks.join(", "));
        }
        let _ = writeln!(out, "selectionPolicy = {};", self.selection_policy);
        let _ = writeln!(out, "opponent = {};", self.opponent);
        out
    }
}

fn check_controller(option: &str, controller: &Controller, side: Side) -> Result<()> {
    if controller.side() != side {
        return Err(ScenarioError::invalid(
            option,
            format!(
                "{} is a {} controller, expected a {} controller",
                controller.script_name(),
                controller.side(),
                side
            ),
        ));
    }

    if let Controller::NeuralNetworkGhost { iterations: 0, .. } = controller {
        return Err(ScenarioError::invalid(
            option,
            "NeuralNetworkGhostController iteration count must be at least 1",
        ));
    }

    Ok(())
}

/// A loaded scenario: its name, optional description and config.
#[derive(Clone, Debug, PartialEq)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    pub config: SimulationConfig,
}

impl Scenario {
    /// Render as a full script, description comment included.
    pub fn to_script(&self) -> String {
        match &self.description {
            Some(description) => format!("/*\n{}\n*/\n\n{}", description, self.config.to_script()),
            None => self.config.to_script(),
        }
    }
}
