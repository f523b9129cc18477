//! Scenario inspection and neural ghost training.
//!
//! Loads scenario scripts, checks them in bulk, and trains or evaluates
//! the neural ghost controller a scenario names against a CSV decision log.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ghostlab_net::{
    misclassification_rate, ControllerOptions, NeuralGhostController, NeuralNetwork,
    TrainingData, TrainingReport,
};
use ghostlab_scenario::{load_path, Controller, Scenario, ScenarioError};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Ghost Lab scenario and controller tool.
#[derive(Parser)]
#[command(name = "ghostlab")]
#[command(about = "Inspect simulation scenarios and train neural ghost controllers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a loaded scenario.
    Show {
        /// Scenario script or JSON file.
        script: PathBuf,

        /// Print the config as JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },

    /// Load every script and report which ones fail.
    Check {
        /// Scenario scripts or JSON files.
        #[arg(required = true)]
        scripts: Vec<PathBuf>,
    },

    /// Train a scenario's neural ghost controller on a decision log.
    Train {
        /// Scenario whose ghost model is a NeuralNetworkGhostController.
        #[arg(short, long)]
        scenario: PathBuf,

        /// CSV decision log (14 feature columns, 4 direction columns).
        #[arg(short, long)]
        log: PathBuf,

        /// Where to write the trained weights.
        #[arg(short, long)]
        output: PathBuf,

        /// Pretrained weights, required if the controller asks for them.
        #[arg(short, long)]
        weights: Option<PathBuf>,

        /// Hidden layer width for a fresh network.
        #[arg(long, default_value = "10")]
        hidden: usize,

        /// Backpropagation learning rate.
        #[arg(long, default_value = "0.2")]
        learning_rate: f64,

        /// Weight initialization seed for a fresh network.
        #[arg(long, default_value = "1")]
        seed: u64,
    },

    /// Report how often saved weights disagree with a decision log.
    Evaluate {
        /// Trained weights.
        #[arg(short, long)]
        weights: PathBuf,

        /// CSV decision log.
        #[arg(short, long)]
        log: PathBuf,
    },
}

/// Human-readable scenario summary.
fn summary(scenario: &Scenario) -> String {
    let config = &scenario.config;
    let mut lines = vec![format!("Scenario: {}", scenario.name)];
    if let Some(description) = &scenario.description {
        lines.push(format!("Description: {}", description));
    }
    lines.push(format!(
        "Node expansion threshold: {}",
        config.node_expansion_threshold
    ));
    lines.push(format!(
        "Maximum simulation length: {}",
        config.maximum_simulation_length
    ));
    lines.push(match config.simulation_count {
        Some(count) => format!("Simulation count: {}", count),
        None => "Simulation count: (runner default)".to_string(),
    });
    lines.push(format!("Pac-Man model: {}", config.pac_man_model));
    lines.push(format!("Ghost model: {}", config.ghost_model));
    if config.tasks.is_empty() {
        lines.push("Tasks: none".to_string());
    } else {
        let tasks: Vec<String> = config.tasks.iter().map(ToString::to_string).collect();
        lines.push(format!("Tasks: {}", tasks.join(", ")));
    }
    lines.push(format!("Selection policy: {}", config.selection_policy));
    lines.push(format!("Opponent: {}", config.opponent));
    lines.join("\n")
}

fn cmd_show(script: &Path, json: bool) -> Result<()> {
    let scenario =
        load_path(script).with_context(|| format!("Failed to load scenario {:?}", script))?;
    if json {
        println!("{}", scenario.config.to_json()?);
    } else {
        println!("{}", summary(&scenario));
    }
    Ok(())
}

/// Load every script in parallel, keeping input order.
fn check_all(scripts: &[PathBuf]) -> Vec<(&Path, Result<Scenario, ScenarioError>)> {
    scripts
        .par_iter()
        .map(|path| (path.as_path(), load_path(path)))
        .collect()
}

fn cmd_check(scripts: &[PathBuf]) -> Result<()> {
    let start = Instant::now();
    let results = check_all(scripts);

    let mut failures = 0;
    for (path, result) in &results {
        match result {
            Ok(scenario) => println!("ok    {} ({})", path.display(), scenario.config.ghost_model),
            Err(e) => {
                failures += 1;
                println!("FAIL  {}: {}", path.display(), e);
            }
        }
    }

    println!(
        "\nChecked {} scenarios in {:.2}s: {} ok, {} failed",
        results.len(),
        start.elapsed().as_secs_f64(),
        results.len() - failures,
        failures
    );

    if failures > 0 {
        bail!("{} of {} scenarios failed to load", failures, results.len());
    }
    Ok(())
}

fn train(
    scenario: &Path,
    log: &Path,
    output: &Path,
    options: ControllerOptions,
    learning_rate: f64,
) -> Result<TrainingReport> {
    let scenario =
        load_path(scenario).with_context(|| format!("Failed to load scenario {:?}", scenario))?;
    let ghost_model = scenario.config.ghost_model;
    if !matches!(ghost_model, Controller::NeuralNetworkGhost { .. }) {
        bail!(
            "scenario {} uses {} for ghosts, not a NeuralNetworkGhostController",
            scenario.name,
            ghost_model
        );
    }

    let mut controller = NeuralGhostController::from_controller(&ghost_model, &options)
        .context("Failed to build ghost controller")?;
    let data = TrainingData::from_csv_path(log)
        .with_context(|| format!("Failed to read training log {:?}", log))?;
    info!(rows = data.len(), iterations = controller.iterations(), "training ghost controller");

    let report = controller
        .learn(&data, learning_rate)
        .context("Training failed")?;
    controller
        .save(output)
        .with_context(|| format!("Failed to write weights to {:?}", output))?;
    Ok(report)
}

fn evaluate(weights: &Path, log: &Path) -> Result<f64> {
    let network = NeuralNetwork::load(weights)
        .with_context(|| format!("Failed to load weights {:?}", weights))?;
    let data = TrainingData::from_csv_path(log)
        .with_context(|| format!("Failed to read training log {:?}", log))?;
    let predictions = network.predict_batch(&data.x)?;
    Ok(misclassification_rate(&data.y, &predictions)?)
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ghostlab=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Show { script, json } => cmd_show(&script, json),

        Commands::Check { scripts } => cmd_check(&scripts),

        Commands::Train {
            scenario,
            log,
            output,
            weights,
            hidden,
            learning_rate,
            seed,
        } => {
            let start = Instant::now();
            let options = ControllerOptions {
                hidden,
                seed,
                pretrained_weights: weights,
            };
            let report = train(&scenario, &log, &output, options, learning_rate)?;

            println!("Completed in {:.2}s", start.elapsed().as_secs_f64());
            println!("Iterations run: {}", report.iterations_run);
            match report.final_error {
                Some(error) => println!("Final squared error: {:.6}", error),
                None => println!("Final squared error: n/a"),
            }
            println!("Converged early: {}", report.converged);
            println!("Weights saved to: {:?}", output);
            Ok(())
        }

        Commands::Evaluate { weights, log } => {
            let rate = evaluate(&weights, &log)?;
            println!("Misclassification rate: {:.1}%", rate * 100.0);
            Ok(())
        }
    }
}
