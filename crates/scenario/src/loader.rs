//! Script evaluation and config assembly.
//!
//! Statements are evaluated in order into a binding table. Identifiers in
//! expressions resolve to earlier bindings, which is how `tasks = [ ghostModel ]`
//! shares the ghost controller. Once every statement is bound, the table
//! is converted into a validated [`SimulationConfig`].

use crate::ast::{Expr, ExprKind, Script, Span};
use crate::config::{Scenario, SimulationConfig};
use crate::controller::{Controller, MoveSelection, SelectionPolicy};
use crate::error::{Result, ScenarioError};
use crate::parser::parse;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Options a script may assign.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum OptionName {
    NodeExpansionThreshold,
    MaximumSimulationLength,
    SimulationCount,
    PacManModel,
    GhostModel,
    Tasks,
    SelectionPolicy,
    Opponent,
}

impl OptionName {
    const ALL: [OptionName; 8] = [
        OptionName::NodeExpansionThreshold,
        OptionName::MaximumSimulationLength,
        OptionName::SimulationCount,
        OptionName::PacManModel,
        OptionName::GhostModel,
        OptionName::Tasks,
        OptionName::SelectionPolicy,
        OptionName::Opponent,
    ];

    fn as_str(self) -> &'static str {
        match self {
            OptionName::NodeExpansionThreshold => "nodeExpansionThreshold",
            OptionName::MaximumSimulationLength => "maximumSimulationLength",
            OptionName::SimulationCount => "simulationCount",
            OptionName::PacManModel => "pacManModel",
            OptionName::GhostModel => "ghostModel",
            OptionName::Tasks => "tasks",
            OptionName::SelectionPolicy => "selectionPolicy",
            OptionName::Opponent => "opponent",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.as_str() == name)
    }
}

/// Runtime value of an evaluated expression.
#[derive(Clone, Debug, PartialEq)]
enum Value {
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
    Str(String),
    Controller(Controller),
    MoveSelection(MoveSelection),
    Policy(SelectionPolicy),
    List(Vec<(Value, Span)>),
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Float(_) => "number",
            Value::Bool(_) => "boolean",
            Value::Null => "null",
            Value::Str(_) => "string",
            Value::Controller(_) => "controller",
            Value::MoveSelection(_) => "move selection strategy",
            Value::Policy(_) => "selection policy",
            Value::List(_) => "array",
        }
    }
}

fn mismatch(expected: &'static str, value: &Value, span: Span) -> ScenarioError {
    ScenarioError::TypeMismatch {
        expected,
        found: value.type_name(),
        span,
    }
}

/// Evaluated bindings, keyed by option.
#[derive(Default)]
struct Bindings {
    values: HashMap<OptionName, (Value, Span)>,
}

impl Bindings {
    fn evaluate(&self, expr: &Expr) -> Result<Value> {
        match &expr.kind {
            ExprKind::Integer(n) => Ok(Value::Integer(*n)),
            ExprKind::Float(x) => Ok(Value::Float(*x)),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Null => Ok(Value::Null),
            ExprKind::Str(s) => Ok(Value::Str(s.clone())),
            ExprKind::Ident(name) => OptionName::parse(name)
                .and_then(|option| self.values.get(&option))
                .map(|(value, _)| value.clone())
                .ok_or_else(|| ScenarioError::UndefinedReference {
                    name: name.clone(),
                    span: expr.span,
                }),
            ExprKind::Array(items) => items
                .iter()
                .map(|item| Ok((self.evaluate(item)?, item.span)))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
            ExprKind::New { constructor, args } => {
                let args = args
                    .iter()
                    .map(|arg| Ok((self.evaluate(arg)?, arg.span)))
                    .collect::<Result<Vec<_>>>()?;
                construct(constructor, args, expr.span)
            }
        }
    }

    fn bind(&mut self, name: &str, name_span: Span, expr: &Expr) -> Result<()> {
        let option = OptionName::parse(name).ok_or_else(|| ScenarioError::UnknownOption {
            name: name.to_string(),
            span: name_span,
        })?;

        if self.values.contains_key(&option) {
            return Err(ScenarioError::DuplicateOption {
                name: name.to_string(),
                span: name_span,
            });
        }

        let value = self.evaluate(expr)?;
        debug!(option = name, value = ?value, "bound scenario option");
        self.values.insert(option, (value, expr.span));
        Ok(())
    }

    fn take(&mut self, option: OptionName) -> Option<(Value, Span)> {
        self.values.remove(&option)
    }

    fn require(&mut self, option: OptionName) -> Result<(Value, Span)> {
        self.take(option)
            .ok_or(ScenarioError::MissingOption(option.as_str()))
    }
}

fn check_arity(constructor: &str, args: &[(Value, Span)], expected: usize, span: Span) -> Result<()> {
    if args.len() != expected {
        return Err(ScenarioError::Arity {
            constructor: constructor.to_string(),
            expected,
            found: args.len(),
            span,
        });
    }
    Ok(())
}

/// Resolve a `new Constructor(args)` expression.
fn construct(constructor: &str, args: Vec<(Value, Span)>, span: Span) -> Result<Value> {
    if let Some(controller) = Controller::simple_from_script_name(constructor) {
        check_arity(constructor, &args, 0, span)?;
        return Ok(Value::Controller(controller));
    }

    if let Some(strategy) = MoveSelection::from_script_name(constructor) {
        check_arity(constructor, &args, 0, span)?;
        return Ok(Value::MoveSelection(strategy));
    }

    match constructor {
        "LevineUcbSelectionPolicy" | "Ucb1SelectionPolicy" => {
            check_arity(constructor, &args, 1, span)?;
            let (value, arg_span) = &args[0];
            let exploration_constant = match value {
                Value::Integer(n) => *n as f64,
                Value::Float(x) => *x,
                other => return Err(mismatch("number", other, *arg_span)),
            };
            SelectionPolicy::from_script_name(constructor, exploration_constant)
                .map(Value::Policy)
                .ok_or_else(|| ScenarioError::UnknownControllerVariant {
                    name: constructor.to_string(),
                    span,
                })
        }
        "NeuralNetworkGhostController" => {
            check_arity(constructor, &args, 3, span)?;
            let move_selection = match &args[0] {
                (Value::MoveSelection(s), _) => *s,
                (other, s) => return Err(mismatch("move selection strategy", other, *s)),
            };
            let iterations = match &args[1] {
                (Value::Integer(n), _) => u32::try_from(*n).ok().filter(|&n| n > 0).ok_or_else(|| {
                    ScenarioError::invalid(
                        "NeuralNetworkGhostController.iterationCount",
                        format!("{} is not a positive integer", n),
                    )
                })?,
                (other, s) => return Err(mismatch("integer", other, *s)),
            };
            let use_pretrained_weights = match &args[2] {
                (Value::Bool(b), _) => *b,
                (other, s) => return Err(mismatch("boolean", other, *s)),
            };
            Ok(Value::Controller(Controller::NeuralNetworkGhost {
                move_selection,
                iterations,
                use_pretrained_weights,
            }))
        }
        _ => Err(ScenarioError::UnknownControllerVariant {
            name: constructor.to_string(),
            span,
        }),
    }
}

fn positive_count(option: OptionName, (value, span): (Value, Span)) -> Result<u32> {
    match value {
        Value::Integer(n) => u32::try_from(n).ok().filter(|&n| n > 0).ok_or_else(|| {
            ScenarioError::invalid(
                option.as_str(),
                format!("{} is not a positive integer", n),
            )
        }),
        other => Err(mismatch("integer", &other, span)),
    }
}

fn controller(value: (Value, Span)) -> Result<Controller> {
    match value {
        (Value::Controller(c), _) => Ok(c),
        (other, span) => Err(mismatch("controller", &other, span)),
    }
}

/// Turn the evaluated bindings into a validated config.
fn assemble(mut bindings: Bindings) -> Result<SimulationConfig> {
    let node_expansion_threshold = positive_count(
        OptionName::NodeExpansionThreshold,
        bindings.require(OptionName::NodeExpansionThreshold)?,
    )?;
    let maximum_simulation_length = positive_count(
        OptionName::MaximumSimulationLength,
        bindings.require(OptionName::MaximumSimulationLength)?,
    )?;
    let simulation_count = match bindings.take(OptionName::SimulationCount) {
        None | Some((Value::Null, _)) => None,
        Some(value) => Some(positive_count(OptionName::SimulationCount, value)?),
    };

    let pac_man_model = controller(bindings.require(OptionName::PacManModel)?)?;
    let ghost_model = controller(bindings.require(OptionName::GhostModel)?)?;
    let opponent = controller(bindings.require(OptionName::Opponent)?)?;

    let tasks = match bindings.take(OptionName::Tasks) {
        None | Some((Value::Null, _)) => Vec::new(),
        Some((Value::List(items), _)) => items
            .into_iter()
            .map(controller)
            .collect::<Result<Vec<_>>>()?,
        Some((other, span)) => return Err(mismatch("array", &other, span)),
    };

    let selection_policy = match bindings.require(OptionName::SelectionPolicy)? {
        (Value::Policy(policy), _) => policy,
        (other, span) => return Err(mismatch("selection policy", &other, span)),
    };

    let config = SimulationConfig {
        node_expansion_threshold,
        maximum_simulation_length,
        simulation_count,
        pac_man_model,
        ghost_model,
        tasks,
        selection_policy,
        opponent,
    };
    config.validate()?;
    Ok(config)
}

/// Evaluate a parsed script into a config.
pub fn evaluate(script: &Script) -> Result<SimulationConfig> {
    let mut bindings = Bindings::default();
    for statement in &script.statements {
        bindings.bind(&statement.name, statement.name_span, &statement.value)?;
    }
    assemble(bindings)
}

/// Load a scenario from script source.
///
/// # Example
/// ```
/// let scenario = ghostlab_scenario::load_str(
///     "quick",
///     "nodeExpansionThreshold = 30;
///      maximumSimulationLength = 250;
///      pacManModel = new RandomNonRevPacMan();
///      ghostModel = new Legacy();
///      selectionPolicy = new LevineUcbSelectionPolicy(4000);
///      opponent = new Legacy();",
/// ).unwrap();
/// assert_eq!(scenario.config.node_expansion_threshold, 30);
/// assert_eq!(scenario.config.simulation_count, None);
/// ```
pub fn load_str(name: &str, source: &str) -> Result<Scenario> {
    let script = parse(source)?;
    let config = evaluate(&script)?;
    info!(scenario = name, ghost_model = config.ghost_model.script_name(), "loaded scenario");

    Ok(Scenario {
        name: name.to_string(),
        description: script.description,
        config,
    })
}

/// Load a scenario from disk.
///
/// `.json` files hold the serde form of [`SimulationConfig`]; anything
/// else is parsed as a script. The scenario is named after the file stem.
pub fn load_path(path: impl AsRef<Path>) -> Result<Scenario> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| ScenarioError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        let config: SimulationConfig = serde_json::from_str(&source)?;
        config.validate()?;
        info!(scenario = %name, "loaded JSON scenario");
        return Ok(Scenario {
            name,
            description: None,
            config,
        });
    }

    load_str(&name, &source)
}
