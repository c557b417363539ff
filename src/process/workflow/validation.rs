// SPDX-License-Identifier: MIT

//! Graph validation
//!
//! Validation runs a structural pass over every node, then merges in the
//! findings of any validator registered for the node's type. Results map
//! node id -> field -> messages; an empty result means the graph is valid.
//! Messages from both passes accumulate and are never deduplicated.

use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::engine::{Action, ActionGraph, START_NODE};
use crate::process::handlers::{HTTP_ACTION, IS_EQUAL, IS_GREATER, IS_LOWER, TASK_ACTION};

const MANDATORY: &str = "is mandatory";

/// Field -> messages for a single action
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append messages under `field`
    pub fn add<I, S>(&mut self, field: &str, messages: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .entry(field.to_string())
            .or_default()
            .extend(messages.into_iter().map(Into::into));
    }

    pub fn add_message(&mut self, field: &str, message: impl Into<String>) {
        self.add(field, [message.into()]);
    }

    /// Append every message of `other`
    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.0 {
            self.add(&field, messages);
        }
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn is_valid(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Node id -> field errors for a whole graph
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GraphValidationErrors(BTreeMap<String, ValidationErrors>);

impl GraphValidationErrors {
    pub fn get(&self, node_id: &str) -> Option<&ValidationErrors> {
        self.0.get(node_id)
    }

    pub fn is_valid(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ValidationErrors)> {
        self.0.iter()
    }

    fn record(&mut self, node_id: &str, errors: ValidationErrors) {
        if errors.is_valid() {
            return;
        }
        self.0.entry(node_id.to_string()).or_default().merge(errors);
    }
}

/// Type-specific argument checks
pub trait Validator: Send + Sync {
    fn validate(&self, action: &Action) -> ValidationErrors;
}

impl<F> Validator for F
where
    F: Fn(&Action) -> ValidationErrors + Send + Sync,
{
    fn validate(&self, action: &Action) -> ValidationErrors {
        self(action)
    }
}

/// Action type -> validator mapping, shared by clones
#[derive(Clone)]
pub struct ValidatorRegistry {
    validators: Arc<RwLock<HashMap<String, Arc<dyn Validator>>>>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self {
            validators: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn register(&self, action_type: impl Into<String>, validator: Arc<dyn Validator>) {
        let mut validators = self.validators.write().await;
        validators.insert(action_type.into(), validator);
    }

    pub async fn get(&self, action_type: &str) -> Option<Arc<dyn Validator>> {
        self.validators.read().await.get(action_type).cloned()
    }
}

impl FromIterator<(String, Arc<dyn Validator>)> for ValidatorRegistry {
    fn from_iter<I: IntoIterator<Item = (String, Arc<dyn Validator>)>>(iter: I) -> Self {
        Self {
            validators: Arc::new(RwLock::new(iter.into_iter().collect())),
        }
    }
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry holding the validators of the built-in action types
pub fn builtin_validators() -> ValidatorRegistry {
    let validators: [(&str, Arc<dyn Validator>); 5] = [
        (IS_GREATER, Arc::new(validate_two_value_operator)),
        (IS_LOWER, Arc::new(validate_two_value_operator)),
        (IS_EQUAL, Arc::new(validate_two_value_operator)),
        (HTTP_ACTION, Arc::new(validate_http)),
        (TASK_ACTION, Arc::new(validate_task)),
    ];
    validators
        .into_iter()
        .map(|(action_type, validator)| (action_type.to_string(), validator))
        .collect()
}

/// Structural checks every node must pass
pub fn validate_action(action: &Action) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    if action.is_start_node() {
        if action.on_success.is_empty() {
            errors.add_message("on_success", "on_success is a required field");
        }
        return errors;
    }

    if action.action_type.is_empty() {
        errors.add_message("type", "type is a required field");
    }
    if action.on_success.is_empty() {
        errors.add_message("on_success", "on_success is a required field");
    }
    if action.on_failure.is_empty() {
        errors.add_message("on_failure", "on_failure is a required field");
    }
    errors
}

/// Validate every node of `graph`
pub async fn validate_graph(
    graph: &ActionGraph,
    validators: &ValidatorRegistry,
) -> GraphValidationErrors {
    let mut report = GraphValidationErrors::default();
    let mut start_nodes = Vec::new();

    for (id, action) in graph.iter() {
        if action.is_start_node() {
            start_nodes.push(id.as_str());
        }

        let mut errors = validate_action(action);
        if let Some(validator) = validators.get(&action.action_type).await {
            errors.merge(validator.validate(action));
        }
        report.record(id, errors);
    }

    match start_nodes.len() {
        0 => {
            let mut errors = ValidationErrors::new();
            errors.add_message(START_NODE, "start_node is required");
            report.record(START_NODE, errors);
        }
        1 => {}
        _ => {
            for id in start_nodes {
                let mut errors = ValidationErrors::new();
                errors.add_message("type", "only one start_node is allowed");
                report.record(id, errors);
            }
        }
    }

    report
}

/// `is_greater`, `is_lower`, `is_equal` need both operands
pub fn validate_two_value_operator(action: &Action) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    for key in ["comparing", "compare_to"] {
        if is_blank(action.args.get(key)) {
            errors.add_message(key, MANDATORY);
        }
    }
    errors
}

/// `http` needs `url`, `method`, `result`, a numeric `timeout`, and object
/// `headers`/`payload` when given
pub fn validate_http(action: &Action) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    for key in ["url", "method", "result"] {
        if is_blank(action.args.get(key)) {
            errors.add_message(key, MANDATORY);
        }
    }

    match action.args.get("timeout") {
        None | Some(Value::Null) => errors.add_message("timeout", MANDATORY),
        Some(Value::Number(_)) => {}
        Some(_) => errors.add_message("timeout", "must be a number"),
    }

    for key in ["headers", "payload"] {
        if let Some(value) = action.args.get(key) {
            if !value.is_object() {
                errors.add_message(key, "must be an object");
            }
        }
    }
    errors
}

/// `task` needs a `task_name`; `parameters` must be an object
pub fn validate_task(action: &Action) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    if is_blank(action.args.get("task_name")) {
        errors.add_message("task_name", MANDATORY);
    }
    if let Some(parameters) = action.args.get("parameters") {
        if !parameters.is_object() {
            errors.add_message("parameters", "must be an object");
        }
    }
    errors
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}
