// SPDX-License-Identifier: MIT

//! Action graph type definitions
//!
//! A graph file is a JSON object mapping node ids to actions:
//!
//! ```json
//! {
//!   "start_node": { "type": "start_node", "on_success": "check" },
//!   "check": {
//!     "type": "is_greater",
//!     "args": { "comparing": "{{ amount }}", "compare_to": 100 },
//!     "on_success": "notify",
//!     "on_failure": "done"
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::args::Args;

/// Reserved type (and conventional id) of the graph entry node
pub const START_NODE: &str = "start_node";

/// A typed node with two outgoing edges
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Action {
    #[serde(rename = "type", default)]
    pub action_type: String,
    #[serde(default)]
    pub args: Args,
    #[serde(default)]
    pub on_success: String,
    #[serde(default)]
    pub on_failure: String,
}

impl Action {
    pub fn new(
        action_type: impl Into<String>,
        args: Args,
        on_success: impl Into<String>,
        on_failure: impl Into<String>,
    ) -> Self {
        Self {
            action_type: action_type.into(),
            args,
            on_success: on_success.into(),
            on_failure: on_failure.into(),
        }
    }

    pub fn is_start_node(&self) -> bool {
        self.action_type == START_NODE
    }
}

/// Node id -> action mapping; immutable once loaded
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ActionGraph(HashMap<String, Action>);

impl ActionGraph {
    pub fn new(actions: HashMap<String, Action>) -> Self {
        Self(actions)
    }

    pub fn get(&self, id: &str) -> Option<&Action> {
        self.0.get(id)
    }

    pub fn insert(&mut self, id: impl Into<String>, action: Action) {
        self.0.insert(id.into(), action);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Action)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The entry node: the `start_node` key when present, else any node
    /// typed `start_node`
    pub fn start_node(&self) -> Option<&Action> {
        self.0
            .get(START_NODE)
            .filter(|a| a.is_start_node())
            .or_else(|| self.0.values().find(|a| a.is_start_node()))
    }

    /// The first real node, named by the entry node's `on_success`
    pub fn first_action(&self) -> Option<(&str, &Action)> {
        let id = self.start_node()?.on_success.as_str();
        self.0.get_key_value(id).map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, Action)> for ActionGraph {
    fn from_iter<I: IntoIterator<Item = (String, Action)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
