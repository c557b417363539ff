// SPDX-License-Identifier: MIT

//! Delegated work records created by the `task` action

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A unit of work handed to an external actor.
///
/// `next` is stored for the external actor's benefit only; completing a task
/// never re-enters the action graph.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Task {
    #[serde(rename = "ID")]
    pub id: String,
    pub name: String,
    pub next: String,
    pub parameters: Map<String, Value>,
}

impl Task {
    pub fn new(
        name: impl Into<String>,
        next: impl Into<String>,
        parameters: Map<String, Value>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            next: next.into(),
            parameters,
        }
    }

    /// Merge an externally supplied payload into `parameters`
    pub fn complete(&mut self, payload: Map<String, Value>) {
        self.parameters.extend(payload);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_new_task_has_unique_id() {
        let a = Task::new("approve", "n2", Map::new());
        let b = Task::new("approve", "n2", Map::new());
        assert_ne!(a.id, b.id);
        assert_eq!(a.name, "approve");
        assert_eq!(a.next, "n2");
    }

    #[test]
    fn test_complete_merges_payload() {
        let mut task = Task::new("approve", "", map(json!({"amount": 5, "owner": "a"})));
        task.complete(map(json!({"owner": "b", "approved": true})));

        assert_eq!(
            Value::Object(task.parameters),
            json!({"amount": 5, "owner": "b", "approved": true})
        );
    }

    #[test]
    fn test_serialize_id_key() {
        let task = Task::new("approve", "n2", Map::new());
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["ID"], json!(task.id));
        assert_eq!(value["parameters"], json!({}));
    }
}
