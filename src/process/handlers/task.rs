// SPDX-License-Identifier: MIT

//! Task creation handler

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{add_action_error, error_variable, result_variable, RESULT_KEY};
use crate::engine::{Action, ExecutedAction, Handler, Session, Task};

/// Marker stored under the result variable once a task exists
pub const TASK_GENERATED: &str = "task_generated";

#[derive(Debug, Deserialize)]
struct TaskArgs {
    #[serde(default)]
    result: String,
    #[serde(default)]
    task_name: String,
    #[serde(default)]
    parameters: Map<String, Value>,
    #[serde(default)]
    next: String,
}

/// Appends a task to the session and continues down `on_success`.
///
/// Traversal does not wait for the task; completing it later only updates
/// its parameters.
pub struct TaskHandler;

#[async_trait]
impl Handler for TaskHandler {
    async fn handle(&self, action: &Action, session: &Session) -> String {
        let args: TaskArgs = match action.args.bind() {
            Ok(args) => args,
            Err(err) => {
                let result = action.args.get_string(RESULT_KEY, "");
                add_action_error(session, error_variable(&result, &action.action_type), &err)
                    .await;
                let name = action.args.get_string("task_name", "");
                session
                    .add_executed_action(task_executed_action(action, &name, &Map::new()))
                    .await;
                return action.on_failure.clone();
            }
        };

        let task = Task::new(&args.task_name, &args.next, args.parameters.clone());
        log::info!(
            "Session {}: task '{}' created ({})",
            session.uuid(),
            task.name,
            task.id
        );
        session.add_task(task).await;
        session
            .set(
                result_variable(&args.result, &action.action_type),
                json!(TASK_GENERATED),
            )
            .await;
        session
            .add_executed_action(task_executed_action(
                action,
                &args.task_name,
                &args.parameters,
            ))
            .await;

        action.on_success.clone()
    }
}

fn task_executed_action(
    action: &Action,
    name: &str,
    parameters: &Map<String, Value>,
) -> ExecutedAction {
    let mut params = Map::new();
    params.insert("name".to_string(), json!(name));
    params.insert("parameters".to_string(), Value::Object(parameters.clone()));
    ExecutedAction::new(action, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Args;

    fn action(args: Value) -> Action {
        Action::new(
            "task",
            serde_json::from_value::<Args>(args).unwrap(),
            "next_node",
            "failed",
        )
    }

    #[tokio::test]
    async fn test_creates_task() {
        let session = Session::new(Map::new(), None);
        let a = action(json!({
            "task_name": "approve",
            "parameters": {"amount": 10},
            "next": "after_approval",
            "result": "approval"
        }));

        let next = TaskHandler.handle(&a, &session).await;

        assert_eq!(next, "next_node");
        let tasks = session.tasks().await;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name, "approve");
        assert_eq!(tasks[0].next, "after_approval");
        assert_eq!(tasks[0].parameters["amount"], 10);
        assert_eq!(session.value_of("approval").await, Some(json!("task_generated")));

        let log = session.executed_actions().await;
        assert_eq!(log[0].params["name"], "approve");
        assert_eq!(log[0].params["parameters"], json!({"amount": 10}));
    }

    #[tokio::test]
    async fn test_default_result_variable() {
        let session = Session::new(Map::new(), None);
        let a = action(json!({"task_name": "review"}));

        assert_eq!(TaskHandler.handle(&a, &session).await, "next_node");
        assert_eq!(
            session.value_of("task.result").await,
            Some(json!("task_generated"))
        );
    }

    #[tokio::test]
    async fn test_each_run_appends_one_task() {
        let session = Session::new(Map::new(), None);
        let a = action(json!({"task_name": "review"}));

        TaskHandler.handle(&a, &session).await;
        TaskHandler.handle(&a, &session).await;

        let tasks = session.tasks().await;
        assert_eq!(tasks.len(), 2);
        assert_ne!(tasks[0].id, tasks[1].id);
    }

    #[tokio::test]
    async fn test_bind_failure() {
        let session = Session::new(Map::new(), None);
        let a = action(json!({"task_name": "review", "parameters": "not a map"}));

        let next = TaskHandler.handle(&a, &session).await;

        assert_eq!(next, "failed");
        assert!(session.tasks().await.is_empty());
        assert!(session.value_of("task.result_error").await.is_some());
        assert_eq!(session.executed_actions().await.len(), 1);
    }
}
