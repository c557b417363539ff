// SPDX-License-Identifier: MIT

//! Per-execution session state
//!
//! A session is shared between its traversal task (the only writer of
//! values, the audit log and tasks) and external readers such as the HTTP
//! surface. Mutable state sits behind one per-session lock; the lifecycle
//! status is published on a watch channel so callers can await termination.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::{watch, RwLock};
use uuid::Uuid;

use super::action::Action;
use super::dto::SessionDto;
use super::path::{lookup_in, lookup_path, value_to_int, value_to_string};
use super::placeholder::{clean_placeholder, is_placeholder};
use super::task::Task;

/// Completion callback target
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Webhook {
    pub url: String,
}

impl Webhook {
    /// `None` for a blank url
    pub fn new(url: impl Into<String>) -> Option<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            None
        } else {
            Some(Self { url })
        }
    }
}

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Created, traversal not dispatched yet
    Pending,
    /// Traversal task active
    Running,
    /// No further dispatch; webhook fired or skipped
    Terminated,
}

/// Audit record of one handler invocation
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ExecutedAction {
    #[serde(flatten)]
    pub action: Action,
    /// Operand values as the handler resolved them
    pub params: Map<String, Value>,
}

impl ExecutedAction {
    pub fn new(action: &Action, params: Map<String, Value>) -> Self {
        Self {
            action: action.clone(),
            params,
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    values: Map<String, Value>,
    executed_actions: Vec<ExecutedAction>,
    tasks: Vec<Task>,
    on_finish_webhook_response: Option<Map<String, Value>>,
}

/// One execution instance of an action graph
#[derive(Debug)]
pub struct Session {
    uuid: String,
    input_data: Map<String, Value>,
    on_finish_webhook: Option<Webhook>,
    state: RwLock<SessionState>,
    status: watch::Sender<SessionStatus>,
}

impl Session {
    pub fn new(input_data: Map<String, Value>, on_finish_webhook: Option<Webhook>) -> Self {
        let (status, _) = watch::channel(SessionStatus::Pending);
        Self {
            uuid: Uuid::new_v4().to_string(),
            input_data,
            on_finish_webhook,
            state: RwLock::new(SessionState::default()),
            status,
        }
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    pub fn input_data(&self) -> &Map<String, Value> {
        &self.input_data
    }

    pub fn on_finish_webhook(&self) -> Option<&Webhook> {
        self.on_finish_webhook.as_ref()
    }

    pub fn status(&self) -> SessionStatus {
        *self.status.borrow()
    }

    pub fn set_status(&self, status: SessionStatus) {
        self.status.send_replace(status);
    }

    /// Resolve once the traversal has terminated and the webhook ran
    pub async fn wait_terminated(&self) {
        let mut rx = self.status.subscribe();
        // The sender lives as long as `self`, so this cannot observe a closed channel.
        let _ = rx
            .wait_for(|status| *status == SessionStatus::Terminated)
            .await;
    }

    pub async fn set(&self, key: impl Into<String>, value: Value) {
        let mut state = self.state.write().await;
        state.values.insert(key.into(), value);
    }

    /// Snapshot of the values store
    pub async fn values(&self) -> Map<String, Value> {
        self.state.read().await.values.clone()
    }

    /// Look up a dotted path in the values store, falling back to the whole
    /// session document (`input_data.amount`, `values.x`, `tasks.0.ID`)
    pub async fn value_of(&self, path: &str) -> Option<Value> {
        {
            let state = self.state.read().await;
            if let Some(found) = lookup_in(&state.values, path) {
                return Some(found.clone());
            }
        }

        let document = serde_json::to_value(self.to_dto().await).ok()?;
        lookup_path(&document, path).cloned()
    }

    pub async fn string_value_of(&self, path: &str, default: &str) -> String {
        match self.value_of(path).await {
            Some(value) => value_to_string(&value),
            None => default.to_string(),
        }
    }

    pub async fn int_value_of(&self, path: &str, default: i64) -> i64 {
        match self.value_of(path).await {
            Some(value) => value_to_int(&value),
            None => default,
        }
    }

    /// The literal, or the value its placeholder points at (the literal
    /// again when the path is absent)
    pub async fn placeholder_or_string_value(&self, value: &str) -> String {
        if is_placeholder(value) {
            self.string_value_of(clean_placeholder(value), value).await
        } else {
            value.to_string()
        }
    }

    /// Integer operand from a raw number or a string (placeholder or base-10
    /// literal); unresolvable input is 0
    pub async fn placeholder_or_int_value(&self, value: &Value) -> i64 {
        match value {
            Value::String(s) if is_placeholder(s) => {
                self.int_value_of(clean_placeholder(s), 0).await
            }
            Value::String(s) => s.parse::<i64>().unwrap_or(0),
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .unwrap_or(0),
            _ => 0,
        }
    }

    pub async fn add_executed_action(&self, record: ExecutedAction) {
        let mut state = self.state.write().await;
        state.executed_actions.push(record);
    }

    pub async fn executed_actions(&self) -> Vec<ExecutedAction> {
        self.state.read().await.executed_actions.clone()
    }

    pub async fn add_task(&self, task: Task) {
        let mut state = self.state.write().await;
        state.tasks.push(task);
    }

    pub async fn tasks(&self) -> Vec<Task> {
        self.state.read().await.tasks.clone()
    }

    pub async fn task(&self, id: &str) -> Option<Task> {
        let state = self.state.read().await;
        state.tasks.iter().find(|t| t.id == id).cloned()
    }

    /// Merge `payload` into the task's parameters; `None` for an unknown id
    pub async fn complete_task(&self, id: &str, payload: Map<String, Value>) -> Option<Task> {
        let mut state = self.state.write().await;
        let task = state.tasks.iter_mut().find(|t| t.id == id)?;
        task.complete(payload);
        Some(task.clone())
    }

    pub async fn on_finish_webhook_response(&self) -> Option<Map<String, Value>> {
        self.state.read().await.on_finish_webhook_response.clone()
    }

    pub async fn set_on_finish_webhook_response(&self, response: Map<String, Value>) {
        let mut state = self.state.write().await;
        state.on_finish_webhook_response = Some(response);
    }

    /// Consistent snapshot of the whole session
    pub async fn to_dto(&self) -> SessionDto {
        let state = self.state.read().await;
        SessionDto {
            uuid: self.uuid.clone(),
            status: self.status(),
            values: state.values.clone(),
            executed_actions: state.executed_actions.clone(),
            input_data: self.input_data.clone(),
            on_finish_webhook: self.on_finish_webhook.clone(),
            on_finish_webhook_response: state.on_finish_webhook_response.clone(),
            tasks: state.tasks.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::args::Args;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_webhook_blank_url() {
        assert!(Webhook::new("").is_none());
        assert!(Webhook::new("   ").is_none());
        assert_eq!(
            Webhook::new("http://localhost/hook").unwrap().url,
            "http://localhost/hook"
        );
    }

    #[tokio::test]
    async fn test_new_session() {
        let session = Session::new(map(json!({"amount": 5})), None);

        assert!(Uuid::parse_str(session.uuid()).is_ok());
        assert_eq!(session.status(), SessionStatus::Pending);
        assert!(session.values().await.is_empty());
        assert!(session.executed_actions().await.is_empty());
        assert!(session.tasks().await.is_empty());
        assert!(session.on_finish_webhook_response().await.is_none());
        assert_eq!(session.input_data()["amount"], 5);
    }

    #[tokio::test]
    async fn test_set_then_value_of() {
        let session = Session::new(Map::new(), None);
        session.set("r", json!(false)).await;

        assert_eq!(session.value_of("r").await, Some(json!(false)));
        assert_eq!(session.value_of("missing").await, None);
    }

    #[tokio::test]
    async fn test_value_of_is_idempotent() {
        let session = Session::new(Map::new(), None);
        session.set("obj", json!({"a": {"b": [1, 2]}})).await;

        let first = session.value_of("obj.a.b").await;
        let second = session.value_of("obj.a.b").await;
        assert_eq!(first, second);
        assert_eq!(first, Some(json!([1, 2])));
    }

    #[tokio::test]
    async fn test_value_of_falls_back_to_session_document() {
        let session = Session::new(map(json!({"amount": 250})), None);
        session.set("x", json!(3)).await;

        assert_eq!(session.value_of("input_data.amount").await, Some(json!(250)));
        assert_eq!(session.value_of("values.x").await, Some(json!(3)));
    }

    #[tokio::test]
    async fn test_typed_reads() {
        let session = Session::new(Map::new(), None);
        session.set("n", json!(12)).await;
        session.set("s", json!("7")).await;

        assert_eq!(session.int_value_of("n", -1).await, 12);
        assert_eq!(session.int_value_of("s", -1).await, 7);
        assert_eq!(session.int_value_of("missing", -1).await, -1);
        assert_eq!(session.string_value_of("n", "").await, "12");
        assert_eq!(session.string_value_of("missing", "dflt").await, "dflt");
    }

    #[tokio::test]
    async fn test_placeholder_or_string_value() {
        let session = Session::new(Map::new(), None);
        session.set("host", json!("example.org")).await;

        assert_eq!(session.placeholder_or_string_value("plain").await, "plain");
        assert_eq!(
            session.placeholder_or_string_value("{{ host }}").await,
            "example.org"
        );
        assert_eq!(
            session.placeholder_or_string_value("{{ missing }}").await,
            "{{ missing }}"
        );
    }

    #[tokio::test]
    async fn test_placeholder_or_int_value() {
        let session = Session::new(Map::new(), None);
        session.set("limit", json!(40)).await;

        assert_eq!(session.placeholder_or_int_value(&json!(10)).await, 10);
        assert_eq!(session.placeholder_or_int_value(&json!("11")).await, 11);
        assert_eq!(session.placeholder_or_int_value(&json!("abc")).await, 0);
        assert_eq!(session.placeholder_or_int_value(&json!("{{limit}}")).await, 40);
        assert_eq!(session.placeholder_or_int_value(&json!("{{nope}}")).await, 0);
        assert_eq!(session.placeholder_or_int_value(&json!(true)).await, 0);
        assert_eq!(session.placeholder_or_int_value(&Value::Null).await, 0);
    }

    #[tokio::test]
    async fn test_audit_log_and_tasks() {
        let session = Session::new(Map::new(), None);
        let action = Action::new("task", Args::default(), "a", "b");
        session
            .add_executed_action(ExecutedAction::new(&action, map(json!({"name": "t"}))))
            .await;

        let task = Task::new("t", "a", Map::new());
        let id = task.id.clone();
        session.add_task(task).await;

        assert_eq!(session.executed_actions().await.len(), 1);
        assert_eq!(session.task(&id).await.map(|t| t.name), Some("t".to_string()));

        let done = session
            .complete_task(&id, map(json!({"approved": true})))
            .await
            .unwrap();
        assert_eq!(done.parameters["approved"], true);
        assert_eq!(session.tasks().await[0].parameters["approved"], true);
        assert!(session.complete_task("nope", Map::new()).await.is_none());
    }

    #[tokio::test]
    async fn test_wait_terminated() {
        let session = Arc::new(Session::new(Map::new(), None));
        let waiter = {
            let session = session.clone();
            tokio::spawn(async move { session.wait_terminated().await })
        };

        session.set_status(SessionStatus::Running);
        session.set_status(SessionStatus::Terminated);

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should finish")
            .unwrap();
        assert_eq!(session.status(), SessionStatus::Terminated);
    }

    #[tokio::test]
    async fn test_dto_shape() {
        let session = Session::new(map(json!({"k": "v"})), Webhook::new("http://localhost/x"));
        let action = Action::new("is_equal", Args::default(), "a", "b");
        session
            .add_executed_action(ExecutedAction::new(&action, map(json!({"comparing": 1}))))
            .await;

        let dto = serde_json::to_value(session.to_dto().await).unwrap();
        assert_eq!(dto["uuid"], json!(session.uuid()));
        assert_eq!(dto["status"], "pending");
        assert_eq!(dto["input_data"], json!({"k": "v"}));
        assert_eq!(dto["on_finish_webhook"], json!({"url": "http://localhost/x"}));
        assert_eq!(dto["on_finish_webhook_response"], Value::Null);
        assert_eq!(dto["executed_actions"][0]["type"], "is_equal");
        assert_eq!(dto["executed_actions"][0]["params"], json!({"comparing": 1}));
        assert_eq!(dto["tasks"], json!([]));
    }
}
