// SPDX-License-Identifier: MIT

//! Serializable session snapshot, as served over HTTP and posted to webhooks

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::session::{ExecutedAction, SessionStatus, Webhook};
use super::task::Task;

/// Full session document.
///
/// Executed actions serialize as `{type, args, on_success, on_failure,
/// params}` and tasks as `{ID, name, next, parameters}`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SessionDto {
    pub uuid: String,
    pub status: SessionStatus,
    pub values: Map<String, Value>,
    pub executed_actions: Vec<ExecutedAction>,
    pub input_data: Map<String, Value>,
    pub on_finish_webhook: Option<Webhook>,
    pub on_finish_webhook_response: Option<Map<String, Value>>,
    pub tasks: Vec<Task>,
}
