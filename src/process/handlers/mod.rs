// SPDX-License-Identifier: MIT

//! Built-in action handlers
//!
//! - `is_greater`, `is_lower`, `is_equal` - integer comparisons
//! - `http` - outbound HTTP call
//! - `task` - delegated work record
//!
//! Every handler stores its outcome under a result variable: the `result`
//! argument when given, else `"<type>.result"`. Soft failures are stored as
//! text under `"<result>_error"` (or `"<type>.result_error"`) and the chain
//! follows `on_failure`.

pub mod comparison;
pub mod http;
pub mod task;

pub use comparison::{Comparison, ComparisonHandler};
pub use http::HttpHandler;
pub use task::TaskHandler;

use serde_json::Value;
use std::fmt::Display;
use std::sync::Arc;

use crate::engine::{Handler, HandlerRegistry, Session};

pub const IS_GREATER: &str = "is_greater";
pub const IS_LOWER: &str = "is_lower";
pub const IS_EQUAL: &str = "is_equal";
pub const HTTP_ACTION: &str = "http";
pub const TASK_ACTION: &str = "task";

pub(crate) const RESULT_KEY: &str = "result";

/// Session key holding an action's outcome
pub fn result_variable(result: &str, action_type: &str) -> String {
    if result.is_empty() {
        format!("{}.result", action_type)
    } else {
        result.to_string()
    }
}

/// Session key holding an action's error message
pub fn error_variable(result: &str, action_type: &str) -> String {
    if result.is_empty() {
        format!("{}.result_error", action_type)
    } else {
        format!("{}_error", result)
    }
}

/// Record a soft failure as text under `variable`
pub(crate) async fn add_action_error(session: &Session, variable: String, err: &impl Display) {
    if variable.is_empty() {
        return;
    }
    session.set(variable, Value::String(err.to_string())).await;
}

/// Registry holding every built-in handler
pub fn builtin_handlers(client: reqwest::Client) -> HandlerRegistry {
    let handlers: [(&str, Arc<dyn Handler>); 5] = [
        (IS_GREATER, Arc::new(ComparisonHandler::new(Comparison::Greater))),
        (IS_LOWER, Arc::new(ComparisonHandler::new(Comparison::Lower))),
        (IS_EQUAL, Arc::new(ComparisonHandler::new(Comparison::Equal))),
        (HTTP_ACTION, Arc::new(HttpHandler::new(client))),
        (TASK_ACTION, Arc::new(TaskHandler)),
    ];
    handlers
        .into_iter()
        .map(|(action_type, handler)| (action_type.to_string(), handler))
        .collect()
}
