// SPDX-License-Identifier: MIT

//! Integer comparison handlers

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Number, Value};

use super::{add_action_error, error_variable, result_variable, RESULT_KEY};
use crate::engine::{Action, ExecutedAction, Handler, Session};

/// Comparison operator applied to the resolved operands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Greater,
    Lower,
    Equal,
}

impl Comparison {
    pub fn apply(self, comparing: i64, compare_to: i64) -> bool {
        match self {
            Comparison::Greater => comparing > compare_to,
            Comparison::Lower => comparing < compare_to,
            Comparison::Equal => comparing == compare_to,
        }
    }
}

/// Operand as written in the graph: a raw number or a string (literal or
/// placeholder)
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Operand {
    Number(Number),
    Text(String),
}

impl Operand {
    fn into_value(self) -> Value {
        match self {
            Operand::Number(n) => Value::Number(n),
            Operand::Text(s) => Value::String(s),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OperatorArgs {
    #[serde(default)]
    result: String,
    comparing: Option<Operand>,
    compare_to: Option<Operand>,
}

/// Stores the comparison outcome and branches on it: `on_success` when it
/// holds, `on_failure` when it does not or the arguments do not bind.
///
/// A false outcome is not treated as a successful step; graphs that want to
/// continue regardless point both edges at the same node and read the stored
/// boolean instead.
pub struct ComparisonHandler {
    operator: Comparison,
}

impl ComparisonHandler {
    pub fn new(operator: Comparison) -> Self {
        Self { operator }
    }
}

#[async_trait]
impl Handler for ComparisonHandler {
    async fn handle(&self, action: &Action, session: &Session) -> String {
        let args: OperatorArgs = match action.args.bind() {
            Ok(args) => args,
            Err(err) => {
                let result = action.args.get_string(RESULT_KEY, "");
                add_action_error(session, error_variable(&result, &action.action_type), &err)
                    .await;
                session
                    .add_executed_action(operator_executed_action(action, 0, 0))
                    .await;
                return action.on_failure.clone();
            }
        };

        let comparing = resolve(session, args.comparing).await;
        let compare_to = resolve(session, args.compare_to).await;
        let holds = self.operator.apply(comparing, compare_to);
        log::debug!(
            "{}: {} vs {} -> {}",
            action.action_type,
            comparing,
            compare_to,
            holds
        );

        session
            .set(
                result_variable(&args.result, &action.action_type),
                Value::Bool(holds),
            )
            .await;
        session
            .add_executed_action(operator_executed_action(action, comparing, compare_to))
            .await;

        if holds {
            action.on_success.clone()
        } else {
            action.on_failure.clone()
        }
    }
}

async fn resolve(session: &Session, operand: Option<Operand>) -> i64 {
    match operand {
        Some(operand) => session.placeholder_or_int_value(&operand.into_value()).await,
        None => 0,
    }
}

fn operator_executed_action(action: &Action, comparing: i64, compare_to: i64) -> ExecutedAction {
    let mut params = Map::new();
    params.insert("comparing".to_string(), json!(comparing));
    params.insert("compare_to".to_string(), json!(compare_to));
    ExecutedAction::new(action, params)
}
