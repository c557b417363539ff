// SPDX-License-Identifier: MIT

//! Outbound HTTP call handler

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;
use url::Url;

use super::{add_action_error, error_variable, result_variable, RESULT_KEY};
use crate::engine::path::value_to_string;
use crate::engine::{Action, ActionError, ExecutedAction, Handler, Session};

#[derive(Debug, Deserialize)]
struct HttpArgs {
    #[serde(default)]
    result: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    method: String,
    /// Deadline in milliseconds; 0 (or absent) expires at once
    #[serde(default)]
    timeout: u64,
    #[serde(default)]
    headers: Map<String, Value>,
    #[serde(default)]
    payload: Option<Value>,
}

impl HttpArgs {
    fn method(&self) -> String {
        if self.method.trim().is_empty() {
            "GET".to_string()
        } else {
            self.method.to_uppercase()
        }
    }
}

/// Calls `url` and stores `{status, status_code, response_body}` under the
/// result variable
pub struct HttpHandler {
    client: Client,
}

impl HttpHandler {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn call(
        &self,
        args: &HttpArgs,
        url: &str,
        method: &str,
        session: &Session,
    ) -> Result<Map<String, Value>, ActionError> {
        let target = Url::parse(url).map_err(|e| ActionError::invalid_url(url, e))?;
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|_| ActionError::InvalidMethod(method.to_string()))?;

        let mut request = self
            .client
            .request(method, target)
            .timeout(Duration::from_millis(args.timeout));
        for (name, value) in &args.headers {
            let value = match value {
                Value::String(s) => session.placeholder_or_string_value(s).await,
                other => value_to_string(other),
            };
            request = request.header(name.as_str(), value);
        }
        if let Some(payload) = &args.payload {
            request = request.json(payload);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ActionError::Body(e.to_string()))?;

        Ok(response_map(status, body))
    }
}

#[async_trait]
impl Handler for HttpHandler {
    async fn handle(&self, action: &Action, session: &Session) -> String {
        let args: HttpArgs = match action.args.bind() {
            Ok(args) => args,
            Err(err) => {
                let result = action.args.get_string(RESULT_KEY, "");
                add_action_error(session, error_variable(&result, &action.action_type), &err)
                    .await;
                session
                    .add_executed_action(http_executed_action(action, "", "", 0))
                    .await;
                return action.on_failure.clone();
            }
        };

        let url = session.placeholder_or_string_value(&args.url).await;
        let method = args.method();
        session
            .add_executed_action(http_executed_action(action, &url, &method, args.timeout))
            .await;

        match self.call(&args, &url, &method, session).await {
            Ok(response) => {
                log::debug!("{} {} -> {}", method, url, response["status"]);
                session
                    .set(
                        result_variable(&args.result, &action.action_type),
                        Value::Object(response),
                    )
                    .await;
                action.on_success.clone()
            }
            Err(err) => {
                log::warn!("{} {} failed: {}", method, url, err);
                add_action_error(
                    session,
                    error_variable(&args.result, &action.action_type),
                    &err,
                )
                .await;
                action.on_failure.clone()
            }
        }
    }
}

/// Response record shared with webhook delivery.
///
/// The body is stored under both `response_body` and `response`.
pub(crate) fn response_map(status: StatusCode, body: String) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("status".to_string(), json!(status.to_string()));
    map.insert("status_code".to_string(), json!(status.as_u16()));
    map.insert("response_body".to_string(), Value::String(body.clone()));
    map.insert("response".to_string(), Value::String(body));
    map
}

fn http_executed_action(action: &Action, url: &str, method: &str, timeout: u64) -> ExecutedAction {
    let mut params = Map::new();
    params.insert("url".to_string(), json!(url));
    params.insert("method".to_string(), json!(method));
    params.insert("timeout".to_string(), json!(timeout));
    ExecutedAction::new(action, params)
}
