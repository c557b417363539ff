// SPDX-License-Identifier: MIT

//! Completion webhook delivery

use reqwest::Client;
use serde_json::{json, Map, Value};
use std::time::Duration;

use crate::engine::{ActionError, Session};
use crate::process::handlers::http::response_map;

/// Fixed deadline for webhook delivery
pub const WEBHOOK_TIMEOUT: Duration = Duration::from_millis(500);

/// Best-effort POST of the final session snapshot
#[derive(Clone)]
pub struct WebhookNotifier {
    client: Client,
    timeout: Duration,
}

impl WebhookNotifier {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            timeout: WEBHOOK_TIMEOUT,
        }
    }

    /// Deliver the session to its webhook, if any, and record the outcome in
    /// `on_finish_webhook_response`. Failures stay in the session.
    pub async fn notify(&self, session: &Session) {
        let Some(webhook) = session.on_finish_webhook() else {
            return;
        };

        let dto = session.to_dto().await;
        let response = match self.deliver(&webhook.url, &dto).await {
            Ok(response) => {
                log::info!(
                    "Session {}: webhook {} answered {}",
                    session.uuid(),
                    webhook.url,
                    response["status"]
                );
                response
            }
            Err(err) => {
                log::warn!(
                    "Session {}: webhook {} failed: {}",
                    session.uuid(),
                    webhook.url,
                    err
                );
                let mut response = Map::new();
                response.insert("error".to_string(), json!(err.to_string()));
                response
            }
        };
        session.set_on_finish_webhook_response(response).await;
    }

    async fn deliver(
        &self,
        url: &str,
        body: &impl serde::Serialize,
    ) -> Result<Map<String, Value>, ActionError> {
        let target = url::Url::parse(url).map_err(|e| ActionError::invalid_url(url, e))?;
        let response = self
            .client
            .post(target)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ActionError::Body(e.to_string()))?;
        Ok(response_map(status, text))
    }
}
