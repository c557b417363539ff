// SPDX-License-Identifier: MIT

//! HTTP surface over a shared engine
//!
//! | Method | Path                              | Success             |
//! |--------|-----------------------------------|---------------------|
//! | GET    | `/api/sessions`                   | 200 session list    |
//! | POST   | `/api/sessions`                   | 201 `{message}`     |
//! | GET    | `/api/sessions/{id}`              | 200 session         |
//! | GET    | `/api/sessions/{id}/tasks`        | 200 task list       |
//! | POST   | `/api/sessions/{id}/tasks/{task}` | 200 completed task  |
//!
//! Unknown sessions and tasks answer 404 with a `null` body.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::engine::{EngineError, SessionDto, Webhook};
use crate::process::config::ServerConfig;
use crate::process::workflow::Engine;

#[derive(Clone)]
pub struct AppState {
    engine: Arc<Engine>,
}

pub fn router(engine: Arc<Engine>) -> Router {
    Router::new()
        .route("/api/sessions", get(list_sessions).post(start_session))
        .route("/api/sessions/{id}", get(get_session))
        .route("/api/sessions/{id}/tasks", get(list_tasks))
        .route("/api/sessions/{id}/tasks/{task_id}", post(complete_task))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState { engine })
}

pub async fn serve(config: &ServerConfig, engine: Arc<Engine>) -> Result<(), EngineError> {
    let listener = tokio::net::TcpListener::bind(config.address()).await?;
    log::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(engine))
        .await
        .map_err(|e| EngineError::Server(e.to_string()))
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: String,
}

#[derive(Debug, Default, Deserialize)]
struct StartSessionRequest {
    #[serde(default)]
    data: Option<Map<String, Value>>,
    #[serde(default)]
    webhook: Option<WebhookRequest>,
}

#[derive(Debug, Default, Deserialize)]
struct WebhookRequest {
    #[serde(default)]
    url: String,
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(Value::Null)).into_response()
}

async fn list_sessions(State(state): State<AppState>) -> Json<Vec<SessionDto>> {
    let mut sessions = Vec::new();
    for session in state.engine.sessions().await {
        sessions.push(session.to_dto().await);
    }
    Json(sessions)
}

async fn start_session(
    State(state): State<AppState>,
    payload: Result<Json<StartSessionRequest>, JsonRejection>,
) -> (StatusCode, Json<MessageResponse>) {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(MessageResponse {
                    message: rejection.body_text(),
                }),
            )
        }
    };

    let webhook = request.webhook.and_then(|w| Webhook::new(w.url));
    let uuid = state
        .engine
        .execute(request.data.unwrap_or_default(), webhook)
        .await;

    (StatusCode::CREATED, Json(MessageResponse { message: uuid }))
}

async fn get_session(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.engine.session(&id).await {
        Some(session) => Json(session.to_dto().await).into_response(),
        None => not_found(),
    }
}

async fn list_tasks(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.engine.session(&id).await {
        Some(session) => Json(session.tasks().await).into_response(),
        None => not_found(),
    }
}

async fn complete_task(
    State(state): State<AppState>,
    Path((id, task_id)): Path<(String, String)>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Response {
    let Some(session) = state.engine.session(&id).await else {
        return not_found();
    };
    if session.task(&task_id).await.is_none() {
        return not_found();
    }

    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": rejection.body_text() })),
            )
                .into_response()
        }
    };

    match session.complete_task(&task_id, payload).await {
        Some(task) => {
            log::info!("Session {}: task {} completed", id, task_id);
            Json(task).into_response()
        }
        None => not_found(),
    }
}
