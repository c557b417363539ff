// SPDX-License-Identifier: MIT

//! Execution engine
//!
//! The engine owns the action graph, the handler and validator registries,
//! and every session it started. `execute` registers a session and hands the
//! traversal to a background task; the traversal dispatches one node at a
//! time and stops on an empty next id, an unknown node id, or a type with no
//! handler. The completion webhook runs once, then the session is marked
//! terminated.

use reqwest::Client;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::loader::GraphLoader;
use super::validation::{
    builtin_validators, validate_graph, GraphValidationErrors, Validator, ValidatorRegistry,
};
use super::webhook::WebhookNotifier;
use crate::engine::{
    ActionGraph, EngineError, Handler, HandlerRegistry, Session, SessionStatus, Webhook,
    START_NODE,
};
use crate::process::handlers::builtin_handlers;

/// Why a traversal stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// A handler returned an empty next id
    Completed { last: String },
    /// The next id names no node in the graph
    UnknownNode(String),
    /// No handler is registered for the node's type
    NoHandler { node: String, action_type: String },
    /// The graph has no start node
    NoStartNode,
    /// The traversal task panicked or was cancelled
    Aborted(String),
}

pub struct Engine {
    graph: RwLock<Arc<ActionGraph>>,
    handlers: HandlerRegistry,
    validators: ValidatorRegistry,
    sessions: RwLock<Vec<Arc<Session>>>,
    notifier: WebhookNotifier,
}

impl Engine {
    /// Engine with an empty graph and the built-in handlers and validators
    pub fn new() -> Self {
        let client = Client::new();
        Self::with_registries(builtin_handlers(client.clone()), builtin_validators(), client)
    }

    pub fn with_registries(
        handlers: HandlerRegistry,
        validators: ValidatorRegistry,
        client: Client,
    ) -> Self {
        Self {
            graph: RwLock::new(Arc::new(ActionGraph::default())),
            handlers,
            validators,
            sessions: RwLock::new(Vec::new()),
            notifier: WebhookNotifier::new(client),
        }
    }

    /// Replace the graph with the one stored in a `.json` file
    pub async fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<(), EngineError> {
        let path = path.as_ref();
        let graph = GraphLoader::new().load_graph(path)?;
        log::info!("Loaded {} actions from {}", graph.len(), path.display());
        self.set_actions(graph).await;
        Ok(())
    }

    /// Replace the graph. Running sessions keep the graph they started with.
    pub async fn set_actions(&self, graph: ActionGraph) {
        *self.graph.write().await = Arc::new(graph);
    }

    pub async fn actions(&self) -> Arc<ActionGraph> {
        self.graph.read().await.clone()
    }

    pub async fn add_handler(&self, action_type: impl Into<String>, handler: Arc<dyn Handler>) {
        self.handlers.register(action_type, handler).await;
    }

    pub async fn add_validator(
        &self,
        action_type: impl Into<String>,
        validator: Arc<dyn Validator>,
    ) {
        self.validators.register(action_type, validator).await;
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    pub fn validators(&self) -> &ValidatorRegistry {
        &self.validators
    }

    pub async fn validate(&self) -> GraphValidationErrors {
        let graph = self.actions().await;
        validate_graph(&graph, &self.validators).await
    }

    /// Start a new session and return its uuid without waiting for the
    /// traversal
    pub async fn execute(&self, input_data: Map<String, Value>, webhook: Option<Webhook>) -> String {
        let session = Arc::new(Session::new(input_data, webhook));
        let uuid = session.uuid().to_string();
        self.sessions.write().await.push(session.clone());

        let traversal = Traversal {
            graph: self.actions().await,
            handlers: self.handlers.clone(),
            notifier: self.notifier.clone(),
            session,
        };
        traversal.session.set_status(SessionStatus::Running);
        log::info!("Session {} started", uuid);
        tokio::spawn(traversal.run());

        uuid
    }

    /// Sessions in creation order
    pub async fn sessions(&self) -> Vec<Arc<Session>> {
        self.sessions.read().await.clone()
    }

    pub async fn session(&self, uuid: &str) -> Option<Arc<Session>> {
        let sessions = self.sessions.read().await;
        sessions.iter().find(|s| s.uuid() == uuid).cloned()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

struct Traversal {
    graph: Arc<ActionGraph>,
    handlers: HandlerRegistry,
    notifier: WebhookNotifier,
    session: Arc<Session>,
}

impl Traversal {
    async fn run(self) {
        let Traversal {
            graph,
            handlers,
            notifier,
            session,
        } = self;
        let uuid = session.uuid().to_string();

        // A panicking handler only takes down the walker; the webhook and the
        // terminated status still follow.
        let walker = tokio::spawn(traverse(graph, handlers, session.clone()));
        let termination = match walker.await {
            Ok(termination) => termination,
            Err(err) => Termination::Aborted(err.to_string()),
        };

        match termination {
            Termination::Completed { last } => {
                log::info!("Session {} completed after {}", uuid, last)
            }
            Termination::UnknownNode(id) => {
                log::warn!("Session {}: node {} not found, terminating", uuid, id)
            }
            Termination::NoHandler { node, action_type } => log::warn!(
                "Session {}: no handler for type {} at node {}, terminating",
                uuid,
                action_type,
                node
            ),
            Termination::NoStartNode => {
                log::warn!("Session {}: graph has no start node", uuid)
            }
            Termination::Aborted(reason) => {
                log::error!("Session {}: traversal aborted: {}", uuid, reason)
            }
        }

        notifier.notify(&session).await;
        session.set_status(SessionStatus::Terminated);
    }
}

async fn traverse(
    graph: Arc<ActionGraph>,
    handlers: HandlerRegistry,
    session: Arc<Session>,
) -> Termination {
    let Some(start) = graph.start_node() else {
        return Termination::NoStartNode;
    };
    if start.on_success.is_empty() {
        return Termination::Completed {
            last: START_NODE.to_string(),
        };
    }

    let mut id = start.on_success.clone();
    loop {
        let Some(action) = graph.get(&id) else {
            return Termination::UnknownNode(id);
        };
        let Some(handler) = handlers.get(&action.action_type).await else {
            return Termination::NoHandler {
                node: id,
                action_type: action.action_type.clone(),
            };
        };

        log::debug!("Session {}: dispatching {}", session.uuid(), id);
        let next = handler.handle(action, &session).await;
        if next.is_empty() {
            return Termination::Completed { last: id };
        }
        id = next;
    }
}
