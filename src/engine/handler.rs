// SPDX-License-Identifier: MIT

//! Handler contract and the registry that dispatches on action type

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::action::Action;
use super::session::Session;

/// Behaviour of one action type.
///
/// Returns the id of the next node to run. An empty id ends the chain.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, action: &Action, session: &Session) -> String;
}

/// Action type -> handler mapping, shared by clones
#[derive(Clone)]
pub struct HandlerRegistry {
    handlers: Arc<RwLock<HashMap<String, Arc<dyn Handler>>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register `handler` for `action_type`, replacing any previous one
    pub async fn register(&self, action_type: impl Into<String>, handler: Arc<dyn Handler>) {
        let mut handlers = self.handlers.write().await;
        handlers.insert(action_type.into(), handler);
    }

    pub async fn get(&self, action_type: &str) -> Option<Arc<dyn Handler>> {
        let handlers = self.handlers.read().await;
        handlers.get(action_type).cloned()
    }

    pub async fn contains(&self, action_type: &str) -> bool {
        self.handlers.read().await.contains_key(action_type)
    }
}

impl FromIterator<(String, Arc<dyn Handler>)> for HandlerRegistry {
    fn from_iter<I: IntoIterator<Item = (String, Arc<dyn Handler>)>>(iter: I) -> Self {
        Self {
            handlers: Arc::new(RwLock::new(iter.into_iter().collect())),
        }
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
