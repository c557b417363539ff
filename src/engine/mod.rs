// SPDX-License-Identifier: MIT

//! Engine toolkit - data model and contracts for action graphs
//!
//! This module provides:
//! - `Action` / `ActionGraph` - the workflow definition
//! - `Session` - per-execution state with placeholder resolution
//! - `Handler` / `HandlerRegistry` - dispatch by action type
//! - `Task` - delegated work records

pub mod action;
pub mod args;
pub mod dto;
pub mod error;
pub mod handler;
pub mod path;
pub mod placeholder;
pub mod session;
pub mod task;

pub use action::{Action, ActionGraph, START_NODE};
pub use args::Args;
pub use dto::SessionDto;
pub use error::{ActionError, EngineError};
pub use handler::{Handler, HandlerRegistry};
pub use session::{ExecutedAction, Session, SessionStatus, Webhook};
pub use task::Task;
