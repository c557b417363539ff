// SPDX-License-Identifier: MIT

//! Graph loading, validation and execution

pub mod executor;
pub mod loader;
pub mod validation;
pub mod webhook;

pub use executor::{Engine, Termination};
pub use loader::GraphLoader;
pub use validation::{
    builtin_validators, validate_graph, GraphValidationErrors, ValidationErrors, Validator,
    ValidatorRegistry,
};
pub use webhook::WebhookNotifier;
