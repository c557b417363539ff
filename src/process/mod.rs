// SPDX-License-Identifier: MIT

pub mod config;
pub mod handlers;
pub mod server;
pub mod workflow;
