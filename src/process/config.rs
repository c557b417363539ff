// SPDX-License-Identifier: MIT

//! Server configuration
//!
//! Values come from command line flags, then `PROCESS_MANAGER_*` environment
//! variables (a `.env` file is honoured when `main` loads it first), then the
//! defaults below.

use clap::Args;
use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind
    #[arg(long, env = "PROCESS_MANAGER_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PROCESS_MANAGER_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Action graph loaded at start-up; without one every session
    /// terminates immediately
    #[arg(short = 'f', long = "file", env = "PROCESS_MANAGER_GRAPH")]
    pub graph_file: Option<PathBuf>,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            graph_file: None,
        }
    }
}
