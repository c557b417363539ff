use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

use process_manager_rs::engine::Webhook;
use process_manager_rs::process::config::ServerConfig;
use process_manager_rs::process::server;
use process_manager_rs::process::workflow::Engine;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load and validate an action graph
    Validate {
        /// Path to the graph file
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Execute one session and print it once terminated
    Run {
        /// Path to the graph file
        #[arg(short, long)]
        file: PathBuf,

        /// Session input data as a JSON object
        #[arg(short, long, default_value = "{}")]
        data: String,

        /// Completion webhook url
        #[arg(short, long)]
        webhook: Option<String>,
    },
    /// Start the HTTP server
    Serve {
        #[command(flatten)]
        config: ServerConfig,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Commands::Validate { file } => {
            let engine = Engine::new();
            engine
                .load_file(&file)
                .await
                .with_context(|| format!("loading {}", file.display()))?;

            let report = engine.validate().await;
            if !report.is_valid() {
                println!("{}", serde_json::to_string_pretty(&report)?);
                std::process::exit(1);
            }
            println!("{}", serde_json::to_string_pretty(&*engine.actions().await)?);
        }
        Commands::Run {
            file,
            data,
            webhook,
        } => {
            let input: Value = serde_json::from_str(&data).context("parsing --data")?;
            let Value::Object(input) = input else {
                bail!("--data must be a JSON object");
            };

            let engine = Engine::new();
            engine
                .load_file(&file)
                .await
                .with_context(|| format!("loading {}", file.display()))?;

            let uuid = engine
                .execute(input, webhook.and_then(Webhook::new))
                .await;
            let session = engine
                .session(&uuid)
                .await
                .context("session vanished after start")?;
            session.wait_terminated().await;

            println!("{}", serde_json::to_string_pretty(&session.to_dto().await)?);
        }
        Commands::Serve { config } => {
            let engine = Engine::new();
            if let Some(file) = &config.graph_file {
                engine
                    .load_file(file)
                    .await
                    .with_context(|| format!("loading {}", file.display()))?;
            }
            server::serve(&config, Arc::new(engine)).await?;
        }
    }

    Ok(())
}
