//! Salto CLI
//!
//! Runs adapter filters and change validators against elements stored on disk.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod commands;
mod workspace;

/// Salto - business application configuration as code
#[derive(Parser)]
#[command(name = "salto")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "salto.yaml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the adapter's fetch filters over instances stored in a directory
    Fetch {
        /// Adapter name
        adapter: String,

        /// Directory of instance files
        dir: String,
    },

    /// Run the adapter's change validators
    Validate {
        /// Adapter name
        adapter: String,

        /// File listing the changes
        changes: String,

        /// Workspace directory to resolve references against
        #[arg(short, long)]
        workspace: Option<String>,
    },

    /// Validate changes and show what would be sent to the service
    Plan {
        /// Adapter name
        adapter: String,

        /// Workspace directory to resolve references against
        dir: String,

        /// File listing the changes
        changes: String,
    },

    /// Print the adapter's declared types
    Types {
        /// Adapter name
        adapter: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for command output
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Fetch { adapter, dir } => {
            commands::fetch::run(&cli.config, &adapter, &dir).await?;
        }
        Commands::Validate {
            adapter,
            changes,
            workspace,
        } => {
            commands::validate::run(&cli.config, &adapter, &changes, workspace.as_deref()).await?;
        }
        Commands::Plan {
            adapter,
            dir,
            changes,
        } => {
            commands::plan::run(&cli.config, &adapter, &dir, &changes).await?;
        }
        Commands::Types { adapter } => {
            commands::types::run(&adapter).await?;
        }
    }

    Ok(())
}
