// Personal Tutor
// Main entry point

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use tutor::cli::Repl;
use tutor::client::TutorClient;
use tutor::config::load_config;
use tutor::logging::init_tracing;
use tutor::server::TutorServer;

#[derive(Parser)]
#[command(name = "tutor", version, about = "Personal tutor study server")]
struct Cli {
    /// Path to a config file (default: ./tutor.toml, then ~/.tutor/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve {
        /// Bind address, overrides the config file
        #[arg(long)]
        bind: Option<String>,
    },
    /// Chat with the tutor about one unit from the terminal
    Chat {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        unit: String,
        /// Server base URL
        #[arg(long, default_value = "http://127.0.0.1:8000")]
        server: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command.unwrap_or(Commands::Serve { bind: None }) {
        Commands::Serve { bind } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(bind) = bind {
                config.server.bind_address = bind;
                config.validate()?;
            }
            TutorServer::new(&config)?.serve().await
        }
        Commands::Chat {
            subject,
            unit,
            server,
        } => {
            let client = TutorClient::new(server)?;
            Repl::new(client, &subject, &unit).run().await
        }
    }
}
