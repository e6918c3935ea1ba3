use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use ticket_mirror::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "ticket-mirror")]
#[command(author, version, about = "Self-hosted mirror of an online travel ticket")]
struct Cli {
    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the refresh scheduler and HTTP server
    Serve,

    /// Run one refresh cycle and print the outcome
    Refresh {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the persisted ticket record without refreshing
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Serve => {
            init_logging();
            cli::serve::run(config).await
        }
        Commands::Refresh { json } => {
            init_logging();
            cli::refresh::run(config, json).await
        }
        Commands::Status { json } => {
            init_logging();
            cli::status::run(config, json).await
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
    }
}
