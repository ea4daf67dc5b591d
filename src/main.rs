use auditstat::cli::run::RunArgs;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "auditstat")]
#[command(about = "Ranked statistics over tab-separated audit logs", long_about = None)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug diagnostics to stderr
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Count matching lines and print ranked reports (default)
    Run(RunArgs),
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a starter config file
    Init {
        #[arg(long)]
        stdout: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Diagnostics go to stderr; stdout carries the report
    let default_filter = if cli.debug {
        "auditstat=debug"
    } else {
        "auditstat=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = auditstat::config::resolve_config_path(cli.config.as_deref());

    match cli.command {
        Some(Commands::Run(args)) => {
            auditstat::cli::run::run(config_path, args).await?;
        }
        None => {
            auditstat::cli::run::run(config_path, RunArgs::default()).await?;
        }
        Some(Commands::Config { action }) => match action {
            ConfigAction::Init { stdout } => {
                auditstat::cli::config::init(stdout)?;
            }
        },
    }

    Ok(())
}
