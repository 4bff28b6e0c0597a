use std::path::{Path, PathBuf};

use anyhow::Result;
use api_ingress::{ApiIngress, ApiIngressConfig};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs};
use tokio_util::sync::CancellationToken;
use users::{StorageBackend, UsersModule};

mod database;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Users Server - CRUD service for user records
#[derive(Parser)]
#[command(name = "users-server", version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Console verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use a throwaway in-memory SQLite database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

impl Cli {
    fn overrides(&self) -> CliArgs {
        CliArgs {
            config: self.config.as_ref().map(|p| p.display().to_string()),
            port: self.port,
            print_config: self.print_config,
            verbose: self.verbose,
            mock: self.mock,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&cli.overrides());

    let home = PathBuf::from(&config.server.home_dir);
    runtime::logging::init_logging_from_config(&config.logging.clone().unwrap_or_default(), &home);
    tracing::info!(home = %home.display(), "Users Server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, &home).await,
        Commands::Check => check_config(&config, &home),
    }
}

async fn run_server(config: AppConfig, home: &Path) -> Result<()> {
    let backend = match &config.database {
        Some(db) => StorageBackend::Database(database::connect(db, home).await?),
        None => {
            tracing::warn!("No database configured, users are kept in memory");
            StorageBackend::Memory
        }
    };
    let users = UsersModule::init(backend).await?;

    let ingress = ApiIngress::new(ApiIngressConfig {
        bind_addr: config.server.bind_addr(),
        timeout_sec: config.server.timeout_sec,
        cors_enabled: config.server.cors_enabled,
        ..Default::default()
    });
    let router = ingress.build_router(users.register_rest(axum::Router::new()));

    let cancel = CancellationToken::new();
    api_ingress::cancel_on_signals(cancel.clone());
    ingress.serve(router, cancel).await?;

    tracing::info!("Users Server stopped");
    Ok(())
}

fn check_config(config: &AppConfig, home: &Path) -> Result<()> {
    if let Some(db) = &config.database {
        database::validate(db, home)?;
    }

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}
