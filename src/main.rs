// ABOUTME: CLI entry point for innodb-tablespace-migrator
// ABOUTME: Parses commands and routes to appropriate handlers

use clap::{Args, Parser, Subcommand};
use innodb_tablespace_migrator::commands;
use innodb_tablespace_migrator::config::{self, MigrationSettings, PartialSettings};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "innodb-tablespace-migrator")]
#[command(about = "Physical InnoDB tablespace migration between MySQL servers", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Default)]
struct EndpointArgs {
    /// Destination MySQL host (also the scp target)
    #[arg(long)]
    dst_host: Option<String>,
    /// Source MySQL host (default: 127.0.0.1; files are read locally)
    #[arg(long)]
    src_host: Option<String>,
    /// Source MySQL port
    #[arg(long)]
    src_port: Option<u16>,
    /// Destination MySQL port
    #[arg(long)]
    dst_port: Option<u16>,
    /// Source database whose tables are migrated
    #[arg(long)]
    src_db: Option<String>,
    /// Destination database name (default: same as --src-db)
    #[arg(long)]
    dst_db: Option<String>,
    /// MySQL admin user for both instances
    #[arg(long = "user")]
    admin_user: Option<String>,
    /// MySQL admin password for both instances
    #[arg(long = "password")]
    admin_password: Option<String>,
    /// Remote user for scp transfers
    #[arg(short = 'u', long)]
    scp_user: Option<String>,
    /// SSH identity file for scp transfers
    #[arg(short = 'i', long)]
    identity_file: Option<PathBuf>,
    /// Base directory holding the source data files
    #[arg(long)]
    src_base_dir: Option<PathBuf>,
    /// Base directory for data files on the destination (default: same as source)
    #[arg(long)]
    dst_base_dir: Option<PathBuf>,
    /// Number of concurrent transfer workers
    #[arg(long)]
    workers: Option<usize>,
    /// Additional transfer attempts per table after the first failure
    #[arg(long)]
    transfer_retries: Option<u32>,
    /// Base delay in seconds before a transfer retry (doubled per attempt)
    #[arg(long)]
    retry_delay: Option<u64>,
    /// Path to a TOML config file with the same keys as the flags
    #[arg(long)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Migrate tablespaces from the source to the destination instance
    Migrate {
        #[command(flatten)]
        endpoint: EndpointArgs,
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
        /// Write the structured migration report to this path
        #[arg(long)]
        report_json: Option<PathBuf>,
    },
    /// Show what a migration would do, without touching either instance
    Plan {
        #[command(flatten)]
        endpoint: EndpointArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - default to INFO level if RUST_LOG not set
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Migrate {
            endpoint,
            yes,
            report_json,
        } => {
            let settings = resolve_settings(endpoint)?;
            commands::migrate(&settings, yes, report_json.as_deref()).await
        }
        Commands::Plan { endpoint } => {
            let settings = resolve_settings(endpoint)?;
            commands::plan(&settings).await
        }
    }
}

fn resolve_settings(args: EndpointArgs) -> anyhow::Result<MigrationSettings> {
    let from_file = match &args.config {
        Some(path) => config::load_settings_file(path)?,
        None => PartialSettings::default(),
    };

    let from_cli = PartialSettings {
        src_host: args.src_host,
        src_port: args.src_port,
        src_db: args.src_db,
        dst_host: args.dst_host,
        dst_port: args.dst_port,
        dst_db: args.dst_db,
        user: args.admin_user,
        password: args.admin_password,
        scp_user: args.scp_user,
        identity_file: args.identity_file,
        src_base_dir: args.src_base_dir,
        dst_base_dir: args.dst_base_dir,
        workers: args.workers,
        transfer_retries: args.transfer_retries,
        retry_delay: args.retry_delay,
    };

    MigrationSettings::resolve(from_cli.merged_over(from_file))
}
