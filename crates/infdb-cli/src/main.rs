mod import;
mod users;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::users::UsersCommands;

#[derive(Debug, Parser)]
#[command(name = "infdb-cli")]
#[command(about = "Influencer database command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Manage API users and their bearer tokens
    Users {
        #[command(subcommand)]
        command: UsersCommands,
    },
    /// Import influencers from a CSV or Excel file
    Import {
        /// Path to a .csv, .xlsx or .xls file
        path: PathBuf,
        /// User recorded as the uploader of the batch
        #[arg(long)]
        username: String,
        /// JSON file mapping field names to headers, overriding auto-mapping
        #[arg(long)]
        mapping: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("infdb-cli: no command given; run with --help for usage");
        return Ok(());
    };

    let config = infdb_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = infdb_db::PoolConfig::from_app_config(&config);
    let pool = infdb_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Db {
            command: DbCommands::Ping,
        } => {
            infdb_db::ping(&pool).await?;
            println!("database ok");
        }
        Commands::Db {
            command: DbCommands::Migrate,
        } => {
            let applied = infdb_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        Commands::Users { command } => users::run(&pool, &config, command).await?,
        Commands::Import {
            path,
            username,
            mapping,
        } => import::run_import_file(&pool, &path, &username, mapping.as_deref()).await?,
    }

    Ok(())
}
