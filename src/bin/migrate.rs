//! Schema migration tool.
//!
//! `migrate up` applies pending migrations to the configured database, over TLS
//! unless `DB_SSL_MODE` says otherwise outside production.
//! `migrate sql` and `migrate list` work offline from the embedded scripts.

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use todo_api::config::{ConfigError, DatabaseConfig};
use todo_api::db::{self, MIGRATOR};

#[derive(Parser)]
#[command(name = "migrate", version, about = "Manage the todo-api database schema")]
struct Cli {
    /// Database to migrate (needed by `up` only)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply every pending migration (online)
    Up,
    /// Print the migration SQL without connecting (offline)
    Sql,
    /// List embedded migrations
    List,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Up => match run_online(cli.database_url).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                log::error!("migration failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Sql => {
            for migration in MIGRATOR.iter() {
                println!("-- {} {}", migration.version, migration.description);
                println!("{}", migration.sql.trim_end());
                println!();
            }
            ExitCode::SUCCESS
        }
        Commands::List => {
            for migration in MIGRATOR.iter() {
                println!("{}\t{}", migration.version, migration.description);
            }
            ExitCode::SUCCESS
        }
    }
}

async fn run_online(database_url: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let url = database_url.ok_or(ConfigError::Missing("DATABASE_URL"))?;
    let mut config = DatabaseConfig::for_url(url)?;
    // A single connection is enough to migrate.
    config.pool_size = 1;
    config.max_overflow = 0;

    let pool = db::connect(&config).await?;
    db::run_migrations(&pool).await?;
    log::info!("database is up to date");
    pool.close().await;
    Ok(())
}
