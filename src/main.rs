//! `ecommerce-api` binary: load CSV files into SQLite, or serve the JSON API.
//!
//! ```bash
//! ecommerce-api load --users users.csv --orders orders.csv
//! ecommerce-api serve --bind 127.0.0.1:5000
//! ```

use clap::{Parser, Subcommand};
use ecommerce_api::{app, load_files, AppConfig, AppState, ConnectionFactory};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(name = "ecommerce-api")]
#[command(version, about = "E-commerce CSV loader and JSON API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recreate the users and orders tables from CSV files
    Load {
        /// Users CSV (defaults to USERS_CSV or users.csv)
        #[arg(long)]
        users: Option<PathBuf>,

        /// Orders CSV (defaults to ORDERS_CSV or orders.csv)
        #[arg(long)]
        orders: Option<PathBuf>,

        /// SQLite file (defaults to DATABASE_PATH or ecommerce.db)
        #[arg(long)]
        database: Option<PathBuf>,
    },
    /// Run the HTTP server
    Serve {
        /// Listen address (defaults to BIND_ADDR or 0.0.0.0:5000)
        #[arg(long)]
        bind: Option<SocketAddr>,

        #[arg(long)]
        database: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("ecommerce_api=info,tower_http=info")
            }),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        tracing::error!("command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::from_env()?;
    match cli.command {
        Commands::Load {
            users,
            orders,
            database,
        } => {
            config.users_csv = users.unwrap_or(config.users_csv);
            config.orders_csv = orders.unwrap_or(config.orders_csv);
            config.database_path = database.unwrap_or(config.database_path);

            let factory = ConnectionFactory::create(&config.database_path);
            let report = load_files(&factory, &config.users_csv, &config.orders_csv).await?;
            tracing::info!(
                database = %config.database_path.display(),
                users = report.users.loaded,
                orders = report.orders.loaded,
                "load complete"
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Serve { bind, database } => {
            config.bind_addr = bind.unwrap_or(config.bind_addr);
            config.database_path = database.unwrap_or(config.database_path);
            if !config.database_path.exists() {
                tracing::warn!(
                    database = %config.database_path.display(),
                    "database file not found; run `ecommerce-api load` first"
                );
            }

            let state = AppState::new(ConnectionFactory::open(&config.database_path));
            let router = app(state, &config);
            let listener = TcpListener::bind(config.bind_addr).await?;
            tracing::info!("listening on http://{}", listener.local_addr()?);
            axum::serve(listener, router).await?;
        }
    }
    Ok(())
}
