use anyhow::Context;
use clap::{Parser, Subcommand};
use poem::{Server, listener::TcpListener};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use sms_gateway::{
    application::services::{event_dispatcher::EventDispatcherConfig, jwt::JwtService},
    build_app,
    config::Config,
    container::{Container, Repositories},
    infrastructure::repositories::postgres::PgPool,
};

/// HTTP gateway that queues SMS messages for Android phones to send.
#[derive(Parser, Debug)]
#[command(name = "sms-gateway")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Apply database migrations and exit
    Migrate,
    /// Print a bearer token for the given phone number
    IssueToken {
        #[arg(long)]
        owner: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();
    let config = Config::try_parse().map_err(anyhow::Error::msg)?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Migrate => {
            let pool = connect(&config)
                .await?
                .context("DATABASE_URL is required to run migrations")?;
            migrate(&pool).await
        }
        Command::IssueToken { owner } => {
            let token = JwtService::new(config.jwt).issue(&owner)?;
            println!("{token}");
            Ok(())
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting sms-gateway v{}", env!("CARGO_PKG_VERSION"));

    let pool = connect(&config).await?;
    let repositories = match &pool {
        Some(pool) => {
            migrate(pool).await?;
            Repositories::postgres(pool.clone())
        }
        None => {
            tracing::warn!("DATABASE_URL not set, messages are kept in memory");
            Repositories::in_memory()
        }
    };

    let container = Container::build(
        repositories,
        config.jwt.clone(),
        EventDispatcherConfig {
            handler_timeout: config.handler_timeout,
        },
    )
    .await;

    let server_url = config.server_url();
    let app = build_app(container.state.clone(), &server_url);

    tracing::info!("Starting HTTP server at {server_url}");
    Server::new(TcpListener::bind(format!("0.0.0.0:{}", config.port)))
        .run(app)
        .await?;

    if let Some(pool) = pool {
        tracing::info!("Closing database connections...");
        pool.close().await;
    }
    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn connect(config: &Config) -> anyhow::Result<Option<PgPool>> {
    let Some(database_url) = &config.database_url else {
        return Ok(None);
    };

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(database_url)
        .await
        .inspect_err(|e| tracing::error!("Failed to connect to database: {e}"))?;
    tracing::info!("Database connection established");
    Ok(Some(pool))
}

async fn migrate(pool: &PgPool) -> anyhow::Result<()> {
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .inspect_err(|e| tracing::error!("Failed to run migrations: {e}"))?;
    tracing::info!("Migrations completed successfully");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
