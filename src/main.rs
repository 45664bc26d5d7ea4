use clap::Parser;
use snippets_backend::db;
use snippets_backend::db::services::user_service;
use snippets_backend::server::config::ServerConfig;
use snippets_backend::version::VERSION;
use snippets_backend::web;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version = VERSION, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<String>,
}

fn init_logging(log_dir: &str) -> WorkerGuard {
    // Log to a file: JSON format, daily rotation
    let file_appender = rolling::daily(log_dir, "server.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .json();

    // Log to stdout: human-readable format
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sea_orm=warn,sqlx::query=warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    guard
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal.");
    }
    info!("Shutdown signal received.");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    // Logging needs the log directory, so configuration comes first.
    let server_config = Arc::new(ServerConfig::load(args.config.as_deref())?);
    let _log_guard = init_logging(&server_config.log_dir);
    info!("Starting server, version: {}", VERSION);

    let db_pool = match db::connect(&server_config).await {
        Ok(pool) => pool,
        Err(e) => {
            error!(error = %e, "Failed to initialise the database.");
            return Err(e.into());
        }
    };

    match user_service::sync_admin_roles(&db_pool, &server_config.admin_usernames).await {
        Ok((promoted, demoted)) => {
            info!(promoted, demoted, "Admin roles synced with configuration.");
        }
        Err(e) => {
            error!(error = %e, "Failed to sync admin roles.");
            return Err(e.into());
        }
    }

    let addr: SocketAddr = server_config.listen_addr.parse()?;
    let app = web::create_axum_router(db_pool, server_config.clone());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, "HTTP server listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped.");
    Ok(())
}
