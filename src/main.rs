use actix_web::{App, HttpServer};
use clap::Parser;
use sqlx::{Pool, Postgres};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, filter::LevelFilter};

use job_store::api;
use job_store::cli::{self, Cli, Command};
use job_store::config::Config;
use job_store::db;
use job_store::shutdown::ShutdownCoordinator;
use job_store::JobService;

/// Console output plus daily rotating files per level
/// (logs/info.log.2024-12-22, logs/error.log.2024-12-22, ...)
fn init_tracing(log_dir: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());

    let info_file = tracing_appender::rolling::daily(log_dir, "info.log");
    let warn_file = tracing_appender::rolling::daily(log_dir, "warn.log");
    let error_file = tracing_appender::rolling::daily(log_dir, "error.log");
    let debug_file = tracing_appender::rolling::daily(log_dir, "debug.log");

    let info_layer = tracing_subscriber::fmt::layer()
        .with_writer(info_file)
        .with_ansi(false)
        .with_filter(LevelFilter::INFO);

    let warn_layer = tracing_subscriber::fmt::layer()
        .with_writer(warn_file)
        .with_ansi(false)
        .with_filter(LevelFilter::WARN);

    let error_layer = tracing_subscriber::fmt::layer()
        .with_writer(error_file)
        .with_ansi(false)
        .with_filter(LevelFilter::ERROR);

    let debug_layer = tracing_subscriber::fmt::layer()
        .with_writer(debug_file)
        .with_ansi(false)
        .with_filter(LevelFilter::DEBUG);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(info_layer)
        .with(warn_layer)
        .with(error_layer)
        .with(debug_layer)
        .init();
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env().map_err(std::io::Error::other)?;

    std::fs::create_dir_all(&config.log_dir)?;
    init_tracing(&config.log_dir);

    let pool = db::connection::get_connection(&config.database_url, config.max_db_connections)
        .await
        .map_err(|e| {
            error!("Failed to connect to database: {}", e);
            std::io::Error::other(e)
        })?;
    info!("Database connection pool established (max {} connections)", config.max_db_connections);

    db::migrations::run_migrations(&pool).await.map_err(|e| {
        error!("Failed to run database migrations: {}", e);
        std::io::Error::other(e)
    })?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, pool).await,
        Command::Migrate => {
            pool.close().await;
            Ok(())
        }
        Command::Import { path, category } => {
            let service = JobService::new(pool.clone());
            let result = cli::import(&service, &path, category.as_deref()).await;
            pool.close().await;

            let summary = result.map_err(|e| {
                error!("Import failed: {}", e);
                std::io::Error::other(e)
            })?;
            info!("{}", summary.message);
            for failed in &summary.errors {
                info!("  rejected {}: {}", failed.link, failed.errors.join("; "));
            }
            Ok(())
        }
    }
}

async fn serve(config: Config, pool: Pool<Postgres>) -> std::io::Result<()> {
    info!("Starting job-store service");
    info!("  - Max payload size: {} bytes", config.max_payload_size);
    info!("  - Max database connections: {}", config.max_db_connections);

    let server_pool = pool.clone();
    let max_payload_size = config.max_payload_size;

    let server = HttpServer::new(move || {
        App::new().configure(api::configure(server_pool.clone(), max_payload_size))
    });

    info!("Server starting on http://{}:{}", config.server_host, config.server_port);

    let server = server
        .bind((config.server_host.as_str(), config.server_port))?
        .run();

    let server_handle = server.handle();
    let server_task = actix_web::rt::spawn(server);

    ShutdownCoordinator::new(server_handle, server_task, pool)
        .wait_for_shutdown()
        .await
}
