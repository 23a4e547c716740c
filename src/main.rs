use std::sync::Arc;

use clap::Parser;
use libreria::config::{Cli, Config, LogFormat, default_config_dir, default_config_path};
use libreria::db::Database;
use libreria::handler::AppState;
use tokio::signal;
use tracing_subscriber::EnvFilter;

fn init_tracing(cfg: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match cfg.log.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl+c");
        return;
    }
    tracing::info!("ctrl+c signal received, preparing to shutdown");
}

#[tokio::main]
async fn main() {
    let args = Cli::parse();
    let _ = dotenvy::dotenv();

    // The config file's directory doubles as the data directory.
    let (config_path, data_dir) = match args.config_path {
        Some(path) => {
            let path = std::path::PathBuf::from(path);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| std::path::PathBuf::from("."));
            (path, dir)
        }
        None => (default_config_path(), default_config_dir()),
    };

    let cfg = Config::new(&config_path).unwrap_or_else(|e| {
        eprintln!("failed to load config file {:?}: {}", config_path, e);
        std::process::exit(1);
    });

    init_tracing(&cfg);
    tracing::info!("libreria.svc starting");

    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::error!(error = %e, path = ?data_dir, "failed to create data directory");
        std::process::exit(1);
    }

    let db = Arc::new(Database::new(&cfg, &data_dir).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to setup database");
        std::process::exit(1);
    }));

    let address = cfg.app.get_address();
    let app = libreria::app(AppState { db });

    let listener = tokio::net::TcpListener::bind(&address).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to setup tcp listener");
        std::process::exit(1);
    });

    tracing::info!("libreria.svc running on {}", &address);
    if let Err(err) = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await {
        tracing::error!(error = %err, "server exited with error");
        std::process::exit(1);
    }

    tracing::info!("libreria.svc going off, graceful shutdown complete");
}
