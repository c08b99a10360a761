use bookmarks::auth::ApiToken;
use bookmarks::config::{Cli, Config, Environment, default_config_dir, default_config_path};
use bookmarks::handler::AppState;
use bookmarks::validate::BookmarkValidator;
use bookmarks::{app, store};
use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

fn init_tracing(environment: Environment) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match environment {
        Environment::Production => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        Environment::Development => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

#[tokio::main]
async fn main() {
    let args = Cli::parse();
    let dotenv = dotenvy::dotenv();

    // With --config, data (the database file) lives next to the config file.
    // Otherwise both go under ~/.bookmarks/
    let (config_path, data_dir) = match args.config_path {
        Some(path) => {
            let path = std::path::PathBuf::from(path);
            let dir = path
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| std::path::PathBuf::from("."));
            (path, dir)
        }
        None => (default_config_path(), default_config_dir()),
    };

    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        eprintln!("failed to create data directory {:?}: {}", data_dir, e);
        std::process::exit(1);
    }

    let cfg = Config::new(&config_path.to_string_lossy()).unwrap_or_else(|e| {
        eprintln!("failed to load config file {:?}: {}", config_path, e);
        std::process::exit(1);
    });

    init_tracing(cfg.app.environment);
    tracing::info!(environment = ?cfg.app.environment, "bookmarks.svc starting");
    for var in cfg.unset_env_vars() {
        tracing::warn!("environment variable '{}' not found", var);
    }
    match dotenv {
        Ok(path) => tracing::info!(path = ?path, "loaded environment file"),
        Err(e) => tracing::debug!(error = %e, "no environment file loaded"),
    }

    let store = store::open(&cfg, &data_dir).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to setup bookmark store");
        std::process::exit(1);
    });

    let state = AppState::new(
        store,
        BookmarkValidator::new(cfg.validation.check_urls),
        cfg.app.environment,
    );
    let router = app(state, ApiToken::new(cfg.app.get_api_token()));

    let address = format!("0.0.0.0:{}", cfg.app.get_port());
    let listener = tokio::net::TcpListener::bind(&address).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to setup tcp listener");
        std::process::exit(1);
    });

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("ctrl+c signal received, preparing to shutdown");
                signal_token.cancel();
            }
            Err(e) => tracing::error!(error = %e, "failed to listen for ctrl+c"),
        }
    });

    tracing::info!("bookmarks.svc running on {}", &address);
    if let Err(err) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
    {
        tracing::error!(error = %err, "server error");
        std::process::exit(1);
    }

    tracing::info!("bookmarks.svc going off, graceful shutdown complete");
}
