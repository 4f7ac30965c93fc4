use std::{error::Error, path::PathBuf};

use clap::Parser;
use tokio::net::TcpListener;
use unistate_users::{
    config::{ServerConfig, DEFAULT_CONFIG_PATH},
    db::UserRepository,
    init_tracing,
    routes::{build_router, AppState},
};

/// Users CRUD backend.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Address to listen on.
    #[arg(long)]
    bind: Option<String>,
    /// SQLite database file.
    #[arg(long)]
    database: Option<PathBuf>,
    /// Value of `Access-Control-Allow-Origin`.
    #[arg(long)]
    allow_origin: Option<String>,
}

impl Cli {
    fn apply(self, config: &mut ServerConfig) {
        if let Some(bind) = self.bind {
            config.bind_addr = bind;
        }
        if let Some(database) = self.database {
            config.database = database;
        }
        if let Some(allow_origin) = self.allow_origin {
            config.allow_origin = allow_origin;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing("info");
    let cli = Cli::parse();
    let mut config = ServerConfig::load(&cli.config)?;
    cli.apply(&mut config);
    config.validate()?;

    let repo = UserRepository::open(&config.database)?;
    let state = AppState::new(repo, &config)?;
    let listener = TcpListener::bind(config.socket_addr()?).await?;
    tracing::info!(addr = %listener.local_addr()?, database = %config.database.display(), "listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
