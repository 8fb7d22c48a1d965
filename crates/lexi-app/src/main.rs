use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use lexi_store::{JsonFileStore, KeyValueStore};
use tracing_subscriber::EnvFilter;

mod controller;
mod events;
mod interaction;
mod io;
mod page;
mod profile;
mod state;
mod ui;

#[cfg(test)]
mod tests;

use self::controller::AppController;
use self::state::ContentState;

#[derive(Parser, Debug)]
#[command(name = "leximind", version, about = "Highlight saved vocabulary in page text")]
struct Args {
    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Vocabulary store file, overrides the config
    #[arg(long)]
    store: Option<PathBuf>,

    /// Text file to load as the initial page
    #[arg(long)]
    page: Option<PathBuf>,

    /// Start with highlighting on regardless of the stored flag
    #[arg(long)]
    activate: bool,

    /// Write the effective config to PATH and exit
    #[arg(long, value_name = "PATH")]
    write_config: Option<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LEXI_LOG_JSON").is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));

    // stdout belongs to the console UI
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.with_ansi(atty::is(atty::Stream::Stderr)).init();
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing();

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(run(args));
    // A pending stdin read cannot be cancelled; don't wait for it
    runtime.shutdown_timeout(Duration::from_millis(200));
    result
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut config = profile::load_config(args.config.as_deref())?;
    if let Some(store) = &args.store {
        config.store.path = store.display().to_string();
    }
    if let Some(path) = &args.write_config {
        return profile::write_config(path, &config);
    }

    let backend = open_store(&config.store.path).await;
    let capacity = config.event_capacity;
    let mut state = ContentState::new(config, backend);
    state.start_active = args.activate;
    if let Some(page) = &args.page {
        page::load_page(&mut state.doc, page)?;
    }

    let controller = AppController::new(capacity);
    let mut tasks = controller.spawn_tasks(state, None);
    controller.spawn_console(&mut tasks);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown requested");
        }
        Some(result) = tasks.join_next() => {
            match result {
                Ok(Ok(())) => tracing::info!("Task finished, shutting down"),
                Ok(Err(e)) => tracing::error!("Task failed: {e}"),
                Err(e) => tracing::error!("Task panicked: {e}"),
            }
        }
    }

    controller.shutdown();
    while let Some(result) = tasks.join_next().await {
        if let Ok(Err(e)) = result {
            tracing::warn!("Task ended with error during shutdown: {e}");
        }
    }
    Ok(())
}

/// A store that cannot be opened degrades to running without one
async fn open_store(path: &str) -> Option<Arc<dyn KeyValueStore>> {
    match JsonFileStore::open(path).await {
        Ok(store) => {
            tracing::info!("Using vocabulary store {}", store.path().display());
            Some(Arc::new(store))
        }
        Err(e) => {
            tracing::error!("Cannot open store {}: {}", path, e);
            None
        }
    }
}
