//! # Chat Node
//!
//! Entry point: opens the ledger in `CHAT_DATA_DIR` and serves JSON-lines
//! requests from stdin until it closes.

use std::sync::Arc;

use anyhow::{Context, Result};
use chat_ledger::adapters::{FileBackedKVStore, RecordingPublisher};
use chat_ledger::ports::inbound::LedgerQueries;
use chat_ledger::ports::outbound::SystemTimeSource;
use chat_ledger::service::ChatLedger;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use chat_node::{load_config, serve, RequestHandler};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging. Stdout is the response channel, so logs go to stderr.
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load configuration
    let config = load_config().context("loading configuration")?;
    let path = config.ledger_path();
    if !path.exists() {
        // Only a new ledger reads its settings from the environment.
        config.validate().context("initializing a new ledger")?;
    }

    // Open the ledger
    let store = FileBackedKVStore::open(&path)
        .with_context(|| format!("opening ledger store at {}", path.display()))?;
    let events = Arc::new(RecordingPublisher::new());
    let ledger = ChatLedger::open(store, SystemTimeSource, Arc::clone(&events), config.ledger)
        .context("opening ledger")?;

    info!(
        path = %path.display(),
        owner = %ledger.get_owner()?,
        message_fee = %ledger.get_message_fee()?,
        version = ledger.get_version(),
        "Chat node ready"
    );

    // Serve until stdin closes
    let handler = RequestHandler::new(ledger, events);
    let handled = serve(
        &handler,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await?;

    info!(handled, "Chat node stopped");
    Ok(())
}
