//! triage-bot — console entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config
//!   3. Init logger (RUST_LOG beats the configured level)
//!   4. Load disease + medicine catalogs
//!   5. Build the chat backend
//!   6. Spawn Ctrl-C watcher, run the session loop
//!
//! Steps 4 and 5 are fatal on failure: no session starts without catalogs
//! and a working backend client.

use tokio_util::sync::CancellationToken;
use tracing::info;

use triage_bot::catalog::{DiseaseCatalog, MedicineCatalog};
use triage_bot::error::AppError;
use triage_bot::llm::providers;
use triage_bot::matcher::SymptomMatcher;
use triage_bot::session::ConversationSession;
use triage_bot::{config, logger};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present — ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let config = config::load()?;

    logger::init(&config.log_level)?;

    info!(
        bot_name = %config.bot_name,
        log_level = %config.log_level,
        provider = %config.llm.provider,
        model = %config.llm.openai.model,
        "config loaded"
    );

    let diseases = DiseaseCatalog::load(&config.catalog.diseases)?;
    let medicines = MedicineCatalog::load(&config.catalog.medicines)?;

    info!(
        diseases = diseases.len(),
        medicines = medicines.len(),
        "catalogs loaded"
    );

    let provider = providers::build(&config.llm, config.llm_api_key.clone())
        .map_err(|e| AppError::Llm(e.to_string()))?;

    let matcher = SymptomMatcher::new(&diseases);
    let mut session = ConversationSession::new(matcher, medicines, provider);

    // Shared shutdown token — Ctrl-C cancels it, the session loop watches it.
    let shutdown = CancellationToken::new();
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received — initiating shutdown");
            ctrlc_token.cancel();
        }
    });

    session.run(shutdown).await?;

    println!("Take care!");
    Ok(())
}
