mod engine;
mod model;
mod ui;

use std::io;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::engine::llm_client::{HttpTransport, InferenceClient};
use crate::ui::settings_io;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let api_key = settings_io::api_key_from_env()?;
    let settings = settings_io::load_settings();

    let transport = HttpTransport::new(&settings.api_url, api_key, settings.request_timeout())
        .context("failed to set up the narrator connection")?;
    let client = InferenceClient::new(transport, settings.model.clone());

    let stdin = io::stdin();
    let stdout = io::stdout();
    ui::terminal::run(client, &mut stdin.lock(), &mut stdout.lock())?;

    Ok(())
}
