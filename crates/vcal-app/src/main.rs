use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};
use vcal_core::config::load_config;
use vcal_core::error::CoreError;
use vcal_rfc::{ContentHint, ImportOptions, import};

fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("debug"));

    // Logs go to stderr so stdout carries only the JSON output
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    let config = load_config()?;

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping debug");
    }

    let path = std::env::args().nth(1).ok_or_else(|| {
        CoreError::InvalidInput("usage: vcal-import <file.vcs|file.ics>".to_string())
    })?;

    let bytes = std::fs::read(&path)
        .map_err(CoreError::from)
        .with_context(|| format!("Failed to read {path}"))?;
    let options = ImportOptions::new(ContentHint::from_path(&path))
        .with_default_timezone(config.import.default_timezone.as_str());

    tracing::info!(%path, hint = ?options.hint, "Importing calendar");
    let records = import(&bytes, &options)?;
    tracing::info!(count = records.len(), "Import finished");

    let json = if config.import.pretty {
        serde_json::to_string_pretty(&records)?
    } else {
        serde_json::to_string(&records)?
    };
    println!("{json}");

    Ok(())
}
