mod config;
mod telemetry;

use anyhow::Context;
use clap::Parser;
use config::{CliArgs, Command, FetchConfig, RenderSettings};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use telemetry::init_tracing;
use transit_heatmap::{
    GoogleClientFactory, OverlayDocument, ResultStore, ResultsToCsv, fetch_results,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    init_tracing()?;

    match args.command {
        Command::Fetch { fetch, output } => {
            let config = FetchConfig::try_from(fetch)?;
            let store = fetch_store(config).await?;
            write_output(output.as_deref(), |out| store.write_json(out))
                .context("Failed to write result store")?;
        }
        Command::Render {
            input,
            render,
            output,
        } => {
            let settings = RenderSettings::try_from(render)?;
            let store = ResultStore::load(&input)
                .with_context(|| format!("Failed to read result store {}", input.display()))?;
            render_overlay(&store, settings, output.as_deref())?;
        }
        Command::Run {
            fetch,
            render,
            save,
            output,
        } => {
            let config = FetchConfig::try_from(fetch)?;
            let settings = RenderSettings::try_from(render)?;
            let store = fetch_store(config).await?;
            if let Some(path) = save {
                store
                    .save(&path)
                    .with_context(|| format!("Failed to save result store {}", path.display()))?;
                tracing::info!("Saved result store to {}", path.display());
            }
            render_overlay(&store, settings, output.as_deref())?;
        }
        Command::ExportCsv { input, output } => {
            let store = ResultStore::load(&input)
                .with_context(|| format!("Failed to read result store {}", input.display()))?;
            store
                .to_csv(&output)
                .with_context(|| format!("Failed to write CSV {}", output.display()))?;
            tracing::info!(rows = store.len(), "Exported {}", output.display());
        }
    }

    Ok(())
}

async fn fetch_store(config: FetchConfig) -> anyhow::Result<ResultStore> {
    tracing::info!(
        destination = %config.plan.destination,
        step_meters = config.plan.step_meters,
        workers = config.pipeline.worker_count(),
        batch_size = config.pipeline.max_batch_size(),
        "Fetching travel times"
    );
    let factory = GoogleClientFactory::new(config.api_key);
    fetch_results(factory, &config.plan, config.pipeline)
        .await
        .context("Failed to fetch travel times")
}

fn render_overlay(
    store: &ResultStore,
    settings: RenderSettings,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let document =
        OverlayDocument::render(store, &settings.config).context("Failed to build overlay")?;
    write_output(output, |out| settings.format.write(&document, out))
        .with_context(|| format!("Failed to write {} overlay", settings.format))?;
    tracing::info!(cells = store.len(), format = %settings.format, "Overlay written");
    Ok(())
}

/// Runs `write` against the output file, or stdout when no path is given.
fn write_output<F>(path: Option<&Path>, write: F) -> anyhow::Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<(), transit_heatmap::HeatmapError>,
{
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write(&mut writer)?;
            writer.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            write(&mut lock)?;
            lock.flush()?;
        }
    }
    Ok(())
}
