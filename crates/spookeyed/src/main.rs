use anyhow::Result;
use spookeye_core::{DecorativeImage, Engine, EyeLayout};
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

mod config;
mod render_loop;
mod wire;

use config::Config;
use render_loop::{EngineHandle, RenderLoop, SnapshotPolicy};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("spookeyed starting");

    let config = Config::from_env();
    let layout = match &config.layout_path {
        Some(path) => EyeLayout::load(path)?,
        None => EyeLayout::default(),
    };

    let engine = Engine::raster(layout, config.engine_options(), &config.initial_size());
    let snapshots = SnapshotPolicy {
        path: config.snapshot_path.clone(),
        every: config.snapshot_every,
    };
    let (render_loop, handle) = RenderLoop::new(engine, config.refresh_interval(), snapshots);
    render_loop.start()?;

    tokio::spawn(load_image(config.image_path.clone(), handle.clone()));

    tracing::info!("spookeyed ready; reading face reports from stdin");

    let stdin = BufReader::new(tokio::io::stdin());
    tokio::select! {
        res = wire::pump(stdin, handle.clone()) => {
            let forwarded = res?;
            tracing::info!(messages = forwarded, "input closed");
        }
        res = tokio::signal::ctrl_c() => {
            res?;
            tracing::info!("interrupted");
        }
    }

    let status = handle.status().await?;
    tracing::info!(
        frames = status.frames,
        image_ready = status.image_ready,
        tracked_point = ?status.tracked_point,
        eyes = ?status.eyes,
        alert = status.alert,
        "final state"
    );

    handle.snapshot(config.snapshot_path.clone()).await?;
    tracing::info!("spookeyed shutting down");

    Ok(())
}

/// Decode the decorative image off the render task and hand it over when
/// ready. On failure the canvas keeps drawing without it.
async fn load_image(path: PathBuf, handle: EngineHandle) {
    let shown = path.display().to_string();
    let decoded = tokio::task::spawn_blocking(move || DecorativeImage::load(&path)).await;
    match decoded {
        Ok(Ok(image)) => {
            if let Err(e) = handle.image_ready(image).await {
                tracing::warn!(error = %e, "render loop gone before image was ready");
            }
        }
        Ok(Err(e)) => tracing::warn!(path = %shown, error = %e, "decorative image unavailable"),
        Err(e) => tracing::warn!(error = %e, "image loader panicked"),
    }
}
