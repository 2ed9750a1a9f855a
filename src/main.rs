use anyhow::Context;
use mouse_smoother::{default_device, init_tracing, MouseSmoother, SmoothingConfig};
use std::path::PathBuf;

/// Environment variable naming a JSON config file
const CONFIG_ENV: &str = "MOUSE_SMOOTHER_CONFIG";

fn config_path() -> Option<PathBuf> {
    std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    tracing::info!("Starting Mouse Smoother v{}", env!("CARGO_PKG_VERSION"));

    let config = match config_path() {
        Some(path) => SmoothingConfig::from_json_file(&path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => SmoothingConfig::default(),
    };

    let device = default_device().context("no pointer device for this platform")?;
    let smoother = MouseSmoother::new(device, config)?;
    smoother.start().context("failed to start smoothing")?;
    tracing::info!("Status: {}", serde_json::to_string(&smoother.status())?);

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;

    tracing::info!("Final status: {}", serde_json::to_string(&smoother.status())?);
    smoother.stop();
    Ok(())
}
