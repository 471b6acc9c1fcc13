//! Serve command.

use clap::Args;
use std::path::Path;
use talentwire_core::config::BindMode;
use talentwire_gateway::{build_state, Gateway};
use tracing::info;

/// Serve command arguments.
#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Bind mode (loopback, lan)
    #[arg(short, long)]
    pub bind: Option<String>,
}

/// Run the webhook gateway.
pub async fn run(config_path: &Path, args: ServeArgs) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    config.validate()?;

    let mut settings = config.gateway.clone();
    if let Some(port) = args.port {
        settings.port = port;
    }
    if let Some(bind) = args.bind.as_deref() {
        settings.bind = match bind {
            "loopback" => BindMode::Loopback,
            "lan" => BindMode::Lan,
            _ => anyhow::bail!("invalid bind mode: {}", bind),
        };
    }

    let state = build_state(&config).await?;
    info!(
        units = config.units.len(),
        providers = state.registry.count().await,
        "starting gateway"
    );

    let gateway = Gateway::new(settings, state);
    gateway.serve().await?;
    Ok(())
}
