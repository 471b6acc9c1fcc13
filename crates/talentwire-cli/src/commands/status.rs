//! Status command.

use std::path::Path;
use talentwire_core::HealthStatus;
use talentwire_gateway::build_state;

/// Probe every configured provider and print delivery counters.
pub async fn run(config_path: &Path) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let state = build_state(&config).await?;

    let health = state.registry.health_check().await;
    if health.is_empty() {
        println!("no providers configured");
    } else {
        let mut instances: Vec<_> = health.iter().collect();
        instances.sort_by(|a, b| a.0.cmp(b.0));
        println!("providers:");
        for (instance, report) in instances {
            match report.status {
                HealthStatus::Healthy | HealthStatus::Degraded => {
                    let latency = report.latency_ms.unwrap_or(0);
                    println!("  {:<28} healthy ({}ms)", instance, latency);
                }
                HealthStatus::Unhealthy | HealthStatus::Unknown => {
                    let error = report.error.as_deref().unwrap_or("unknown error");
                    println!("  {:<28} unhealthy: {}", instance, error);
                }
            }
        }
    }

    let stats = state.delivery_log.stats().await;
    println!("deliveries:");
    println!("  pending     {}", stats.pending);
    println!("  in-progress {}", stats.in_progress);
    println!("  delivered   {}", stats.delivered);
    println!("  failed      {}", stats.failed);
    println!("  dropped     {}", stats.dropped);
    println!("  suppressed  {}", stats.suppressed);

    Ok(())
}
