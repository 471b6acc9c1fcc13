//! Send command.

use clap::Args;
use std::path::Path;
use talentwire_core::{BusinessUnit, MessagePriority};
use talentwire_engine::NotificationRequest;
use talentwire_gateway::build_state;

/// Send command arguments.
#[derive(Args)]
pub struct SendArgs {
    /// Contact ID of the recipient
    pub recipient: String,

    /// Template to render
    #[arg(short, long, conflicts_with = "text")]
    pub template: Option<String>,

    /// Raw message text (instead of a template)
    #[arg(long)]
    pub text: Option<String>,

    /// Subject line for channels that support one
    #[arg(short, long)]
    pub subject: Option<String>,

    /// Template variable as name=value (repeatable)
    #[arg(long = "var")]
    pub var: Vec<String>,

    /// Priority (low, normal, high, urgent, critical)
    #[arg(short, long, default_value = "normal")]
    pub priority: String,

    /// Business unit override
    #[arg(short, long)]
    pub unit: Option<String>,
}

/// Dispatch a single notification and print the outcome.
pub async fn run(config_path: &Path, args: SendArgs) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let state = build_state(&config).await?;

    let priority = MessagePriority::parse(&args.priority)
        .ok_or_else(|| anyhow::anyhow!("invalid priority: {}", args.priority))?;

    let mut request = match (&args.template, &args.text) {
        (Some(template), _) => {
            let mut req = NotificationRequest::template(args.recipient.as_str(), template.as_str());
            for var in &args.var {
                let (name, value) = var
                    .split_once('=')
                    .ok_or_else(|| anyhow::anyhow!("invalid variable (expected name=value): {}", var))?;
                req = req.with_var(name, value);
            }
            req
        }
        (None, Some(text)) => NotificationRequest::text(args.recipient.as_str(), text.as_str()),
        (None, None) => anyhow::bail!("either --template or --text is required"),
    };

    request = request.with_priority(priority);
    if let Some(unit) = &args.unit {
        request = request.for_unit(BusinessUnit::new(unit));
    }
    if let Some(subject) = &args.subject {
        if let talentwire_engine::NotificationContent::Text { subject: s, .. } =
            &mut request.content
        {
            *s = Some(subject.clone());
        }
    }

    let outcome = state.engine.notify(request).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if !outcome.delivered() {
        anyhow::bail!("notification was not delivered");
    }
    Ok(())
}
