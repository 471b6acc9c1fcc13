//! Wiring: build the shared application state from configuration.
//!
//! Each business unit gets one provider instance per configured channel.
//! Concrete webhook providers (WhatsApp, Telegram, Messenger) are kept in
//! typed maps alongside the registry so handlers can run verification and
//! payload parsing without downcasting.

use crate::{GatewayError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use talentwire_channels::messenger::MessengerProvider;
use talentwire_channels::sms::SmsProvider;
use talentwire_channels::telegram::TelegramProvider;
use talentwire_channels::whatsapp::WhatsAppProvider;
use talentwire_channels::{
    email::EmailProvider, slack::SlackProvider, teams::TeamsProvider, DeliveryLog,
    ProviderRegistry, RetryPolicy, TemplateStore,
};
use talentwire_core::types::BusinessUnit;
use talentwire_core::Config;
use talentwire_engine::{
    BulkDispatcher, ContactDirectory, InboundDispatcher, IntentBot, MessagingEngine,
};
use tracing::info;
use url::Url;

/// Shared state behind the axum router.
#[derive(Debug)]
pub struct AppState {
    /// Dispatch engine.
    pub engine: Arc<MessagingEngine>,

    /// Bulk campaign dispatcher.
    pub bulk: BulkDispatcher,

    /// Inbound webhook dispatcher.
    pub inbound: Arc<InboundDispatcher>,

    /// Provider registry.
    pub registry: Arc<ProviderRegistry>,

    /// Delivery log shared with the engine.
    pub delivery_log: Arc<DeliveryLog>,

    /// WhatsApp providers by unit, for webhook verify/parse.
    pub whatsapp: HashMap<BusinessUnit, Arc<WhatsAppProvider>>,

    /// Telegram providers by unit.
    pub telegram: HashMap<BusinessUnit, Arc<TelegramProvider>>,

    /// Messenger providers by unit.
    pub messenger: HashMap<BusinessUnit, Arc<MessengerProvider>>,
}

/// Build application state from a loaded configuration.
pub async fn build_state(config: &Config) -> Result<Arc<AppState>> {
    let registry = Arc::new(ProviderRegistry::new());
    let mut whatsapp = HashMap::new();
    let mut telegram = HashMap::new();
    let mut messenger = HashMap::new();

    for (name, unit_cfg) in &config.units {
        let unit = BusinessUnit::new(name.clone());

        if let Some(wa) = &unit_cfg.whatsapp {
            let provider = Arc::new(WhatsAppProvider::new(
                wa.phone_number_id.clone(),
                wa.access_token.clone(),
                wa.verify_token.clone(),
                unit.clone(),
            ));
            registry
                .register(unit.clone(), provider.clone())
                .await
                .map_err(|e| GatewayError::Internal(e.to_string()))?;
            whatsapp.insert(unit.clone(), provider);
        }

        if let Some(tg) = &unit_cfg.telegram {
            let provider = Arc::new(TelegramProvider::new(
                tg.bot_token.clone(),
                tg.webhook_secret.clone(),
                unit.clone(),
            ));
            registry
                .register(unit.clone(), provider.clone())
                .await
                .map_err(|e| GatewayError::Internal(e.to_string()))?;
            telegram.insert(unit.clone(), provider);
        }

        if let Some(fb) = &unit_cfg.messenger {
            let provider = Arc::new(MessengerProvider::new(
                fb.page_access_token.clone(),
                fb.app_secret.clone(),
                fb.verify_token.clone(),
                unit.clone(),
            ));
            registry
                .register(unit.clone(), provider.clone())
                .await
                .map_err(|e| GatewayError::Internal(e.to_string()))?;
            messenger.insert(unit.clone(), provider);
        }

        if let Some(sms) = &unit_cfg.sms {
            registry
                .register(
                    unit.clone(),
                    Arc::new(SmsProvider::new(
                        sms.account_sid.clone(),
                        sms.auth_token.clone(),
                        sms.from_number.clone(),
                        unit.clone(),
                    )),
                )
                .await
                .map_err(|e| GatewayError::Internal(e.to_string()))?;
        }

        if let Some(email) = &unit_cfg.email {
            registry
                .register(
                    unit.clone(),
                    Arc::new(EmailProvider::new(
                        email.api_key.clone(),
                        email.from_address.clone(),
                        email.from_name.clone(),
                        unit.clone(),
                    )),
                )
                .await
                .map_err(|e| GatewayError::Internal(e.to_string()))?;
        }

        if let Some(slack) = &unit_cfg.slack {
            registry
                .register(
                    unit.clone(),
                    Arc::new(SlackProvider::new(slack.bot_token.clone(), unit.clone())),
                )
                .await
                .map_err(|e| GatewayError::Internal(e.to_string()))?;
        }

        if let Some(teams) = &unit_cfg.teams {
            let url = Url::parse(&teams.webhook_url)
                .map_err(|e| GatewayError::Internal(format!("teams webhook URL: {e}")))?;
            registry
                .register(unit.clone(), Arc::new(TeamsProvider::new(url, unit.clone())))
                .await
                .map_err(|e| GatewayError::Internal(e.to_string()))?;
        }
    }

    let contacts = match &config.contacts_file {
        Some(path) => Arc::new(ContactDirectory::load(path)?),
        None => Arc::new(ContactDirectory::new()),
    };

    let delivery_log = Arc::new(DeliveryLog::new(config.dispatch.delivery_log_capacity));
    let engine = Arc::new(MessagingEngine::new(
        registry.clone(),
        contacts,
        TemplateStore::with_defaults(),
        delivery_log.clone(),
        RetryPolicy::from_settings(&config.dispatch),
    ));
    let bulk = BulkDispatcher::new(
        engine.clone(),
        config.dispatch.bulk_batch_size,
        config.dispatch.bulk_concurrency,
    );
    let inbound = Arc::new(InboundDispatcher::new(
        registry.clone(),
        Arc::new(IntentBot::new()),
        delivery_log.clone(),
    ));

    info!(
        units = config.units.len(),
        providers = registry.count().await,
        "gateway state built"
    );

    Ok(Arc::new(AppState {
        engine,
        bulk,
        inbound,
        registry,
        delivery_log,
        whatsapp,
        telegram,
        messenger,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use talentwire_core::config::{TelegramSettings, UnitConfig, WhatsAppSettings};
    use talentwire_core::SecretString;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.units.insert(
            "huntred".to_string(),
            UnitConfig {
                whatsapp: Some(WhatsAppSettings {
                    phone_number_id: "123".to_string(),
                    access_token: SecretString::new("tok"),
                    verify_token: SecretString::new("verify"),
                }),
                telegram: Some(TelegramSettings {
                    bot_token: SecretString::new("bot"),
                    webhook_secret: SecretString::new("hook"),
                }),
                ..Default::default()
            },
        );
        config
    }

    #[tokio::test]
    async fn test_build_state_registers_providers() {
        let state = build_state(&test_config()).await.unwrap();
        assert_eq!(state.registry.count().await, 2);

        let unit = BusinessUnit::new("huntred");
        assert!(state.whatsapp.contains_key(&unit));
        assert!(state.telegram.contains_key(&unit));
        assert!(state.messenger.is_empty());
    }
}
