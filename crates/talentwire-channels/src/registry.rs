//! Provider registry keyed by business unit and channel.

use crate::error::ChannelError;
use crate::traits::MessageProvider;
use crate::Result;
use std::collections::HashMap;
use std::sync::Arc;
use talentwire_core::types::{BusinessUnit, ChannelKind, ProviderHealth};
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Registry of provider instances, indexed by `(business unit, channel)`.
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    inner: RwLock<RegistryInner>,
}

#[derive(Debug, Default)]
struct RegistryInner {
    providers: HashMap<String, Arc<dyn MessageProvider>>,
    index: HashMap<(BusinessUnit, ChannelKind), String>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider for a business unit.
    ///
    /// Fails if the unit already has a provider for the same channel.
    pub async fn register(
        &self,
        unit: BusinessUnit,
        provider: Arc<dyn MessageProvider>,
    ) -> Result<()> {
        let mut inner = self.inner.write().await;
        let key = (unit.clone(), provider.kind());
        let instance_id = provider.instance_id().to_string();

        if inner.index.contains_key(&key) {
            return Err(ChannelError::AlreadyExists(format!(
                "{}/{}",
                unit,
                provider.kind()
            )));
        }
        if inner.providers.contains_key(&instance_id) {
            return Err(ChannelError::AlreadyExists(instance_id));
        }

        info!(unit = %unit, channel = %provider.kind(), instance = %instance_id, "registered provider");
        inner.index.insert(key, instance_id.clone());
        inner.providers.insert(instance_id, provider);
        Ok(())
    }

    /// Remove a provider by instance ID.
    pub async fn unregister(&self, instance_id: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.providers.remove(instance_id).is_none() {
            return Err(ChannelError::not_found(instance_id));
        }
        inner.index.retain(|_, id| id != instance_id);
        info!(instance = %instance_id, "unregistered provider");
        Ok(())
    }

    /// Get the provider serving a unit/channel pair.
    pub async fn get(
        &self,
        unit: &BusinessUnit,
        kind: ChannelKind,
    ) -> Option<Arc<dyn MessageProvider>> {
        let inner = self.inner.read().await;
        inner
            .index
            .get(&(unit.clone(), kind))
            .and_then(|id| inner.providers.get(id))
            .cloned()
    }

    /// Channels configured for a business unit.
    pub async fn configured_kinds(&self, unit: &BusinessUnit) -> Vec<ChannelKind> {
        let inner = self.inner.read().await;
        inner
            .index
            .keys()
            .filter(|(u, _)| u == unit)
            .map(|(_, kind)| *kind)
            .collect()
    }

    /// All registered instance IDs.
    pub async fn list(&self) -> Vec<String> {
        self.inner.read().await.providers.keys().cloned().collect()
    }

    /// Number of registered providers.
    pub async fn count(&self) -> usize {
        self.inner.read().await.providers.len()
    }

    /// Probe health of every provider.
    pub async fn health_check(&self) -> HashMap<String, ProviderHealth> {
        let providers: Vec<(String, Arc<dyn MessageProvider>)> = {
            let inner = self.inner.read().await;
            inner
                .providers
                .iter()
                .map(|(id, p)| (id.clone(), p.clone()))
                .collect()
        };

        let mut health_map = HashMap::new();
        for (id, provider) in providers {
            let health = match provider.health().await {
                Ok(health) => health,
                Err(e) => {
                    warn!(instance = %id, error = %e, "health probe failed");
                    ProviderHealth::unhealthy(e.to_string())
                }
            };
            health_map.insert(id, health);
        }
        health_map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ProviderReceipt;
    use async_trait::async_trait;
    use talentwire_core::types::OutboundMessage;

    #[derive(Debug)]
    struct StubProvider {
        kind: ChannelKind,
        instance: String,
    }

    #[async_trait]
    impl MessageProvider for StubProvider {
        fn kind(&self) -> ChannelKind {
            self.kind
        }

        fn instance_id(&self) -> &str {
            &self.instance
        }

        async fn send(&self, _message: &OutboundMessage, _address: &str) -> Result<ProviderReceipt> {
            Ok(ProviderReceipt::new("stub"))
        }

        async fn health(&self) -> Result<ProviderHealth> {
            Ok(ProviderHealth::healthy(1))
        }
    }

    fn stub(kind: ChannelKind, instance: &str) -> Arc<dyn MessageProvider> {
        Arc::new(StubProvider {
            kind,
            instance: instance.to_string(),
        })
    }

    #[tokio::test]
    async fn test_register_and_get() {
        let registry = ProviderRegistry::new();
        let unit = BusinessUnit::new("huntred");
        registry
            .register(unit.clone(), stub(ChannelKind::Email, "huntred-email"))
            .await
            .unwrap();

        assert!(registry.get(&unit, ChannelKind::Email).await.is_some());
        assert!(registry.get(&unit, ChannelKind::Sms).await.is_none());
        assert_eq!(registry.count().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_registration_rejected() {
        let registry = ProviderRegistry::new();
        let unit = BusinessUnit::new("huntred");
        registry
            .register(unit.clone(), stub(ChannelKind::Email, "a"))
            .await
            .unwrap();
        let err = registry
            .register(unit, stub(ChannelKind::Email, "b"))
            .await
            .unwrap_err();
        assert!(matches!(err, ChannelError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_configured_kinds_scoped_by_unit() {
        let registry = ProviderRegistry::new();
        let huntred = BusinessUnit::new("huntred");
        let huntu = BusinessUnit::new("huntu");

        registry
            .register(huntred.clone(), stub(ChannelKind::Email, "r-email"))
            .await
            .unwrap();
        registry
            .register(huntred.clone(), stub(ChannelKind::WhatsApp, "r-wa"))
            .await
            .unwrap();
        registry
            .register(huntu.clone(), stub(ChannelKind::Sms, "u-sms"))
            .await
            .unwrap();

        let mut kinds = registry.configured_kinds(&huntred).await;
        kinds.sort_by_key(|k| k.as_str());
        assert_eq!(kinds, vec![ChannelKind::Email, ChannelKind::WhatsApp]);
        assert_eq!(registry.configured_kinds(&huntu).await, vec![ChannelKind::Sms]);
    }

    #[tokio::test]
    async fn test_unregister() {
        let registry = ProviderRegistry::new();
        let unit = BusinessUnit::new("huntred");
        registry
            .register(unit.clone(), stub(ChannelKind::Slack, "r-slack"))
            .await
            .unwrap();

        registry.unregister("r-slack").await.unwrap();
        assert!(registry.get(&unit, ChannelKind::Slack).await.is_none());
        assert!(registry.unregister("r-slack").await.is_err());
    }
}
