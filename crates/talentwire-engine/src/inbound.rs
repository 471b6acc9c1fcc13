//! Inbound message dispatch.
//!
//! Webhook handlers hand parsed messages here. The dispatcher asks the
//! chatbot for a reply and sends it back on the channel the message came
//! in on. Failures are logged, never propagated: webhook handlers must
//! stay cheap and always acknowledge.

use crate::chatbot::ChatbotEngine;
use std::sync::Arc;
use talentwire_channels::{DeliveryLog, ProviderRegistry};
use talentwire_core::types::{
    ContactId, DeliveryRecord, DeliveryState, InboundMessage, OutboundMessage,
};
use tracing::{debug, warn};

/// Routes inbound webhook messages to the chatbot and replies in place.
#[derive(Debug)]
pub struct InboundDispatcher {
    registry: Arc<ProviderRegistry>,
    bot: Arc<dyn ChatbotEngine>,
    delivery_log: Arc<DeliveryLog>,
}

impl InboundDispatcher {
    /// Create a dispatcher.
    pub fn new(
        registry: Arc<ProviderRegistry>,
        bot: Arc<dyn ChatbotEngine>,
        delivery_log: Arc<DeliveryLog>,
    ) -> Self {
        Self {
            registry,
            bot,
            delivery_log,
        }
    }

    /// Handle one inbound message end to end.
    ///
    /// Returns whether a reply went out. Never returns an error: webhook
    /// handlers call this after acknowledging the provider.
    pub async fn handle(&self, message: InboundMessage) -> bool {
        debug!(
            channel = %message.channel,
            unit = %message.business_unit,
            chat = %message.chat.id,
            "handling inbound message"
        );

        let Some(reply) = self.bot.respond(&message).await else {
            return false;
        };

        let Some(provider) = self
            .registry
            .get(&message.business_unit, message.channel)
            .await
        else {
            warn!(
                channel = %message.channel,
                unit = %message.business_unit,
                "no provider to carry chatbot reply"
            );
            return false;
        };

        let outbound = OutboundMessage::text(reply)
            .for_unit(message.business_unit.clone())
            .in_reply_to(message.id.as_str());

        // Chatbot replies are tracked like any other delivery, keyed by the
        // chat the candidate wrote from.
        let mut record = DeliveryRecord::pending(
            ContactId::new(format!("chat:{}", message.chat.id)),
            message.channel,
        );
        record.attempts = 1;

        match provider.send(&outbound, &message.chat.id).await {
            Ok(receipt) => {
                record.state = DeliveryState::Delivered;
                record.provider_message_id = Some(receipt.provider_message_id);
                self.delivery_log.record(record).await;
                true
            }
            Err(e) => {
                warn!(
                    channel = %message.channel,
                    chat = %message.chat.id,
                    error = %e,
                    "chatbot reply failed"
                );
                record.state = DeliveryState::Failed;
                record.error = Some(e.to_string());
                self.delivery_log.record(record).await;
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chatbot::IntentBot;
    use async_trait::async_trait;
    use chrono::Utc;
    use talentwire_channels::traits::{MessageProvider, ProviderReceipt};
    use talentwire_core::types::{
        BusinessUnit, ChannelKind, ChatInfo, ProviderHealth, SenderInfo,
    };
    use talentwire_core::MessageId;
    use tokio::sync::Mutex;

    #[derive(Debug)]
    struct CapturingProvider {
        kind: ChannelKind,
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl MessageProvider for CapturingProvider {
        fn kind(&self) -> ChannelKind {
            self.kind
        }

        fn instance_id(&self) -> &str {
            "capture"
        }

        async fn send(
            &self,
            message: &OutboundMessage,
            address: &str,
        ) -> talentwire_channels::Result<ProviderReceipt> {
            self.sent
                .lock()
                .await
                .push((address.to_string(), message.text.clone()));
            Ok(ProviderReceipt::new("reply-1"))
        }

        async fn health(&self) -> talentwire_channels::Result<ProviderHealth> {
            Ok(ProviderHealth::healthy(1))
        }
    }

    fn inbound(unit: &str, channel: ChannelKind, text: &str) -> InboundMessage {
        InboundMessage {
            id: MessageId::new("in-1"),
            timestamp: Utc::now(),
            channel,
            business_unit: BusinessUnit::new(unit),
            sender: SenderInfo {
                id: "u1".to_string(),
                ..Default::default()
            },
            chat: ChatInfo {
                id: "chat-9".to_string(),
                title: None,
            },
            text: text.to_string(),
            reply_to: None,
            metadata: serde_json::Value::Null,
        }
    }

    #[tokio::test]
    async fn test_reply_goes_back_on_same_channel() {
        let registry = Arc::new(ProviderRegistry::new());
        let provider = Arc::new(CapturingProvider {
            kind: ChannelKind::Telegram,
            sent: Mutex::new(Vec::new()),
        });
        registry
            .register(BusinessUnit::new("huntred"), provider.clone())
            .await
            .unwrap();

        let dispatcher = InboundDispatcher::new(
            registry,
            Arc::new(IntentBot::new()),
            Arc::new(DeliveryLog::new(10)),
        );

        let replied = dispatcher
            .handle(inbound("huntred", ChannelKind::Telegram, "hola"))
            .await;
        assert!(replied);

        let sent = provider.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "chat-9");
        assert!(!sent[0].1.is_empty());
    }

    #[tokio::test]
    async fn test_missing_provider_is_swallowed() {
        let dispatcher = InboundDispatcher::new(
            Arc::new(ProviderRegistry::new()),
            Arc::new(IntentBot::new()),
            Arc::new(DeliveryLog::new(10)),
        );

        let replied = dispatcher
            .handle(inbound("huntred", ChannelKind::Messenger, "hola"))
            .await;
        assert!(!replied);
    }
}
