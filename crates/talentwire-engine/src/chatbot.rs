//! Candidate-facing chatbot.
//!
//! A small keyword-intent bot that answers the questions candidates
//! actually ask: greetings, application status, interview scheduling, and
//! handoff to a human recruiter. Per-chat session state tracks whether a
//! handoff was already requested so the bot stops repeating itself.

use async_trait::async_trait;
use std::collections::HashMap;
use talentwire_core::types::{BusinessUnit, InboundMessage};
use tokio::sync::RwLock;
use tracing::debug;

/// A chatbot that can answer inbound candidate messages.
#[async_trait]
pub trait ChatbotEngine: Send + Sync + std::fmt::Debug {
    /// Produce a reply for the message, or `None` to stay silent.
    async fn respond(&self, message: &InboundMessage) -> Option<String>;
}

/// Recognized candidate intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Greeting or conversation opener.
    Greeting,

    /// Question about application status.
    ApplicationStatus,

    /// Interview scheduling request.
    Schedule,

    /// Explicit request for a human recruiter.
    HumanHandoff,

    /// Anything the bot does not understand.
    Unknown,
}

impl Intent {
    /// Classify a message by keyword.
    pub fn classify(text: &str) -> Self {
        let lower = text.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| lower.contains(w));

        if has(&["hola", "buenos días", "buenas tardes", "buenas noches", "hello", "hi "])
            || lower.trim() == "hi"
        {
            Self::Greeting
        } else if has(&["estado", "estatus", "status", "postulación", "aplicación", "proceso"]) {
            Self::ApplicationStatus
        } else if has(&["entrevista", "agendar", "horario", "cita", "reagendar", "schedule"]) {
            Self::Schedule
        } else if has(&["humano", "persona", "reclutador", "asesor", "agente", "human"]) {
            Self::HumanHandoff
        } else {
            Self::Unknown
        }
    }
}

#[derive(Debug, Default, Clone)]
struct Session {
    turns: u32,
    handoff_requested: bool,
}

/// Keyword-intent chatbot with per-unit greetings.
#[derive(Debug, Default)]
pub struct IntentBot {
    greetings: HashMap<BusinessUnit, String>,
    sessions: RwLock<HashMap<String, Session>>,
}

impl IntentBot {
    /// Create a bot with the default greeting only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the greeting used for a business unit.
    pub fn with_greeting(mut self, unit: BusinessUnit, greeting: impl Into<String>) -> Self {
        self.greetings.insert(unit, greeting.into());
        self
    }

    fn greeting_for(&self, unit: &BusinessUnit) -> String {
        self.greetings.get(unit).cloned().unwrap_or_else(|| {
            "¡Hola! Soy el asistente de talento. Puedo informarte sobre el estado de tu \
             postulación o ayudarte a agendar una entrevista."
                .to_string()
        })
    }

    /// Session key: channel plus chat ID, so the same person on two
    /// channels gets two sessions.
    fn session_key(message: &InboundMessage) -> String {
        format!("{}:{}", message.channel, message.chat.id)
    }
}

#[async_trait]
impl ChatbotEngine for IntentBot {
    async fn respond(&self, message: &InboundMessage) -> Option<String> {
        if message.sender.is_bot {
            return None;
        }

        let intent = Intent::classify(&message.text);
        debug!(chat = %message.chat.id, ?intent, "classified inbound message");

        let key = Self::session_key(message);
        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(key).or_default();
        session.turns += 1;

        let reply = match intent {
            Intent::Greeting => self.greeting_for(&message.business_unit),
            Intent::ApplicationStatus => {
                "Tu postulación sigue activa. Un reclutador la está revisando y te \
                 avisaremos en cuanto haya novedades."
                    .to_string()
            }
            Intent::Schedule => {
                "Con gusto. Responde con dos o tres horarios que te funcionen y \
                 coordinamos la entrevista."
                    .to_string()
            }
            Intent::HumanHandoff => {
                if session.handoff_requested {
                    "Ya avisamos al equipo; te contactarán en breve.".to_string()
                } else {
                    session.handoff_requested = true;
                    "Entendido, te pongo en contacto con un reclutador. Te escribirá \
                     por este medio."
                        .to_string()
                }
            }
            Intent::Unknown => {
                "No estoy seguro de haber entendido. Puedo informarte sobre el estado \
                 de tu postulación, agendar una entrevista o contactarte con un \
                 reclutador."
                    .to_string()
            }
        };

        Some(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use talentwire_core::types::{ChannelKind, ChatInfo, SenderInfo};
    use talentwire_core::MessageId;

    fn inbound(text: &str) -> InboundMessage {
        InboundMessage {
            id: MessageId::new("m1"),
            timestamp: Utc::now(),
            channel: ChannelKind::WhatsApp,
            business_unit: BusinessUnit::new("huntred"),
            sender: SenderInfo {
                id: "u1".to_string(),
                ..Default::default()
            },
            chat: ChatInfo {
                id: "chat-1".to_string(),
                title: None,
            },
            text: text.to_string(),
            reply_to: None,
            metadata: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_intent_classification() {
        assert_eq!(Intent::classify("Hola, buenos días"), Intent::Greeting);
        assert_eq!(
            Intent::classify("¿Cuál es el estado de mi postulación?"),
            Intent::ApplicationStatus
        );
        assert_eq!(Intent::classify("Quiero agendar mi entrevista"), Intent::Schedule);
        assert_eq!(Intent::classify("Quiero hablar con un humano"), Intent::HumanHandoff);
        assert_eq!(Intent::classify("xyzzy"), Intent::Unknown);
    }

    #[tokio::test]
    async fn test_unit_specific_greeting() {
        let bot = IntentBot::new()
            .with_greeting(BusinessUnit::new("huntu"), "¡Hola! Bienvenido a huntU.");

        let mut msg = inbound("hola");
        msg.business_unit = BusinessUnit::new("huntu");
        let reply = bot.respond(&msg).await.unwrap();
        assert_eq!(reply, "¡Hola! Bienvenido a huntU.");

        // Other units fall back to the default greeting.
        let reply = bot.respond(&inbound("hola")).await.unwrap();
        assert!(reply.contains("asistente de talento"));
    }

    #[tokio::test]
    async fn test_handoff_acknowledged_once() {
        let bot = IntentBot::new();

        let first = bot.respond(&inbound("contáctame con un reclutador")).await.unwrap();
        assert!(first.contains("te pongo en contacto"));

        let second = bot.respond(&inbound("sigo esperando al reclutador")).await.unwrap();
        assert!(second.contains("Ya avisamos"));
    }

    #[tokio::test]
    async fn test_bot_messages_ignored() {
        let bot = IntentBot::new();
        let mut msg = inbound("hola");
        msg.sender.is_bot = true;
        assert!(bot.respond(&msg).await.is_none());
    }
}
