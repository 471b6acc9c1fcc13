//! Message templates: static string rendering keyed by template ID.
//!
//! Templates use `{{variable}}` placeholders. Business units can override
//! shared templates; lookup falls back from per-unit to shared.

use crate::error::ChannelError;
use crate::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use talentwire_core::types::{BusinessUnit, TemplateId};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").expect("valid placeholder regex"));

/// A message template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageTemplate {
    /// Template identifier.
    pub id: TemplateId,

    /// Body with `{{var}}` placeholders.
    pub body: String,

    /// Subject line for email-like channels, also with placeholders.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl MessageTemplate {
    /// Create a template.
    pub fn new(id: impl Into<TemplateId>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            body: body.into(),
            subject: None,
        }
    }

    /// Set the subject line.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Placeholder names referenced by body and subject.
    pub fn variables(&self) -> BTreeSet<String> {
        let mut vars = BTreeSet::new();
        for text in [Some(self.body.as_str()), self.subject.as_deref()]
            .into_iter()
            .flatten()
        {
            for capture in PLACEHOLDER.captures_iter(text) {
                vars.insert(capture[1].to_string());
            }
        }
        vars
    }
}

/// A rendered template, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTemplate {
    /// Rendered body text.
    pub text: String,

    /// Rendered subject, if the template has one.
    pub subject: Option<String>,
}

/// Store of shared and per-business-unit templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    shared: HashMap<TemplateId, MessageTemplate>,
    per_unit: HashMap<BusinessUnit, HashMap<TemplateId, MessageTemplate>>,
}

impl TemplateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store loaded with the built-in ATS templates.
    pub fn with_defaults() -> Self {
        let mut store = Self::new();
        for template in default_templates() {
            store.register(template);
        }
        store
    }

    /// Register a shared template, replacing any previous version.
    pub fn register(&mut self, template: MessageTemplate) {
        self.shared.insert(template.id.clone(), template);
    }

    /// Register a per-unit override.
    pub fn register_for_unit(&mut self, unit: BusinessUnit, template: MessageTemplate) {
        self.per_unit
            .entry(unit)
            .or_default()
            .insert(template.id.clone(), template);
    }

    /// Look up a template, preferring the unit override.
    pub fn get(&self, unit: &BusinessUnit, id: &TemplateId) -> Option<&MessageTemplate> {
        self.per_unit
            .get(unit)
            .and_then(|templates| templates.get(id))
            .or_else(|| self.shared.get(id))
    }

    /// Render a template with the given variables.
    ///
    /// Fails with an error naming every missing variable; extra variables
    /// are ignored.
    pub fn render(
        &self,
        unit: &BusinessUnit,
        id: &TemplateId,
        vars: &HashMap<String, String>,
    ) -> Result<RenderedTemplate> {
        let template = self
            .get(unit, id)
            .ok_or_else(|| ChannelError::Template(format!("Unknown template: {id}")))?;

        let missing: Vec<String> = template
            .variables()
            .into_iter()
            .filter(|name| !vars.contains_key(name))
            .collect();

        if !missing.is_empty() {
            return Err(ChannelError::Template(format!(
                "Template '{}' missing variables: {}",
                id,
                missing.join(", ")
            )));
        }

        let text = substitute(&template.body, vars);
        let subject = template.subject.as_deref().map(|s| substitute(s, vars));

        Ok(RenderedTemplate { text, subject })
    }

    /// Number of shared templates.
    pub fn len(&self) -> usize {
        self.shared.len()
    }

    /// Whether the shared set is empty.
    pub fn is_empty(&self) -> bool {
        self.shared.is_empty()
    }
}

fn substitute(text: &str, vars: &HashMap<String, String>) -> String {
    PLACEHOLDER
        .replace_all(text, |caps: &regex::Captures<'_>| {
            vars.get(&caps[1]).cloned().unwrap_or_default()
        })
        .into_owned()
}

/// Built-in recruitment templates shared by all business units.
fn default_templates() -> Vec<MessageTemplate> {
    vec![
        MessageTemplate::new(
            "application_received",
            "Hola {{candidate_name}}, recibimos tu aplicación para {{position}}. \
             Te contactaremos pronto con los siguientes pasos.",
        )
        .with_subject("Aplicación recibida: {{position}}"),
        MessageTemplate::new(
            "interview_invite",
            "Hola {{candidate_name}}, te invitamos a una entrevista para {{position}} \
             el {{interview_date}} a las {{interview_time}}. Responde para confirmar.",
        )
        .with_subject("Entrevista: {{position}} ({{interview_date}})"),
        MessageTemplate::new(
            "interview_reminder",
            "Recordatorio: tu entrevista para {{position}} es {{interview_date}} a las \
             {{interview_time}}.",
        )
        .with_subject("Recordatorio de entrevista: {{position}}"),
        MessageTemplate::new(
            "offer_sent",
            "¡Felicidades {{candidate_name}}! Te enviamos una propuesta para {{position}}. \
             Revisa tu correo para los detalles.",
        )
        .with_subject("Propuesta: {{position}}"),
        MessageTemplate::new(
            "feedback_request",
            "Hola {{candidate_name}}, ¿cómo fue tu experiencia en el proceso de {{position}}? \
             Tu opinión nos ayuda a mejorar.",
        )
        .with_subject("Tu opinión sobre el proceso de {{position}}"),
    ]
}
