//! In-memory contact directory.
//!
//! Contacts are loaded from a JSON file at startup and can be mutated at
//! runtime. The directory is the engine's only view of recipients; channel
//! addresses and DND windows live on the contact record.

use crate::{EngineError, Result};
use std::collections::HashMap;
use std::path::Path;
use talentwire_core::types::{BusinessUnit, ContactId, ContactInfo};
use tokio::sync::RwLock;
use tracing::info;

/// Thread-safe store of contact records keyed by contact ID.
#[derive(Debug, Default)]
pub struct ContactDirectory {
    contacts: RwLock<HashMap<ContactId, ContactInfo>>,
}

impl ContactDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory seeded with contacts.
    pub fn with_contacts(contacts: impl IntoIterator<Item = ContactInfo>) -> Self {
        let map = contacts
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();
        Self {
            contacts: RwLock::new(map),
        }
    }

    /// Load contacts from a JSON file (an array of contact records).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(talentwire_core::Error::Io)?;
        let contacts: Vec<ContactInfo> =
            serde_json::from_str(&content).map_err(talentwire_core::Error::Json)?;
        info!(count = contacts.len(), path = %path.display(), "loaded contacts");
        Ok(Self::with_contacts(contacts))
    }

    /// Persist all contacts to a JSON file.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let contacts = self.contacts.read().await;
        let mut records: Vec<&ContactInfo> = contacts.values().collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        let json =
            serde_json::to_string_pretty(&records).map_err(talentwire_core::Error::Json)?;
        std::fs::write(path.as_ref(), json).map_err(talentwire_core::Error::Io)?;
        Ok(())
    }

    /// Look up a contact by ID.
    pub async fn resolve(&self, id: &ContactId) -> Result<ContactInfo> {
        self.contacts
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::unknown_contact(id))
    }

    /// Insert or replace a contact.
    pub async fn upsert(&self, contact: ContactInfo) {
        self.contacts
            .write()
            .await
            .insert(contact.id.clone(), contact);
    }

    /// Remove a contact, returning it if present.
    pub async fn remove(&self, id: &ContactId) -> Option<ContactInfo> {
        self.contacts.write().await.remove(id)
    }

    /// All contacts belonging to a business unit, sorted by ID.
    pub async fn list(&self, unit: &BusinessUnit) -> Vec<ContactInfo> {
        let mut contacts: Vec<ContactInfo> = self
            .contacts
            .read()
            .await
            .values()
            .filter(|c| &c.business_unit == unit)
            .cloned()
            .collect();
        contacts.sort_by(|a, b| a.id.cmp(&b.id));
        contacts
    }

    /// Number of contacts in the directory.
    pub async fn len(&self) -> usize {
        self.contacts.read().await.len()
    }

    /// Whether the directory holds no contacts.
    pub async fn is_empty(&self) -> bool {
        self.contacts.read().await.is_empty()
    }
}
