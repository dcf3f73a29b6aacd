//! Emergency contacts.
//!
//! Contacts are never edited in place: they are appended with a fresh id and
//! later removed by that id. Names and phone numbers may repeat, ids may not.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ContactError;

/// Opaque contact identifier.
///
/// New ids are UUID v4 strings. Lists written by the legacy web app use
/// millisecond timestamps instead, so no format is assumed when reading.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(String);

impl ContactId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ContactId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ContactId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub phone: String,
}

/// Ordered (insertion order) list of contacts with unique ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactList {
    contacts: Vec<Contact>,
}

impl ContactList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Contact> {
        self.contacts.iter()
    }

    pub fn as_slice(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn get(&self, id: &ContactId) -> Option<&Contact> {
        self.contacts.iter().find(|c| &c.id == id)
    }

    pub fn contains(&self, id: &ContactId) -> bool {
        self.get(id).is_some()
    }

    /// Appends a contact built from the trimmed `name` and `phone`.
    ///
    /// Fails without touching the list when either is blank.
    pub fn add(&mut self, name: &str, phone: &str) -> Result<&Contact, ContactError> {
        let (name, phone) = (name.trim(), phone.trim());
        if name.is_empty() || phone.is_empty() {
            return Err(ContactError::MissingInformation);
        }

        let mut id = ContactId::generate();
        while self.contains(&id) {
            id = ContactId::generate();
        }

        self.contacts.push(Contact {
            id,
            name: name.to_string(),
            phone: phone.to_string(),
        });
        Ok(&self.contacts[self.contacts.len() - 1])
    }

    /// Removes the contact with `id`. Unknown ids are ignored.
    pub fn remove(&mut self, id: &ContactId) -> Option<Contact> {
        let index = self.contacts.iter().position(|c| &c.id == id)?;
        Some(self.contacts.remove(index))
    }

    /// Restores the list invariants on data read from storage: trims fields,
    /// drops contacts left blank and drops repeated ids (first one wins).
    ///
    /// Returns how many contacts were dropped.
    pub fn normalize(&mut self) -> usize {
        let before = self.contacts.len();
        let mut seen = HashSet::new();

        self.contacts.retain_mut(|contact| {
            contact.name = contact.name.trim().to_string();
            contact.phone = contact.phone.trim().to_string();
            if contact.name.is_empty() || contact.phone.is_empty() {
                warn!(id = %contact.id, "dropping contact without name or phone");
                return false;
            }
            if !seen.insert(contact.id.clone()) {
                warn!(id = %contact.id, "dropping contact with duplicate id");
                return false;
            }
            true
        });

        before - self.contacts.len()
    }
}

impl<'a> IntoIterator for &'a ContactList {
    type Item = &'a Contact;
    type IntoIter = std::slice::Iter<'a, Contact>;

    fn into_iter(self) -> Self::IntoIter {
        self.contacts.iter()
    }
}

impl FromIterator<Contact> for ContactList {
    fn from_iter<I: IntoIterator<Item = Contact>>(iter: I) -> Self {
        Self {
            contacts: iter.into_iter().collect(),
        }
    }
}
