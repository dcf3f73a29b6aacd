//! The persisted settings record and the repository that loads and saves it.

use tracing::{debug, info, warn};

use crate::codec;
use crate::contacts::ContactList;
use crate::error::StoreError;
use crate::record::{read_field, write_field, FieldFallback};
use crate::storage::Storage;

pub const DEFAULT_MESSAGE: &str =
    "Emergency! I've been in an accident and need help. My current location is: [location]";

/// Layout version written next to the record. Data without it was written by
/// the legacy web app and is version 0.
pub const SCHEMA_VERSION: u32 = 1;
pub const SCHEMA_VERSION_KEY: &str = "schemaVersion";

crate::keyed_record! {
    /// Emergency configuration for one profile.
    pub struct SettingsRecord {
        /// Message template. `[location]` is replaced when an alert goes out.
        pub message: String = DEFAULT_MESSAGE.to_string() => "message" as text,
        pub contacts: ContactList = ContactList::new() => "contacts" as json,
        pub send_sms: bool = true => "sendSMS" as json,
        pub send_whatsapp: bool = true => "sendWhatsApp" as json,
    }
}

/// What happened while loading, beyond the values themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Schema version found in storage (0 when absent).
    pub stored_version: u32,
    /// Fields whose stored value was unreadable and replaced by the default.
    pub fallbacks: Vec<FieldFallback>,
    /// Contacts dropped for being blank or repeating an id.
    pub dropped_contacts: usize,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.fallbacks.is_empty() && self.dropped_contacts == 0
    }

    pub fn needs_migration(&self) -> bool {
        self.stored_version < SCHEMA_VERSION
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSettings {
    pub record: SettingsRecord,
    pub report: LoadReport,
}

/// Loads and saves [`SettingsRecord`] through an injected [`Storage`].
#[derive(Debug)]
pub struct SettingsRepository {
    storage: Box<dyn Storage>,
}

impl SettingsRepository {
    pub fn new(storage: Box<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &dyn Storage {
        &*self.storage
    }

    pub fn load(&self) -> Result<LoadedSettings, StoreError> {
        let mut fallbacks = Vec::new();
        let stored_version = read_field(
            self.storage(),
            SCHEMA_VERSION_KEY,
            codec::json::decode::<u32>,
            || 0,
            &mut fallbacks,
        )?;
        if stored_version > SCHEMA_VERSION {
            return Err(StoreError::FutureSchema {
                found: stored_version,
                max: SCHEMA_VERSION,
            });
        }

        let (mut record, field_fallbacks) = SettingsRecord::load_from(self.storage())?;
        fallbacks.extend(field_fallbacks);
        let dropped_contacts = migrate(&mut record, stored_version);

        debug!(
            path = %self.storage.get_path(SettingsRecord::MESSAGE_KEY),
            contacts = record.contacts.len(),
            "loaded settings"
        );
        Ok(LoadedSettings {
            record,
            report: LoadReport {
                stored_version,
                fallbacks,
                dropped_contacts,
            },
        })
    }

    /// Overwrites every stored field, then stamps the schema version.
    pub fn save(&self, record: &SettingsRecord) -> Result<(), StoreError> {
        record.save_to(self.storage())?;
        write_field(
            self.storage(),
            SCHEMA_VERSION_KEY,
            codec::json::encode(&SCHEMA_VERSION),
        )?;
        debug!(contacts = record.contacts.len(), "saved settings");
        Ok(())
    }
}

/// Brings a freshly read record up to the current layout.
fn migrate(record: &mut SettingsRecord, from: u32) -> usize {
    if from < SCHEMA_VERSION {
        info!(from, to = SCHEMA_VERSION, "upgrading stored settings");
    }
    // Version 0 shares the current value formats; only its contacts were
    // never validated on the way in. Hand-edited storage can break them too.
    let dropped = record.contacts.normalize();
    if dropped > 0 {
        warn!(dropped, "dropped invalid stored contacts");
    }
    dropped
}
