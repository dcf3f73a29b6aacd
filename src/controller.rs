//! The settings page: load once, edit in memory, save on demand.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::contacts::{ContactId, ContactList};
use crate::error::{ContactError, StoreError};
use crate::notify::{Notice, Notifier};
use crate::settings::{LoadReport, SettingsRecord, SettingsRepository};

/// Holds the record being edited plus the "add contact" form.
///
/// Nothing reaches storage until [`save`](Self::save). There is no dirty
/// tracking; leaving the page discards unsaved edits.
pub struct SettingsController {
    repository: SettingsRepository,
    notifier: Arc<dyn Notifier>,
    record: SettingsRecord,
    report: LoadReport,
    draft_name: String,
    draft_phone: String,
}

impl std::fmt::Debug for SettingsController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsController")
            .field("repository", &self.repository)
            .field("record", &self.record)
            .field("draft_name", &self.draft_name)
            .field("draft_phone", &self.draft_phone)
            .finish_non_exhaustive()
    }
}

impl SettingsController {
    /// Loads the stored record. Called once when the page opens.
    pub fn activate(
        repository: SettingsRepository,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, StoreError> {
        let loaded = repository.load()?;
        if !loaded.report.is_clean() {
            warn!(report = ?loaded.report, "settings loaded with repairs");
        }
        Ok(Self {
            repository,
            notifier,
            record: loaded.record,
            report: loaded.report,
            draft_name: String::new(),
            draft_phone: String::new(),
        })
    }

    pub fn record(&self) -> &SettingsRecord {
        &self.record
    }

    pub fn contacts(&self) -> &ContactList {
        &self.record.contacts
    }

    pub fn load_report(&self) -> &LoadReport {
        &self.report
    }

    pub fn draft_name(&self) -> &str {
        &self.draft_name
    }

    pub fn draft_phone(&self) -> &str {
        &self.draft_phone
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.record.message = message.into();
    }

    pub fn set_send_sms(&mut self, enabled: bool) {
        self.record.send_sms = enabled;
    }

    pub fn set_send_whatsapp(&mut self, enabled: bool) {
        self.record.send_whatsapp = enabled;
    }

    pub fn set_draft_name(&mut self, name: impl Into<String>) {
        self.draft_name = name.into();
    }

    pub fn set_draft_phone(&mut self, phone: impl Into<String>) {
        self.draft_phone = phone.into();
    }

    /// Adds the contact typed into the form and clears the form.
    ///
    /// A blank name or phone leaves everything as it was and raises a
    /// destructive notice.
    pub fn add_contact(&mut self) -> Result<ContactId, ContactError> {
        let contact = match self.record.contacts.add(&self.draft_name, &self.draft_phone) {
            Ok(contact) => contact,
            Err(e) => {
                self.notifier.notify(Notice::destructive(
                    "Missing Information",
                    "Please enter both name and phone number.",
                ));
                return Err(e);
            }
        };

        let (id, name) = (contact.id.clone(), contact.name.clone());
        self.draft_name.clear();
        self.draft_phone.clear();
        debug!(%id, "contact added");
        self.notifier.notify(Notice::info(
            "Contact Added",
            format!("{} has been added to your emergency contacts.", name),
        ));
        Ok(id)
    }

    /// Removes a contact by id. Unknown ids change nothing, but the removal
    /// notice is raised either way.
    pub fn remove_contact(&mut self, id: &ContactId) -> bool {
        let removed = self.record.contacts.remove(id).is_some();
        if !removed {
            debug!(%id, "remove requested for unknown contact");
        }
        self.notifier.notify(Notice::info(
            "Contact Removed",
            "Emergency contact has been removed.",
        ));
        removed
    }

    /// Writes the whole record.
    pub fn save(&mut self) -> Result<(), StoreError> {
        match self.repository.save(&self.record) {
            Ok(()) => {
                self.notifier.notify(Notice::info(
                    "✅ Settings Saved",
                    "Your emergency settings have been saved successfully.",
                ));
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "saving settings failed");
                self.notifier.notify(Notice::destructive(
                    "Settings Not Saved",
                    "Your emergency settings could not be saved. Please try again.",
                ));
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NoticeLog;
    use crate::storage::memory::MemoryStorage;

    fn page() -> (SettingsController, Arc<NoticeLog>) {
        let notices = Arc::new(NoticeLog::new());
        let repository = SettingsRepository::new(Box::new(MemoryStorage::new()));
        let controller = SettingsController::activate(repository, notices.clone()).unwrap();
        (controller, notices)
    }

    #[test]
    fn add_contact_clears_form_and_announces_name() {
        let (mut page, notices) = page();
        page.set_draft_name(" Alice ");
        page.set_draft_phone("+15551234567");

        let id = page.add_contact().unwrap();
        assert_eq!(page.contacts().get(&id).unwrap().name, "Alice");
        assert_eq!(page.draft_name(), "");
        assert_eq!(page.draft_phone(), "");

        let notice = notices.last().unwrap();
        assert_eq!(notice.title, "Contact Added");
        assert!(notice.description.starts_with("Alice "));
    }

    #[test]
    fn add_contact_with_blank_phone_keeps_form() {
        let (mut page, notices) = page();
        page.set_draft_name("Alice");
        page.set_draft_phone("  ");

        assert_eq!(page.add_contact(), Err(ContactError::MissingInformation));
        assert!(page.contacts().is_empty());
        assert_eq!(page.draft_name(), "Alice");
        assert!(notices.last().unwrap().is_destructive());
    }

    #[test]
    fn remove_unknown_contact_still_notifies() {
        let (mut page, notices) = page();
        assert!(!page.remove_contact(&ContactId::from("missing")));
        assert_eq!(notices.take()[0].title, "Contact Removed");
    }

    #[test]
    fn edits_stay_in_memory_until_save() {
        let (mut page, _) = page();
        page.set_send_sms(false);
        assert!(!page.record().send_sms);

        let stored = page.repository.load().unwrap().record;
        assert!(stored.send_sms);

        page.save().unwrap();
        assert!(!page.repository.load().unwrap().record.send_sms);
    }

    #[test]
    fn message_without_location_saves_quietly() {
        let (mut page, notices) = page();
        page.set_message("Call me");
        page.save().unwrap();

        let raised = notices.take();
        assert_eq!(raised.len(), 1);
        assert_eq!(raised[0].title, "✅ Settings Saved");
        assert_eq!(page.repository.load().unwrap().record.message, "Call me");
    }
}
