#![cfg(not(target_arch = "wasm32"))]

use std::sync::Arc;

use sos_prefs::controller::SettingsController;
use sos_prefs::notify::NoticeLog;
use sos_prefs::settings::SettingsRepository;
use sos_prefs::storage::{create_storage, Storage};
use sos_prefs::{ContactError, StoreError};

fn open_page(dir: &tempfile::TempDir) -> (SettingsController, Arc<NoticeLog>) {
    let notices = Arc::new(NoticeLog::new());
    let repository = SettingsRepository::new(create_storage(dir.path().to_str().unwrap()));
    let page = SettingsController::activate(repository, notices.clone()).expect("page should load");
    (page, notices)
}

/// Accepts reads, refuses every write.
#[derive(Debug)]
struct ReadOnlyStorage;

impl Storage for ReadOnlyStorage {
    fn read(&self, _key: &str) -> Result<Option<String>, std::io::Error> {
        Ok(None)
    }

    fn write(&self, _key: &str, _data: &str) -> Result<(), std::io::Error> {
        Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "quota exceeded"))
    }

    fn get_path(&self, key: &str) -> String {
        format!("readonly::{}", key)
    }
}

#[test]
fn alice_is_added_then_removed() {
    let dir = tempfile::tempdir().unwrap();
    let (mut page, notices) = open_page(&dir);
    assert!(page.contacts().is_empty());

    page.set_draft_name("Alice");
    page.set_draft_phone("+15551234567");
    let id = page.add_contact().unwrap();
    assert_eq!(page.contacts().len(), 1);
    assert_eq!(page.contacts().as_slice()[0].name, "Alice");

    assert!(page.remove_contact(&id));
    assert!(page.contacts().is_empty());

    let titles: Vec<_> = notices.take().into_iter().map(|n| n.title).collect();
    assert_eq!(titles, vec!["Contact Added", "Contact Removed"]);
}

#[test]
fn saved_page_reopens_with_same_record() {
    let dir = tempfile::tempdir().unwrap();
    let (mut page, notices) = open_page(&dir);

    page.set_message("Down at [location], send help");
    page.set_draft_name("Bob");
    page.set_draft_phone("+447700900123");
    page.add_contact().unwrap();
    page.set_send_sms(false);
    page.set_send_whatsapp(true);
    page.save().unwrap();
    assert_eq!(notices.last().unwrap().title, "✅ Settings Saved");

    let saved = page.record().clone();
    drop(page);

    let (reopened, _) = open_page(&dir);
    assert_eq!(reopened.record(), &saved);
    assert!(reopened.load_report().is_clean());
}

#[test]
fn unsaved_edits_are_lost_on_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let (mut page, _) = open_page(&dir);
    page.set_draft_name("Carol");
    page.set_draft_phone("123");
    page.add_contact().unwrap();
    drop(page);

    let (reopened, _) = open_page(&dir);
    assert!(reopened.contacts().is_empty());
}

#[test]
fn missing_information_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let (mut page, notices) = open_page(&dir);
    page.set_draft_name("   ");
    page.set_draft_phone("+15551234567");

    let err = page.add_contact().unwrap_err();
    assert_eq!(err, ContactError::MissingInformation);
    assert_eq!(page.draft_phone(), "+15551234567");

    let notice = notices.last().unwrap();
    assert_eq!(notice.title, "Missing Information");
    assert!(notice.is_destructive());
}

#[test]
fn failed_save_is_reported() {
    let notices = Arc::new(NoticeLog::new());
    let repository = SettingsRepository::new(Box::new(ReadOnlyStorage));
    let mut page = SettingsController::activate(repository, notices.clone()).unwrap();

    let err = page.save().unwrap_err();
    assert!(matches!(err, StoreError::Storage { ref location, .. } if location == "readonly::message"));
    assert!(err.to_string().contains("quota exceeded"));

    let notice = notices.last().unwrap();
    assert_eq!(notice.title, "Settings Not Saved");
    assert!(notice.is_destructive());
}
