//! `keyed_record!` must expand in a downstream crate that imports nothing but
//! the macro itself (no `paste`, no `serde_json` in scope).

use sos_prefs::keyed_record;
use sos_prefs::storage::memory::MemoryStorage;

keyed_record! {
    pub struct MacroHygieneTest {
        pub test_field: bool = false => "test_field" as json,
        pub label: String = String::new() => "label" as text,
    }
}

#[test]
fn test_macro_hygiene() {
    let storage = MemoryStorage::new();
    let record = MacroHygieneTest {
        test_field: true,
        label: "x".to_string(),
    };
    record.save_to(&storage).unwrap();

    let (loaded, fallbacks) = MacroHygieneTest::load_from(&storage).unwrap();
    assert_eq!(loaded, record);
    assert!(fallbacks.is_empty());
    assert_eq!(MacroHygieneTest::TEST_FIELD_KEY, "test_field");
    assert_eq!(MacroHygieneTest::KEYS.len(), 2);
}
