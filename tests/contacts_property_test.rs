#![cfg(not(target_arch = "wasm32"))]

use proptest::prelude::*;
use sos_prefs::{ContactError, ContactId, ContactList};

fn blank() -> impl Strategy<Value = String> {
    "[ \t\n]{0,4}"
}

fn filled() -> impl Strategy<Value = String> {
    "[ ]{0,2}[A-Za-z0-9+][A-Za-z0-9+ ]{0,12}"
}

fn seeded(count: usize) -> ContactList {
    let mut list = ContactList::new();
    for i in 0..count {
        list.add(&format!("Contact {i}"), &format!("+1555000{i:04}")).unwrap();
    }
    list
}

proptest! {
    #[test]
    fn valid_add_grows_by_one_with_fresh_id(seed in 0usize..6, name in filled(), phone in filled()) {
        let mut list = seeded(seed);
        let id = list.add(&name, &phone).unwrap().id.clone();

        prop_assert_eq!(list.len(), seed + 1);
        prop_assert_eq!(list.iter().filter(|c| c.id == id).count(), 1);
        prop_assert_eq!(&list.as_slice()[seed].name, name.trim());
    }

    #[test]
    fn blank_name_or_phone_changes_nothing(seed in 0usize..6, name in filled(), empty in blank(), blank_name in any::<bool>()) {
        let mut list = seeded(seed);
        let before = list.clone();

        let result = if blank_name { list.add(&empty, &name).map(|_| ()) } else { list.add(&name, &empty).map(|_| ()) };

        prop_assert_eq!(result, Err(ContactError::MissingInformation));
        prop_assert_eq!(list, before);
    }

    #[test]
    fn removed_id_is_gone(seed in 1usize..6, pick in any::<prop::sample::Index>()) {
        let mut list = seeded(seed);
        let id = list.as_slice()[pick.index(seed)].id.clone();

        prop_assert!(list.remove(&id).is_some());
        prop_assert!(!list.contains(&id));
        prop_assert_eq!(list.len(), seed - 1);
    }

    #[test]
    fn removing_unknown_id_keeps_list(seed in 0usize..6, id in "[0-9]{13}") {
        let mut list = seeded(seed);
        let before = list.clone();

        prop_assert!(list.remove(&ContactId::from(id)).is_none());
        prop_assert_eq!(list, before);
    }
}
