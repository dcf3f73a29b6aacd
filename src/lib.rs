//! # sos_prefs
//!
//! The settings and alerting core of a personal-safety "SOS" app.
//!
//! A rider keeps a short list of emergency contacts, an emergency message
//! template and two delivery toggles (SMS, WhatsApp). This crate persists
//! that record, manages the contact list, drives the settings page and sends
//! the alert when the big red button is pressed.
//!
//! The design priorities are:
//!
//! - **Plain storage:** every field lives under its own key as text or JSON,
//!   so data written by the legacy web app (`bikerSOS_*` keys in
//!   `localStorage`) loads unchanged.
//! - **Forgiving loads:** a missing or malformed value falls back to its
//!   default and is reported, never fatal.
//! - **Explicit seams:** storage, notifications and delivery transports are
//!   traits injected by the host.
//!
//! **Note:** writes are per key. A crash in the middle of a save can leave a
//! mix of old and new fields; the next save overwrites all of them.
//!
//! ## Example
//!
//! ```rust
//! use sos_prefs::controller::SettingsController;
//! use sos_prefs::notify::NoticeLog;
//! use sos_prefs::settings::SettingsRepository;
//! use sos_prefs::storage::memory::MemoryStorage;
//! use std::sync::Arc;
//!
//! let repository = SettingsRepository::new(Box::new(MemoryStorage::new()));
//! let notices = Arc::new(NoticeLog::new());
//! let mut page = SettingsController::activate(repository, notices.clone()).unwrap();
//!
//! page.set_draft_name("Alice");
//! page.set_draft_phone("+15551234567");
//! page.add_contact().unwrap();
//! page.set_send_whatsapp(false);
//! page.save().unwrap();
//!
//! assert_eq!(page.contacts().len(), 1);
//! assert_eq!(notices.take().len(), 2);
//! ```

// Re-export dependencies used by `keyed_record!` so downstream crates don't
// need them in their Cargo.toml
pub use paste;

pub mod codec;
pub mod config;
pub mod contacts;
pub mod controller;
#[cfg(any(not(target_arch = "wasm32"), feature = "wasm"))]
pub mod dispatch;
pub mod error;
pub mod notify;
pub mod record;
#[cfg(any(not(target_arch = "wasm32"), feature = "wasm"))]
mod runtime;
pub mod settings;
pub mod storage;
pub mod template;
#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub mod web;

pub use contacts::{Contact, ContactId, ContactList};
pub use error::{CodecError, ConfigError, ContactError, StoreError};
pub use settings::{SettingsRecord, SettingsRepository};

/// Declares a record whose fields are each persisted under their own key.
///
/// # Overview
/// Every field names a default, the storage key it lives under and the codec
/// used for its value (`text` stores the string verbatim, `json` stores a
/// JSON document). The macro generates:
///
/// - the struct itself (`Debug`, `Clone`, `PartialEq`) and a `Default` impl;
/// - `KEYS`, every key in save order, and one `<FIELD>_KEY` constant per field;
/// - `load_from(&dyn Storage)`, which reads each key independently and falls
///   back to the field default when the key is missing or cannot be decoded;
/// - `save_to(&dyn Storage)`, which writes every key in declaration order.
///
/// There is no transaction across keys.
///
/// # Example
///
/// ```rust
/// use sos_prefs::keyed_record;
/// use sos_prefs::storage::memory::MemoryStorage;
///
/// keyed_record! {
///     /// Display preferences.
///     pub struct DisplayPrefs {
///         /// Greeting shown on the dashboard.
///         pub greeting: String = "Ride safe".to_string() => "greeting" as text,
///         pub large_button: bool = true => "largeButton" as json,
///     }
/// }
///
/// let storage = MemoryStorage::with_entries([("largeButton", "false")]);
/// let (display, fallbacks) = DisplayPrefs::load_from(&storage).unwrap();
/// assert_eq!(display.greeting, "Ride safe");
/// assert!(!display.large_button);
/// assert!(fallbacks.is_empty());
/// assert_eq!(DisplayPrefs::LARGE_BUTTON_KEY, "largeButton");
/// ```
#[macro_export]
macro_rules! keyed_record {
    (
        $(#[$outer:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$inner:meta])*
                $field_vis:vis $field:ident: $type:ty = $default:expr => $key:literal as $codec:ident,
            )*
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq)]
        $vis struct $name {
            $(
                $(#[$inner])*
                $field_vis $field: $type,
            )*
        }

        impl Default for $name {
            fn default() -> Self {
                $name {
                    $(
                        $field: $default,
                    )*
                }
            }
        }

        $crate::paste::paste! {
            impl $name {
                $(
                    #[allow(dead_code)]
                    pub const [<$field:upper _KEY>]: &'static str = $key;
                )*
            }
        }

        impl $name {
            /// Storage keys in save order.
            pub const KEYS: &'static [&'static str] = &[$($key),*];

            /// Loads every field independently. Missing or malformed values
            /// take their default; malformed ones are listed in the second
            /// element of the result.
            pub fn load_from(
                storage: &dyn $crate::storage::Storage,
            ) -> Result<(Self, Vec<$crate::record::FieldFallback>), $crate::error::StoreError> {
                let mut fallbacks = Vec::new();
                let record = $name {
                    $(
                        $field: $crate::record::read_field::<$type>(
                            storage,
                            $key,
                            |raw| $crate::codec::$codec::decode(raw),
                            || $default,
                            &mut fallbacks,
                        )?,
                    )*
                };
                Ok((record, fallbacks))
            }

            /// Writes every field, one key at a time, in declaration order.
            pub fn save_to(
                &self,
                storage: &dyn $crate::storage::Storage,
            ) -> Result<(), $crate::error::StoreError> {
                $(
                    $crate::record::write_field(
                        storage,
                        $key,
                        $crate::codec::$codec::encode(&self.$field),
                    )?;
                )*
                Ok(())
            }
        }
    };
}
