use std::fmt::Debug;

/// Storage abstraction trait for cross-platform settings storage.
///
/// Every settings field lives under its own key, so backends only need flat
/// string reads and writes. A missing key is `Ok(None)`, never an error.
pub trait Storage: Send + Sync + Debug {
    /// Read data from storage
    fn read(&self, key: &str) -> Result<Option<String>, std::io::Error>;

    /// Write data to storage
    fn write(&self, key: &str, data: &str) -> Result<(), std::io::Error>;

    /// Get the full path/key for display purposes
    fn get_path(&self, key: &str) -> String;
}

#[cfg(not(target_arch = "wasm32"))]
pub mod native {
    use super::Storage;
    use std::io::Write;
    use std::path::{Path, PathBuf};

    /// One file per key inside `base_dir`.
    #[derive(Debug)]
    pub struct FileStorage {
        base_dir: PathBuf,
    }

    impl FileStorage {
        pub fn new(directory: impl AsRef<Path>) -> Self {
            Self {
                base_dir: directory.as_ref().to_path_buf(),
            }
        }

        pub fn base_dir(&self) -> &Path {
            &self.base_dir
        }
    }

    impl Storage for FileStorage {
        fn read(&self, key: &str) -> Result<Option<String>, std::io::Error> {
            let path = self.base_dir.join(key);

            match std::fs::read_to_string(&path) {
                Ok(contents) => Ok(Some(contents)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e),
            }
        }

        fn write(&self, key: &str, data: &str) -> Result<(), std::io::Error> {
            let path = self.base_dir.join(key);
            let parent_dir = path.parent().unwrap_or(&self.base_dir);
            std::fs::create_dir_all(parent_dir)?;

            // Write to temporary file first, then move it over the old value
            let mut tmp_file = tempfile::NamedTempFile::new_in(parent_dir)?;
            tmp_file.write_all(data.as_bytes())?;
            tmp_file.persist(&path).map_err(|e| e.error)?;

            Ok(())
        }

        fn get_path(&self, key: &str) -> String {
            self.base_dir.join(key).display().to_string()
        }
    }
}

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub mod wasm {
    use super::Storage;
    use web_sys::{window, Storage as WebStorage};

    /// Browser `localStorage`, keys prefixed with `"{namespace}_"`.
    #[derive(Debug)]
    pub struct LocalStorage {
        prefix: String,
    }

    impl LocalStorage {
        pub fn new(namespace: &str) -> Self {
            Self {
                prefix: format!("{}_", namespace),
            }
        }

        fn get_storage() -> Result<WebStorage, std::io::Error> {
            window()
                .ok_or_else(|| std::io::Error::other("window not available"))?
                .local_storage()
                .map_err(|_| std::io::Error::other("localStorage not available"))?
                .ok_or_else(|| std::io::Error::other("localStorage is null"))
        }

        fn full_key(&self, key: &str) -> String {
            format!("{}{}", self.prefix, key)
        }
    }

    impl Storage for LocalStorage {
        fn read(&self, key: &str) -> Result<Option<String>, std::io::Error> {
            let storage = Self::get_storage()?;

            storage
                .get_item(&self.full_key(key))
                .map_err(|_| std::io::Error::other("failed to read from localStorage"))
        }

        fn write(&self, key: &str, data: &str) -> Result<(), std::io::Error> {
            let storage = Self::get_storage()?;

            // Quota errors surface here.
            storage
                .set_item(&self.full_key(key), data)
                .map_err(|_| std::io::Error::other("failed to write to localStorage"))
        }

        fn get_path(&self, key: &str) -> String {
            format!("localStorage::{}", self.full_key(key))
        }
    }
}

pub mod memory {
    use super::Storage;
    use std::collections::HashMap;
    use std::sync::{Mutex, MutexGuard};

    /// Process-local map. Useful for tests and for hosts that persist the
    /// values themselves.
    #[derive(Debug, Default)]
    pub struct MemoryStorage {
        entries: Mutex<HashMap<String, String>>,
    }

    impl MemoryStorage {
        pub fn new() -> Self {
            Self::default()
        }

        /// Seeds the map, e.g. with values written by an older app version.
        pub fn with_entries<I, K, V>(entries: I) -> Self
        where
            I: IntoIterator<Item = (K, V)>,
            K: Into<String>,
            V: Into<String>,
        {
            Self {
                entries: Mutex::new(
                    entries
                        .into_iter()
                        .map(|(k, v)| (k.into(), v.into()))
                        .collect(),
                ),
            }
        }

        pub fn len(&self) -> usize {
            self.lock().len()
        }

        pub fn is_empty(&self) -> bool {
            self.lock().is_empty()
        }

        fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
            // A panic while holding the lock cannot leave a half-written String.
            self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
        }
    }

    impl Storage for MemoryStorage {
        fn read(&self, key: &str) -> Result<Option<String>, std::io::Error> {
            Ok(self.lock().get(key).cloned())
        }

        fn write(&self, key: &str, data: &str) -> Result<(), std::io::Error> {
            self.lock().insert(key.to_string(), data.to_string());
            Ok(())
        }

        fn get_path(&self, key: &str) -> String {
            format!("memory::{}", key)
        }
    }
}

/// Platform-specific storage factory
#[cfg(not(target_arch = "wasm32"))]
pub fn create_storage(directory: &str) -> Box<dyn Storage> {
    Box::new(native::FileStorage::new(directory))
}

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub fn create_storage(namespace: &str) -> Box<dyn Storage> {
    Box::new(wasm::LocalStorage::new(namespace))
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryStorage;
    use super::Storage;

    #[test]
    fn memory_storage_missing_key_is_none() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.read("message").unwrap(), None);
        assert!(storage.is_empty());
    }

    #[test]
    fn memory_storage_overwrites() {
        let storage = MemoryStorage::with_entries([("sendSMS", "true")]);
        storage.write("sendSMS", "false").unwrap();
        assert_eq!(storage.read("sendSMS").unwrap().as_deref(), Some("false"));
        assert_eq!(storage.len(), 1);
        assert_eq!(storage.get_path("sendSMS"), "memory::sendSMS");
    }

    #[test]
    fn boxed_storage_forwards() {
        let storage: Box<dyn Storage> = Box::new(MemoryStorage::new());
        storage.write("k", "v").unwrap();
        assert_eq!(storage.read("k").unwrap().as_deref(), Some("v"));
    }
}
