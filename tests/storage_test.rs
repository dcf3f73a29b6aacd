#[cfg(not(target_arch = "wasm32"))]
mod native_storage_tests {
    use sos_prefs::storage::{create_storage, Storage};

    #[test]
    fn test_file_storage_read_write() {
        let dir = tempfile::tempdir().unwrap();
        let storage = create_storage(dir.path().to_str().unwrap());

        storage.write("sendSMS", "true").expect("Write should succeed");

        let content = storage.read("sendSMS").expect("Read should succeed");
        assert_eq!(content, Some("true".to_string()));

        let path = storage.get_path("sendSMS");
        assert!(path.contains(dir.path().to_str().unwrap()));
        assert!(path.ends_with("sendSMS"));
    }

    #[test]
    fn test_file_storage_read_nonexistent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = create_storage(dir.path().to_str().unwrap());

        // Missing keys are not errors
        let content = storage.read("contacts").expect("Read should succeed");
        assert_eq!(content, None);
    }

    #[test]
    fn test_file_storage_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested").join("deep");
        let storage = create_storage(nested.to_str().unwrap());

        storage.write("message", "Help at [location]").expect("Write should create directories");

        let content = storage.read("message").expect("Read should succeed");
        assert_eq!(content.as_deref(), Some("Help at [location]"));
    }

    #[test]
    fn test_file_storage_overwrite_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = create_storage(dir.path().to_str().unwrap());

        storage.write("contacts", "[]").unwrap();
        storage.write("contacts", r#"[{"id":"1","name":"A","phone":"1"}]"#).unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(
            storage.read("contacts").unwrap().as_deref(),
            Some(r#"[{"id":"1","name":"A","phone":"1"}]"#)
        );
    }

    #[test]
    fn test_file_storage_read_error_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where a value file should be cannot be read as text.
        std::fs::create_dir(dir.path().join("message")).unwrap();
        let storage = create_storage(dir.path().to_str().unwrap());

        assert!(storage.read("message").is_err());
    }

    #[test]
    fn test_storage_trait_object() {
        let dir = tempfile::tempdir().unwrap();
        let storage: Box<dyn Storage> = create_storage(dir.path().to_str().unwrap());

        storage.write("sendWhatsApp", "false").expect("Write should succeed");
        let _ = storage.read("sendWhatsApp").expect("Read should succeed");
    }
}
