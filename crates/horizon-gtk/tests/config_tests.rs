//! Integration tests for toolkit configuration and initialisation.

#![cfg(feature = "headless")]

use horizon_gtk::{Backend, ConfigError, Error, Toolkit, ToolkitConfig};

#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("toolkit.toml");
    std::fs::write(
        &path,
        "backend = \"headless\"\nsearch_dirs = [\"/opt/gtk/lib\"]\nthread_checks = false\n",
    )
    .unwrap();
    let config = ToolkitConfig::load(&path).unwrap();
    assert_eq!(config.backend(), Backend::Headless);
    assert_eq!(config.search_dirs(), [std::path::PathBuf::from("/opt/gtk/lib")]);
    assert_eq!(config.thread_checks(), Some(false));
    assert_eq!(config.library_path(), None);
}

#[test]
fn test_unknown_keys_and_missing_files_are_errors() {
    assert!(matches!(
        ToolkitConfig::from_toml_str("backend = \"headless\"\ncolour = \"blue\"\n"),
        Err(ConfigError::Parse(_))
    ));
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        ToolkitConfig::load(dir.path().join("nope.toml")),
        Err(ConfigError::Io { .. })
    ));
}

#[test]
fn test_init_binds_backend_per_thread() {
    let tk = Toolkit::init(&ToolkitConfig::headless()).unwrap();
    assert_eq!(tk.backend(), Backend::Headless);
    assert_eq!(Toolkit::current_backend(), Some(Backend::Headless));

    // Initialising again on the same thread hands back the same binding.
    let again = Toolkit::init(&ToolkitConfig::headless()).unwrap();
    assert!(std::ptr::eq(tk.api(), again.api()));

    let err = Toolkit::init(&ToolkitConfig::new().with_backend(Backend::Native)).unwrap_err();
    assert!(matches!(err, Error::AlreadyInitialized { current: Backend::Headless }));

    let other = std::thread::spawn(Toolkit::is_initialized).join().unwrap();
    assert!(!other);
}
