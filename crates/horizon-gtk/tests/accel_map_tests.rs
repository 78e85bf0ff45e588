//! Integration tests for saving and loading the accelerator map.

#![cfg(feature = "headless")]

use horizon_gtk::{AccelKey, AccelMap, ModifierType, Toolkit, ToolkitConfig};

fn setup() -> Toolkit {
    Toolkit::init(&ToolkitConfig::headless()).unwrap()
}

#[test]
fn test_save_then_load_on_fresh_thread() {
    let _tk = setup();
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("accels.rc");

    AccelMap::add_entry("<Editor>/File/Save", 's' as u32, ModifierType::CONTROL).unwrap();
    AccelMap::add_entry("<Editor>/File/Quit", 'q' as u32, ModifierType::CONTROL | ModifierType::SHIFT).unwrap();
    AccelMap::save(&file).unwrap();

    let text = std::fs::read_to_string(&file).unwrap();
    assert!(text.starts_with(';'));
    assert!(text.contains("(gtk_accel_path \"<Editor>/File/Save\" \"<Primary>s\")"));

    // Each thread has its own headless toolkit, so this starts empty.
    let loaded = std::thread::spawn(move || {
        let _tk = setup();
        assert_eq!(AccelMap::lookup_entry("<Editor>/File/Quit").unwrap(), None);
        AccelMap::load(&file).unwrap();
        AccelMap::lookup_entry("<Editor>/File/Quit").unwrap()
    })
    .join()
    .unwrap();
    assert_eq!(
        loaded,
        Some(AccelKey {
            key: 'q' as u32,
            mods: ModifierType::CONTROL | ModifierType::SHIFT,
        })
    );
}

#[test]
fn test_load_overrides_and_skips_malformed_lines() {
    let _tk = setup();
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("custom.rc");
    std::fs::write(
        &file,
        "; user overrides\n\
         (gtk_accel_path \"<Viewer>/Zoom/Reset\" \"<Control>0\")\n\
         (gtk_accel_path \"Viewer/Broken\" \"<Control>b\")\n\
         (gtk_accel_path \"<Viewer>/Zoom/Bad\" \"<Hyper>x\")\n\
         not an entry\n",
    )
    .unwrap();

    AccelMap::add_entry("<Viewer>/Zoom/Reset", 'r' as u32, ModifierType::empty()).unwrap();
    AccelMap::load(&file).unwrap();
    assert_eq!(
        AccelMap::lookup_entry("<Viewer>/Zoom/Reset").unwrap(),
        Some(AccelKey {
            key: '0' as u32,
            mods: ModifierType::CONTROL,
        })
    );
    assert_eq!(AccelMap::lookup_entry("<Viewer>/Zoom/Bad").unwrap(), None);
}

#[test]
fn test_missing_file_is_not_an_error() {
    let _tk = setup();
    let dir = tempfile::tempdir().unwrap();
    let warnings = horizon_gtk::ffi::headless::warning_count();
    AccelMap::load(dir.path().join("absent.rc")).unwrap();
    assert_eq!(horizon_gtk::ffi::headless::warning_count(), warnings);
}
