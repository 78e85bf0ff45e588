//! Integration tests for handle ownership against the headless backend.

#![cfg(feature = "headless")]

use horizon_gtk::ffi::headless;
use horizon_gtk::prelude::*;
use horizon_gtk::{
    Borrowed, Button, Label, Object, Orientation, Owned, SizeGroup, SizeGroupMode, Toolkit, ToolkitConfig, Widget,
    Window, WindowType,
};

fn setup() -> Toolkit {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("horizon_gtk=trace,horizon_gtk_sys=debug")
        .with_test_writer()
        .try_init();
    Toolkit::init(&ToolkitConfig::headless()).unwrap()
}

#[test]
fn test_every_created_object_is_finalized() {
    let _tk = setup();
    let before = headless::live_object_count();
    {
        let column = horizon_gtk::Box::new(Orientation::Vertical, 0).unwrap();
        for i in 0..5 {
            let label = Label::new(&format!("row {i}")).unwrap();
            column.add(&*label);
        }
        let group = SizeGroup::new(SizeGroupMode::Both);
        for child in &column.children() {
            group.add_widget(&*child);
        }
        assert_eq!(headless::live_object_count(), before + 7);
    }
    assert_eq!(headless::live_object_count(), before);
}

#[test]
fn test_release_is_equivalent_to_drop() {
    let _tk = setup();
    let before = headless::live_object_count();
    let a = Button::new();
    let b = a.clone();
    a.release();
    assert_eq!(headless::ref_count(b.as_ptr().cast()), Some(1));
    drop(b);
    assert_eq!(headless::live_object_count(), before);
}

#[test]
fn test_into_raw_and_back() {
    let _tk = setup();
    let button = Button::new();
    let raw = button.into_raw();
    // SAFETY: `raw` carries the reference given up by `into_raw`, and it is
    // no longer floating.
    let button = unsafe { Owned::<Button>::from_raw_full(raw) }.unwrap();
    assert_eq!(headless::ref_count(button.as_ptr().cast()), Some(1));
}

#[test]
fn test_borrowed_view_does_not_change_counts() {
    let _tk = setup();
    let label = Label::new("view").unwrap();
    let ptr = label.as_ptr();
    let views: Vec<Borrowed<'_, Label>> = (0..3).map(|_| label.borrow()).collect();
    for view in &views {
        assert_eq!(view.text(), "view");
    }
    assert_eq!(headless::ref_count(ptr.cast()), Some(1));
}

#[test]
fn test_upcast_downcast_round_trip() {
    let _tk = setup();
    let button = Button::with_label("cast").unwrap();
    let as_widget: Owned<Widget> = button.clone().upcast();
    let as_object: Owned<Object> = as_widget.upcast();
    assert!(as_object.is::<Widget>());
    assert!(!as_object.is::<Window>());
    let back = as_object.downcast::<Button>().unwrap();
    assert!(back.ptr_eq(&*button));
    assert_eq!(back.label().as_deref(), Some("cast"));
    assert_eq!(headless::ref_count(button.as_ptr().cast()), Some(2));
}

#[test]
fn test_window_outlives_released_handle_until_destroyed() {
    let _tk = setup();
    let before = headless::live_object_count();
    let window = Window::new(WindowType::Toplevel);
    let label = Label::new("inside").unwrap();
    window.add(&*label);
    let label_ptr = label.as_ptr();
    label.release();
    let kept = window.clone();
    window.release();
    assert_eq!(headless::live_object_count(), before + 2);

    kept.destroy();
    assert_eq!(headless::ref_count(label_ptr.cast()), None);
    kept.release();
    assert_eq!(headless::live_object_count(), before);
}

#[test]
fn test_facade_without_init_panics_on_that_thread() {
    let _tk = setup();
    let result = std::thread::spawn(|| std::panic::catch_unwind(|| Button::new().release()).is_err())
        .join()
        .unwrap();
    assert!(result);
}
