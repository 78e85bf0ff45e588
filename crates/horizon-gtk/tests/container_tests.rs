//! Integration tests for containers, child lists and size groups.

#![cfg(feature = "headless")]

use horizon_gtk::ffi::headless;
use horizon_gtk::logging::{TreeFormatOptions, TreeStyle, WidgetTreeDebug};
use horizon_gtk::prelude::*;
use horizon_gtk::{
    Button, Label, Orientation, SizeGroup, SizeGroupMode, Toolkit, ToolkitConfig, Window, WindowType,
};

fn setup() -> Toolkit {
    Toolkit::init(&ToolkitConfig::headless()).unwrap()
}

#[test]
fn test_child_list_preserves_insertion_order() {
    let _tk = setup();
    let row = horizon_gtk::Box::new(Orientation::Horizontal, 4).unwrap();
    for text in ["a", "b", "c"] {
        row.pack_start(&*Label::new(text).unwrap(), false, false, 0);
    }
    let texts: Vec<String> = row
        .children()
        .iter()
        .map(|child| child.downcast_ref::<Label>().unwrap().text())
        .collect();
    assert_eq!(texts, ["a", "b", "c"]);
}

#[test]
fn test_child_list_is_a_snapshot() {
    let _tk = setup();
    let column = horizon_gtk::Box::new(Orientation::Vertical, 0).unwrap();
    let first = Button::new();
    column.add(&*first);
    let children = column.children();
    column.add(&*Button::new());
    assert_eq!(children.len(), 1);
    assert_eq!(column.children().len(), 2);
}

#[test]
fn test_size_group_membership() {
    let _tk = setup();
    let group = SizeGroup::new(SizeGroupMode::Horizontal);
    let ok = Button::with_label("OK").unwrap();
    let cancel = Button::with_label("Cancel").unwrap();
    group.add_widget(&*ok);
    group.add_widget(&*cancel);
    assert_eq!(group.widgets().len(), 2);

    let ptrs: Vec<usize> = group.widgets().iter().map(|w| w.as_ptr() as usize).collect();
    assert!(ptrs.contains(&(ok.as_ptr() as usize)));
    assert!(ptrs.contains(&(cancel.as_ptr() as usize)));

    // The group does not keep members alive.
    let ok_ptr = ok.as_ptr();
    drop(ok);
    assert_eq!(headless::ref_count(ok_ptr.cast()), None);
    assert_eq!(group.widgets().len(), 1);

    let warnings = headless::warning_count();
    group.remove_widget(&*Label::new("stranger").unwrap());
    assert_eq!(headless::warning_count(), warnings + 1);
}

#[test]
fn test_child_list_keeps_children_after_container_is_gone() {
    let _tk = setup();
    let before = headless::live_object_count();
    let children = {
        let row = horizon_gtk::Box::new(Orientation::Horizontal, 4).unwrap();
        row.pack_start(&*Button::with_label("Left").unwrap(), false, false, 0);
        row.pack_start(&*Button::with_label("Right").unwrap(), false, false, 0);
        row.children()
    };
    assert_eq!(headless::live_object_count(), before + 2);

    let warnings = headless::warning_count();
    let clicks = std::rc::Rc::new(std::cell::Cell::new(0));
    for child in &children {
        let button = child.downcast_ref::<Button>().unwrap();
        assert!(button.parent().is_none());
        let counter = clicks.clone();
        button.connect_clicked(move |_| counter.set(counter.get() + 1)).unwrap();
        button.clicked();
    }
    let labels: Vec<Option<String>> = children
        .iter()
        .map(|child| child.downcast_ref::<Button>().unwrap().label())
        .collect();
    assert_eq!(labels, [Some("Left".to_string()), Some("Right".to_string())]);
    assert_eq!(clicks.get(), 2);
    assert_eq!(headless::warning_count(), warnings);

    drop(children);
    assert_eq!(headless::live_object_count(), before);
}

#[test]
fn test_size_group_view_keeps_dropped_member() {
    let _tk = setup();
    let group = SizeGroup::new(SizeGroupMode::Both);
    let label = Label::new("detached").unwrap();
    let label_ptr = label.as_ptr();
    group.add_widget(&*label);

    let members = group.widgets();
    drop(label);
    assert_eq!(headless::ref_count(label_ptr.cast()), Some(1));

    let warnings = headless::warning_count();
    let member = members.iter().next().unwrap();
    member.set_sensitive(false);
    assert!(!member.is_sensitive());
    assert_eq!(member.downcast_ref::<Label>().unwrap().text(), "detached");
    assert_eq!(headless::warning_count(), warnings);

    drop(members);
    assert_eq!(headless::ref_count(label_ptr.cast()), None);
    assert!(group.widgets().is_empty());
}

#[test]
fn test_tree_dump_of_window() {
    let _tk = setup();
    let window = Window::new(WindowType::Toplevel);
    window.set_name("main").unwrap();
    let column = horizon_gtk::Box::new(Orientation::Vertical, 0).unwrap();
    let row = horizon_gtk::Box::new(Orientation::Horizontal, 0).unwrap();
    row.set_name("row").unwrap();
    let ok = Button::with_label("OK").unwrap();
    ok.set_name("ok").unwrap();
    row.add(&*ok);
    column.add(&*row);
    column.add(&*Label::new("status").unwrap());
    window.add(&*column);
    window.show_all();

    let options = TreeFormatOptions {
        style: TreeStyle::Ascii,
        ..TreeFormatOptions::default()
    };
    let dump = WidgetTreeDebug::with_options(options).format_subtree(&*window);
    let lines: Vec<&str> = dump.lines().collect();
    assert_eq!(
        lines,
        [
            "main (GtkWindow)",
            "`-- GtkBox (GtkBox)",
            "   +-- row (GtkBox)",
            "   |  `-- ok (GtkButton)",
            "   `-- GtkLabel (GtkLabel)",
        ]
    );
    window.destroy();
}
