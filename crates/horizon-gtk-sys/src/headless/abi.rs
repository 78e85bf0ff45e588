//! In-process implementations of every toolkit entry point.
//!
//! Each function has the C signature of the symbol it is named after and is
//! stored in the headless [`NativeApi`](crate::NativeApi) table. Invalid
//! instances, names and ids produce a warning and a zero or no-op result,
//! the way the native library's precondition checks do.
//!
//! Nothing here holds the world borrow across a callback: signal handlers
//! and destroy notifies may call back into any function in this module.

#![allow(clippy::missing_safety_doc)]

use std::ffi::{CStr, CString, c_char, c_int};
use std::path::PathBuf;

use super::object::Value;
use super::signal::{self, ConnectRefusal, EmitArg};
use super::types::*;
use super::{accel, native_warning, with_world};
use crate::types::*;

/// The type a pointer argument must have and the assertion GTK would print.
struct Expect {
    ty: GType,
    assertion: &'static str,
}

const OBJECT: Expect = Expect {
    ty: G_TYPE_OBJECT,
    assertion: "G_IS_OBJECT (object)",
};
const APPLICATION: Expect = Expect {
    ty: G_TYPE_APPLICATION,
    assertion: "G_IS_APPLICATION (application)",
};
const WIDGET: Expect = Expect {
    ty: GTK_TYPE_WIDGET,
    assertion: "GTK_IS_WIDGET (widget)",
};
const CONTAINER: Expect = Expect {
    ty: GTK_TYPE_CONTAINER,
    assertion: "GTK_IS_CONTAINER (container)",
};
const BIN: Expect = Expect {
    ty: GTK_TYPE_BIN,
    assertion: "GTK_IS_BIN (bin)",
};
const WINDOW: Expect = Expect {
    ty: GTK_TYPE_WINDOW,
    assertion: "GTK_IS_WINDOW (window)",
};
const BUTTON: Expect = Expect {
    ty: GTK_TYPE_BUTTON,
    assertion: "GTK_IS_BUTTON (button)",
};
const LABEL: Expect = Expect {
    ty: GTK_TYPE_LABEL,
    assertion: "GTK_IS_LABEL (label)",
};
const BOX: Expect = Expect {
    ty: GTK_TYPE_BOX,
    assertion: "GTK_IS_BOX (box)",
};
const MENU_ITEM: Expect = Expect {
    ty: GTK_TYPE_MENU_ITEM,
    assertion: "GTK_IS_MENU_ITEM (menu_item)",
};
const IMAGE: Expect = Expect {
    ty: GTK_TYPE_IMAGE,
    assertion: "GTK_IS_IMAGE (image)",
};
const SIZE_GROUP: Expect = Expect {
    ty: GTK_TYPE_SIZE_GROUP,
    assertion: "GTK_IS_SIZE_GROUP (size_group)",
};
const GTK_APPLICATION: Expect = Expect {
    ty: GTK_TYPE_APPLICATION,
    assertion: "GTK_IS_APPLICATION (application)",
};

/// Internal flag set by `g_application_quit` while an application runs.
const QUIT_REQUESTED: &str = "horizon-quit-requested";

const MAX_MARGIN: gint = 32767;
const MAX_BORDER_WIDTH: guint = 65535;
const MAX_APPLICATION_ID: usize = 255;

fn check<T>(ptr: *mut T, expect: &Expect, function: &'static str) -> Option<usize> {
    let addr = ptr as usize;
    if with_world(|w| w.is_instance_of(addr, expect.ty)) {
        Some(addr)
    } else {
        native_warning!(function, "{function}: assertion '{}' failed", expect.assertion);
        None
    }
}

fn precondition(ok: bool, function: &'static str, assertion: &str) -> bool {
    if !ok {
        native_warning!(function, "{function}: assertion '{assertion}' failed");
    }
    ok
}

/// Copy a nullable C string.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string.
unsafe fn owned_str(ptr: *const gchar) -> Option<CString> {
    if ptr.is_null() {
        None
    } else {
        // SAFETY: forwarded to the caller.
        Some(unsafe { CStr::from_ptr(ptr) }.to_owned())
    }
}

fn type_name(addr: usize) -> String {
    with_world(|w| w.type_of(addr))
        .and_then(info)
        .map_or_else(|| "<invalid>".to_string(), |i| i.name.to_string_lossy().into_owned())
}

fn gbool(value: bool) -> gboolean {
    if value { GTRUE } else { GFALSE }
}

fn emit_void(addr: usize, name: &str) {
    signal::emit(addr, name, None, EmitArg::None);
}

fn notify(addr: usize, property: &'static str) {
    let pspec = with_world(|w| w.pspec(property));
    signal::emit(addr, "notify", Some(property), EmitArg::Pointer(pspec));
}

/// Store a property and emit `notify` if it changed.
fn set_property(addr: usize, property: &'static str, value: Value) {
    let (changed, released) = with_world(|w| w.set_prop(addr, property, value));
    if let Some(old) = released {
        // SAFETY: the old value held this reference.
        unsafe { g_object_unref(old as gpointer) };
    }
    if changed {
        notify(addr, property);
    }
}

fn bool_property(addr: usize, property: &str) -> gboolean {
    gbool(with_world(|w| w.instance(addr).is_some_and(|i| i.bool_prop(property))))
}

fn int_property(addr: usize, property: &str) -> gint {
    with_world(|w| w.instance(addr).map_or(0, |i| i.int_prop(property)))
}

fn str_property(addr: usize, property: &str) -> *const gchar {
    with_world(|w| w.instance(addr).map_or(std::ptr::null(), |i| i.str_prop(property)))
}

fn widget_defaults() -> Vec<(&'static str, Value)> {
    vec![
        ("visible", Value::Bool(false)),
        ("sensitive", Value::Bool(true)),
        ("margin-start", Value::Int(0)),
        ("margin-end", Value::Int(0)),
        ("margin-top", Value::Int(0)),
        ("margin-bottom", Value::Int(0)),
        ("name", Value::Str(None)),
        ("tooltip-text", Value::Str(None)),
        ("width-request", Value::Int(-1)),
        ("height-request", Value::Int(-1)),
        ("hexpand", Value::Bool(false)),
        ("vexpand", Value::Bool(false)),
    ]
}

fn container_defaults() -> Vec<(&'static str, Value)> {
    let mut props = widget_defaults();
    props.push(("border-width", Value::UInt(0)));
    props
}

fn create_widget(ty: GType, extra: Vec<(&'static str, Value)>) -> *mut GtkWidget {
    let mut props = if is_a(ty, GTK_TYPE_CONTAINER) {
        container_defaults()
    } else {
        widget_defaults()
    };
    props.extend(extra);
    with_world(|w| w.create(ty, &props)) as *mut GtkWidget
}

// ---------------------------------------------------------------------------
// GLib / GObject
// ---------------------------------------------------------------------------

pub unsafe extern "C" fn g_free(mem: gpointer) {
    if mem.is_null() {
        return;
    }
    let addr = mem as usize;
    if with_world(|w| w.strings.remove(&addr)) {
        // SAFETY: registered in `strings` by `into_transfer_full`.
        drop(unsafe { CString::from_raw(mem as *mut c_char) });
    } else {
        native_warning!(ptr = ?mem, "g_free: pointer was not allocated by the toolkit");
    }
}

/// Hand a string to the caller, who frees it with `g_free`.
fn into_transfer_full(value: CString) -> *mut gchar {
    let ptr = value.into_raw();
    with_world(|w| w.strings.insert(ptr as usize));
    ptr
}

pub unsafe extern "C" fn g_list_free(list: *mut GList) {
    if list.is_null() {
        return;
    }
    if !with_world(|w| w.lists.remove(&(list as usize))) {
        native_warning!("g_list_free: list was not allocated by the toolkit");
        return;
    }
    let mut node = list;
    while !node.is_null() {
        // SAFETY: every node was boxed by `gtk_container_get_children`.
        let boxed = unsafe { Box::from_raw(node) };
        node = boxed.next;
    }
}

pub unsafe extern "C" fn g_object_ref(object: gpointer) -> gpointer {
    if with_world(|w| w.add_ref(object as usize)) {
        tracing::trace!(target: super::TARGET, object = ?object, "ref");
        object
    } else {
        native_warning!("g_object_ref: assertion '{}' failed", OBJECT.assertion);
        std::ptr::null_mut()
    }
}

pub unsafe extern "C" fn g_object_ref_sink(object: gpointer) -> gpointer {
    if with_world(|w| w.ref_sink(object as usize)) {
        tracing::trace!(target: super::TARGET, object = ?object, "ref_sink");
        object
    } else {
        native_warning!("g_object_ref_sink: assertion '{}' failed", OBJECT.assertion);
        std::ptr::null_mut()
    }
}

pub unsafe extern "C" fn g_object_unref(object: gpointer) {
    let addr = object as usize;
    if with_world(|w| w.instance(addr).is_none()) {
        native_warning!("g_object_unref: assertion '{}' failed", OBJECT.assertion);
        return;
    }

    let mut queue = vec![addr];
    while let Some(addr) = queue.pop() {
        // A widget losing its last reference is destroyed first, which can
        // emit signals and release children.
        let dispose = with_world(|w| {
            w.instance(addr).is_some_and(|i| {
                i.ref_count == 1 && !i.destroyed && !i.in_destruction && is_a(i.ty, GTK_TYPE_WIDGET)
            })
        });
        if dispose {
            destroy_widget(addr);
        }

        let Some(mut finalized) = with_world(|w| w.drop_ref(addr)) else {
            continue;
        };
        for pending in std::mem::take(&mut finalized.notifies) {
            // SAFETY: taken out of the registry, so it runs once.
            unsafe { pending.run() };
        }
        queue.append(&mut finalized.release);
        finalized.free_header();
    }
}

pub unsafe extern "C" fn g_object_is_floating(object: gpointer) -> gboolean {
    match with_world(|w| w.instance(object as usize).map(|i| i.floating)) {
        Some(floating) => gbool(floating),
        None => {
            native_warning!("g_object_is_floating: assertion '{}' failed", OBJECT.assertion);
            GFALSE
        }
    }
}

pub unsafe extern "C" fn g_type_check_instance_is_a(instance: gpointer, iface_type: GType) -> gboolean {
    gbool(with_world(|w| w.is_instance_of(instance as usize, iface_type)))
}

pub unsafe extern "C" fn g_type_name_from_instance(instance: gpointer) -> *const gchar {
    if instance.is_null() {
        return c"(NULL)".as_ptr();
    }
    with_world(|w| w.type_of(instance as usize))
        .and_then(info)
        .map_or(c"<invalid>".as_ptr(), |i| i.name.as_ptr())
}

pub unsafe extern "C" fn g_signal_connect_data(
    instance: gpointer,
    detailed_signal: *const gchar,
    c_handler: GCallback,
    data: gpointer,
    destroy_data: GClosureNotify,
    connect_flags: GConnectFlags,
) -> gulong {
    let addr = instance as usize;
    let name = if detailed_signal.is_null() {
        String::new()
    } else {
        // SAFETY: the caller passes a NUL-terminated signal name.
        unsafe { CStr::from_ptr(detailed_signal) }
            .to_string_lossy()
            .into_owned()
    };

    let result = with_world(|w| {
        w.connect(
            addr,
            &name,
            c_handler,
            data,
            destroy_data,
            connect_flags & G_CONNECT_AFTER != 0,
            connect_flags & G_CONNECT_SWAPPED != 0,
        )
    });

    match result {
        Ok(key) => {
            tracing::debug!(target: super::TARGET, signal = %name, id = key.id(), "handler connected");
            key.id()
        }
        Err(refusal) => {
            match refusal {
                ConnectRefusal::InvalidInstance => {
                    native_warning!("g_signal_connect_data: assertion 'G_TYPE_CHECK_INSTANCE (instance)' failed")
                }
                ConnectRefusal::NullHandler => {
                    native_warning!("g_signal_connect_data: assertion 'c_handler != NULL' failed")
                }
                ConnectRefusal::MalformedName => {
                    native_warning!(signal = %name, "unable to parse signal name '{name}'")
                }
                ConnectRefusal::UnknownSignal { type_name } => native_warning!(
                    signal = %name,
                    "signal '{name}' is invalid for instance '{instance:p}' of type '{type_name}'"
                ),
                ConnectRefusal::DetailNotAllowed => {
                    native_warning!(signal = %name, "signal '{name}' does not support details")
                }
            }
            0
        }
    }
}

pub unsafe extern "C" fn g_signal_handler_disconnect(instance: gpointer, handler_id: gulong) {
    match with_world(|w| w.disconnect(instance as usize, handler_id)) {
        Some(pending) => {
            tracing::debug!(target: super::TARGET, id = handler_id, "handler disconnected");
            if let Some(pending) = pending {
                // SAFETY: removed from the registry, so it runs once.
                unsafe { pending.run() };
            }
        }
        None => native_warning!(
            id = handler_id,
            "instance '{instance:p}' has no handler with id '{handler_id}'"
        ),
    }
}

pub unsafe extern "C" fn g_signal_handler_is_connected(instance: gpointer, handler_id: gulong) -> gboolean {
    gbool(with_world(|w| w.handler_of(instance as usize, handler_id).is_some()))
}

pub unsafe extern "C" fn g_signal_handler_block(instance: gpointer, handler_id: gulong) {
    let blocked = with_world(|w| {
        let key = w.handler_of(instance as usize, handler_id)?;
        let handler = w.handlers.get_mut(key)?;
        handler.block_count += 1;
        Some(())
    });
    if blocked.is_none() {
        native_warning!(id = handler_id, "instance '{instance:p}' has no handler with id '{handler_id}'");
    }
}

pub unsafe extern "C" fn g_signal_handler_unblock(instance: gpointer, handler_id: gulong) {
    let unblocked = with_world(|w| {
        let key = w.handler_of(instance as usize, handler_id)?;
        let handler = w.handlers.get_mut(key)?;
        Some(match handler.block_count {
            0 => false,
            _ => {
                handler.block_count -= 1;
                true
            }
        })
    });
    match unblocked {
        Some(true) => {}
        Some(false) => native_warning!(id = handler_id, "handler '{handler_id}' of instance '{instance:p}' is not blocked"),
        None => native_warning!(id = handler_id, "instance '{instance:p}' has no handler with id '{handler_id}'"),
    }
}

// ---------------------------------------------------------------------------
// GIO
// ---------------------------------------------------------------------------

/// Reverse-DNS style: at least two non-empty dot-separated elements of
/// `[A-Za-z0-9_-]`, none starting with a digit, at most 255 bytes.
pub(crate) fn application_id_is_valid(id: &[u8]) -> bool {
    if id.is_empty() || id.len() > MAX_APPLICATION_ID || id[0] == b'.' {
        return false;
    }
    let mut elements = 0;
    for element in id.split(|&b| b == b'.') {
        let Some(&first) = element.first() else {
            return false;
        };
        if first.is_ascii_digit() {
            return false;
        }
        if !element
            .iter()
            .all(|&b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        {
            return false;
        }
        elements += 1;
    }
    elements >= 2
}

pub unsafe extern "C" fn g_application_id_is_valid(application_id: *const gchar) -> gboolean {
    if application_id.is_null() {
        return GFALSE;
    }
    // SAFETY: the caller passes a NUL-terminated string.
    let id = unsafe { CStr::from_ptr(application_id) };
    gbool(application_id_is_valid(id.to_bytes()))
}

pub unsafe extern "C" fn g_application_get_application_id(application: *mut GApplication) -> *const gchar {
    check(application, &APPLICATION, "g_application_get_application_id")
        .map_or(std::ptr::null(), |addr| str_property(addr, "application-id"))
}

pub unsafe extern "C" fn g_application_run(application: *mut GApplication, _argc: c_int, _argv: *mut *mut c_char) -> c_int {
    let Some(addr) = check(application, &APPLICATION, "g_application_run") else {
        return 1;
    };
    // SAFETY: `addr` is a live application.
    unsafe { g_object_ref(addr as gpointer) };
    let id = with_world(|w| match w.instance(addr).and_then(|i| i.prop("application-id")) {
        Some(Value::Str(Some(id))) => id.to_string_lossy().into_owned(),
        _ => String::new(),
    });
    tracing::debug!(target: super::TARGET, %id, "application running");

    emit_void(addr, "startup");
    let quit_early = with_world(|w| w.instance(addr).is_some_and(|i| i.bool_prop(QUIT_REQUESTED)));
    if !quit_early {
        emit_void(addr, "activate");
    }
    emit_void(addr, "shutdown");
    with_world(|w| w.set_prop(addr, QUIT_REQUESTED, Value::Bool(false)));

    // SAFETY: balances the reference above.
    unsafe { g_object_unref(addr as gpointer) };
    0
}

pub unsafe extern "C" fn g_application_quit(application: *mut GApplication) {
    if let Some(addr) = check(application, &APPLICATION, "g_application_quit") {
        with_world(|w| w.set_prop(addr, QUIT_REQUESTED, Value::Bool(true)));
    }
}

// ---------------------------------------------------------------------------
// GTK: initialisation and type ids
// ---------------------------------------------------------------------------

pub unsafe extern "C" fn gtk_init_check(_argc: *mut c_int, _argv: *mut *mut *mut c_char) -> gboolean {
    with_world(|w| w.initialized = true);
    GTRUE
}

pub unsafe extern "C" fn gtk_widget_get_type() -> GType {
    GTK_TYPE_WIDGET
}

pub unsafe extern "C" fn gtk_container_get_type() -> GType {
    GTK_TYPE_CONTAINER
}

pub unsafe extern "C" fn gtk_bin_get_type() -> GType {
    GTK_TYPE_BIN
}

pub unsafe extern "C" fn gtk_window_get_type() -> GType {
    GTK_TYPE_WINDOW
}

pub unsafe extern "C" fn gtk_button_get_type() -> GType {
    GTK_TYPE_BUTTON
}

pub unsafe extern "C" fn gtk_label_get_type() -> GType {
    GTK_TYPE_LABEL
}

pub unsafe extern "C" fn gtk_box_get_type() -> GType {
    GTK_TYPE_BOX
}

pub unsafe extern "C" fn gtk_menu_item_get_type() -> GType {
    GTK_TYPE_MENU_ITEM
}

pub unsafe extern "C" fn gtk_image_get_type() -> GType {
    GTK_TYPE_IMAGE
}

pub unsafe extern "C" fn gtk_size_group_get_type() -> GType {
    GTK_TYPE_SIZE_GROUP
}

pub unsafe extern "C" fn gtk_application_get_type() -> GType {
    GTK_TYPE_APPLICATION
}

// ---------------------------------------------------------------------------
// GtkWidget
// ---------------------------------------------------------------------------

/// Run the destroy sequence on a widget.
///
/// Emits `destroy`, destroys children, detaches from the parent, drops the
/// toolkit's reference on a toplevel, leaves size groups and disconnects
/// every handler. A temporary reference keeps the widget alive throughout.
fn destroy_widget(addr: usize) {
    let proceed = with_world(|w| match w.instance_mut(addr) {
        Some(i) if !i.in_destruction && !i.destroyed => {
            i.in_destruction = true;
            i.ref_count += 1;
            true
        }
        _ => false,
    });
    if !proceed {
        return;
    }
    tracing::trace!(target: super::TARGET, addr = ?(addr as *const u8), "destroying widget");

    emit_void(addr, "destroy");

    for child in with_world(|w| w.children_of(addr)) {
        destroy_widget(child);
    }

    if let Some(parent) = with_world(|w| w.parent_of(addr)) {
        remove_child(parent, addr);
    }

    if with_world(|w| w.is_instance_of(addr, GTK_TYPE_WINDOW)) {
        set_property(addr, "application", Value::Object(None));
    }

    let was_toplevel = with_world(|w| {
        let before = w.toplevels.len();
        w.toplevels.retain(|&t| t != addr);
        before != w.toplevels.len()
    });
    if was_toplevel {
        // SAFETY: releases the reference the toolkit took in `gtk_window_new`.
        unsafe { g_object_unref(addr as gpointer) };
    }

    with_world(|w| w.leave_size_groups(addr));

    for pending in with_world(|w| w.disconnect_all(addr)) {
        // SAFETY: removed from the registry, so it runs once.
        unsafe { pending.run() };
    }

    with_world(|w| {
        if let Some(i) = w.instance_mut(addr) {
            i.in_destruction = false;
            i.destroyed = true;
            i.props.insert("visible", Value::Bool(false));
        }
    });

    // SAFETY: balances the temporary reference.
    unsafe { g_object_unref(addr as gpointer) };
}

fn set_visible(addr: usize, visible: bool) {
    let current = with_world(|w| w.instance(addr).map(|i| (i.bool_prop("visible"), i.destroyed || i.in_destruction)));
    match current {
        Some((now, false)) if now != visible => {
            set_property(addr, "visible", Value::Bool(visible));
            emit_void(addr, if visible { "show" } else { "hide" });
        }
        _ => {}
    }
}

fn show_all(addr: usize) {
    for child in with_world(|w| w.children_of(addr)) {
        show_all(child);
    }
    set_visible(addr, true);
}

pub unsafe extern "C" fn gtk_widget_show(widget: *mut GtkWidget) {
    if let Some(addr) = check(widget, &WIDGET, "gtk_widget_show") {
        set_visible(addr, true);
    }
}

pub unsafe extern "C" fn gtk_widget_show_all(widget: *mut GtkWidget) {
    if let Some(addr) = check(widget, &WIDGET, "gtk_widget_show_all") {
        show_all(addr);
    }
}

pub unsafe extern "C" fn gtk_widget_hide(widget: *mut GtkWidget) {
    if let Some(addr) = check(widget, &WIDGET, "gtk_widget_hide") {
        set_visible(addr, false);
    }
}

pub unsafe extern "C" fn gtk_widget_destroy(widget: *mut GtkWidget) {
    if let Some(addr) = check(widget, &WIDGET, "gtk_widget_destroy") {
        destroy_widget(addr);
    }
}

pub unsafe extern "C" fn gtk_widget_get_visible(widget: *mut GtkWidget) -> gboolean {
    check(widget, &WIDGET, "gtk_widget_get_visible").map_or(GFALSE, |addr| bool_property(addr, "visible"))
}

pub unsafe extern "C" fn gtk_widget_set_sensitive(widget: *mut GtkWidget, sensitive: gboolean) {
    if let Some(addr) = check(widget, &WIDGET, "gtk_widget_set_sensitive") {
        set_property(addr, "sensitive", Value::Bool(sensitive != GFALSE));
    }
}

pub unsafe extern "C" fn gtk_widget_get_sensitive(widget: *mut GtkWidget) -> gboolean {
    check(widget, &WIDGET, "gtk_widget_get_sensitive").map_or(GFALSE, |addr| bool_property(addr, "sensitive"))
}

fn set_margin(widget: *mut GtkWidget, property: &'static str, margin: gint, function: &'static str) {
    let Some(addr) = check(widget, &WIDGET, function) else {
        return;
    };
    if !(0..=MAX_MARGIN).contains(&margin) {
        native_warning!(
            function,
            "value \"{margin}\" of type 'gint' is invalid or out of range for property '{property}' of type 'gint'"
        );
        return;
    }
    set_property(addr, property, Value::Int(margin));
}

fn get_margin(widget: *mut GtkWidget, property: &str, function: &'static str) -> gint {
    check(widget, &WIDGET, function).map_or(0, |addr| int_property(addr, property))
}

pub unsafe extern "C" fn gtk_widget_set_margin_start(widget: *mut GtkWidget, margin: gint) {
    set_margin(widget, "margin-start", margin, "gtk_widget_set_margin_start");
}

pub unsafe extern "C" fn gtk_widget_get_margin_start(widget: *mut GtkWidget) -> gint {
    get_margin(widget, "margin-start", "gtk_widget_get_margin_start")
}

pub unsafe extern "C" fn gtk_widget_set_margin_end(widget: *mut GtkWidget, margin: gint) {
    set_margin(widget, "margin-end", margin, "gtk_widget_set_margin_end");
}

pub unsafe extern "C" fn gtk_widget_get_margin_end(widget: *mut GtkWidget) -> gint {
    get_margin(widget, "margin-end", "gtk_widget_get_margin_end")
}

pub unsafe extern "C" fn gtk_widget_set_margin_top(widget: *mut GtkWidget, margin: gint) {
    set_margin(widget, "margin-top", margin, "gtk_widget_set_margin_top");
}

pub unsafe extern "C" fn gtk_widget_get_margin_top(widget: *mut GtkWidget) -> gint {
    get_margin(widget, "margin-top", "gtk_widget_get_margin_top")
}

pub unsafe extern "C" fn gtk_widget_set_margin_bottom(widget: *mut GtkWidget, margin: gint) {
    set_margin(widget, "margin-bottom", margin, "gtk_widget_set_margin_bottom");
}

pub unsafe extern "C" fn gtk_widget_get_margin_bottom(widget: *mut GtkWidget) -> gint {
    get_margin(widget, "margin-bottom", "gtk_widget_get_margin_bottom")
}

pub unsafe extern "C" fn gtk_widget_set_name(widget: *mut GtkWidget, name: *const gchar) {
    if let Some(addr) = check(widget, &WIDGET, "gtk_widget_set_name") {
        // SAFETY: the caller passes null or a NUL-terminated string.
        set_property(addr, "name", Value::Str(unsafe { owned_str(name) }));
    }
}

/// The widget name, or its type name when none was set.
pub unsafe extern "C" fn gtk_widget_get_name(widget: *mut GtkWidget) -> *const gchar {
    let Some(addr) = check(widget, &WIDGET, "gtk_widget_get_name") else {
        return std::ptr::null();
    };
    let name = str_property(addr, "name");
    if !name.is_null() {
        return name;
    }
    with_world(|w| w.type_of(addr))
        .and_then(info)
        .map_or(std::ptr::null(), |i| i.name.as_ptr())
}

pub unsafe extern "C" fn gtk_widget_set_tooltip_text(widget: *mut GtkWidget, text: *const gchar) {
    if let Some(addr) = check(widget, &WIDGET, "gtk_widget_set_tooltip_text") {
        // SAFETY: the caller passes null or a NUL-terminated string.
        set_property(addr, "tooltip-text", Value::Str(unsafe { owned_str(text) }));
    }
}

/// Returns a newly allocated copy, freed with `g_free`.
pub unsafe extern "C" fn gtk_widget_get_tooltip_text(widget: *mut GtkWidget) -> *mut gchar {
    let Some(addr) = check(widget, &WIDGET, "gtk_widget_get_tooltip_text") else {
        return std::ptr::null_mut();
    };
    let text = with_world(|w| match w.instance(addr).and_then(|i| i.prop("tooltip-text")) {
        Some(Value::Str(Some(text))) => Some(text.clone()),
        _ => None,
    });
    text.map_or(std::ptr::null_mut(), into_transfer_full)
}

pub unsafe extern "C" fn gtk_widget_set_size_request(widget: *mut GtkWidget, width: gint, height: gint) {
    let Some(addr) = check(widget, &WIDGET, "gtk_widget_set_size_request") else {
        return;
    };
    if !precondition(width >= -1, "gtk_widget_set_size_request", "width >= -1")
        || !precondition(height >= -1, "gtk_widget_set_size_request", "height >= -1")
    {
        return;
    }
    set_property(addr, "width-request", Value::Int(width));
    set_property(addr, "height-request", Value::Int(height));
}

pub unsafe extern "C" fn gtk_widget_get_size_request(widget: *mut GtkWidget, width: *mut gint, height: *mut gint) {
    let (w_req, h_req) = check(widget, &WIDGET, "gtk_widget_get_size_request").map_or((-1, -1), |addr| {
        (int_property(addr, "width-request"), int_property(addr, "height-request"))
    });
    // SAFETY: the caller passes null or writable out-parameters.
    unsafe {
        if !width.is_null() {
            *width = w_req;
        }
        if !height.is_null() {
            *height = h_req;
        }
    }
}

pub unsafe extern "C" fn gtk_widget_set_hexpand(widget: *mut GtkWidget, expand: gboolean) {
    if let Some(addr) = check(widget, &WIDGET, "gtk_widget_set_hexpand") {
        set_property(addr, "hexpand", Value::Bool(expand != GFALSE));
    }
}

pub unsafe extern "C" fn gtk_widget_get_hexpand(widget: *mut GtkWidget) -> gboolean {
    check(widget, &WIDGET, "gtk_widget_get_hexpand").map_or(GFALSE, |addr| bool_property(addr, "hexpand"))
}

pub unsafe extern "C" fn gtk_widget_set_vexpand(widget: *mut GtkWidget, expand: gboolean) {
    if let Some(addr) = check(widget, &WIDGET, "gtk_widget_set_vexpand") {
        set_property(addr, "vexpand", Value::Bool(expand != GFALSE));
    }
}

pub unsafe extern "C" fn gtk_widget_get_vexpand(widget: *mut GtkWidget) -> gboolean {
    check(widget, &WIDGET, "gtk_widget_get_vexpand").map_or(GFALSE, |addr| bool_property(addr, "vexpand"))
}

pub unsafe extern "C" fn gtk_widget_get_parent(widget: *mut GtkWidget) -> *mut GtkWidget {
    check(widget, &WIDGET, "gtk_widget_get_parent")
        .and_then(|addr| with_world(|w| w.parent_of(addr)))
        .map_or(std::ptr::null_mut(), |parent| parent as *mut GtkWidget)
}

// ---------------------------------------------------------------------------
// GtkContainer / GtkBin
// ---------------------------------------------------------------------------

/// Checks shared by `gtk_container_add` and `gtk_box_pack_start`.
fn can_parent(container: usize, widget: usize, function: &'static str) -> bool {
    if container == widget {
        native_warning!(function, "{function}: assertion 'container != widget' failed");
        return false;
    }
    let (widget_parent, is_toplevel, bin_child, is_ancestor) = with_world(|w| {
        let mut ancestor = w.parent_of(container);
        let mut is_ancestor = false;
        while let Some(a) = ancestor {
            if a == widget {
                is_ancestor = true;
                break;
            }
            ancestor = w.parent_of(a);
        }
        (
            w.parent_of(widget),
            w.is_instance_of(widget, GTK_TYPE_WINDOW),
            w.is_instance_of(container, GTK_TYPE_BIN)
                .then(|| w.children_of(container).first().copied())
                .flatten(),
            is_ancestor,
        )
    });

    if let Some(parent) = widget_parent {
        native_warning!(
            function,
            "Attempting to add a widget with type {} to a container of type {}, but the widget is already inside a container of type {}",
            type_name(widget),
            type_name(container),
            type_name(parent)
        );
        return false;
    }
    if is_toplevel {
        native_warning!(function, "Can't add a toplevel widget of type {} to a container", type_name(widget));
        return false;
    }
    if bin_child.is_some() {
        native_warning!(
            function,
            "Attempting to add a widget with type {} to a {}, but as a GtkBin subclass a {} can only contain one widget at a time",
            type_name(widget),
            type_name(container),
            type_name(container)
        );
        return false;
    }
    if is_ancestor {
        native_warning!(function, "Attempting to add a widget to one of its own descendants");
        return false;
    }
    true
}

fn adopt_child(container: usize, widget: usize) {
    with_world(|w| {
        w.ref_sink(widget);
        w.attach(container, widget);
    });
}

/// Detach `child` from `container`, emit `remove` and drop the container's
/// reference.
fn remove_child(container: usize, child: usize) {
    // SAFETY: `child` is live; the temporary ref spans the emission.
    unsafe { g_object_ref(child as gpointer) };
    if with_world(|w| w.detach(container, child)) {
        signal::emit(container, "remove", None, EmitArg::Pointer(child as gpointer));
        // SAFETY: the reference the container held.
        unsafe { g_object_unref(child as gpointer) };
    }
    // SAFETY: balances the temporary reference.
    unsafe { g_object_unref(child as gpointer) };
}

pub unsafe extern "C" fn gtk_container_add(container: *mut GtkContainer, widget: *mut GtkWidget) {
    let Some(parent) = check(container, &CONTAINER, "gtk_container_add") else {
        return;
    };
    let Some(child) = check(widget, &WIDGET, "gtk_container_add") else {
        return;
    };
    if !can_parent(parent, child, "gtk_container_add") {
        return;
    }
    adopt_child(parent, child);
    signal::emit(parent, "add", None, EmitArg::Pointer(child as gpointer));
}

pub unsafe extern "C" fn gtk_container_remove(container: *mut GtkContainer, widget: *mut GtkWidget) {
    let Some(parent) = check(container, &CONTAINER, "gtk_container_remove") else {
        return;
    };
    let Some(child) = check(widget, &WIDGET, "gtk_container_remove") else {
        return;
    };
    if with_world(|w| w.parent_of(child)) != Some(parent) {
        native_warning!(
            "Attempting to remove a widget with type {} from a container of type {}, but the widget is not a direct child",
            type_name(child),
            type_name(parent)
        );
        return;
    }
    remove_child(parent, child);
}

/// Returns a list the caller frees with `g_list_free`; the widgets are not
/// referenced.
pub unsafe extern "C" fn gtk_container_get_children(container: *mut GtkContainer) -> *mut GList {
    let Some(addr) = check(container, &CONTAINER, "gtk_container_get_children") else {
        return std::ptr::null_mut();
    };
    let children = with_world(|w| w.children_of(addr));

    let mut head: *mut GList = std::ptr::null_mut();
    for &child in children.iter().rev() {
        let node = Box::into_raw(Box::new(GList {
            data: child as gpointer,
            next: head,
            prev: std::ptr::null_mut(),
        }));
        if !head.is_null() {
            // SAFETY: `head` was boxed in the previous iteration.
            unsafe { (*head).prev = node };
        }
        head = node;
    }
    if !head.is_null() {
        with_world(|w| w.lists.insert(head as usize));
    }
    head
}

pub unsafe extern "C" fn gtk_container_set_border_width(container: *mut GtkContainer, border_width: guint) {
    let Some(addr) = check(container, &CONTAINER, "gtk_container_set_border_width") else {
        return;
    };
    if precondition(border_width <= MAX_BORDER_WIDTH, "gtk_container_set_border_width", "border_width <= 65535") {
        set_property(addr, "border-width", Value::UInt(border_width));
    }
}

pub unsafe extern "C" fn gtk_container_get_border_width(container: *mut GtkContainer) -> guint {
    check(container, &CONTAINER, "gtk_container_get_border_width")
        .map_or(0, |addr| with_world(|w| w.instance(addr).map_or(0, |i| i.uint_prop("border-width"))))
}

pub unsafe extern "C" fn gtk_bin_get_child(bin: *mut GtkBin) -> *mut GtkWidget {
    check(bin, &BIN, "gtk_bin_get_child")
        .and_then(|addr| with_world(|w| w.children_of(addr).first().copied()))
        .map_or(std::ptr::null_mut(), |child| child as *mut GtkWidget)
}

// ---------------------------------------------------------------------------
// GtkWindow
// ---------------------------------------------------------------------------

/// The toolkit keeps the new window alive until it is destroyed; the
/// returned reference is not floating and belongs to the toolkit.
pub unsafe extern "C" fn gtk_window_new(window_type: GtkWindowType) -> *mut GtkWidget {
    let window = create_widget(
        GTK_TYPE_WINDOW,
        vec![
            ("type", Value::Int(window_type)),
            ("title", Value::Str(None)),
            ("default-width", Value::Int(-1)),
            ("default-height", Value::Int(-1)),
            ("resizable", Value::Bool(true)),
            ("application", Value::Object(None)),
        ],
    );
    let addr = window as usize;
    with_world(|w| {
        if let Some(i) = w.instance_mut(addr) {
            i.floating = false;
        }
        w.toplevels.push(addr);
    });
    window
}

pub unsafe extern "C" fn gtk_window_set_title(window: *mut GtkWindow, title: *const gchar) {
    if let Some(addr) = check(window, &WINDOW, "gtk_window_set_title") {
        // SAFETY: the caller passes null or a NUL-terminated string.
        set_property(addr, "title", Value::Str(unsafe { owned_str(title) }));
    }
}

pub unsafe extern "C" fn gtk_window_get_title(window: *mut GtkWindow) -> *const gchar {
    check(window, &WINDOW, "gtk_window_get_title").map_or(std::ptr::null(), |addr| str_property(addr, "title"))
}

pub unsafe extern "C" fn gtk_window_set_default_size(window: *mut GtkWindow, width: gint, height: gint) {
    let Some(addr) = check(window, &WINDOW, "gtk_window_set_default_size") else {
        return;
    };
    if !precondition(width >= -1, "gtk_window_set_default_size", "width >= -1")
        || !precondition(height >= -1, "gtk_window_set_default_size", "height >= -1")
    {
        return;
    }
    set_property(addr, "default-width", Value::Int(width));
    set_property(addr, "default-height", Value::Int(height));
}

pub unsafe extern "C" fn gtk_window_get_default_size(window: *mut GtkWindow, width: *mut gint, height: *mut gint) {
    let (w_def, h_def) = check(window, &WINDOW, "gtk_window_get_default_size").map_or((-1, -1), |addr| {
        (int_property(addr, "default-width"), int_property(addr, "default-height"))
    });
    // SAFETY: the caller passes null or writable out-parameters.
    unsafe {
        if !width.is_null() {
            *width = w_def;
        }
        if !height.is_null() {
            *height = h_def;
        }
    }
}

pub unsafe extern "C" fn gtk_window_set_resizable(window: *mut GtkWindow, resizable: gboolean) {
    if let Some(addr) = check(window, &WINDOW, "gtk_window_set_resizable") {
        set_property(addr, "resizable", Value::Bool(resizable != GFALSE));
    }
}

pub unsafe extern "C" fn gtk_window_get_resizable(window: *mut GtkWindow) -> gboolean {
    check(window, &WINDOW, "gtk_window_get_resizable").map_or(GFALSE, |addr| bool_property(addr, "resizable"))
}

/// Emits `delete-event` and destroys the window unless a handler stops it.
pub unsafe extern "C" fn gtk_window_close(window: *mut GtkWindow) {
    let Some(addr) = check(window, &WINDOW, "gtk_window_close") else {
        return;
    };
    if with_world(|w| w.instance(addr).is_some_and(|i| i.destroyed || i.in_destruction)) {
        return;
    }
    let handled = signal::emit(addr, "delete-event", None, EmitArg::Pointer(std::ptr::null_mut()));
    if !handled {
        destroy_widget(addr);
    }
}

pub unsafe extern "C" fn gtk_window_set_application(window: *mut GtkWindow, application: *mut GtkApplication) {
    let Some(addr) = check(window, &WINDOW, "gtk_window_set_application") else {
        return;
    };
    let app = if application.is_null() {
        None
    } else {
        match check(application, &GTK_APPLICATION, "gtk_window_set_application") {
            Some(app) => Some(app),
            None => return,
        }
    };
    let current = with_world(|w| w.instance(addr).and_then(|i| i.object_prop("application")));
    if current == app {
        return;
    }
    if let Some(app) = app {
        // SAFETY: checked live above; the property owns this reference.
        unsafe { g_object_ref(app as gpointer) };
    }
    set_property(addr, "application", Value::Object(app));
}

pub unsafe extern "C" fn gtk_window_get_application(window: *mut GtkWindow) -> *mut GtkApplication {
    check(window, &WINDOW, "gtk_window_get_application")
        .and_then(|addr| with_world(|w| w.instance(addr).and_then(|i| i.object_prop("application"))))
        .map_or(std::ptr::null_mut(), |app| app as *mut GtkApplication)
}

// ---------------------------------------------------------------------------
// GtkButton
// ---------------------------------------------------------------------------

pub unsafe extern "C" fn gtk_button_new() -> *mut GtkWidget {
    create_widget(GTK_TYPE_BUTTON, vec![("label", Value::Str(None))])
}

pub unsafe extern "C" fn gtk_button_new_with_label(label: *const gchar) -> *mut GtkWidget {
    // SAFETY: the caller passes null or a NUL-terminated string.
    let label = unsafe { owned_str(label) };
    create_widget(GTK_TYPE_BUTTON, vec![("label", Value::Str(label))])
}

pub unsafe extern "C" fn gtk_button_set_label(button: *mut GtkButton, label: *const gchar) {
    if let Some(addr) = check(button, &BUTTON, "gtk_button_set_label") {
        // SAFETY: the caller passes null or a NUL-terminated string.
        set_property(addr, "label", Value::Str(unsafe { owned_str(label) }));
    }
}

pub unsafe extern "C" fn gtk_button_get_label(button: *mut GtkButton) -> *const gchar {
    check(button, &BUTTON, "gtk_button_get_label").map_or(std::ptr::null(), |addr| str_property(addr, "label"))
}

pub unsafe extern "C" fn gtk_button_clicked(button: *mut GtkButton) {
    if let Some(addr) = check(button, &BUTTON, "gtk_button_clicked") {
        emit_void(addr, "clicked");
    }
}

// ---------------------------------------------------------------------------
// GtkLabel
// ---------------------------------------------------------------------------

pub unsafe extern "C" fn gtk_label_new(text: *const gchar) -> *mut GtkWidget {
    // SAFETY: the caller passes null or a NUL-terminated string.
    let text = unsafe { owned_str(text) }.unwrap_or_default();
    create_widget(
        GTK_TYPE_LABEL,
        vec![("label", Value::Str(Some(text))), ("selectable", Value::Bool(false))],
    )
}

pub unsafe extern "C" fn gtk_label_set_text(label: *mut GtkLabel, text: *const gchar) {
    if let Some(addr) = check(label, &LABEL, "gtk_label_set_text") {
        // SAFETY: the caller passes null or a NUL-terminated string.
        let text = unsafe { owned_str(text) }.unwrap_or_default();
        set_property(addr, "label", Value::Str(Some(text)));
    }
}

pub unsafe extern "C" fn gtk_label_get_text(label: *mut GtkLabel) -> *const gchar {
    check(label, &LABEL, "gtk_label_get_text").map_or(std::ptr::null(), |addr| str_property(addr, "label"))
}

pub unsafe extern "C" fn gtk_label_set_selectable(label: *mut GtkLabel, selectable: gboolean) {
    if let Some(addr) = check(label, &LABEL, "gtk_label_set_selectable") {
        set_property(addr, "selectable", Value::Bool(selectable != GFALSE));
    }
}

pub unsafe extern "C" fn gtk_label_get_selectable(label: *mut GtkLabel) -> gboolean {
    check(label, &LABEL, "gtk_label_get_selectable").map_or(GFALSE, |addr| bool_property(addr, "selectable"))
}

// ---------------------------------------------------------------------------
// GtkBox
// ---------------------------------------------------------------------------

pub unsafe extern "C" fn gtk_box_new(orientation: GtkOrientation, spacing: gint) -> *mut GtkWidget {
    create_widget(
        GTK_TYPE_BOX,
        vec![
            ("orientation", Value::Int(orientation)),
            ("spacing", Value::Int(spacing.max(0))),
            ("homogeneous", Value::Bool(false)),
        ],
    )
}

pub unsafe extern "C" fn gtk_box_set_spacing(box_: *mut GtkBox, spacing: gint) {
    let Some(addr) = check(box_, &BOX, "gtk_box_set_spacing") else {
        return;
    };
    if precondition(spacing >= 0, "gtk_box_set_spacing", "spacing >= 0") {
        set_property(addr, "spacing", Value::Int(spacing));
    }
}

pub unsafe extern "C" fn gtk_box_get_spacing(box_: *mut GtkBox) -> gint {
    check(box_, &BOX, "gtk_box_get_spacing").map_or(0, |addr| int_property(addr, "spacing"))
}

pub unsafe extern "C" fn gtk_box_set_homogeneous(box_: *mut GtkBox, homogeneous: gboolean) {
    if let Some(addr) = check(box_, &BOX, "gtk_box_set_homogeneous") {
        set_property(addr, "homogeneous", Value::Bool(homogeneous != GFALSE));
    }
}

pub unsafe extern "C" fn gtk_box_get_homogeneous(box_: *mut GtkBox) -> gboolean {
    check(box_, &BOX, "gtk_box_get_homogeneous").map_or(GFALSE, |addr| bool_property(addr, "homogeneous"))
}

/// Parents `child` without emitting `add`. Packing options only affect
/// allocation, which this backend does not perform.
pub unsafe extern "C" fn gtk_box_pack_start(
    box_: *mut GtkBox,
    child: *mut GtkWidget,
    _expand: gboolean,
    _fill: gboolean,
    _padding: guint,
) {
    let Some(parent) = check(box_, &BOX, "gtk_box_pack_start") else {
        return;
    };
    let Some(widget) = check(child, &WIDGET, "gtk_box_pack_start") else {
        return;
    };
    if can_parent(parent, widget, "gtk_box_pack_start") {
        adopt_child(parent, widget);
    }
}

// ---------------------------------------------------------------------------
// GtkMenuItem
// ---------------------------------------------------------------------------

pub unsafe extern "C" fn gtk_menu_item_new() -> *mut GtkWidget {
    create_widget(GTK_TYPE_MENU_ITEM, vec![("label", Value::Str(None))])
}

pub unsafe extern "C" fn gtk_menu_item_new_with_label(label: *const gchar) -> *mut GtkWidget {
    // SAFETY: the caller passes null or a NUL-terminated string.
    let label = unsafe { owned_str(label) };
    create_widget(GTK_TYPE_MENU_ITEM, vec![("label", Value::Str(label))])
}

pub unsafe extern "C" fn gtk_menu_item_set_label(menu_item: *mut GtkMenuItem, label: *const gchar) {
    if let Some(addr) = check(menu_item, &MENU_ITEM, "gtk_menu_item_set_label") {
        // SAFETY: the caller passes null or a NUL-terminated string.
        set_property(addr, "label", Value::Str(unsafe { owned_str(label) }));
    }
}

pub unsafe extern "C" fn gtk_menu_item_get_label(menu_item: *mut GtkMenuItem) -> *const gchar {
    check(menu_item, &MENU_ITEM, "gtk_menu_item_get_label").map_or(std::ptr::null(), |addr| str_property(addr, "label"))
}

pub unsafe extern "C" fn gtk_menu_item_activate(menu_item: *mut GtkMenuItem) {
    if let Some(addr) = check(menu_item, &MENU_ITEM, "gtk_menu_item_activate") {
        emit_void(addr, "activate");
    }
}

// ---------------------------------------------------------------------------
// GtkImage
// ---------------------------------------------------------------------------

/// A file that exists is taken as a loadable image; anything else shows the
/// "image-missing" icon, as the native library does for unreadable files.
fn load_image(addr: usize, filename: Option<CString>) {
    let storage = match &filename {
        None => GTK_IMAGE_EMPTY,
        Some(name) => {
            let exists = name.to_str().is_ok_and(|path| PathBuf::from(path).is_file());
            if exists { GTK_IMAGE_PIXBUF } else { GTK_IMAGE_ICON_NAME }
        }
    };
    set_property(addr, "file", Value::Str(filename));
    set_property(addr, "storage-type", Value::Int(storage));
}

pub unsafe extern "C" fn gtk_image_new() -> *mut GtkWidget {
    create_widget(
        GTK_TYPE_IMAGE,
        vec![("file", Value::Str(None)), ("storage-type", Value::Int(GTK_IMAGE_EMPTY))],
    )
}

pub unsafe extern "C" fn gtk_image_new_from_file(filename: *const gchar) -> *mut GtkWidget {
    // SAFETY: no arguments.
    let image = unsafe { gtk_image_new() };
    // SAFETY: the caller passes null or a NUL-terminated string.
    load_image(image as usize, unsafe { owned_str(filename) });
    image
}

pub unsafe extern "C" fn gtk_image_set_from_file(image: *mut GtkImage, filename: *const gchar) {
    if let Some(addr) = check(image, &IMAGE, "gtk_image_set_from_file") {
        // SAFETY: the caller passes null or a NUL-terminated string.
        load_image(addr, unsafe { owned_str(filename) });
    }
}

pub unsafe extern "C" fn gtk_image_clear(image: *mut GtkImage) {
    if let Some(addr) = check(image, &IMAGE, "gtk_image_clear") {
        load_image(addr, None);
    }
}

pub unsafe extern "C" fn gtk_image_get_storage_type(image: *mut GtkImage) -> GtkImageType {
    check(image, &IMAGE, "gtk_image_get_storage_type").map_or(GTK_IMAGE_EMPTY, |addr| int_property(addr, "storage-type"))
}

// ---------------------------------------------------------------------------
// GtkSizeGroup
// ---------------------------------------------------------------------------

pub unsafe extern "C" fn gtk_size_group_new(mode: GtkSizeGroupMode) -> *mut GtkSizeGroup {
    with_world(|w| w.create(GTK_TYPE_SIZE_GROUP, &[("mode", Value::Int(mode))])) as *mut GtkSizeGroup
}

pub unsafe extern "C" fn gtk_size_group_set_mode(size_group: *mut GtkSizeGroup, mode: GtkSizeGroupMode) {
    let Some(addr) = check(size_group, &SIZE_GROUP, "gtk_size_group_set_mode") else {
        return;
    };
    if precondition(
        (GTK_SIZE_GROUP_NONE..=GTK_SIZE_GROUP_BOTH).contains(&mode),
        "gtk_size_group_set_mode",
        "mode <= GTK_SIZE_GROUP_BOTH",
    ) {
        set_property(addr, "mode", Value::Int(mode));
    }
}

pub unsafe extern "C" fn gtk_size_group_get_mode(size_group: *mut GtkSizeGroup) -> GtkSizeGroupMode {
    check(size_group, &SIZE_GROUP, "gtk_size_group_get_mode").map_or(GTK_SIZE_GROUP_BOTH, |addr| int_property(addr, "mode"))
}

/// The group does not reference its widgets; a finalised widget leaves it.
pub unsafe extern "C" fn gtk_size_group_add_widget(size_group: *mut GtkSizeGroup, widget: *mut GtkWidget) {
    let Some(group) = check(size_group, &SIZE_GROUP, "gtk_size_group_add_widget") else {
        return;
    };
    if let Some(widget) = check(widget, &WIDGET, "gtk_size_group_add_widget") {
        with_world(|w| w.add_member(group, widget));
    }
}

pub unsafe extern "C" fn gtk_size_group_remove_widget(size_group: *mut GtkSizeGroup, widget: *mut GtkWidget) {
    let Some(group) = check(size_group, &SIZE_GROUP, "gtk_size_group_remove_widget") else {
        return;
    };
    let Some(widget) = check(widget, &WIDGET, "gtk_size_group_remove_widget") else {
        return;
    };
    let removed = with_world(|w| w.remove_member(group, widget));
    precondition(removed, "gtk_size_group_remove_widget", "g_slist_find (priv->widgets, widget)");
}

/// The list belongs to the group and must not be freed.
pub unsafe extern "C" fn gtk_size_group_get_widgets(size_group: *mut GtkSizeGroup) -> *mut GSList {
    check(size_group, &SIZE_GROUP, "gtk_size_group_get_widgets").map_or(std::ptr::null_mut(), |addr| {
        with_world(|w| w.instance_mut(addr).map_or(std::ptr::null_mut(), |i| i.member_list.head()))
    })
}

// ---------------------------------------------------------------------------
// GtkAccelMap
// ---------------------------------------------------------------------------

/// Borrow a C string as UTF-8, warning on failure.
///
/// # Safety
///
/// `ptr` must be null or NUL-terminated and outlive the returned borrow.
unsafe fn utf8_arg<'a>(ptr: *const gchar, function: &'static str, name: &str) -> Option<&'a str> {
    if ptr.is_null() {
        native_warning!(function, "{function}: assertion '{name} != NULL' failed");
        return None;
    }
    // SAFETY: forwarded to the caller.
    let value = unsafe { CStr::from_ptr(ptr) };
    match value.to_str() {
        Ok(value) => Some(value),
        Err(_) => {
            native_warning!(function, "{function}: {name} is not valid UTF-8");
            None
        }
    }
}

fn normalize_key(key: guint) -> guint {
    match char::from_u32(key) {
        Some(c) if c.is_ascii_uppercase() => c.to_ascii_lowercase() as guint,
        _ => key,
    }
}

pub unsafe extern "C" fn gtk_accel_map_add_entry(accel_path: *const gchar, accel_key: guint, accel_mods: GdkModifierType) {
    // SAFETY: the caller passes a NUL-terminated path.
    let Some(path) = (unsafe { utf8_arg(accel_path, "gtk_accel_map_add_entry", "accel_path") }) else {
        return;
    };
    if precondition(
        accel::is_valid_accel_path(path),
        "gtk_accel_map_add_entry",
        "gtk_accel_path_is_valid (accel_path)",
    ) {
        with_world(|w| w.accel_map.add_entry(path, normalize_key(accel_key), accel_mods));
    }
}

pub unsafe extern "C" fn gtk_accel_map_lookup_entry(accel_path: *const gchar, key: *mut GtkAccelKey) -> gboolean {
    // SAFETY: the caller passes a NUL-terminated path.
    let Some(path) = (unsafe { utf8_arg(accel_path, "gtk_accel_map_lookup_entry", "accel_path") }) else {
        return GFALSE;
    };
    if !precondition(
        accel::is_valid_accel_path(path),
        "gtk_accel_map_lookup_entry",
        "gtk_accel_path_is_valid (accel_path)",
    ) {
        return GFALSE;
    }
    match with_world(|w| w.accel_map.lookup(path)) {
        Some((accel_key, accel_mods)) => {
            if !key.is_null() {
                // SAFETY: the caller passes null or a writable `GtkAccelKey`.
                unsafe {
                    *key = GtkAccelKey {
                        accel_key,
                        accel_mods,
                        accel_flags: 0,
                    };
                }
            }
            GTRUE
        }
        None => GFALSE,
    }
}

/// A missing file is not an error.
pub unsafe extern "C" fn gtk_accel_map_load(file_name: *const gchar) {
    // SAFETY: the caller passes a NUL-terminated file name.
    let Some(path) = (unsafe { utf8_arg(file_name, "gtk_accel_map_load", "file_name") }) else {
        return;
    };
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return,
        Err(err) => {
            native_warning!(path, %err, "failed to read accelerator map");
            return;
        }
    };
    let applied = with_world(|w| w.accel_map.load_str(&text));
    tracing::debug!(target: super::TARGET, path, applied, "accelerator map loaded");
}

pub unsafe extern "C" fn gtk_accel_map_save(file_name: *const gchar) {
    // SAFETY: the caller passes a NUL-terminated file name.
    let Some(path) = (unsafe { utf8_arg(file_name, "gtk_accel_map_save", "file_name") }) else {
        return;
    };
    let text = with_world(|w| w.accel_map.to_rc_string());
    if let Err(err) = std::fs::write(path, text) {
        native_warning!(path, %err, "failed to save accelerator map");
    }
}

// ---------------------------------------------------------------------------
// GtkApplication
// ---------------------------------------------------------------------------

pub unsafe extern "C" fn gtk_application_new(application_id: *const gchar, flags: GApplicationFlags) -> *mut GtkApplication {
    // SAFETY: the caller passes null or a NUL-terminated string.
    let id = unsafe { owned_str(application_id) };
    if let Some(id) = &id {
        if !application_id_is_valid(id.to_bytes()) {
            native_warning!(
                id = %id.to_string_lossy(),
                "gtk_application_new: assertion 'application_id == NULL || g_application_id_is_valid (application_id)' failed"
            );
            return std::ptr::null_mut();
        }
    }
    with_world(|w| {
        w.create(
            GTK_TYPE_APPLICATION,
            &[
                ("application-id", Value::Str(id)),
                ("flags", Value::UInt(flags)),
                (QUIT_REQUESTED, Value::Bool(false)),
            ],
        )
    }) as *mut GtkApplication
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{handler_count, live_object_count, ref_count, warning_count};
    use std::cell::RefCell;

    thread_local! {
        static LOG: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
    }

    fn log(entry: impl Into<String>) {
        LOG.with(|l| l.borrow_mut().push(entry.into()));
    }

    fn take_log() -> Vec<String> {
        LOG.with(|l| std::mem::take(&mut *l.borrow_mut()))
    }

    unsafe extern "C" fn record(_instance: gpointer, data: gpointer) {
        // SAFETY: tests pass a `&'static str` pointer as data.
        let tag = unsafe { *(data as *const &'static str) };
        log(tag);
    }

    unsafe extern "C" fn record_notify(_data: gpointer, _closure: *mut GClosure) {
        log("notify");
    }

    unsafe extern "C" fn stop_delete(_instance: gpointer, _event: gpointer, _data: gpointer) -> gboolean {
        log("delete-event");
        GTRUE
    }

    fn as_callback(f: unsafe extern "C" fn(gpointer, gpointer)) -> GCallback {
        // SAFETY: emission casts back to this signature.
        Some(unsafe { std::mem::transmute::<unsafe extern "C" fn(gpointer, gpointer), unsafe extern "C" fn()>(f) })
    }

    fn tag(s: &'static &'static str) -> gpointer {
        s as *const &'static str as gpointer
    }

    unsafe fn connect(instance: gpointer, signal: &CStr, data: gpointer, flags: GConnectFlags) -> gulong {
        unsafe {
            g_signal_connect_data(instance, signal.as_ptr(), as_callback(record), data, Some(record_notify), flags)
        }
    }

    #[test]
    fn test_application_id_rules() {
        for valid in ["org.gtk.Test", "a.b", "com.example.My-App", "_x.y_z"] {
            assert!(application_id_is_valid(valid.as_bytes()), "{valid}");
        }
        for invalid in ["", "single", "org..gtk", ".org.gtk", "org.gtk.", "org.1gtk", "org.gtk Test"] {
            assert!(!application_id_is_valid(invalid.as_bytes()), "{invalid}");
        }
        assert!(!application_id_is_valid("a.".repeat(200).as_bytes()));
    }

    #[test]
    fn test_floating_widget_finalizes_on_single_unref() {
        let before = live_object_count();
        unsafe {
            let button = gtk_button_new() as gpointer;
            assert_eq!(g_object_is_floating(button), GTRUE);
            g_object_ref_sink(button);
            assert_eq!(ref_count(button), Some(1));
            g_object_unref(button);
        }
        assert_eq!(live_object_count(), before);
    }

    #[test]
    fn test_container_owns_children_until_destroyed() {
        let before = live_object_count();
        unsafe {
            let window = gtk_window_new(GTK_WINDOW_TOPLEVEL);
            let vbox = gtk_box_new(GTK_ORIENTATION_VERTICAL, 4);
            let label = gtk_label_new(c"hi".as_ptr());
            gtk_container_add(window as *mut GtkContainer, vbox);
            gtk_box_pack_start(vbox as *mut GtkBox, label, GTRUE, GTRUE, 0);
            assert_eq!(ref_count(label as gpointer), Some(1));
            assert_eq!(gtk_widget_get_parent(label), vbox);

            gtk_widget_destroy(window);
        }
        assert_eq!(live_object_count(), before);
    }

    #[test]
    fn test_destroy_notify_runs_once_on_disconnect() {
        static CLICKED: &str = "clicked";
        take_log();
        unsafe {
            let button = gtk_button_new() as gpointer;
            g_object_ref_sink(button);
            let id = connect(button, c"clicked", tag(&CLICKED), 0);
            assert_ne!(id, 0);
            gtk_button_clicked(button as *mut GtkButton);
            g_signal_handler_disconnect(button, id);
            gtk_button_clicked(button as *mut GtkButton);

            let warnings = warning_count();
            g_signal_handler_disconnect(button, id);
            assert_eq!(warning_count(), warnings + 1);
            g_object_unref(button);
        }
        assert_eq!(take_log(), vec!["clicked", "notify"]);
    }

    #[test]
    fn test_after_handlers_and_blocking() {
        static FIRST: &str = "first";
        static LATE: &str = "late";
        take_log();
        unsafe {
            let item = gtk_menu_item_new() as gpointer;
            g_object_ref_sink(item);
            let late = connect(item, c"activate", tag(&LATE), G_CONNECT_AFTER);
            let first = connect(item, c"activate", tag(&FIRST), 0);
            gtk_menu_item_activate(item as *mut GtkMenuItem);

            g_signal_handler_block(item, first);
            gtk_menu_item_activate(item as *mut GtkMenuItem);
            g_signal_handler_unblock(item, first);
            gtk_menu_item_activate(item as *mut GtkMenuItem);

            assert_eq!(g_signal_handler_is_connected(item, late), GTRUE);
            g_object_unref(item);
        }
        assert_eq!(
            take_log(),
            vec!["first", "late", "late", "first", "late", "notify", "notify"]
        );
    }

    #[test]
    fn test_invalid_signal_is_refused_without_notify() {
        static TAG: &str = "never";
        take_log();
        unsafe {
            let label = gtk_label_new(std::ptr::null());
            g_object_ref_sink(label as gpointer);
            let warnings = warning_count();
            assert_eq!(connect(label as gpointer, c"clicked", tag(&TAG), 0), 0);
            assert_eq!(connect(label as gpointer, c"not a signal", tag(&TAG), 0), 0);
            assert_eq!(warning_count(), warnings + 2);
            assert_eq!(handler_count(label as gpointer), 0);
            g_object_unref(label as gpointer);
        }
        assert!(take_log().is_empty());
    }

    #[test]
    fn test_window_close_respects_delete_event() {
        take_log();
        unsafe {
            let window = gtk_window_new(GTK_WINDOW_TOPLEVEL) as gpointer;
            g_object_ref_sink(window);
            let cb: unsafe extern "C" fn(gpointer, gpointer, gpointer) -> gboolean = stop_delete;
            let id = g_signal_connect_data(
                window,
                c"delete-event".as_ptr(),
                Some(std::mem::transmute::<_, unsafe extern "C" fn()>(cb)),
                std::ptr::null_mut(),
                None,
                0,
            );
            gtk_window_close(window as *mut GtkWindow);
            assert_eq!(crate::headless::toplevel_count(), 1);

            g_signal_handler_disconnect(window, id);
            gtk_window_close(window as *mut GtkWindow);
            assert_eq!(crate::headless::toplevel_count(), 0);
            assert_eq!(ref_count(window), Some(1));
            g_object_unref(window);
        }
        assert_eq!(take_log(), vec!["delete-event"]);
    }

    #[test]
    fn test_margin_out_of_range_keeps_value() {
        unsafe {
            let label = gtk_label_new(std::ptr::null());
            gtk_widget_set_margin_start(label, 12);
            gtk_widget_set_margin_start(label, -3);
            assert_eq!(gtk_widget_get_margin_start(label), 12);
            gtk_widget_set_margin_start(label, MAX_MARGIN + 1);
            assert_eq!(gtk_widget_get_margin_start(label), 12);
            g_object_ref_sink(label as gpointer);
            g_object_unref(label as gpointer);
        }
    }

    #[test]
    fn test_children_list_is_owned_by_caller() {
        unsafe {
            let hbox = gtk_box_new(GTK_ORIENTATION_HORIZONTAL, 0);
            g_object_ref_sink(hbox as gpointer);
            let a = gtk_button_new();
            let b = gtk_label_new(std::ptr::null());
            gtk_container_add(hbox as *mut GtkContainer, a);
            gtk_container_add(hbox as *mut GtkContainer, b);

            let list = gtk_container_get_children(hbox as *mut GtkContainer);
            assert_eq!((*list).data, a as gpointer);
            assert_eq!((*(*list).next).data, b as gpointer);
            assert_eq!((*(*list).next).prev, list);
            g_list_free(list);

            let warnings = warning_count();
            g_list_free(list);
            assert_eq!(warning_count(), warnings + 1);
            g_object_unref(hbox as gpointer);
        }
    }

    #[test]
    fn test_tooltip_is_transfer_full() {
        unsafe {
            let button = gtk_button_new();
            g_object_ref_sink(button as gpointer);
            assert!(gtk_widget_get_tooltip_text(button).is_null());
            gtk_widget_set_tooltip_text(button, c"Save the file".as_ptr());
            let text = gtk_widget_get_tooltip_text(button);
            assert_eq!(CStr::from_ptr(text).to_str().unwrap(), "Save the file");
            g_free(text as gpointer);
            g_object_unref(button as gpointer);
        }
    }

    #[test]
    fn test_accel_map_lookup() {
        unsafe {
            gtk_accel_map_add_entry(c"<Test>/File/Open".as_ptr(), 'O' as guint, GDK_CONTROL_MASK);
            let mut key = GtkAccelKey::default();
            assert_eq!(gtk_accel_map_lookup_entry(c"<Test>/File/Open".as_ptr(), &mut key), GTRUE);
            assert_eq!(key.accel_key, 'o' as guint);
            assert_eq!(key.accel_mods, GDK_CONTROL_MASK);
            assert_eq!(gtk_accel_map_lookup_entry(c"<Test>/File/Nope".as_ptr(), &mut key), GFALSE);
        }
    }

    #[test]
    fn test_invalid_application_id_returns_null() {
        unsafe {
            assert!(gtk_application_new(c"nodots".as_ptr(), G_APPLICATION_FLAGS_NONE).is_null());
            let app = gtk_application_new(c"org.example.Test".as_ptr(), G_APPLICATION_FLAGS_NONE);
            assert!(!app.is_null());
            let id = CStr::from_ptr(g_application_get_application_id(app as *mut GApplication));
            assert_eq!(id.to_str().unwrap(), "org.example.Test");
            g_object_unref(app as gpointer);
        }
    }
}
