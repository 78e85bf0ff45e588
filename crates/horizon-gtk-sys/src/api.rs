//! The toolkit function table.
//!
//! Every native entry point the binding calls is a field of [`NativeApi`].
//! A backend fills the table once; callers never link against a symbol
//! directly. The `native` backend resolves each field by name from the
//! loaded toolkit library and the `headless` backend points each field at
//! its in-process implementation of the same function, so both backends are
//! checked against one signature list at compile time.

use std::ffi::{c_char, c_int};
use std::fmt;

use crate::types::*;

macro_rules! native_api {
    ($(
        $(#[$meta:meta])*
        fn $name:ident($($arg:ident: $ty:ty),* $(,)?) $(-> $ret:ty)?;
    )*) => {
        /// Table of toolkit entry points.
        ///
        /// All fields are `unsafe extern "C"` function pointers with the C
        /// signature of the symbol they are named after.
        #[derive(Clone, Copy)]
        pub struct NativeApi {
            $(
                $(#[$meta])*
                pub $name: unsafe extern "C" fn($($arg: $ty),*) $(-> $ret)?,
            )*
        }

        impl NativeApi {
            /// Names of every symbol in the table, in declaration order.
            pub const SYMBOLS: &'static [&'static str] = &[$(stringify!($name)),*];

            #[cfg(feature = "headless")]
            pub(crate) fn headless() -> Self {
                Self {
                    $($name: crate::headless::abi::$name,)*
                }
            }

            #[cfg(all(
                feature = "native",
                unix,
                any(target_arch = "x86_64", target_arch = "aarch64")
            ))]
            pub(crate) fn resolve(
                library: &crate::native::NativeLibrary,
            ) -> Result<Self, crate::LoadError> {
                // SAFETY: each symbol is looked up by its C name and stored in
                // a field declared with that symbol's C signature.
                unsafe {
                    Ok(Self {
                        $($name: library.function(concat!(stringify!($name), "\0"))?,)*
                    })
                }
            }
        }
    };
}

native_api! {
    // GLib / GObject
    fn g_free(mem: gpointer);
    fn g_list_free(list: *mut GList);
    fn g_object_ref(object: gpointer) -> gpointer;
    fn g_object_ref_sink(object: gpointer) -> gpointer;
    fn g_object_unref(object: gpointer);
    fn g_object_is_floating(object: gpointer) -> gboolean;
    fn g_type_check_instance_is_a(instance: gpointer, iface_type: GType) -> gboolean;
    fn g_type_name_from_instance(instance: gpointer) -> *const gchar;
    fn g_signal_connect_data(
        instance: gpointer,
        detailed_signal: *const gchar,
        c_handler: GCallback,
        data: gpointer,
        destroy_data: GClosureNotify,
        connect_flags: GConnectFlags,
    ) -> gulong;
    fn g_signal_handler_disconnect(instance: gpointer, handler_id: gulong);
    fn g_signal_handler_is_connected(instance: gpointer, handler_id: gulong) -> gboolean;
    fn g_signal_handler_block(instance: gpointer, handler_id: gulong);
    fn g_signal_handler_unblock(instance: gpointer, handler_id: gulong);

    // GIO
    fn g_application_id_is_valid(application_id: *const gchar) -> gboolean;
    fn g_application_get_application_id(application: *mut GApplication) -> *const gchar;
    fn g_application_run(application: *mut GApplication, argc: c_int, argv: *mut *mut c_char) -> c_int;
    fn g_application_quit(application: *mut GApplication);

    // GTK: initialisation
    fn gtk_init_check(argc: *mut c_int, argv: *mut *mut *mut c_char) -> gboolean;

    // GtkWidget
    fn gtk_widget_get_type() -> GType;
    fn gtk_widget_show(widget: *mut GtkWidget);
    fn gtk_widget_show_all(widget: *mut GtkWidget);
    fn gtk_widget_hide(widget: *mut GtkWidget);
    fn gtk_widget_destroy(widget: *mut GtkWidget);
    fn gtk_widget_get_visible(widget: *mut GtkWidget) -> gboolean;
    fn gtk_widget_set_sensitive(widget: *mut GtkWidget, sensitive: gboolean);
    fn gtk_widget_get_sensitive(widget: *mut GtkWidget) -> gboolean;
    fn gtk_widget_set_margin_start(widget: *mut GtkWidget, margin: gint);
    fn gtk_widget_get_margin_start(widget: *mut GtkWidget) -> gint;
    fn gtk_widget_set_margin_end(widget: *mut GtkWidget, margin: gint);
    fn gtk_widget_get_margin_end(widget: *mut GtkWidget) -> gint;
    fn gtk_widget_set_margin_top(widget: *mut GtkWidget, margin: gint);
    fn gtk_widget_get_margin_top(widget: *mut GtkWidget) -> gint;
    fn gtk_widget_set_margin_bottom(widget: *mut GtkWidget, margin: gint);
    fn gtk_widget_get_margin_bottom(widget: *mut GtkWidget) -> gint;
    fn gtk_widget_set_name(widget: *mut GtkWidget, name: *const gchar);
    fn gtk_widget_get_name(widget: *mut GtkWidget) -> *const gchar;
    fn gtk_widget_set_tooltip_text(widget: *mut GtkWidget, text: *const gchar);
    fn gtk_widget_get_tooltip_text(widget: *mut GtkWidget) -> *mut gchar;
    fn gtk_widget_set_size_request(widget: *mut GtkWidget, width: gint, height: gint);
    fn gtk_widget_get_size_request(widget: *mut GtkWidget, width: *mut gint, height: *mut gint);
    fn gtk_widget_set_hexpand(widget: *mut GtkWidget, expand: gboolean);
    fn gtk_widget_get_hexpand(widget: *mut GtkWidget) -> gboolean;
    fn gtk_widget_set_vexpand(widget: *mut GtkWidget, expand: gboolean);
    fn gtk_widget_get_vexpand(widget: *mut GtkWidget) -> gboolean;
    fn gtk_widget_get_parent(widget: *mut GtkWidget) -> *mut GtkWidget;

    // GtkContainer
    fn gtk_container_get_type() -> GType;
    fn gtk_container_add(container: *mut GtkContainer, widget: *mut GtkWidget);
    fn gtk_container_remove(container: *mut GtkContainer, widget: *mut GtkWidget);
    fn gtk_container_get_children(container: *mut GtkContainer) -> *mut GList;
    fn gtk_container_set_border_width(container: *mut GtkContainer, border_width: guint);
    fn gtk_container_get_border_width(container: *mut GtkContainer) -> guint;

    // GtkBin
    fn gtk_bin_get_type() -> GType;
    fn gtk_bin_get_child(bin: *mut GtkBin) -> *mut GtkWidget;

    // GtkWindow
    fn gtk_window_get_type() -> GType;
    fn gtk_window_new(window_type: GtkWindowType) -> *mut GtkWidget;
    fn gtk_window_set_title(window: *mut GtkWindow, title: *const gchar);
    fn gtk_window_get_title(window: *mut GtkWindow) -> *const gchar;
    fn gtk_window_set_default_size(window: *mut GtkWindow, width: gint, height: gint);
    fn gtk_window_get_default_size(window: *mut GtkWindow, width: *mut gint, height: *mut gint);
    fn gtk_window_set_resizable(window: *mut GtkWindow, resizable: gboolean);
    fn gtk_window_get_resizable(window: *mut GtkWindow) -> gboolean;
    fn gtk_window_close(window: *mut GtkWindow);
    fn gtk_window_set_application(window: *mut GtkWindow, application: *mut GtkApplication);
    fn gtk_window_get_application(window: *mut GtkWindow) -> *mut GtkApplication;

    // GtkButton
    fn gtk_button_get_type() -> GType;
    fn gtk_button_new() -> *mut GtkWidget;
    fn gtk_button_new_with_label(label: *const gchar) -> *mut GtkWidget;
    fn gtk_button_set_label(button: *mut GtkButton, label: *const gchar);
    fn gtk_button_get_label(button: *mut GtkButton) -> *const gchar;
    fn gtk_button_clicked(button: *mut GtkButton);

    // GtkLabel
    fn gtk_label_get_type() -> GType;
    fn gtk_label_new(text: *const gchar) -> *mut GtkWidget;
    fn gtk_label_set_text(label: *mut GtkLabel, text: *const gchar);
    fn gtk_label_get_text(label: *mut GtkLabel) -> *const gchar;
    fn gtk_label_set_selectable(label: *mut GtkLabel, selectable: gboolean);
    fn gtk_label_get_selectable(label: *mut GtkLabel) -> gboolean;

    // GtkBox
    fn gtk_box_get_type() -> GType;
    fn gtk_box_new(orientation: GtkOrientation, spacing: gint) -> *mut GtkWidget;
    fn gtk_box_set_spacing(box_: *mut GtkBox, spacing: gint);
    fn gtk_box_get_spacing(box_: *mut GtkBox) -> gint;
    fn gtk_box_set_homogeneous(box_: *mut GtkBox, homogeneous: gboolean);
    fn gtk_box_get_homogeneous(box_: *mut GtkBox) -> gboolean;
    fn gtk_box_pack_start(
        box_: *mut GtkBox,
        child: *mut GtkWidget,
        expand: gboolean,
        fill: gboolean,
        padding: guint,
    );

    // GtkMenuItem
    fn gtk_menu_item_get_type() -> GType;
    fn gtk_menu_item_new() -> *mut GtkWidget;
    fn gtk_menu_item_new_with_label(label: *const gchar) -> *mut GtkWidget;
    fn gtk_menu_item_set_label(menu_item: *mut GtkMenuItem, label: *const gchar);
    fn gtk_menu_item_get_label(menu_item: *mut GtkMenuItem) -> *const gchar;
    fn gtk_menu_item_activate(menu_item: *mut GtkMenuItem);

    // GtkImage
    fn gtk_image_get_type() -> GType;
    fn gtk_image_new() -> *mut GtkWidget;
    fn gtk_image_new_from_file(filename: *const gchar) -> *mut GtkWidget;
    fn gtk_image_set_from_file(image: *mut GtkImage, filename: *const gchar);
    fn gtk_image_clear(image: *mut GtkImage);
    fn gtk_image_get_storage_type(image: *mut GtkImage) -> GtkImageType;

    // GtkSizeGroup
    fn gtk_size_group_get_type() -> GType;
    fn gtk_size_group_new(mode: GtkSizeGroupMode) -> *mut GtkSizeGroup;
    fn gtk_size_group_set_mode(size_group: *mut GtkSizeGroup, mode: GtkSizeGroupMode);
    fn gtk_size_group_get_mode(size_group: *mut GtkSizeGroup) -> GtkSizeGroupMode;
    fn gtk_size_group_add_widget(size_group: *mut GtkSizeGroup, widget: *mut GtkWidget);
    fn gtk_size_group_remove_widget(size_group: *mut GtkSizeGroup, widget: *mut GtkWidget);
    fn gtk_size_group_get_widgets(size_group: *mut GtkSizeGroup) -> *mut GSList;

    // GtkAccelMap
    fn gtk_accel_map_add_entry(accel_path: *const gchar, accel_key: guint, accel_mods: GdkModifierType);
    fn gtk_accel_map_lookup_entry(accel_path: *const gchar, key: *mut GtkAccelKey) -> gboolean;
    fn gtk_accel_map_load(file_name: *const gchar);
    fn gtk_accel_map_save(file_name: *const gchar);

    // GtkApplication
    fn gtk_application_get_type() -> GType;
    fn gtk_application_new(application_id: *const gchar, flags: GApplicationFlags) -> *mut GtkApplication;
}

impl fmt::Debug for NativeApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeApi")
            .field("symbols", &Self::SYMBOLS.len())
            .finish()
    }
}
