//! C type declarations mirroring the GLib, GObject, GIO and GTK3 headers.
//!
//! Only the subset reached by the [`NativeApi`](crate::NativeApi) table is
//! declared. Instance structs are opaque: their layout belongs to the
//! toolkit and is never read from Rust. The few public structs the toolkit
//! documents as stable (`GList`, `GSList`, `GtkAccelKey` and the leading
//! fields of `GParamSpec`) are declared with their C layout.

#![allow(non_camel_case_types)]

use std::ffi::{c_char, c_int, c_uint, c_ulong, c_void};
use std::marker::{PhantomData, PhantomPinned};

use static_assertions::{assert_eq_size, const_assert_eq};

pub type gboolean = c_int;
pub type gint = c_int;
pub type guint = c_uint;
pub type gulong = c_ulong;
pub type gsize = usize;
pub type gchar = c_char;
pub type gpointer = *mut c_void;
pub type gconstpointer = *const c_void;

/// Runtime type identifier.
pub type GType = gsize;

pub const GFALSE: gboolean = 0;
pub const GTRUE: gboolean = 1;

/// The invalid type id. No registered type uses it.
pub const G_TYPE_INVALID: GType = 0;

/// `GObject`'s fundamental type id, fixed by GLib (`G_TYPE_MAKE_FUNDAMENTAL (20)`).
pub const G_TYPE_OBJECT: GType = 20 << 2;

/// Generic signal handler pointer. The real signature is cast at emission.
pub type GCallback = Option<unsafe extern "C" fn()>;

/// Called with the user data when a handler registration is destroyed.
pub type GClosureNotify = Option<unsafe extern "C" fn(data: gpointer, closure: *mut GClosure)>;

pub type GConnectFlags = c_uint;
pub const G_CONNECT_AFTER: GConnectFlags = 1 << 0;
pub const G_CONNECT_SWAPPED: GConnectFlags = 1 << 1;

pub type GApplicationFlags = c_uint;
pub const G_APPLICATION_FLAGS_NONE: GApplicationFlags = 0;
pub const G_APPLICATION_IS_SERVICE: GApplicationFlags = 1 << 0;
pub const G_APPLICATION_IS_LAUNCHER: GApplicationFlags = 1 << 1;
pub const G_APPLICATION_HANDLES_OPEN: GApplicationFlags = 1 << 2;
pub const G_APPLICATION_HANDLES_COMMAND_LINE: GApplicationFlags = 1 << 3;
pub const G_APPLICATION_SEND_ENVIRONMENT: GApplicationFlags = 1 << 4;
pub const G_APPLICATION_NON_UNIQUE: GApplicationFlags = 1 << 5;

pub type GtkWindowType = c_int;
pub const GTK_WINDOW_TOPLEVEL: GtkWindowType = 0;
pub const GTK_WINDOW_POPUP: GtkWindowType = 1;

pub type GtkOrientation = c_int;
pub const GTK_ORIENTATION_HORIZONTAL: GtkOrientation = 0;
pub const GTK_ORIENTATION_VERTICAL: GtkOrientation = 1;

pub type GtkSizeGroupMode = c_int;
pub const GTK_SIZE_GROUP_NONE: GtkSizeGroupMode = 0;
pub const GTK_SIZE_GROUP_HORIZONTAL: GtkSizeGroupMode = 1;
pub const GTK_SIZE_GROUP_VERTICAL: GtkSizeGroupMode = 2;
pub const GTK_SIZE_GROUP_BOTH: GtkSizeGroupMode = 3;

pub type GtkImageType = c_int;
pub const GTK_IMAGE_EMPTY: GtkImageType = 0;
pub const GTK_IMAGE_PIXBUF: GtkImageType = 1;
pub const GTK_IMAGE_STOCK: GtkImageType = 2;
pub const GTK_IMAGE_ICON_SET: GtkImageType = 3;
pub const GTK_IMAGE_ANIMATION: GtkImageType = 4;
pub const GTK_IMAGE_ICON_NAME: GtkImageType = 5;
pub const GTK_IMAGE_GICON: GtkImageType = 6;
pub const GTK_IMAGE_SURFACE: GtkImageType = 7;

pub type GdkModifierType = c_uint;
pub const GDK_SHIFT_MASK: GdkModifierType = 1 << 0;
pub const GDK_LOCK_MASK: GdkModifierType = 1 << 1;
pub const GDK_CONTROL_MASK: GdkModifierType = 1 << 2;
pub const GDK_MOD1_MASK: GdkModifierType = 1 << 3;
pub const GDK_SUPER_MASK: GdkModifierType = 1 << 26;

/// Doubly linked list node (`GList`).
#[repr(C)]
#[derive(Debug)]
pub struct GList {
    pub data: gpointer,
    pub next: *mut GList,
    pub prev: *mut GList,
}

/// Singly linked list node (`GSList`).
#[repr(C)]
#[derive(Debug)]
pub struct GSList {
    pub data: gpointer,
    pub next: *mut GSList,
}

/// Accelerator entry filled by `gtk_accel_map_lookup_entry`.
///
/// `accel_flags` is a 16-bit bitfield in C sharing one `guint`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GtkAccelKey {
    pub accel_key: guint,
    pub accel_mods: GdkModifierType,
    pub accel_flags: guint,
}

/// Leading members of `GTypeInstance`.
#[repr(C)]
#[derive(Debug)]
pub struct GTypeInstance {
    pub g_class: gpointer,
}

/// Leading public members of `GParamSpec`.
///
/// Handlers of `notify` receive a pointer to this struct; only `name` is read.
#[repr(C)]
#[derive(Debug)]
pub struct GParamSpec {
    pub g_type_instance: GTypeInstance,
    pub name: *const gchar,
    pub flags: c_uint,
    pub value_type: GType,
    pub owner_type: GType,
}

assert_eq_size!(GList, [gpointer; 3]);
assert_eq_size!(GSList, [gpointer; 2]);
const_assert_eq!(std::mem::size_of::<GtkAccelKey>(), 12);
assert_eq_size!(GCallback, gpointer);
assert_eq_size!(GClosureNotify, gpointer);

macro_rules! opaque {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[repr(C)]
            pub struct $name {
                _data: [u8; 0],
                _marker: PhantomData<(*mut u8, PhantomPinned)>,
            }

            impl std::fmt::Debug for $name {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{}({:p})", stringify!($name), self)
                }
            }
        )*
    };
}

opaque!(
    /// Closure attached to a signal handler. Never dereferenced from Rust.
    GClosure,
    GObject,
    GApplication,
    GdkEvent,
    GtkWidget,
    GtkContainer,
    GtkBin,
    GtkWindow,
    GtkButton,
    GtkLabel,
    GtkBox,
    GtkMenuItem,
    GtkImage,
    GtkSizeGroup,
    GtkApplication,
);
