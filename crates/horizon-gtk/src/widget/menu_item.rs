use horizon_gtk_sys as ffi;

use crate::error::{PropertyError, SignalError};
use crate::handle::{self, Owned, facade};
use crate::property;
use crate::signal::{self, ConnectFlags, SubscriptionToken};
use crate::toolkit::api;
use crate::{Bin, Container, Object, Widget};

facade! {
    /// An entry of a menu (`GtkMenuItem`).
    pub struct MenuItem(ffi::GtkMenuItem);
    type_name = "GtkMenuItem";
    static_type = (api().gtk_menu_item_get_type)();
    is_a = [Object, Widget, Container, Bin];
}

impl MenuItem {
    pub fn new() -> Owned<Self> {
        // SAFETY: the new item's floating reference is ours.
        unsafe { handle::construct::<Self>((api().gtk_menu_item_new)().cast(), "gtk_menu_item_new") }
    }

    pub fn with_label(label: &str) -> Result<Owned<Self>, PropertyError> {
        let label = property::to_cstring("label", label)?;
        // SAFETY: the new item's floating reference is ours.
        Ok(unsafe {
            handle::construct::<Self>(
                (api().gtk_menu_item_new_with_label)(label.as_ptr()).cast(),
                "gtk_menu_item_new_with_label",
            )
        })
    }

    pub fn set_label(&self, label: &str) -> Result<(), PropertyError> {
        let label = property::to_cstring("label", label)?;
        // SAFETY: the item is live; the toolkit copies the string.
        unsafe { (api().gtk_menu_item_set_label)(self.ptr.as_ptr(), label.as_ptr()) };
        Ok(())
    }

    pub fn label(&self) -> Option<String> {
        // SAFETY: the item is live; the string is owned by the item.
        unsafe { property::from_glib_none((api().gtk_menu_item_get_label)(self.ptr.as_ptr())) }
    }

    /// Emit `activate` as if the user had chosen the item.
    pub fn activate(&self) {
        // SAFETY: the item is live for the call.
        unsafe { (api().gtk_menu_item_activate)(self.ptr.as_ptr()) }
    }

    pub fn connect_activate<F: Fn(&Self) + 'static>(&self, f: F) -> Result<SubscriptionToken, SignalError> {
        signal::connect(self, "activate", ConnectFlags::empty(), f)
    }
}
