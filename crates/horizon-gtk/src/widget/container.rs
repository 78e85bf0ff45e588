use horizon_gtk_sys as ffi;

use crate::error::{PropertyError, SignalError};
use crate::handle::{Cast, IsA, ObjectType, WidgetList, facade};
use crate::property::{self, BORDER_WIDTH_MAX};
use crate::signal::{self, ConnectFlags, SubscriptionToken};
use crate::toolkit::api;
use crate::widget::base::raw;
use crate::{Object, Widget};

facade! {
    /// A widget holding other widgets (`GtkContainer`).
    pub struct Container(ffi::GtkContainer);
    type_name = "GtkContainer";
    static_type = (api().gtk_container_get_type)();
    is_a = [Object, Widget];
}

#[inline]
fn container<C: IsA<Container>>(c: &C) -> *mut ffi::GtkContainer {
    c.upcast_ref::<Container>().as_ptr()
}

/// Operations on containers.
pub trait ContainerExt: IsA<Container> {
    /// Add `widget` as a child.
    ///
    /// The container takes its own reference (sinking a floating one), so
    /// the caller's handle may be released afterwards. Adding a widget that
    /// already has a parent, a toplevel window, or a second child to a
    /// single-child container is refused with a toolkit warning.
    fn add(&self, widget: &impl IsA<Widget>) {
        // SAFETY: both instances are live for the call.
        unsafe { (api().gtk_container_add)(container(self), raw(widget)) }
    }

    /// Remove a child, dropping the container's reference to it.
    fn remove(&self, widget: &impl IsA<Widget>) {
        // SAFETY: both instances are live for the call.
        unsafe { (api().gtk_container_remove)(container(self), raw(widget)) }
    }

    /// Snapshot of the direct children, in insertion order.
    ///
    /// The list holds a reference on each child until it is dropped.
    fn children(&self) -> WidgetList {
        // SAFETY: the list is transferred to us; its entries are borrowed.
        unsafe { WidgetList::from_raw((api().gtk_container_get_children)(container(self))) }
    }

    /// # Errors
    ///
    /// [`PropertyError::OutOfRange`] above 65535.
    fn set_border_width(&self, width: u32) -> Result<(), PropertyError> {
        property::check_range("border-width", width.into(), 0, BORDER_WIDTH_MAX.into())?;
        // SAFETY: the container is live for the call.
        unsafe { (api().gtk_container_set_border_width)(container(self), width) };
        Ok(())
    }

    fn border_width(&self) -> u32 {
        // SAFETY: the container is live for the call.
        unsafe { (api().gtk_container_get_border_width)(container(self)) }
    }

    /// Called after a child is added.
    fn connect_add<F>(&self, f: F) -> Result<SubscriptionToken, SignalError>
    where
        F: Fn(&Self, &Widget) + 'static,
    {
        signal::connect_widget(self, "add", ConnectFlags::empty(), f)
    }

    /// Called when a child is removed, while it is still alive.
    fn connect_remove<F>(&self, f: F) -> Result<SubscriptionToken, SignalError>
    where
        F: Fn(&Self, &Widget) + 'static,
    {
        signal::connect_widget(self, "remove", ConnectFlags::empty(), f)
    }
}

impl<T: IsA<Container>> ContainerExt for T {}
