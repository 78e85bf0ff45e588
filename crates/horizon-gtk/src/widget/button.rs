use horizon_gtk_sys as ffi;

use crate::error::{PropertyError, SignalError};
use crate::handle::{self, Cast, IsA, ObjectType, Owned, facade};
use crate::property;
use crate::signal::{self, ConnectFlags, SubscriptionToken};
use crate::toolkit::api;
use crate::{Bin, Container, Object, Widget};

facade! {
    /// A push button (`GtkButton`).
    pub struct Button(ffi::GtkButton);
    type_name = "GtkButton";
    static_type = (api().gtk_button_get_type)();
    is_a = [Object, Widget, Container, Bin];
}

impl Button {
    pub fn new() -> Owned<Self> {
        // SAFETY: the new button's floating reference is ours.
        unsafe { handle::construct::<Self>((api().gtk_button_new)().cast(), "gtk_button_new") }
    }

    /// A button showing `label`.
    pub fn with_label(label: &str) -> Result<Owned<Self>, PropertyError> {
        let label = property::to_cstring("label", label)?;
        // SAFETY: the new button's floating reference is ours.
        Ok(unsafe {
            handle::construct::<Self>(
                (api().gtk_button_new_with_label)(label.as_ptr()).cast(),
                "gtk_button_new_with_label",
            )
        })
    }
}

#[inline]
fn button<B: IsA<Button>>(b: &B) -> *mut ffi::GtkButton {
    b.upcast_ref::<Button>().as_ptr()
}

/// Operations on buttons.
pub trait ButtonExt: IsA<Button> {
    fn set_label(&self, label: &str) -> Result<(), PropertyError> {
        let label = property::to_cstring("label", label)?;
        // SAFETY: the button is live; the toolkit copies the string.
        unsafe { (api().gtk_button_set_label)(button(self), label.as_ptr()) };
        Ok(())
    }

    fn label(&self) -> Option<String> {
        // SAFETY: the button is live; the string is owned by the button.
        unsafe { property::from_glib_none((api().gtk_button_get_label)(button(self))) }
    }

    /// Emit `clicked` as if the user had pressed the button.
    fn clicked(&self) {
        // SAFETY: the button is live for the call.
        unsafe { (api().gtk_button_clicked)(button(self)) }
    }

    fn connect_clicked<F: Fn(&Self) + 'static>(&self, f: F) -> Result<SubscriptionToken, SignalError> {
        signal::connect(self, "clicked", ConnectFlags::empty(), f)
    }
}

impl<T: IsA<Button>> ButtonExt for T {}

#[cfg(all(test, feature = "headless"))]
mod tests {
    use super::*;
    use crate::prelude::*;
    use crate::{Toolkit, ToolkitConfig};
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_label_round_trip() {
        let _tk = Toolkit::init(&ToolkitConfig::headless()).unwrap();
        let button = Button::new();
        assert_eq!(button.label(), None);
        button.set_label("Open").unwrap();
        assert_eq!(button.label().as_deref(), Some("Open"));
        assert!(Button::with_label("bad\0label").is_err());
    }

    #[test]
    fn test_clicked_reaches_handler_with_self() {
        let _tk = Toolkit::init(&ToolkitConfig::headless()).unwrap();
        let button = Button::with_label("Go").unwrap();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        button
            .connect_clicked(move |b| {
                assert_eq!(b.label().as_deref(), Some("Go"));
                h.set(h.get() + 1);
            })
            .unwrap();
        button.clicked();
        button.clicked();
        assert_eq!(hits.get(), 2);
    }
}
