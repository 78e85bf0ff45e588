//! The root of the hierarchy and the operations every object shares.

use std::ffi::CStr;

use horizon_gtk_sys as ffi;

use crate::error::SignalError;
use crate::handle::{IsA, Owned, facade};
use crate::signal::{self, ConnectFlags, SignalGuard, SubscriptionToken};
use crate::toolkit::api;

facade! {
    /// Any toolkit object (`GObject`).
    pub struct Object(ffi::GObject);
    type_name = "GObject";
    static_type = ffi::G_TYPE_OBJECT;
    is_a = [];
}

/// Operations available on every object.
pub trait ObjectExt: IsA<Object> {
    /// The instance's dynamic type name, such as `"GtkButton"`.
    fn type_name(&self) -> &'static str {
        // SAFETY: the instance is live; type names live as long as the type
        // system.
        let name = unsafe { (api().g_type_name_from_instance)(self.as_ptr().cast()) };
        if name.is_null() {
            return Self::NAME;
        }
        // SAFETY: non-null type names are static NUL-terminated strings.
        unsafe { CStr::from_ptr(name) }.to_str().unwrap_or(Self::NAME)
    }

    /// A new strong reference to this object.
    fn to_handle(&self) -> Owned<Self> {
        Owned::from_instance(self)
    }

    /// Call `f` whenever a property changes, or only `property` when given.
    fn connect_notify<F>(&self, property: Option<&str>, f: F) -> Result<SubscriptionToken, SignalError>
    where
        F: Fn(&Self, &str) + 'static,
    {
        signal::connect_notify(self, property, ConnectFlags::empty(), f)
    }

    /// Disconnect a handler connected on this object.
    ///
    /// The handler's closure is dropped before this returns. A token whose
    /// handler was already removed by destruction only logs a toolkit
    /// warning.
    fn disconnect(&self, token: SubscriptionToken) {
        // SAFETY: `self` is live.
        unsafe { signal::disconnect_raw(self.as_object_ptr(), token) }
    }

    /// Stop calling the handler until a matching [`unblock_signal`](Self::unblock_signal).
    ///
    /// Blocks nest.
    fn block_signal(&self, token: &SubscriptionToken) {
        // SAFETY: `self` is live.
        unsafe { signal::block_raw(self.as_object_ptr(), token) }
    }

    fn unblock_signal(&self, token: &SubscriptionToken) {
        // SAFETY: `self` is live.
        unsafe { signal::unblock_raw(self.as_object_ptr(), token) }
    }

    fn is_signal_connected(&self, token: &SubscriptionToken) -> bool {
        // SAFETY: `self` is live.
        unsafe { signal::is_connected_raw(self.as_object_ptr(), token) }
    }

    /// Tie the handler's lifetime to the returned guard.
    fn guard(&self, token: SubscriptionToken) -> SignalGuard {
        let instance: Owned<Object> = self.to_handle().upcast();
        SignalGuard::new(instance, token)
    }
}

impl<T: IsA<Object>> ObjectExt for T {}

#[cfg(all(test, feature = "headless"))]
mod tests {
    use super::*;
    use crate::handle::{Cast, ObjectType};
    use crate::prelude::*;
    use crate::{Application, ApplicationFlags, Button, Label, Toolkit, ToolkitConfig, Widget};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_type_names() {
        let _tk = Toolkit::init(&ToolkitConfig::headless()).unwrap();
        let button = Button::new();
        assert_eq!(button.type_name(), "GtkButton");
        let widget: &Widget = button.upcast_ref();
        assert_eq!(widget.type_name(), "GtkButton");
        let app = Application::new("org.horizon.Names", ApplicationFlags::empty());
        assert_eq!(app.type_name(), "GtkApplication");
        assert!(app.is::<Object>());
        assert_eq!(Object::static_type(), ffi::G_TYPE_OBJECT);
    }

    #[test]
    fn test_notify_reports_property_name() {
        let _tk = Toolkit::init(&ToolkitConfig::headless()).unwrap();
        let label = Label::new("a").unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let s = seen.clone();
        label
            .connect_notify(None, move |_, name| s.borrow_mut().push(name.to_owned()))
            .unwrap();
        let s = seen.clone();
        label
            .connect_notify(Some("selectable"), move |_, name| s.borrow_mut().push(format!("only {name}")))
            .unwrap();

        label.set_text("b").unwrap();
        label.set_selectable(true);
        label.set_selectable(true);
        assert_eq!(*seen.borrow(), ["label", "selectable", "only selectable"]);
    }

    #[test]
    fn test_to_handle_adds_reference() {
        let _tk = Toolkit::init(&ToolkitConfig::headless()).unwrap();
        let button = Button::new();
        let view: &Button = &button;
        let second = view.to_handle();
        assert!(second.ptr_eq(&*button));
        assert_eq!(
            horizon_gtk_sys::headless::ref_count(button.as_ptr().cast()),
            Some(2)
        );
    }
}
