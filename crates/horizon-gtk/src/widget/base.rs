use horizon_gtk_sys::{self as ffi, GFALSE};

use crate::error::{PropertyError, SignalError};
use crate::handle::{Cast, IsA, Owned, facade};
use crate::property::{self, MARGIN_RANGE};
use crate::signal::{self, ConnectFlags, SubscriptionToken};
use crate::toolkit::api;
use crate::Object;

facade! {
    /// Base of every visible element (`GtkWidget`).
    pub struct Widget(ffi::GtkWidget);
    type_name = "GtkWidget";
    static_type = (api().gtk_widget_get_type)();
    is_a = [Object];
}

#[inline]
pub(crate) fn raw<W: IsA<Widget>>(widget: &W) -> *mut ffi::GtkWidget {
    widget.upcast_ref::<Widget>().ptr.as_ptr()
}

fn check_margin(property: &'static str, margin: i32) -> Result<(), PropertyError> {
    property::check_range(property, margin.into(), MARGIN_RANGE.0.into(), MARGIN_RANGE.1.into())
}

/// Operations available on every widget.
///
/// Setters taking a range validate before reaching the toolkit; on error the
/// widget keeps its previous value.
pub trait WidgetExt: IsA<Widget> {
    fn show(&self) {
        // SAFETY: the widget is live for the call.
        unsafe { (api().gtk_widget_show)(raw(self)) }
    }

    /// Show the widget and, recursively, every child.
    fn show_all(&self) {
        // SAFETY: the widget is live for the call.
        unsafe { (api().gtk_widget_show_all)(raw(self)) }
    }

    fn hide(&self) {
        // SAFETY: the widget is live for the call.
        unsafe { (api().gtk_widget_hide)(raw(self)) }
    }

    /// Destroy the widget.
    ///
    /// Emits `destroy`, destroys children, removes the widget from its parent
    /// and disconnects every handler. Handles to it stay valid until
    /// released; the toolkit drops its own references.
    fn destroy(&self) {
        // SAFETY: the widget is live for the call.
        unsafe { (api().gtk_widget_destroy)(raw(self)) }
    }

    fn is_visible(&self) -> bool {
        // SAFETY: the widget is live for the call.
        unsafe { (api().gtk_widget_get_visible)(raw(self)) != GFALSE }
    }

    fn set_sensitive(&self, sensitive: bool) {
        // SAFETY: the widget is live for the call.
        unsafe { (api().gtk_widget_set_sensitive)(raw(self), sensitive.into()) }
    }

    fn is_sensitive(&self) -> bool {
        // SAFETY: the widget is live for the call.
        unsafe { (api().gtk_widget_get_sensitive)(raw(self)) != GFALSE }
    }

    /// # Errors
    ///
    /// [`PropertyError::OutOfRange`] outside `0..=32767`.
    fn set_margin_start(&self, margin: i32) -> Result<(), PropertyError> {
        check_margin("margin-start", margin)?;
        // SAFETY: the widget is live for the call.
        unsafe { (api().gtk_widget_set_margin_start)(raw(self), margin) };
        Ok(())
    }

    fn margin_start(&self) -> i32 {
        // SAFETY: the widget is live for the call.
        unsafe { (api().gtk_widget_get_margin_start)(raw(self)) }
    }

    /// # Errors
    ///
    /// [`PropertyError::OutOfRange`] outside `0..=32767`.
    fn set_margin_end(&self, margin: i32) -> Result<(), PropertyError> {
        check_margin("margin-end", margin)?;
        // SAFETY: the widget is live for the call.
        unsafe { (api().gtk_widget_set_margin_end)(raw(self), margin) };
        Ok(())
    }

    fn margin_end(&self) -> i32 {
        // SAFETY: the widget is live for the call.
        unsafe { (api().gtk_widget_get_margin_end)(raw(self)) }
    }

    /// # Errors
    ///
    /// [`PropertyError::OutOfRange`] outside `0..=32767`.
    fn set_margin_top(&self, margin: i32) -> Result<(), PropertyError> {
        check_margin("margin-top", margin)?;
        // SAFETY: the widget is live for the call.
        unsafe { (api().gtk_widget_set_margin_top)(raw(self), margin) };
        Ok(())
    }

    fn margin_top(&self) -> i32 {
        // SAFETY: the widget is live for the call.
        unsafe { (api().gtk_widget_get_margin_top)(raw(self)) }
    }

    /// # Errors
    ///
    /// [`PropertyError::OutOfRange`] outside `0..=32767`.
    fn set_margin_bottom(&self, margin: i32) -> Result<(), PropertyError> {
        check_margin("margin-bottom", margin)?;
        // SAFETY: the widget is live for the call.
        unsafe { (api().gtk_widget_set_margin_bottom)(raw(self), margin) };
        Ok(())
    }

    fn margin_bottom(&self) -> i32 {
        // SAFETY: the widget is live for the call.
        unsafe { (api().gtk_widget_get_margin_bottom)(raw(self)) }
    }

    /// Name used by style selectors and [`WidgetTreeDebug`](crate::logging::WidgetTreeDebug).
    fn set_name(&self, name: &str) -> Result<(), PropertyError> {
        let name = property::to_cstring("name", name)?;
        // SAFETY: the widget is live; the toolkit copies the string.
        unsafe { (api().gtk_widget_set_name)(raw(self), name.as_ptr()) };
        Ok(())
    }

    /// The widget name, or its type name when none was set.
    fn name(&self) -> String {
        // SAFETY: the widget is live; the string is owned by the widget.
        unsafe { property::from_glib_none((api().gtk_widget_get_name)(raw(self))) }.unwrap_or_default()
    }

    /// Set or clear (`None`) the tooltip.
    fn set_tooltip_text(&self, text: Option<&str>) -> Result<(), PropertyError> {
        let text = property::to_optional_cstring("tooltip-text", text)?;
        // SAFETY: the widget is live; the toolkit copies the string.
        unsafe { (api().gtk_widget_set_tooltip_text)(raw(self), property::opt_ptr(&text)) };
        Ok(())
    }

    fn tooltip_text(&self) -> Option<String> {
        // SAFETY: the widget is live; the returned copy is ours to free.
        unsafe { property::from_glib_full((api().gtk_widget_get_tooltip_text)(raw(self))) }
    }

    fn set_hexpand(&self, expand: bool) {
        // SAFETY: the widget is live for the call.
        unsafe { (api().gtk_widget_set_hexpand)(raw(self), expand.into()) }
    }

    fn hexpand(&self) -> bool {
        // SAFETY: the widget is live for the call.
        unsafe { (api().gtk_widget_get_hexpand)(raw(self)) != GFALSE }
    }

    fn set_vexpand(&self, expand: bool) {
        // SAFETY: the widget is live for the call.
        unsafe { (api().gtk_widget_set_vexpand)(raw(self), expand.into()) }
    }

    fn vexpand(&self) -> bool {
        // SAFETY: the widget is live for the call.
        unsafe { (api().gtk_widget_get_vexpand)(raw(self)) != GFALSE }
    }

    /// Minimum size; `-1` leaves a dimension unset.
    ///
    /// # Errors
    ///
    /// [`PropertyError::OutOfRange`] for values below `-1`.
    fn set_size_request(&self, width: i32, height: i32) -> Result<(), PropertyError> {
        property::check_size("width-request", width)?;
        property::check_size("height-request", height)?;
        // SAFETY: the widget is live for the call.
        unsafe { (api().gtk_widget_set_size_request)(raw(self), width, height) };
        Ok(())
    }

    fn size_request(&self) -> (i32, i32) {
        let (mut width, mut height) = (-1, -1);
        // SAFETY: the widget is live; both out-pointers are valid.
        unsafe { (api().gtk_widget_get_size_request)(raw(self), &mut width, &mut height) };
        (width, height)
    }

    /// The containing widget, if any.
    fn parent(&self) -> Option<Owned<Widget>> {
        // SAFETY: the parent is live while it contains `self`.
        unsafe { Owned::from_raw_none((api().gtk_widget_get_parent)(raw(self))) }
    }

    fn connect_destroy<F: Fn(&Self) + 'static>(&self, f: F) -> Result<SubscriptionToken, SignalError> {
        signal::connect(self, "destroy", ConnectFlags::empty(), f)
    }

    fn connect_show<F: Fn(&Self) + 'static>(&self, f: F) -> Result<SubscriptionToken, SignalError> {
        signal::connect(self, "show", ConnectFlags::empty(), f)
    }

    fn connect_hide<F: Fn(&Self) + 'static>(&self, f: F) -> Result<SubscriptionToken, SignalError> {
        signal::connect(self, "hide", ConnectFlags::empty(), f)
    }
}

impl<T: IsA<Widget>> WidgetExt for T {}

#[cfg(all(test, feature = "headless"))]
mod tests {
    use crate::prelude::*;
    use crate::{Button, Label, PropertyError, Toolkit, ToolkitConfig};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn init() -> Toolkit {
        Toolkit::init(&ToolkitConfig::headless()).unwrap()
    }

    #[test]
    fn test_visibility_signals_fire_on_change() {
        let _tk = init();
        let button = Button::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        button.connect_show(move |_| l.borrow_mut().push("show")).unwrap();
        let l = log.clone();
        button.connect_hide(move |_| l.borrow_mut().push("hide")).unwrap();

        assert!(!button.is_visible());
        button.show();
        button.show();
        button.hide();
        assert_eq!(*log.borrow(), ["show", "hide"]);
    }

    #[test]
    fn test_negative_margin_keeps_previous_value() {
        let _tk = init();
        let label = Label::new("m").unwrap();
        label.set_margin_start(12).unwrap();
        let err = label.set_margin_start(-5).unwrap_err();
        assert!(matches!(err, PropertyError::OutOfRange { property: "margin-start", value: -5, .. }));
        assert_eq!(label.margin_start(), 12);
        assert!(label.set_margin_bottom(32768).is_err());
        label.set_margin_bottom(32767).unwrap();
        assert_eq!(label.margin_bottom(), 32767);
    }

    #[test]
    fn test_name_and_tooltip() {
        let _tk = init();
        let button = Button::new();
        assert_eq!(button.name(), "GtkButton");
        button.set_name("save").unwrap();
        assert_eq!(button.name(), "save");
        assert!(button.set_name("a\0b").is_err());
        assert_eq!(button.name(), "save");

        assert_eq!(button.tooltip_text(), None);
        button.set_tooltip_text(Some("Save the file")).unwrap();
        assert_eq!(button.tooltip_text().as_deref(), Some("Save the file"));
        button.set_tooltip_text(None).unwrap();
        assert_eq!(button.tooltip_text(), None);
    }

    #[test]
    fn test_size_request_and_flags() {
        let _tk = init();
        let button = Button::new();
        assert_eq!(button.size_request(), (-1, -1));
        button.set_size_request(100, -1).unwrap();
        assert!(button.set_size_request(-2, 10).is_err());
        assert_eq!(button.size_request(), (100, -1));

        button.set_hexpand(true);
        assert!(button.hexpand());
        assert!(!button.vexpand());
        assert!(button.is_sensitive());
        button.set_sensitive(false);
        assert!(!button.is_sensitive());
    }

    #[test]
    fn test_destroy_signal_and_parent() {
        let _tk = init();
        let vbox = crate::Box::new(crate::Orientation::Vertical, 0).unwrap();
        let child = Button::new();
        vbox.add(&*child);
        assert!(child.parent().unwrap().ptr_eq(&*vbox));

        let destroyed = Rc::new(RefCell::new(false));
        let d = destroyed.clone();
        child.connect_destroy(move |_| *d.borrow_mut() = true).unwrap();
        child.destroy();
        assert!(*destroyed.borrow());
        assert!(child.parent().is_none());
        assert!(vbox.children().is_empty());
    }
}
