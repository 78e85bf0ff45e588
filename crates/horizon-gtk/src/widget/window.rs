use horizon_gtk_sys::{self as ffi, GFALSE};

use crate::application::Application;
use crate::enums::WindowType;
use crate::error::{PropertyError, SignalError};
use crate::handle::{self, Cast, IsA, ObjectType, Owned, facade};
use crate::property;
use crate::signal::{self, ConnectFlags, Propagation, SubscriptionToken};
use crate::toolkit::api;
use crate::{Bin, Container, Object, Widget};

facade! {
    /// A toplevel or popup window (`GtkWindow`).
    pub struct Window(ffi::GtkWindow);
    type_name = "GtkWindow";
    static_type = (api().gtk_window_get_type)();
    is_a = [Object, Widget, Container, Bin];
}

impl Window {
    /// Create a window.
    ///
    /// The toolkit keeps every window alive until it is destroyed, so the
    /// returned handle holds a second reference. Releasing it does not close
    /// the window; call [`WidgetExt::destroy`](crate::prelude::WidgetExt::destroy)
    /// or [`WindowExt::close`].
    pub fn new(window_type: WindowType) -> Owned<Self> {
        // SAFETY: the toolkit owns the new window's reference; we add ours.
        let window = unsafe { Owned::<Self>::from_raw_none((api().gtk_window_new)(window_type.into_glib()).cast()) };
        match window {
            Some(window) => window,
            None => handle::null_constructor("gtk_window_new"),
        }
    }
}

#[inline]
fn window<W: IsA<Window>>(w: &W) -> *mut ffi::GtkWindow {
    w.upcast_ref::<Window>().as_ptr()
}

/// Operations on windows.
pub trait WindowExt: IsA<Window> {
    fn set_title(&self, title: &str) -> Result<(), PropertyError> {
        let title = property::to_cstring("title", title)?;
        // SAFETY: the window is live; the toolkit copies the string.
        unsafe { (api().gtk_window_set_title)(window(self), title.as_ptr()) };
        Ok(())
    }

    fn title(&self) -> Option<String> {
        // SAFETY: the window is live; the string is owned by the window.
        unsafe { property::from_glib_none((api().gtk_window_get_title)(window(self))) }
    }

    /// Size used when the window is first shown; `-1` leaves a dimension
    /// to the natural size.
    ///
    /// # Errors
    ///
    /// [`PropertyError::OutOfRange`] for values below `-1`.
    fn set_default_size(&self, width: i32, height: i32) -> Result<(), PropertyError> {
        property::check_size("default-width", width)?;
        property::check_size("default-height", height)?;
        // SAFETY: the window is live for the call.
        unsafe { (api().gtk_window_set_default_size)(window(self), width, height) };
        Ok(())
    }

    fn default_size(&self) -> (i32, i32) {
        let (mut width, mut height) = (-1, -1);
        // SAFETY: the window is live; both out-pointers are valid.
        unsafe { (api().gtk_window_get_default_size)(window(self), &mut width, &mut height) };
        (width, height)
    }

    fn set_resizable(&self, resizable: bool) {
        // SAFETY: the window is live for the call.
        unsafe { (api().gtk_window_set_resizable)(window(self), resizable.into()) }
    }

    fn is_resizable(&self) -> bool {
        // SAFETY: the window is live for the call.
        unsafe { (api().gtk_window_get_resizable)(window(self)) != GFALSE }
    }

    /// Ask the window to close.
    ///
    /// Emits `delete-event`; unless a handler returns
    /// [`Propagation::Stop`], the window is destroyed.
    fn close(&self) {
        // SAFETY: the window is live for the call.
        unsafe { (api().gtk_window_close)(window(self)) }
    }

    /// Attach the window to `application`, or detach it with `None`.
    fn set_application(&self, application: Option<&Application>) {
        let app = application.map_or(std::ptr::null_mut(), |app| app.as_ptr());
        // SAFETY: both instances are live; the window takes its own reference.
        unsafe { (api().gtk_window_set_application)(window(self), app) }
    }

    fn application(&self) -> Option<Owned<Application>> {
        // SAFETY: the application is live while attached to the window.
        unsafe { Owned::from_raw_none((api().gtk_window_get_application)(window(self))) }
    }

    /// Called when the user or [`close`](Self::close) asks to close the
    /// window. Return [`Propagation::Stop`] to keep it open.
    fn connect_delete_event<F>(&self, f: F) -> Result<SubscriptionToken, SignalError>
    where
        F: Fn(&Self) -> Propagation + 'static,
    {
        signal::connect_propagation(self, "delete-event", ConnectFlags::empty(), f)
    }
}

impl<T: IsA<Window>> WindowExt for T {}

#[cfg(all(test, feature = "headless"))]
mod tests {
    use super::*;
    use crate::prelude::*;
    use crate::{ApplicationFlags, Toolkit, ToolkitConfig};
    use horizon_gtk_sys::headless;
    use std::cell::Cell;
    use std::rc::Rc;

    fn init() -> Toolkit {
        Toolkit::init(&ToolkitConfig::headless()).unwrap()
    }

    #[test]
    fn test_toolkit_holds_windows_until_destroyed() {
        let _tk = init();
        let before = headless::toplevel_count();
        let window = Window::new(WindowType::Toplevel);
        let ptr = window.as_ptr().cast();
        assert_eq!(headless::toplevel_count(), before + 1);
        assert_eq!(headless::ref_count(ptr), Some(2));

        let live = headless::live_object_count();
        window.release();
        assert_eq!(headless::live_object_count(), live);
        assert_eq!(headless::ref_count(ptr), Some(1));

        // SAFETY: the toolkit still holds the window.
        let window = unsafe { Owned::<Window>::from_raw_none(ptr.cast()) }.unwrap();
        window.destroy();
        assert_eq!(headless::toplevel_count(), before);
        drop(window);
        assert_eq!(headless::live_object_count(), live - 1);
    }

    #[test]
    fn test_title_and_sizes() {
        let _tk = init();
        let window = Window::new(WindowType::Popup);
        assert_eq!(window.title(), None);
        window.set_title("Editor").unwrap();
        assert_eq!(window.title().as_deref(), Some("Editor"));
        assert_eq!(window.default_size(), (-1, -1));
        window.set_default_size(640, 480).unwrap();
        assert!(window.set_default_size(-3, 480).is_err());
        assert_eq!(window.default_size(), (640, 480));
        assert!(window.is_resizable());
        window.set_resizable(false);
        assert!(!window.is_resizable());
        window.destroy();
    }

    #[test]
    fn test_close_respects_delete_event() {
        let _tk = init();
        let window = Window::new(WindowType::Toplevel);
        let keep_open = Rc::new(Cell::new(true));
        let k = keep_open.clone();
        window
            .connect_delete_event(move |_| Propagation::from(k.get()))
            .unwrap();
        let destroyed = Rc::new(Cell::new(false));
        let d = destroyed.clone();
        window.connect_destroy(move |_| d.set(true)).unwrap();

        window.close();
        assert!(!destroyed.get());
        keep_open.set(false);
        window.close();
        assert!(destroyed.get());
    }

    #[test]
    fn test_application_link() {
        let _tk = init();
        let app = Application::new("org.horizon.WindowLink", ApplicationFlags::NON_UNIQUE);
        let window = Window::new(WindowType::Toplevel);
        assert!(window.application().is_none());
        window.set_application(Some(&*app));
        assert!(window.application().unwrap().ptr_eq(&*app));
        window.set_application(None);
        assert!(window.application().is_none());
        window.destroy();
    }
}
