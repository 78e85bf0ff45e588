//! Signal bridge between Rust closures and toolkit signal handlers.
//!
//! A closure connected to a signal is boxed and handed to the toolkit as the
//! handler's user data, together with a typed trampoline and a destroy
//! notify. The toolkit owns the box from then on and frees it exactly once:
//! on disconnect, or when the instance is destroyed or finalised.
//!
//! # Key Types
//!
//! - [`SubscriptionToken`] - Handler id returned by a successful connect
//! - [`SignalGuard`] - RAII alternative that disconnects when dropped
//! - [`ConnectFlags`] - `AFTER` runs the handler after default handlers
//! - [`Propagation`] - Return value of event signals such as `delete-event`
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use horizon_gtk::prelude::*;
//! use horizon_gtk::{Button, Toolkit, ToolkitConfig};
//!
//! let _toolkit = Toolkit::init(&ToolkitConfig::headless()).unwrap();
//! let button = Button::with_label("Save").unwrap();
//! let clicks = Rc::new(Cell::new(0));
//!
//! let counter = clicks.clone();
//! let token = button
//!     .connect_clicked(move |_| counter.set(counter.get() + 1))
//!     .unwrap();
//! button.clicked();
//! button.disconnect(token);
//! button.clicked();
//! assert_eq!(clicks.get(), 1);
//! ```

use std::ffi::{CStr, CString, c_ulong};
use std::fmt;
use std::num::NonZero;
use std::ptr::NonNull;

use bitflags::bitflags;
use horizon_gtk_sys::{self as ffi, GClosure, GFALSE, GTRUE, gboolean, gpointer};

use crate::error::SignalError;
use crate::handle::{Borrowed, ObjectType, Owned};
use crate::logging::targets;
use crate::toolkit::api;
use crate::{Object, Widget};

/// Id of a connected handler.
///
/// Not `Copy`: [`disconnect`](crate::prelude::ObjectExt::disconnect)
/// consumes the token, so a handler cannot be disconnected twice through
/// it.
#[derive(PartialEq, Eq, Hash)]
pub struct SubscriptionToken(NonZero<c_ulong>);

impl SubscriptionToken {
    /// The toolkit handler id.
    pub fn id(&self) -> c_ulong {
        self.0.get()
    }

    /// Wrap a handler id obtained from the toolkit directly.
    ///
    /// # Safety
    ///
    /// `id` must be a handler id the caller owns and has not disconnected.
    pub unsafe fn from_raw(id: c_ulong) -> Option<Self> {
        NonZero::new(id).map(Self)
    }

    /// Give up the token without disconnecting.
    pub fn into_raw(self) -> c_ulong {
        self.0.get()
    }
}

impl fmt::Debug for SubscriptionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubscriptionToken({})", self.0)
    }
}

bitflags! {
    /// Connection flags (`GConnectFlags`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ConnectFlags: u32 {
        /// Run after the default handler.
        const AFTER = ffi::G_CONNECT_AFTER;
        /// Swap the instance and user data arguments. Raw connections only.
        const SWAPPED = ffi::G_CONNECT_SWAPPED;
    }
}

/// Whether an event should continue to other handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Propagation {
    /// Stop: the event is handled.
    Stop,
    /// Let other handlers and the default handler run.
    #[default]
    Proceed,
}

impl Propagation {
    pub fn is_stop(self) -> bool {
        self == Self::Stop
    }

    fn into_glib(self) -> gboolean {
        match self {
            Self::Stop => GTRUE,
            Self::Proceed => GFALSE,
        }
    }
}

impl From<bool> for Propagation {
    /// `true` stops propagation, as the toolkit's return value does.
    fn from(stop: bool) -> Self {
        if stop { Self::Stop } else { Self::Proceed }
    }
}

/// Connect a raw handler.
///
/// # Safety
///
/// - `instance` must be a live object.
/// - `callback` must have the C signature of `signal` (with the instance and
///   user data swapped if `flags` contains `SWAPPED`).
/// - `destroy`, if given, must free `user_data` and must be safe to call
///   once at any later point.
///
/// # Errors
///
/// [`SignalError::Rejected`] if the toolkit refused the connection (unknown
/// signal, detail on a non-detailed signal). The destroy notify has not run
/// in that case; the caller still owns `user_data`.
#[tracing::instrument(
    level = "debug",
    skip_all,
    target = "horizon_gtk::signal",
    fields(instance = ?instance, signal = ?signal)
)]
pub unsafe fn connect_raw(
    instance: NonNull<ffi::GObject>,
    signal: &CStr,
    callback: ffi::GCallback,
    user_data: Option<NonNull<std::ffi::c_void>>,
    destroy: ffi::GClosureNotify,
    flags: ConnectFlags,
) -> Result<SubscriptionToken, SignalError> {
    let data = user_data.map_or(std::ptr::null_mut(), NonNull::as_ptr);
    // SAFETY: forwarded to the caller.
    let id = unsafe {
        (api().g_signal_connect_data)(
            instance.as_ptr().cast(),
            signal.as_ptr(),
            callback,
            data,
            destroy,
            flags.bits(),
        )
    };
    match NonZero::new(id) {
        Some(id) => {
            tracing::debug!(target: targets::SIGNAL, id, "connected");
            Ok(SubscriptionToken(id))
        }
        None => {
            let signal = signal.to_string_lossy().into_owned();
            tracing::warn!(target: targets::SIGNAL, %signal, "connection rejected");
            Err(SignalError::Rejected { signal })
        }
    }
}

/// Disconnect a handler. Its destroy notify runs before this returns.
///
/// # Safety
///
/// `instance` must be a live object.
pub unsafe fn disconnect_raw(instance: NonNull<ffi::GObject>, token: SubscriptionToken) {
    tracing::debug!(target: targets::SIGNAL, id = token.id(), "disconnecting");
    // SAFETY: forwarded to the caller.
    unsafe { (api().g_signal_handler_disconnect)(instance.as_ptr().cast(), token.id()) }
}

/// # Safety
///
/// `instance` must be a live object.
pub unsafe fn block_raw(instance: NonNull<ffi::GObject>, token: &SubscriptionToken) {
    // SAFETY: forwarded to the caller.
    unsafe { (api().g_signal_handler_block)(instance.as_ptr().cast(), token.id()) }
}

/// # Safety
///
/// `instance` must be a live object.
pub unsafe fn unblock_raw(instance: NonNull<ffi::GObject>, token: &SubscriptionToken) {
    // SAFETY: forwarded to the caller.
    unsafe { (api().g_signal_handler_unblock)(instance.as_ptr().cast(), token.id()) }
}

/// Whether the handler is still connected.
///
/// A handler is disconnected implicitly when its instance is destroyed.
///
/// # Safety
///
/// `instance` must be a live object.
pub unsafe fn is_connected_raw(instance: NonNull<ffi::GObject>, token: &SubscriptionToken) -> bool {
    // SAFETY: forwarded to the caller.
    unsafe { (api().g_signal_handler_is_connected)(instance.as_ptr().cast(), token.id()) != GFALSE }
}

fn signal_name(signal: &str) -> Result<CString, SignalError> {
    if signal.is_empty() {
        return Err(SignalError::InvalidName(String::new()));
    }
    CString::new(signal).map_err(|_| SignalError::InvalidName(signal.to_owned()))
}

/// Box `f` as user data and connect it with `trampoline`.
///
/// # Safety
///
/// `trampoline` must have the C signature of `signal` and read its user
/// data as `*const F`.
unsafe fn connect_boxed<F: 'static>(
    instance: NonNull<ffi::GObject>,
    signal: &CStr,
    trampoline: unsafe extern "C" fn(),
    f: F,
    flags: ConnectFlags,
) -> Result<SubscriptionToken, SignalError> {
    let data = Box::into_raw(Box::new(f));
    // SAFETY: `destroy_closure::<F>` frees exactly this box.
    let result = unsafe {
        connect_raw(
            instance,
            signal,
            Some(trampoline),
            NonNull::new(data.cast()),
            Some(destroy_closure::<F>),
            flags.difference(ConnectFlags::SWAPPED),
        )
    };
    if result.is_err() {
        // SAFETY: a refused connection never took the box.
        drop(unsafe { Box::from_raw(data) });
    }
    result
}

unsafe extern "C" fn destroy_closure<F>(data: gpointer, _closure: *mut GClosure) {
    // SAFETY: `data` is the box leaked in `connect_boxed`; the toolkit calls
    // the notify once.
    drop(unsafe { Box::from_raw(data.cast::<F>()) });
}

/// The emitting instance as a borrowed facade.
///
/// # Safety
///
/// `this` must be the live instance the handler was connected on.
unsafe fn this<'a, T: ObjectType>(this: gpointer) -> Option<Borrowed<'a, T>> {
    // SAFETY: forwarded to the caller.
    unsafe { Borrowed::from_raw(this.cast()) }
}

unsafe extern "C" fn unit_trampoline<T: ObjectType, F: Fn(&T) + 'static>(this_ptr: gpointer, data: gpointer) {
    // SAFETY: installed by `connect` with a `F` box on a `T` instance.
    let (f, this) = unsafe { (&*data.cast::<F>(), this::<T>(this_ptr)) };
    if let Some(this) = this {
        f(&this);
    }
}

unsafe extern "C" fn widget_trampoline<T: ObjectType, F: Fn(&T, &Widget) + 'static>(
    this_ptr: gpointer,
    widget: gpointer,
    data: gpointer,
) {
    // SAFETY: installed by `connect_widget` with a `F` box on a `T` instance;
    // the argument is a live widget for the emission.
    let (f, this, widget) = unsafe {
        (
            &*data.cast::<F>(),
            this::<T>(this_ptr),
            Borrowed::<Widget>::from_raw(widget.cast()),
        )
    };
    if let (Some(this), Some(widget)) = (this, widget) {
        f(&this, &widget);
    }
}

unsafe extern "C" fn propagation_trampoline<T: ObjectType, F: Fn(&T) -> Propagation + 'static>(
    this_ptr: gpointer,
    _event: gpointer,
    data: gpointer,
) -> gboolean {
    // SAFETY: installed by `connect_propagation` with a `F` box on a `T`.
    let (f, this) = unsafe { (&*data.cast::<F>(), this::<T>(this_ptr)) };
    this.map_or(GFALSE, |this| f(&this).into_glib())
}

unsafe extern "C" fn notify_trampoline<T: ObjectType, F: Fn(&T, &str) + 'static>(
    this_ptr: gpointer,
    pspec: gpointer,
    data: gpointer,
) {
    // SAFETY: installed by `connect_notify` with a `F` box on a `T` instance;
    // `pspec` is the changed property's spec.
    let (f, this) = unsafe { (&*data.cast::<F>(), this::<T>(this_ptr)) };
    // SAFETY: null or a live `GParamSpec`.
    let name = unsafe { pspec.cast::<ffi::GParamSpec>().as_ref() }
        .filter(|spec| !spec.name.is_null())
        // SAFETY: the spec name is a static NUL-terminated string.
        .map(|spec| unsafe { CStr::from_ptr(spec.name) }.to_string_lossy());
    if let (Some(this), Some(name)) = (this, name) {
        f(&this, &name);
    }
}

/// Connect `f` to a signal with no arguments.
pub fn connect<T, F>(this: &T, signal: &str, flags: ConnectFlags, f: F) -> Result<SubscriptionToken, SignalError>
where
    T: ObjectType,
    F: Fn(&T) + 'static,
{
    let name = signal_name(signal)?;
    let trampoline: unsafe extern "C" fn(gpointer, gpointer) = unit_trampoline::<T, F>;
    // SAFETY: no-argument signals call `(instance, user_data)`.
    unsafe {
        connect_boxed(
            this.as_object_ptr(),
            &name,
            std::mem::transmute::<unsafe extern "C" fn(gpointer, gpointer), unsafe extern "C" fn()>(trampoline),
            f,
            flags,
        )
    }
}

/// Connect `f` to a signal carrying one widget, such as `add` or `remove`.
pub fn connect_widget<T, F>(this: &T, signal: &str, flags: ConnectFlags, f: F) -> Result<SubscriptionToken, SignalError>
where
    T: ObjectType,
    F: Fn(&T, &Widget) + 'static,
{
    let name = signal_name(signal)?;
    let trampoline: unsafe extern "C" fn(gpointer, gpointer, gpointer) = widget_trampoline::<T, F>;
    // SAFETY: widget signals call `(instance, widget, user_data)`.
    unsafe {
        connect_boxed(
            this.as_object_ptr(),
            &name,
            std::mem::transmute::<unsafe extern "C" fn(gpointer, gpointer, gpointer), unsafe extern "C" fn()>(
                trampoline,
            ),
            f,
            flags,
        )
    }
}

/// Connect `f` to an event signal whose return value stops propagation.
pub fn connect_propagation<T, F>(
    this: &T,
    signal: &str,
    flags: ConnectFlags,
    f: F,
) -> Result<SubscriptionToken, SignalError>
where
    T: ObjectType,
    F: Fn(&T) -> Propagation + 'static,
{
    let name = signal_name(signal)?;
    let trampoline: unsafe extern "C" fn(gpointer, gpointer, gpointer) -> gboolean =
        propagation_trampoline::<T, F>;
    // SAFETY: event signals call `(instance, event, user_data) -> gboolean`.
    unsafe {
        connect_boxed(
            this.as_object_ptr(),
            &name,
            std::mem::transmute::<
                unsafe extern "C" fn(gpointer, gpointer, gpointer) -> gboolean,
                unsafe extern "C" fn(),
            >(trampoline),
            f,
            flags,
        )
    }
}

/// Connect `f` to `notify`, or `notify::<property>` when `property` is
/// given. `f` receives the changed property's name.
pub fn connect_notify<T, F>(
    this: &T,
    property: Option<&str>,
    flags: ConnectFlags,
    f: F,
) -> Result<SubscriptionToken, SignalError>
where
    T: ObjectType,
    F: Fn(&T, &str) + 'static,
{
    let signal = match property {
        Some(property) if property.is_empty() => return Err(SignalError::InvalidName("notify::".into())),
        Some(property) => format!("notify::{property}"),
        None => "notify".to_owned(),
    };
    let name = signal_name(&signal)?;
    let trampoline: unsafe extern "C" fn(gpointer, gpointer, gpointer) = notify_trampoline::<T, F>;
    // SAFETY: `notify` calls `(instance, pspec, user_data)`.
    unsafe {
        connect_boxed(
            this.as_object_ptr(),
            &name,
            std::mem::transmute::<unsafe extern "C" fn(gpointer, gpointer, gpointer), unsafe extern "C" fn()>(
                trampoline,
            ),
            f,
            flags,
        )
    }
}

/// Disconnects its handler when dropped.
///
/// Holds a reference to the instance, so the handler can always be
/// disconnected safely. A handler already removed by the instance's
/// destruction is left alone.
///
/// # Example
///
/// ```
/// use horizon_gtk::prelude::*;
/// use horizon_gtk::{Button, Toolkit, ToolkitConfig};
///
/// let _toolkit = Toolkit::init(&ToolkitConfig::headless()).unwrap();
/// let button = Button::new();
/// {
///     let token = button.connect_clicked(|_| println!("clicked")).unwrap();
///     let _guard = button.guard(token);
///     button.clicked(); // prints
/// }
/// button.clicked(); // nothing
/// ```
pub struct SignalGuard {
    instance: Owned<Object>,
    token: Option<SubscriptionToken>,
}

impl SignalGuard {
    pub(crate) fn new(instance: Owned<Object>, token: SubscriptionToken) -> Self {
        Self {
            instance,
            token: Some(token),
        }
    }

    /// Whether the guarded handler is still connected.
    pub fn is_connected(&self) -> bool {
        self.token
            .as_ref()
            // SAFETY: `instance` keeps the object alive.
            .is_some_and(|token| unsafe { is_connected_raw(self.instance.as_object_ptr(), token) })
    }

    /// Keep the handler connected and return its token.
    pub fn forget(mut self) -> Option<SubscriptionToken> {
        self.token.take()
    }
}

impl Drop for SignalGuard {
    fn drop(&mut self) {
        let Some(token) = self.token.take() else {
            return;
        };
        let instance = self.instance.as_object_ptr();
        // SAFETY: `instance` keeps the object alive.
        unsafe {
            if is_connected_raw(instance, &token) {
                disconnect_raw(instance, token);
            }
        }
    }
}

impl fmt::Debug for SignalGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalGuard")
            .field("instance", &self.instance)
            .field("token", &self.token)
            .finish()
    }
}

static_assertions::assert_not_impl_any!(SubscriptionToken: Copy, Clone);
static_assertions::assert_not_impl_any!(SignalGuard: Send, Sync);

#[cfg(all(test, feature = "headless"))]
mod tests {
    use super::*;
    use crate::prelude::*;
    use crate::{Button, Label, Toolkit, ToolkitConfig};
    use horizon_gtk_sys::headless;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn init() -> Toolkit {
        Toolkit::init(&ToolkitConfig::headless()).unwrap()
    }

    #[test]
    fn test_connect_by_name_and_flags() {
        let _tk = init();
        let button = Button::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let o = order.clone();
        connect(&*button, "clicked", ConnectFlags::AFTER, move |_| o.borrow_mut().push("after")).unwrap();
        let o = order.clone();
        connect(&*button, "clicked", ConnectFlags::empty(), move |_| o.borrow_mut().push("normal")).unwrap();

        button.clicked();
        assert_eq!(*order.borrow(), ["normal", "after"]);
    }

    #[test]
    fn test_invalid_names() {
        let _tk = init();
        let button = Button::new();
        assert_eq!(
            connect(&*button, "", ConnectFlags::empty(), |_| {}).unwrap_err(),
            SignalError::InvalidName(String::new())
        );
        assert!(matches!(
            connect(&*button, "cli\0cked", ConnectFlags::empty(), |_| {}),
            Err(SignalError::InvalidName(_))
        ));
    }

    #[test]
    fn test_rejected_connection_frees_closure() {
        let _tk = init();
        let label = Label::new("x").unwrap();
        let marker = Rc::new(());
        let held = marker.clone();
        let err = connect(&*label, "clicked", ConnectFlags::empty(), move |_| {
            let _ = &held;
        })
        .unwrap_err();
        assert_eq!(err, SignalError::Rejected { signal: "clicked".into() });
        assert_eq!(Rc::strong_count(&marker), 1);
        assert_eq!(headless::handler_count(label.as_ptr().cast()), 0);
    }

    #[test]
    fn test_disconnect_runs_destroy_notify_once() {
        let _tk = init();
        let button = Button::new();
        let marker = Rc::new(());
        let held = marker.clone();
        let token = button
            .connect_clicked(move |_| {
                let _ = &held;
            })
            .unwrap();
        assert_eq!(Rc::strong_count(&marker), 2);
        button.disconnect(token);
        assert_eq!(Rc::strong_count(&marker), 1);
    }

    #[test]
    fn test_finalize_releases_closures() {
        let _tk = init();
        let marker = Rc::new(());
        {
            let button = Button::new();
            let held = marker.clone();
            button
                .connect_clicked(move |_| {
                    let _ = &held;
                })
                .unwrap();
        }
        assert_eq!(Rc::strong_count(&marker), 1);
    }

    #[test]
    fn test_block_and_unblock() {
        let _tk = init();
        let button = Button::new();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let token = button.connect_clicked(move |_| c.set(c.get() + 1)).unwrap();
        button.block_signal(&token);
        button.clicked();
        button.unblock_signal(&token);
        button.clicked();
        assert_eq!(count.get(), 1);
        assert!(button.is_signal_connected(&token));
    }

    #[test]
    fn test_guard_disconnects_and_forget_keeps() {
        let _tk = init();
        let button = Button::new();
        let count = Rc::new(Cell::new(0));

        let c = count.clone();
        let guard = button.guard(button.connect_clicked(move |_| c.set(c.get() + 1)).unwrap());
        assert!(guard.is_connected());
        button.clicked();
        drop(guard);
        button.clicked();
        assert_eq!(count.get(), 1);

        let c = count.clone();
        let guard = button.guard(button.connect_clicked(move |_| c.set(c.get() + 10)).unwrap());
        let token = guard.forget().unwrap();
        button.clicked();
        assert_eq!(count.get(), 11);
        assert!(button.is_signal_connected(&token));
    }

    #[test]
    fn test_guard_after_destroy_is_quiet() {
        let _tk = init();
        let button = Button::new();
        let guard = button.guard(button.connect_clicked(|_| {}).unwrap());
        let warnings = headless::warning_count();
        button.destroy();
        assert!(!guard.is_connected());
        drop(guard);
        assert_eq!(headless::warning_count(), warnings);
    }

    #[test]
    fn test_propagation_from_bool() {
        assert_eq!(Propagation::from(true), Propagation::Stop);
        assert!(!Propagation::from(false).is_stop());
        assert_eq!(Propagation::default(), Propagation::Proceed);
    }
}
