//! Headless backend: the toolkit ABI implemented in process.
//!
//! Objects, handlers and the accelerator map live in a per-thread world.
//! Every [`NativeApi`](crate::NativeApi) entry point has a counterpart in
//! [`abi`] with the same C signature and the same observable contract as the
//! native library: floating references are sunk by the first owner, handler
//! ids are never reused, destroy notifies run exactly once, and invalid
//! calls produce a warning (logged under the `horizon_gtk_sys::headless`
//! target) and a zero or no-op result instead of touching memory.
//!
//! The free functions below inspect the calling thread's world. They exist
//! for tests that check ownership and handler bookkeeping.

pub mod abi;
mod accel;
mod object;
mod signal;
pub mod types;

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::ffi::CString;

use slotmap::SlotMap;

use crate::types::{GParamSpec, GTypeInstance, gpointer};
use accel::AccelMap;
use object::Instance;
use signal::{Handler, HandlerKey, PendingNotify};

pub(crate) const TARGET: &str = "horizon_gtk_sys::headless";

/// Log a warning the native library would have printed, and count it.
macro_rules! native_warning {
    ($($arg:tt)+) => {{
        $crate::headless::note_warning();
        ::tracing::warn!(target: $crate::headless::TARGET, $($arg)+);
    }};
}
pub(crate) use native_warning;

thread_local! {
    static WORLD: RefCell<World> = RefCell::new(World::default());
    static WARNINGS: Cell<usize> = const { Cell::new(0) };
}

/// A `GParamSpec` handed to `notify` handlers, with the name it points to.
struct ParamSpecSlot {
    spec: GParamSpec,
    _name: CString,
}

#[derive(Default)]
pub(crate) struct World {
    objects: HashMap<usize, Instance>,
    handlers: SlotMap<HandlerKey, Handler>,
    /// Handlers currently running, with their nesting depth.
    invoking: HashMap<HandlerKey, u32>,
    /// Notifies of handlers removed while running; they run when the
    /// outermost invocation returns.
    deferred_notifies: Vec<(HandlerKey, PendingNotify)>,
    /// Windows the toolkit holds a reference on until they are destroyed.
    toplevels: Vec<usize>,
    pspecs: HashMap<&'static str, Box<ParamSpecSlot>>,
    /// Strings handed out with transfer-full semantics, freed by `g_free`.
    strings: HashSet<usize>,
    /// Heads of lists handed out with transfer-container semantics.
    lists: HashSet<usize>,
    accel_map: AccelMap,
    initialized: bool,
}

impl World {
    /// The parameter spec for property `name`, created on first use.
    fn pspec(&mut self, name: &'static str) -> gpointer {
        let slot = self.pspecs.entry(name).or_insert_with(|| {
            let owned = CString::new(name).unwrap_or_default();
            Box::new(ParamSpecSlot {
                spec: GParamSpec {
                    g_type_instance: GTypeInstance {
                        g_class: std::ptr::null_mut(),
                    },
                    name: owned.as_ptr(),
                    flags: 0,
                    value_type: 0,
                    owner_type: 0,
                },
                _name: owned,
            })
        });
        &mut slot.spec as *mut GParamSpec as gpointer
    }
}

pub(crate) fn with_world<R>(f: impl FnOnce(&mut World) -> R) -> R {
    WORLD.with(|world| f(&mut world.borrow_mut()))
}

pub(crate) fn note_warning() {
    WARNINGS.with(|count| count.set(count.get() + 1));
}

/// Number of live objects on this thread.
pub fn live_object_count() -> usize {
    with_world(|w| w.objects.len())
}

/// Reference count of `object`, or `None` if it is not a live object.
pub fn ref_count(object: gpointer) -> Option<u32> {
    with_world(|w| w.instance(object as usize).map(|i| i.ref_count))
}

/// Whether `object` still carries its floating reference.
pub fn is_floating(object: gpointer) -> Option<bool> {
    with_world(|w| w.instance(object as usize).map(|i| i.floating))
}

/// Number of handlers connected on `object`.
pub fn handler_count(object: gpointer) -> usize {
    with_world(|w| w.instance(object as usize).map_or(0, |i| i.handlers.len()))
}

/// Number of windows the toolkit is holding alive.
pub fn toplevel_count() -> usize {
    with_world(|w| w.toplevels.len())
}

/// Number of native warnings logged on this thread so far.
pub fn warning_count() -> usize {
    WARNINGS.with(Cell::get)
}

/// Whether `gtk_init_check` has run on this thread.
pub fn is_initialized() -> bool {
    with_world(|w| w.initialized)
}
