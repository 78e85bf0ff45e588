//! Handler registry and signal emission.
//!
//! Handler ids are slotmap keys, so an id that was disconnected never names
//! a later registration. Emission snapshots the matching handlers, releases
//! the world borrow and re-checks each handler right before calling it, so
//! handlers may connect, disconnect, block or destroy freely while running.

use slotmap::{Key, KeyData, new_key_type};

use super::types::{self, Marshal};
use super::{World, native_warning, with_world};
use crate::types::{GCallback, GClosure, gboolean, gpointer, gulong, GFALSE};

new_key_type! {
    /// Registry key of a connected handler. Its FFI form is the handler id.
    pub(crate) struct HandlerKey;
}

impl HandlerKey {
    pub fn id(self) -> gulong {
        self.data().as_ffi() as gulong
    }

    pub fn from_id(id: gulong) -> Self {
        Self::from(KeyData::from_ffi(id as u64))
    }
}

type NotifyFn = unsafe extern "C" fn(gpointer, *mut GClosure);

/// A destroy notify that still has to run.
pub(crate) struct PendingNotify {
    notify: NotifyFn,
    data: gpointer,
}

impl PendingNotify {
    /// # Safety
    ///
    /// Must run at most once, outside the world borrow.
    pub unsafe fn run(self) {
        // SAFETY: `notify` was registered together with `data`.
        unsafe { (self.notify)(self.data, std::ptr::null_mut()) }
    }
}

pub(crate) struct Handler {
    pub instance: usize,
    pub signal: String,
    pub detail: Option<String>,
    pub callback: unsafe extern "C" fn(),
    pub data: gpointer,
    pub notify: Option<NotifyFn>,
    pub after: bool,
    pub swapped: bool,
    pub block_count: u32,
}

impl Handler {
    pub fn pending_notify(&self) -> Option<PendingNotify> {
        self.notify.map(|notify| PendingNotify {
            notify,
            data: self.data,
        })
    }
}

/// Why a connection was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ConnectRefusal {
    InvalidInstance,
    NullHandler,
    MalformedName,
    UnknownSignal { type_name: String },
    DetailNotAllowed,
}

/// Emission arguments beyond the instance.
#[derive(Debug, Clone, Copy)]
pub(crate) enum EmitArg {
    None,
    Pointer(gpointer),
}

struct Pending {
    key: HandlerKey,
    callback: unsafe extern "C" fn(),
    data: gpointer,
    swapped: bool,
}

impl World {
    #[allow(clippy::too_many_arguments)]
    pub fn connect(
        &mut self,
        instance: usize,
        detailed_signal: &str,
        callback: GCallback,
        data: gpointer,
        notify: Option<NotifyFn>,
        after: bool,
        swapped: bool,
    ) -> Result<HandlerKey, ConnectRefusal> {
        let ty = self.type_of(instance).ok_or(ConnectRefusal::InvalidInstance)?;
        let callback = callback.ok_or(ConnectRefusal::NullHandler)?;
        let (name, detail) =
            types::parse_detailed_signal(detailed_signal).ok_or(ConnectRefusal::MalformedName)?;
        let decl = types::find_signal(ty, &name).ok_or_else(|| ConnectRefusal::UnknownSignal {
            type_name: types::info(ty)
                .map(|i| i.name.to_string_lossy().into_owned())
                .unwrap_or_default(),
        })?;
        if detail.is_some() && !decl.detailed {
            return Err(ConnectRefusal::DetailNotAllowed);
        }

        let key = self.handlers.insert(Handler {
            instance,
            signal: name,
            detail: detail.map(str::to_string),
            callback,
            data,
            notify,
            after,
            swapped,
            block_count: 0,
        });
        if let Some(inst) = self.instance_mut(instance) {
            inst.handlers.push(key);
        }
        Ok(key)
    }

    /// Look up a handler id that belongs to `instance`.
    pub fn handler_of(&self, instance: usize, id: gulong) -> Option<HandlerKey> {
        if id == 0 {
            return None;
        }
        let key = HandlerKey::from_id(id);
        self.handlers
            .get(key)
            .filter(|h| h.instance == instance)
            .map(|_| key)
    }

    pub fn disconnect(&mut self, instance: usize, id: gulong) -> Option<Option<PendingNotify>> {
        let key = self.handler_of(instance, id)?;
        let handler = self.handlers.remove(key)?;
        if let Some(inst) = self.instance_mut(instance) {
            inst.handlers.retain(|&k| k != key);
        }
        Some(self.release_handler(key, handler))
    }

    /// Remove every handler of `instance`, returning the notifies to run.
    pub fn disconnect_all(&mut self, instance: usize) -> Vec<PendingNotify> {
        let keys = self
            .instance_mut(instance)
            .map(|inst| std::mem::take(&mut inst.handlers))
            .unwrap_or_default();
        let mut notifies = Vec::new();
        for key in keys {
            if let Some(handler) = self.handlers.remove(key) {
                notifies.extend(self.release_handler(key, handler));
            }
        }
        notifies
    }

    /// The notify of a removed handler, or `None` if there is none or the
    /// handler is still running and the notify was deferred.
    pub fn release_handler(&mut self, key: HandlerKey, handler: Handler) -> Option<PendingNotify> {
        let notify = handler.pending_notify()?;
        if self.invoking.contains_key(&key) {
            self.deferred_notifies.push((key, notify));
            None
        } else {
            Some(notify)
        }
    }

    fn begin_invocation(&mut self, key: HandlerKey) {
        *self.invoking.entry(key).or_insert(0) += 1;
    }

    /// Notifies that were waiting for the outermost run of `key` to end.
    fn end_invocation(&mut self, key: HandlerKey) -> Vec<PendingNotify> {
        match self.invoking.get_mut(&key) {
            Some(depth) if *depth > 1 => {
                *depth -= 1;
                return Vec::new();
            }
            Some(_) => {
                self.invoking.remove(&key);
            }
            None => return Vec::new(),
        }
        let (ready, waiting) = std::mem::take(&mut self.deferred_notifies)
            .into_iter()
            .partition(|(k, _)| *k == key);
        self.deferred_notifies = waiting;
        ready.into_iter().map(|(_, notify)| notify).collect()
    }

    fn live_unblocked(&self, key: HandlerKey) -> bool {
        self.handlers.get(key).is_some_and(|h| h.block_count == 0)
    }

    fn snapshot(&self, instance: usize, signal: &str, detail: Option<&str>) -> Vec<Pending> {
        let Some(inst) = self.instance(instance) else {
            return Vec::new();
        };
        let matching = |after: bool| {
            inst.handlers.iter().filter_map(move |&key| {
                let h = self.handlers.get(key)?;
                let detail_matches = match (&h.detail, detail) {
                    (None, _) => true,
                    (Some(wanted), Some(actual)) => wanted == actual,
                    (Some(_), None) => false,
                };
                (h.signal == signal && h.after == after && h.block_count == 0 && detail_matches)
                    .then_some(Pending {
                        key,
                        callback: h.callback,
                        data: h.data,
                        swapped: h.swapped,
                    })
            })
        };
        matching(false).chain(matching(true)).collect()
    }
}

/// Emit `signal` on `instance`.
///
/// Returns `true` when a `BoolPointer` handler stopped the emission.
pub(crate) fn emit(instance: usize, signal: &str, detail: Option<&str>, arg: EmitArg) -> bool {
    let prepared = with_world(|w| {
        let ty = w.type_of(instance)?;
        let decl = types::find_signal(ty, signal)?;
        w.add_ref(instance);
        Some((decl.marshal, w.snapshot(instance, signal, detail)))
    });
    let Some((marshal, pending)) = prepared else {
        native_warning!(signal, "emission on an invalid instance or unknown signal");
        return false;
    };

    let mut handled = false;
    for handler in pending {
        let runnable = with_world(|w| {
            let live = w.live_unblocked(handler.key);
            if live {
                w.begin_invocation(handler.key);
            }
            live
        });
        if !runnable {
            continue;
        }
        // SAFETY: the callback was registered for this signal, whose
        // declaration fixes the marshal used to call it.
        let result = unsafe { invoke(&handler, marshal, instance as gpointer, arg) };
        for notify in with_world(|w| w.end_invocation(handler.key)) {
            // SAFETY: removed from the registry, so it runs only here.
            unsafe { notify.run() };
        }
        if marshal == Marshal::BoolPointer && result != GFALSE {
            handled = true;
            break;
        }
    }

    // SAFETY: balances the reference taken above.
    unsafe { super::abi::g_object_unref(instance as gpointer) };
    handled
}

unsafe fn invoke(handler: &Pending, marshal: Marshal, instance: gpointer, arg: EmitArg) -> gboolean {
    type VoidFn = unsafe extern "C" fn(gpointer, gpointer);
    type PointerFn = unsafe extern "C" fn(gpointer, gpointer, gpointer);
    type BoolFn = unsafe extern "C" fn(gpointer, gpointer, gpointer) -> gboolean;

    let (first, last) = if handler.swapped {
        (handler.data, instance)
    } else {
        (instance, handler.data)
    };
    let arg = match arg {
        EmitArg::None => std::ptr::null_mut(),
        EmitArg::Pointer(p) => p,
    };

    // SAFETY: the caller guarantees the registered callback has the
    // signature described by `marshal`.
    unsafe {
        match marshal {
            Marshal::Void => {
                let f: VoidFn = std::mem::transmute(handler.callback);
                f(first, last);
                GFALSE
            }
            Marshal::Pointer => {
                let f: PointerFn = std::mem::transmute(handler.callback);
                f(first, arg, last);
                GFALSE
            }
            Marshal::BoolPointer => {
                let f: BoolFn = std::mem::transmute(handler.callback);
                f(first, arg, last)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::types::{GTK_TYPE_BUTTON, GTK_TYPE_LABEL};

    unsafe extern "C" fn noop(_instance: gpointer, _data: gpointer) {}

    fn callback() -> GCallback {
        // SAFETY: only stored, never called with another signature here.
        Some(unsafe {
            std::mem::transmute::<unsafe extern "C" fn(gpointer, gpointer), unsafe extern "C" fn()>(
                noop,
            )
        })
    }

    #[test]
    fn test_connect_refusals() {
        let mut world = World::default();
        let label = world.create(GTK_TYPE_LABEL, &[]);

        let refusal = |w: &mut World, inst, name: &str, cb| {
            w.connect(inst, name, cb, std::ptr::null_mut(), None, false, false)
                .err()
        };
        assert_eq!(refusal(&mut world, 0x1, "destroy", callback()), Some(ConnectRefusal::InvalidInstance));
        assert_eq!(refusal(&mut world, label, "destroy", None), Some(ConnectRefusal::NullHandler));
        assert_eq!(refusal(&mut world, label, "no such", callback()), Some(ConnectRefusal::MalformedName));
        assert!(matches!(
            refusal(&mut world, label, "clicked", callback()),
            Some(ConnectRefusal::UnknownSignal { type_name }) if type_name == "GtkLabel"
        ));
        assert_eq!(refusal(&mut world, label, "destroy::x", callback()), Some(ConnectRefusal::DetailNotAllowed));
        assert_eq!(refusal(&mut world, label, "notify::label", callback()), None);
    }

    #[test]
    fn test_stale_ids_do_not_alias_new_handlers() {
        let mut world = World::default();
        let button = world.create(GTK_TYPE_BUTTON, &[]);
        let first = world
            .connect(button, "clicked", callback(), std::ptr::null_mut(), None, false, false)
            .unwrap();
        assert!(world.disconnect(button, first.id()).is_some());

        let second = world
            .connect(button, "clicked", callback(), std::ptr::null_mut(), None, false, false)
            .unwrap();
        assert_ne!(first.id(), second.id());
        assert!(world.handler_of(button, first.id()).is_none());
        assert!(world.handler_of(button, second.id()).is_some());
        assert!(first.id() > 0 && second.id() > 0);
    }

    #[test]
    fn test_snapshot_orders_after_handlers_last() {
        let mut world = World::default();
        let button = world.create(GTK_TYPE_BUTTON, &[]);
        let late = world
            .connect(button, "clicked", callback(), std::ptr::null_mut(), None, true, false)
            .unwrap();
        let early = world
            .connect(button, "clicked", callback(), std::ptr::null_mut(), None, false, false)
            .unwrap();
        let order: Vec<_> = world.snapshot(button, "clicked", None).iter().map(|p| p.key).collect();
        assert_eq!(order, vec![early, late]);
    }

    unsafe extern "C" fn count_notify(data: gpointer, _closure: *mut GClosure) {
        // SAFETY: the test passes a `u32` counter.
        unsafe { *data.cast::<u32>() += 1 };
    }

    #[test]
    fn test_notify_of_running_handler_waits_for_return() {
        let mut world = World::default();
        let button = world.create(GTK_TYPE_BUTTON, &[]);
        let mut runs = 0u32;
        let key = world
            .connect(
                button,
                "clicked",
                callback(),
                (&mut runs as *mut u32).cast(),
                Some(count_notify),
                false,
                false,
            )
            .unwrap();

        world.begin_invocation(key);
        world.begin_invocation(key);
        assert!(matches!(world.disconnect(button, key.id()), Some(None)));
        assert!(world.end_invocation(key).is_empty());
        let ready = world.end_invocation(key);
        assert_eq!(ready.len(), 1);
        for notify in ready {
            unsafe { notify.run() };
        }
        assert_eq!(runs, 1);
        assert!(world.deferred_notifies.is_empty());
    }
}
