//! Thread affinity checks for toolkit handles.
//!
//! GTK is single-threaded: every call must come from the thread that
//! initialised it. Facades and handles are `!Send`, so safe code cannot move
//! them across threads. These checks catch the unsafe cases, such as a
//! handle smuggled out through an `unsafe impl Send` wrapper.
//!
//! Two levels of checking are provided:
//!
//! - **Native ownership**: the native backend may be initialised from one
//!   thread for the life of the process. This is always enforced.
//! - **Handle affinity**: every [`Owned`](crate::Owned) handle records the
//!   thread it was created on and verifies it when released. This runs when
//!   thread checks are enabled, which is the default in debug builds and can
//!   be switched on for release builds with [`set_thread_checks_enabled`] or
//!   the `thread_checks` configuration key.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::ThreadId;

use parking_lot::Mutex;

use crate::error::{Error, Result};

/// Thread that initialised the native backend, if any.
static NATIVE_OWNER: Mutex<Option<ThreadId>> = Mutex::new(None);

/// Flag to enable/disable handle affinity checks globally.
static THREAD_CHECKS_ENABLED: AtomicBool = AtomicBool::new(cfg!(debug_assertions));

/// Run `init` and bind the native backend to the calling thread if it
/// succeeds.
///
/// The owner lock is held for the whole call, so concurrent initialisations
/// are serialised and a failed `init` leaves no owner behind. Succeeds again
/// on the owning thread and fails on any other without running `init`.
pub(crate) fn claim_native_thread<T>(init: impl FnOnce() -> Result<T>) -> Result<T> {
    let current = std::thread::current().id();
    let mut owner = NATIVE_OWNER.lock();
    match *owner {
        Some(id) if id != current => return Err(Error::WrongThread { owner: id }),
        _ => {}
    }
    let value = init()?;
    *owner = Some(current);
    Ok(value)
}

/// Thread that owns the native backend, if it has been initialised.
pub fn native_thread_id() -> Option<ThreadId> {
    *NATIVE_OWNER.lock()
}

/// Enable or disable handle affinity checks.
pub fn set_thread_checks_enabled(enabled: bool) {
    THREAD_CHECKS_ENABLED.store(enabled, Ordering::SeqCst);
}

/// Check if handle affinity checks are currently enabled.
#[inline]
pub fn are_thread_checks_enabled() -> bool {
    THREAD_CHECKS_ENABLED.load(Ordering::Relaxed)
}

/// The thread a handle was created on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadAffinity {
    thread_id: ThreadId,
}

impl Default for ThreadAffinity {
    fn default() -> Self {
        Self::current()
    }
}

impl ThreadAffinity {
    /// Create a new thread affinity tracker for the current thread.
    #[inline]
    pub fn current() -> Self {
        Self {
            thread_id: std::thread::current().id(),
        }
    }

    /// Get the thread ID this affinity is bound to.
    #[inline]
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Check if the current thread matches this affinity.
    #[inline]
    pub fn is_same_thread(&self) -> bool {
        std::thread::current().id() == self.thread_id
    }

    /// Assert that we are on the same thread as the affinity.
    ///
    /// # Panics
    ///
    /// Panics if the current thread differs.
    #[track_caller]
    pub fn assert_same_thread(&self) {
        if !self.is_same_thread() {
            panic_wrong_thread(self.thread_id);
        }
    }

    /// [`assert_same_thread`](Self::assert_same_thread) when thread checks
    /// are enabled.
    #[inline]
    #[track_caller]
    pub fn check(&self) {
        if are_thread_checks_enabled() {
            self.assert_same_thread();
        }
    }
}

#[cold]
#[inline(never)]
#[track_caller]
fn panic_wrong_thread(owner: ThreadId) -> ! {
    let current = std::thread::current();
    panic!(
        "toolkit handle used on the wrong thread\n\
         \n\
         owner:   {owner:?}\n\
         current: {:?} ({})\n\
         \n\
         Toolkit objects must be used and released on the thread that created them.",
        current.id(),
        current.name().unwrap_or("<unnamed>")
    )
}
