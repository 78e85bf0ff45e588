//! Toolkit initialisation and per-thread backend binding.
//!
//! [`Toolkit::init`] loads a backend, runs `gtk_init_check` and binds the
//! backend's function table to the calling thread. Every facade call on that
//! thread goes through the bound table. Calling a facade on a thread without
//! an initialised toolkit panics.

use std::cell::Cell;
use std::marker::PhantomData;

use horizon_gtk_sys::{Backend, GFALSE, NativeApi};

use crate::config::ToolkitConfig;
use crate::error::{Error, Result};
use crate::logging::targets;
use crate::thread_check::{self, ThreadAffinity};

thread_local! {
    static BOUND: Cell<Option<(&'static NativeApi, Backend)>> = const { Cell::new(None) };
}

/// Proof that the toolkit is initialised on the current thread.
///
/// Dropping it does not shut the toolkit down; GTK cannot be
/// de-initialised.
#[derive(Debug)]
pub struct Toolkit {
    api: &'static NativeApi,
    backend: Backend,
    affinity: ThreadAffinity,
    _not_send: PhantomData<*mut ()>,
}

impl Toolkit {
    /// Initialise the toolkit on the calling thread.
    ///
    /// Initialising again on the same thread with the same backend returns a
    /// new handle to the existing binding.
    ///
    /// # Errors
    ///
    /// - [`Error::Load`] if the backend cannot be loaded.
    /// - [`Error::WrongThread`] if the native backend was initialised on
    ///   another thread.
    /// - [`Error::AlreadyInitialized`] if this thread is bound to another
    ///   backend.
    /// - [`Error::InitFailed`] if `gtk_init_check` fails.
    #[tracing::instrument(skip_all, target = "horizon_gtk::toolkit", fields(backend = %config.backend()))]
    pub fn init(config: &ToolkitConfig) -> Result<Self> {
        let backend = config.backend();
        if let Some(enabled) = config.thread_checks() {
            thread_check::set_thread_checks_enabled(enabled);
        }

        if let Some((api, current)) = BOUND.with(Cell::get) {
            if current != backend {
                return Err(Error::AlreadyInitialized { current });
            }
            return Ok(Self::bound(api, backend));
        }

        let api = if backend == Backend::Native {
            thread_check::claim_native_thread(|| Self::load_and_init(config))?
        } else {
            Self::load_and_init(config)?
        };

        BOUND.with(|bound| bound.set(Some((api, backend))));
        tracing::info!(
            target: targets::TOOLKIT,
            %backend,
            thread = ?std::thread::current().id(),
            "toolkit initialised"
        );
        Ok(Self::bound(api, backend))
    }

    fn load_and_init(config: &ToolkitConfig) -> Result<&'static NativeApi> {
        let backend = config.backend();
        let api = horizon_gtk_sys::load(backend, &config.load_options())?;
        // SAFETY: null argc/argv is documented as accepted.
        let ok = unsafe { (api.gtk_init_check)(std::ptr::null_mut(), std::ptr::null_mut()) };
        if ok == GFALSE {
            tracing::error!(target: targets::TOOLKIT, %backend, "gtk_init_check failed");
            return Err(Error::InitFailed { backend });
        }
        Ok(api)
    }

    fn bound(api: &'static NativeApi, backend: Backend) -> Self {
        Self {
            api,
            backend,
            affinity: ThreadAffinity::current(),
            _not_send: PhantomData,
        }
    }

    /// Whether the toolkit is initialised on the calling thread.
    pub fn is_initialized() -> bool {
        BOUND.with(Cell::get).is_some()
    }

    /// The backend bound to the calling thread, if any.
    pub fn current_backend() -> Option<Backend> {
        BOUND.with(Cell::get).map(|(_, backend)| backend)
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// The raw function table, for calls the facades do not cover.
    pub fn api(&self) -> &'static NativeApi {
        self.affinity.check();
        self.api
    }
}

/// The function table bound to the calling thread.
///
/// # Panics
///
/// Panics if [`Toolkit::init`] has not succeeded on this thread.
#[inline]
#[track_caller]
pub(crate) fn api() -> &'static NativeApi {
    match BOUND.with(Cell::get) {
        Some((api, _)) => api,
        None => not_initialized(),
    }
}

#[cold]
#[inline(never)]
#[track_caller]
fn not_initialized() -> ! {
    let thread = std::thread::current();
    panic!(
        "the toolkit is not initialised on thread {:?} ({}); call Toolkit::init on this thread first",
        thread.id(),
        thread.name().unwrap_or("<unnamed>")
    )
}
