//! The application object and its run loop.

use std::ffi::{CString, c_char, c_int};

use horizon_gtk_sys::{self as ffi, GFALSE};

use crate::enums::ApplicationFlags;
use crate::error::{PropertyError, SignalError};
use crate::handle::{self, Owned, facade};
use crate::logging::targets;
use crate::property;
use crate::signal::{self, ConnectFlags, SubscriptionToken};
use crate::toolkit::api;
use crate::Object;

facade! {
    /// A GTK application (`GtkApplication`).
    ///
    /// Owns the main loop: [`run`](Self::run) emits `startup`, then
    /// `activate`, and `shutdown` once the loop ends.
    pub struct Application(ffi::GtkApplication);
    type_name = "GtkApplication";
    static_type = (api().gtk_application_get_type)();
    is_a = [Object];
}

impl Application {
    /// Create an application.
    ///
    /// # Panics
    ///
    /// Panics if `application_id` is not a valid application id: at least
    /// two dot-separated elements of `[A-Za-z0-9_-]`, none empty or starting
    /// with a digit, at most 255 bytes. An invalid id is a programming error.
    pub fn new(application_id: &str, flags: ApplicationFlags) -> Owned<Self> {
        let Some(id) = CString::new(application_id)
            .ok()
            // SAFETY: `id` is NUL-terminated.
            .filter(|id| unsafe { (api().g_application_id_is_valid)(id.as_ptr()) } != GFALSE)
        else {
            invalid_application_id(application_id)
        };
        // SAFETY: the new application's reference is ours.
        unsafe {
            handle::construct::<Self>(
                (api().gtk_application_new)(id.as_ptr(), flags.bits()),
                "gtk_application_new",
            )
        }
    }

    fn as_gapplication(&self) -> *mut ffi::GApplication {
        self.ptr.as_ptr().cast()
    }

    pub fn application_id(&self) -> Option<String> {
        // SAFETY: the application is live; the string is owned by it.
        unsafe { property::from_glib_none((api().g_application_get_application_id)(self.as_gapplication())) }
    }

    /// Run the application with no command-line arguments.
    ///
    /// Returns the exit status.
    pub fn run(&self) -> i32 {
        self.run_argv(&[])
    }

    /// Run the application with `args` as `argv` (the first being the
    /// program name).
    ///
    /// # Errors
    ///
    /// [`PropertyError::InteriorNul`] if an argument contains a NUL byte.
    /// The application does not run in that case.
    pub fn run_with_args<S: AsRef<str>>(&self, args: &[S]) -> Result<i32, PropertyError> {
        let args = args
            .iter()
            .map(|arg| property::to_cstring("argv", arg.as_ref()))
            .collect::<Result<Vec<CString>, _>>()?;
        Ok(self.run_argv(&args))
    }

    fn run_argv(&self, args: &[CString]) -> i32 {
        let mut argv: Vec<*mut c_char> = args.iter().map(|a| a.as_ptr().cast_mut()).collect();
        argv.push(std::ptr::null_mut());
        let argc = c_int::try_from(args.len()).unwrap_or(c_int::MAX);

        tracing::debug!(target: targets::TOOLKIT, id = ?self.application_id(), argc, "running application");
        // SAFETY: `argv` is a NULL-terminated array of `argc` strings that
        // outlive the call.
        let status = unsafe { (api().g_application_run)(self.as_gapplication(), argc, argv.as_mut_ptr()) };
        tracing::debug!(target: targets::TOOLKIT, status, "application finished");
        status
    }

    /// Ask the running main loop to stop.
    pub fn quit(&self) {
        // SAFETY: the application is live for the call.
        unsafe { (api().g_application_quit)(self.as_gapplication()) }
    }

    /// Called once when the application first runs, before `activate`.
    pub fn connect_startup<F: Fn(&Self) + 'static>(&self, f: F) -> Result<SubscriptionToken, SignalError> {
        signal::connect(self, "startup", ConnectFlags::empty(), f)
    }

    /// Called when the application should show its main window.
    pub fn connect_activate<F: Fn(&Self) + 'static>(&self, f: F) -> Result<SubscriptionToken, SignalError> {
        signal::connect(self, "activate", ConnectFlags::empty(), f)
    }

    /// Called once after the main loop ends.
    pub fn connect_shutdown<F: Fn(&Self) + 'static>(&self, f: F) -> Result<SubscriptionToken, SignalError> {
        signal::connect(self, "shutdown", ConnectFlags::empty(), f)
    }
}

#[cold]
#[inline(never)]
#[track_caller]
fn invalid_application_id(id: &str) -> ! {
    tracing::error!(target: targets::TOOLKIT, id, "invalid application id");
    panic!("{id:?} is not a valid application id")
}
