//! Raw GTK3 ABI for Horizon GTK.
//!
//! This crate declares the C types and entry points the binding layer uses
//! and provides the backends that implement them:
//!
//! - **Native**: `libgtk-3` loaded at run time. The library search path is
//!   chosen per target architecture at build time (x86_64 and aarch64).
//! - **Headless**: an in-process implementation of the same ABI contract
//!   (reference counting, floating references, signal handler ids, destroy
//!   notifies, native warnings). Each thread gets its own toolkit world, which
//!   makes it suitable for tests and machines without a display.
//!
//! Both backends produce a [`NativeApi`] table. Higher layers call through
//! the table and never name a backend directly.
//!
//! ```
//! use horizon_gtk_sys::{Backend, LoadOptions};
//!
//! let api = horizon_gtk_sys::load(Backend::Headless, &LoadOptions::default()).unwrap();
//! let ok = unsafe { (api.gtk_init_check)(std::ptr::null_mut(), std::ptr::null_mut()) };
//! assert_eq!(ok, horizon_gtk_sys::GTRUE);
//! ```

mod api;
mod error;
mod types;

#[cfg(feature = "headless")]
pub mod headless;

#[cfg(all(
    feature = "native",
    unix,
    any(target_arch = "x86_64", target_arch = "aarch64")
))]
pub mod native;

use std::path::PathBuf;

pub use api::NativeApi;
pub use error::LoadError;
pub use types::*;

/// Which implementation of the toolkit ABI to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// The system GTK3 library.
    Native,
    /// The in-process implementation.
    Headless,
}

impl Backend {
    /// The backend used when no configuration says otherwise.
    ///
    /// Native where the architecture has a native backend compiled in,
    /// headless everywhere else.
    pub const fn platform_default() -> Self {
        if native_supported() {
            Self::Native
        } else {
            Self::Headless
        }
    }

    /// Lower-case name used in configuration files and environment variables.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Headless => "headless",
        }
    }
}

impl std::str::FromStr for Backend {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" | "gtk" | "gtk3" => Ok(Self::Native),
            "headless" | "null" => Ok(Self::Headless),
            other => Err(LoadError::UnknownBackend(other.to_string())),
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for locating the native library.
///
/// Ignored by the headless backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Load exactly this file instead of searching.
    pub library_path: Option<PathBuf>,
    /// Directories searched before the architecture defaults.
    pub search_dirs: Vec<PathBuf>,
}

/// Whether this build carries the native backend.
pub const fn native_supported() -> bool {
    cfg!(all(
        feature = "native",
        unix,
        any(target_arch = "x86_64", target_arch = "aarch64")
    ))
}

/// Load a backend and return its function table.
///
/// Tables are created once per process and live for its remainder. The
/// native library is never unloaded. Loading the native backend a second time
/// returns the table from the first load and ignores `options`.
pub fn load(backend: Backend, options: &LoadOptions) -> Result<&'static NativeApi, LoadError> {
    match backend {
        Backend::Headless => load_headless(),
        Backend::Native => load_native(options),
    }
}

#[cfg(feature = "headless")]
fn load_headless() -> Result<&'static NativeApi, LoadError> {
    static HEADLESS: std::sync::OnceLock<NativeApi> = std::sync::OnceLock::new();
    Ok(HEADLESS.get_or_init(NativeApi::headless))
}

#[cfg(not(feature = "headless"))]
fn load_headless() -> Result<&'static NativeApi, LoadError> {
    Err(LoadError::BackendDisabled(Backend::Headless))
}

#[cfg(all(
    feature = "native",
    unix,
    any(target_arch = "x86_64", target_arch = "aarch64")
))]
fn load_native(options: &LoadOptions) -> Result<&'static NativeApi, LoadError> {
    native::load(options)
}

#[cfg(not(all(
    feature = "native",
    unix,
    any(target_arch = "x86_64", target_arch = "aarch64")
)))]
fn load_native(_options: &LoadOptions) -> Result<&'static NativeApi, LoadError> {
    if cfg!(feature = "native") {
        Err(LoadError::UnsupportedArchitecture(std::env::consts::ARCH))
    } else {
        Err(LoadError::BackendDisabled(Backend::Native))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_str() {
        assert_eq!("native".parse::<Backend>().unwrap(), Backend::Native);
        assert_eq!(" Headless ".parse::<Backend>().unwrap(), Backend::Headless);
        assert!(matches!(
            "cocoa".parse::<Backend>(),
            Err(LoadError::UnknownBackend(name)) if name == "cocoa"
        ));
    }

    #[test]
    fn test_backend_display_round_trip() {
        for backend in [Backend::Native, Backend::Headless] {
            assert_eq!(backend.to_string().parse::<Backend>().unwrap(), backend);
        }
    }

    #[cfg(feature = "headless")]
    #[test]
    fn test_headless_table_is_shared() {
        let a = load(Backend::Headless, &LoadOptions::default()).unwrap();
        let b = load(Backend::Headless, &LoadOptions::default()).unwrap();
        assert!(std::ptr::eq(a, b));
    }
}
