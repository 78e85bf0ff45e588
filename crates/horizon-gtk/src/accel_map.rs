//! The toolkit-wide table of keyboard accelerators.
//!
//! Entries are keyed by accelerator paths of the form
//! `<WindowName>/Category/Action`. The table can be saved to and loaded from
//! the toolkit's accelerator rc format:
//!
//! ```text
//! ; horizon-gtk accelerator map
//! (gtk_accel_path "<Editor>/File/Save" "<Primary>s")
//! ```

use std::ffi::CString;
use std::path::Path;

use horizon_gtk_sys::{self as ffi, GFALSE};

use crate::enums::ModifierType;
use crate::error::PropertyError;
use crate::property;
use crate::toolkit::api;

/// A key with modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccelKey {
    /// Key value (keysym), such as `'s' as u32` or `0xffbe` for F1.
    pub key: u32,
    pub mods: ModifierType,
}

/// Access to the accelerator table.
#[derive(Debug)]
pub struct AccelMap(());

impl AccelMap {
    /// Register `path` with a default accelerator.
    ///
    /// An existing entry for `path` is left unchanged.
    pub fn add_entry(path: &str, key: u32, mods: ModifierType) -> Result<(), PropertyError> {
        let path = accel_path(path)?;
        // SAFETY: `path` is a valid NUL-terminated accelerator path.
        unsafe { (api().gtk_accel_map_add_entry)(path.as_ptr(), key, mods.bits()) };
        Ok(())
    }

    /// The accelerator registered for `path`, if any.
    pub fn lookup_entry(path: &str) -> Result<Option<AccelKey>, PropertyError> {
        let path = accel_path(path)?;
        let mut key = ffi::GtkAccelKey::default();
        // SAFETY: `path` is NUL-terminated and `key` is writable.
        let found = unsafe { (api().gtk_accel_map_lookup_entry)(path.as_ptr(), &mut key) };
        Ok((found != GFALSE).then(|| AccelKey {
            key: key.accel_key,
            mods: ModifierType::from_bits_truncate(key.accel_mods),
        }))
    }

    /// Merge entries from an accelerator rc file.
    ///
    /// A missing file is not an error. Unreadable files and malformed lines
    /// are reported as toolkit warnings.
    pub fn load(file: impl AsRef<Path>) -> Result<(), PropertyError> {
        let file = property::path_to_cstring("file", file.as_ref())?;
        // SAFETY: `file` is NUL-terminated.
        unsafe { (api().gtk_accel_map_load)(file.as_ptr()) };
        Ok(())
    }

    /// Write every entry to an accelerator rc file.
    ///
    /// Write failures are reported as toolkit warnings.
    pub fn save(file: impl AsRef<Path>) -> Result<(), PropertyError> {
        let file = property::path_to_cstring("file", file.as_ref())?;
        // SAFETY: `file` is NUL-terminated.
        unsafe { (api().gtk_accel_map_save)(file.as_ptr()) };
        Ok(())
    }
}

/// Whether `path` has the form `<Name>/rest`.
pub fn is_valid_accel_path(path: &str) -> bool {
    path.starts_with('<')
        && path
            .find(">/")
            .is_some_and(|end| end > 1 && end + 2 < path.len())
}

fn accel_path(path: &str) -> Result<CString, PropertyError> {
    if !is_valid_accel_path(path) {
        return Err(PropertyError::InvalidAccelPath(path.to_owned()));
    }
    CString::new(path).map_err(|_| PropertyError::InvalidAccelPath(path.to_owned()))
}
