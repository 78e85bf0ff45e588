//! Value checks and string conversion shared by the facades.
//!
//! Setters validate before calling into the toolkit so that a rejected value
//! never reaches it and the previous value stays in place.

use std::ffi::{CStr, CString, c_char};
use std::path::Path;

use crate::error::PropertyError;

/// Widget margins (`margin-start` and friends).
pub const MARGIN_RANGE: (i32, i32) = (0, 32767);
/// `border-width` of a container.
pub const BORDER_WIDTH_MAX: u32 = 65535;

/// Check `min <= value <= max`.
pub(crate) fn check_range(
    property: &'static str,
    value: i64,
    min: i64,
    max: i64,
) -> Result<(), PropertyError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(PropertyError::OutOfRange {
            property,
            value,
            min,
            max,
        })
    }
}

/// Size requests and default sizes accept `-1` (unset) or any non-negative value.
pub(crate) fn check_size(property: &'static str, value: i32) -> Result<(), PropertyError> {
    check_range(property, value.into(), -1, i32::MAX.into())
}

pub(crate) fn to_cstring(property: &'static str, value: &str) -> Result<CString, PropertyError> {
    CString::new(value).map_err(|_| PropertyError::InteriorNul { property })
}

pub(crate) fn to_optional_cstring(
    property: &'static str,
    value: Option<&str>,
) -> Result<Option<CString>, PropertyError> {
    value.map(|v| to_cstring(property, v)).transpose()
}

pub(crate) fn path_to_cstring(property: &'static str, path: &Path) -> Result<CString, PropertyError> {
    let text = path.to_str().ok_or_else(|| PropertyError::NonUtf8Path {
        property,
        path: path.to_path_buf(),
    })?;
    to_cstring(property, text)
}

/// Pointer for an optional C string argument.
pub(crate) fn opt_ptr(value: &Option<CString>) -> *const c_char {
    value.as_deref().map_or(std::ptr::null(), CStr::as_ptr)
}

/// Copy a toolkit-owned string.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string valid for the call.
pub(crate) unsafe fn from_glib_none(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        // SAFETY: forwarded to the caller.
        Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
    }
}

/// Take ownership of a string the caller must free, copy it and free it.
///
/// # Safety
///
/// `ptr` must be null or a string allocated by the toolkit for the caller.
pub(crate) unsafe fn from_glib_full(ptr: *mut c_char) -> Option<String> {
    // SAFETY: forwarded to the caller.
    let value = unsafe { from_glib_none(ptr) };
    if !ptr.is_null() {
        // SAFETY: ownership was transferred to us.
        unsafe { (crate::toolkit::api().g_free)(ptr.cast()) };
    }
    value
}
