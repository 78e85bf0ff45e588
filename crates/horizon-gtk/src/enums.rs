//! Toolkit enumerations and flag sets.

use bitflags::bitflags;
use horizon_gtk_sys as ffi;

/// Kind of window (`GtkWindowType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WindowType {
    /// A regular window managed by the window manager.
    #[default]
    Toplevel,
    /// An undecorated window for menus and tooltips.
    Popup,
}

impl WindowType {
    pub(crate) fn into_glib(self) -> ffi::GtkWindowType {
        match self {
            Self::Toplevel => ffi::GTK_WINDOW_TOPLEVEL,
            Self::Popup => ffi::GTK_WINDOW_POPUP,
        }
    }
}

/// Layout direction (`GtkOrientation`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub(crate) fn into_glib(self) -> ffi::GtkOrientation {
        match self {
            Self::Horizontal => ffi::GTK_ORIENTATION_HORIZONTAL,
            Self::Vertical => ffi::GTK_ORIENTATION_VERTICAL,
        }
    }
}

/// Dimensions a size group equalises (`GtkSizeGroupMode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeGroupMode {
    None,
    Horizontal,
    Vertical,
    Both,
}

impl SizeGroupMode {
    pub(crate) fn into_glib(self) -> ffi::GtkSizeGroupMode {
        match self {
            Self::None => ffi::GTK_SIZE_GROUP_NONE,
            Self::Horizontal => ffi::GTK_SIZE_GROUP_HORIZONTAL,
            Self::Vertical => ffi::GTK_SIZE_GROUP_VERTICAL,
            Self::Both => ffi::GTK_SIZE_GROUP_BOTH,
        }
    }

    pub(crate) fn from_glib(value: ffi::GtkSizeGroupMode) -> Self {
        match value {
            ffi::GTK_SIZE_GROUP_HORIZONTAL => Self::Horizontal,
            ffi::GTK_SIZE_GROUP_VERTICAL => Self::Vertical,
            ffi::GTK_SIZE_GROUP_BOTH => Self::Both,
            _ => Self::None,
        }
    }
}

/// What an image is currently showing (`GtkImageType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageType {
    Empty,
    Pixbuf,
    Stock,
    IconSet,
    Animation,
    IconName,
    GIcon,
    Surface,
    /// A value added by a newer toolkit.
    Unknown(i32),
}

impl ImageType {
    pub(crate) fn from_glib(value: ffi::GtkImageType) -> Self {
        match value {
            ffi::GTK_IMAGE_EMPTY => Self::Empty,
            ffi::GTK_IMAGE_PIXBUF => Self::Pixbuf,
            ffi::GTK_IMAGE_STOCK => Self::Stock,
            ffi::GTK_IMAGE_ICON_SET => Self::IconSet,
            ffi::GTK_IMAGE_ANIMATION => Self::Animation,
            ffi::GTK_IMAGE_ICON_NAME => Self::IconName,
            ffi::GTK_IMAGE_GICON => Self::GIcon,
            ffi::GTK_IMAGE_SURFACE => Self::Surface,
            other => Self::Unknown(other),
        }
    }
}

bitflags! {
    /// Application behaviour flags (`GApplicationFlags`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ApplicationFlags: u32 {
        const IS_SERVICE = ffi::G_APPLICATION_IS_SERVICE;
        const IS_LAUNCHER = ffi::G_APPLICATION_IS_LAUNCHER;
        const HANDLES_OPEN = ffi::G_APPLICATION_HANDLES_OPEN;
        const HANDLES_COMMAND_LINE = ffi::G_APPLICATION_HANDLES_COMMAND_LINE;
        const SEND_ENVIRONMENT = ffi::G_APPLICATION_SEND_ENVIRONMENT;
        /// Skip single-instance registration.
        const NON_UNIQUE = ffi::G_APPLICATION_NON_UNIQUE;
    }
}

bitflags! {
    /// Keyboard modifiers (`GdkModifierType`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ModifierType: u32 {
        const SHIFT = ffi::GDK_SHIFT_MASK;
        const LOCK = ffi::GDK_LOCK_MASK;
        const CONTROL = ffi::GDK_CONTROL_MASK;
        /// Usually Alt.
        const MOD1 = ffi::GDK_MOD1_MASK;
        const SUPER = ffi::GDK_SUPER_MASK;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_type_round_trips_known_values() {
        assert_eq!(ImageType::from_glib(ffi::GTK_IMAGE_ICON_NAME), ImageType::IconName);
        assert_eq!(ImageType::from_glib(42), ImageType::Unknown(42));
    }

    #[test]
    fn test_size_group_mode_values() {
        for mode in [
            SizeGroupMode::None,
            SizeGroupMode::Horizontal,
            SizeGroupMode::Vertical,
            SizeGroupMode::Both,
        ] {
            assert_eq!(SizeGroupMode::from_glib(mode.into_glib()), mode);
        }
    }

    #[test]
    fn test_flag_bits_match_toolkit() {
        assert_eq!(ApplicationFlags::NON_UNIQUE.bits(), 32);
        assert_eq!(ModifierType::SUPER.bits(), 1 << 26);
        assert_eq!((ModifierType::CONTROL | ModifierType::SHIFT).bits(), 5);
    }
}
