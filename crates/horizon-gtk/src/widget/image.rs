use std::path::Path;

use horizon_gtk_sys as ffi;

use crate::enums::ImageType;
use crate::error::PropertyError;
use crate::handle::{self, Owned, facade};
use crate::property;
use crate::toolkit::api;
use crate::{Object, Widget};

facade! {
    /// Displays a picture or icon (`GtkImage`).
    pub struct Image(ffi::GtkImage);
    type_name = "GtkImage";
    static_type = (api().gtk_image_get_type)();
    is_a = [Object, Widget];
}

impl Image {
    /// An empty image.
    pub fn new() -> Owned<Self> {
        // SAFETY: the new image's floating reference is ours.
        unsafe { handle::construct::<Self>((api().gtk_image_new)().cast(), "gtk_image_new") }
    }

    /// An image loaded from `path`.
    ///
    /// A file that cannot be loaded shows the "broken image" icon rather than
    /// failing.
    ///
    /// # Errors
    ///
    /// [`PropertyError::NonUtf8Path`] or [`PropertyError::InteriorNul`] if
    /// the path cannot be passed to the toolkit.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Owned<Self>, PropertyError> {
        let path = property::path_to_cstring("file", path.as_ref())?;
        // SAFETY: the new image's floating reference is ours.
        Ok(unsafe {
            handle::construct::<Self>(
                (api().gtk_image_new_from_file)(path.as_ptr()).cast(),
                "gtk_image_new_from_file",
            )
        })
    }

    /// Replace the contents with the file at `path`.
    pub fn set_from_file(&self, path: impl AsRef<Path>) -> Result<(), PropertyError> {
        let path = property::path_to_cstring("file", path.as_ref())?;
        // SAFETY: the image is live; the toolkit copies the string.
        unsafe { (api().gtk_image_set_from_file)(self.ptr.as_ptr(), path.as_ptr()) };
        Ok(())
    }

    /// Reset to empty.
    pub fn clear(&self) {
        // SAFETY: the image is live for the call.
        unsafe { (api().gtk_image_clear)(self.ptr.as_ptr()) }
    }

    pub fn storage_type(&self) -> ImageType {
        // SAFETY: the image is live for the call.
        ImageType::from_glib(unsafe { (api().gtk_image_get_storage_type)(self.ptr.as_ptr()) })
    }
}
