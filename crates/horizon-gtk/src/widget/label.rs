use horizon_gtk_sys::{self as ffi, GFALSE};

use crate::error::PropertyError;
use crate::handle::{self, Owned, facade};
use crate::property;
use crate::toolkit::api;
use crate::{Object, Widget};

facade! {
    /// Read-only text (`GtkLabel`).
    pub struct Label(ffi::GtkLabel);
    type_name = "GtkLabel";
    static_type = (api().gtk_label_get_type)();
    is_a = [Object, Widget];
}

impl Label {
    pub fn new(text: &str) -> Result<Owned<Self>, PropertyError> {
        let text = property::to_cstring("label", text)?;
        // SAFETY: the new label's floating reference is ours.
        Ok(unsafe { handle::construct::<Self>((api().gtk_label_new)(text.as_ptr()).cast(), "gtk_label_new") })
    }

    pub fn set_text(&self, text: &str) -> Result<(), PropertyError> {
        let text = property::to_cstring("label", text)?;
        // SAFETY: the label is live; the toolkit copies the string.
        unsafe { (api().gtk_label_set_text)(self.ptr.as_ptr(), text.as_ptr()) };
        Ok(())
    }

    pub fn text(&self) -> String {
        // SAFETY: the label is live; the string is owned by the label.
        unsafe { property::from_glib_none((api().gtk_label_get_text)(self.ptr.as_ptr())) }.unwrap_or_default()
    }

    /// Whether the user can select and copy the text.
    pub fn set_selectable(&self, selectable: bool) {
        // SAFETY: the label is live for the call.
        unsafe { (api().gtk_label_set_selectable)(self.ptr.as_ptr(), selectable.into()) }
    }

    pub fn is_selectable(&self) -> bool {
        // SAFETY: the label is live for the call.
        unsafe { (api().gtk_label_get_selectable)(self.ptr.as_ptr()) != GFALSE }
    }
}

#[cfg(all(test, feature = "headless"))]
mod tests {
    use super::*;
    use crate::{Toolkit, ToolkitConfig};

    #[test]
    fn test_text_and_selectable() {
        let _tk = Toolkit::init(&ToolkitConfig::headless()).unwrap();
        let label = Label::new("Name:").unwrap();
        assert_eq!(label.text(), "Name:");
        label.set_text("").unwrap();
        assert_eq!(label.text(), "");
        assert!(label.set_text("x\0y").is_err());
        assert!(!label.is_selectable());
        label.set_selectable(true);
        assert!(label.is_selectable());
    }
}
