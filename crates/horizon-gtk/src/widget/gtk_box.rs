use horizon_gtk_sys::{self as ffi, GFALSE};

use crate::enums::Orientation;
use crate::error::PropertyError;
use crate::handle::{self, IsA, Owned, facade};
use crate::property;
use crate::toolkit::api;
use crate::widget::base::raw;
use crate::{Container, Object, Widget};

facade! {
    /// Lays children out in a row or column (`GtkBox`).
    pub struct Box(ffi::GtkBox);
    type_name = "GtkBox";
    static_type = (api().gtk_box_get_type)();
    is_a = [Object, Widget, Container];
}

fn check_spacing(spacing: i32) -> Result<(), PropertyError> {
    property::check_range("spacing", spacing.into(), 0, i32::MAX.into())
}

impl Box {
    /// # Errors
    ///
    /// [`PropertyError::OutOfRange`] for negative `spacing`.
    pub fn new(orientation: Orientation, spacing: i32) -> Result<Owned<Self>, PropertyError> {
        check_spacing(spacing)?;
        // SAFETY: the new box's floating reference is ours.
        Ok(unsafe {
            handle::construct::<Self>(
                (api().gtk_box_new)(orientation.into_glib(), spacing).cast(),
                "gtk_box_new",
            )
        })
    }

    /// Pixels between children.
    pub fn set_spacing(&self, spacing: i32) -> Result<(), PropertyError> {
        check_spacing(spacing)?;
        // SAFETY: the box is live for the call.
        unsafe { (api().gtk_box_set_spacing)(self.ptr.as_ptr(), spacing) };
        Ok(())
    }

    pub fn spacing(&self) -> i32 {
        // SAFETY: the box is live for the call.
        unsafe { (api().gtk_box_get_spacing)(self.ptr.as_ptr()) }
    }

    /// Whether every child gets the same size.
    pub fn set_homogeneous(&self, homogeneous: bool) {
        // SAFETY: the box is live for the call.
        unsafe { (api().gtk_box_set_homogeneous)(self.ptr.as_ptr(), homogeneous.into()) }
    }

    pub fn is_homogeneous(&self) -> bool {
        // SAFETY: the box is live for the call.
        unsafe { (api().gtk_box_get_homogeneous)(self.ptr.as_ptr()) != GFALSE }
    }

    /// Append `child` with packing options.
    ///
    /// Takes a reference like [`ContainerExt::add`](crate::prelude::ContainerExt::add)
    /// but does not emit `add`.
    pub fn pack_start(&self, child: &impl IsA<Widget>, expand: bool, fill: bool, padding: u32) {
        // SAFETY: both instances are live for the call.
        unsafe {
            (api().gtk_box_pack_start)(self.ptr.as_ptr(), raw(child), expand.into(), fill.into(), padding)
        }
    }
}

#[cfg(all(test, feature = "headless"))]
mod tests {
    use super::*;
    use crate::prelude::*;
    use crate::{Button, Toolkit, ToolkitConfig};

    #[test]
    fn test_spacing_rejects_negative() {
        let _tk = Toolkit::init(&ToolkitConfig::headless()).unwrap();
        assert!(Box::new(Orientation::Vertical, -1).is_err());
        let row = Box::new(Orientation::Horizontal, 3).unwrap();
        assert_eq!(row.spacing(), 3);
        assert!(row.set_spacing(-4).is_err());
        row.set_spacing(8).unwrap();
        assert_eq!(row.spacing(), 8);
        row.set_homogeneous(true);
        assert!(row.is_homogeneous());
    }

    #[test]
    fn test_pack_start_appends_in_order() {
        let _tk = Toolkit::init(&ToolkitConfig::headless()).unwrap();
        let column = Box::new(Orientation::Vertical, 0).unwrap();
        let first = Button::with_label("first").unwrap();
        let second = Button::with_label("second").unwrap();
        column.pack_start(&*first, true, true, 4);
        column.add(&*second);
        let labels: Vec<_> = column
            .children()
            .iter()
            .map(|w| w.downcast_ref::<Button>().and_then(|b| b.label()))
            .collect();
        assert_eq!(labels, [Some("first".into()), Some("second".into())]);
    }
}
