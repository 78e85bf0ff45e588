use horizon_gtk_sys as ffi;

use crate::handle::{Cast, IsA, ObjectType, Owned, facade};
use crate::toolkit::api;
use crate::{Container, Object, Widget};

facade! {
    /// A container with at most one child (`GtkBin`).
    pub struct Bin(ffi::GtkBin);
    type_name = "GtkBin";
    static_type = (api().gtk_bin_get_type)();
    is_a = [Object, Widget, Container];
}

pub trait BinExt: IsA<Bin> {
    /// The single child, if any.
    fn child(&self) -> Option<Owned<Widget>> {
        // SAFETY: the bin is live; its child is live while attached.
        unsafe { Owned::from_raw_none((api().gtk_bin_get_child)(self.upcast_ref::<Bin>().as_ptr())) }
    }
}

impl<T: IsA<Bin>> BinExt for T {}
