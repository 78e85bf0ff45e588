//! Traits needed to call facade methods.
//!
//! ```
//! use horizon_gtk::prelude::*;
//! ```

pub use crate::handle::{Cast, IsA, ObjectType};
pub use crate::object::ObjectExt;
pub use crate::widget::{BinExt, ButtonExt, ContainerExt, WidgetExt, WindowExt};
