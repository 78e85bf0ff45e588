//! Widget facades.
//!
//! Each facade is a typed view of one toolkit class. Operations shared down
//! the hierarchy live in extension traits (`WidgetExt`, `ContainerExt`,
//! `BinExt`, `WindowExt`, `ButtonExt`) implemented for every subclass, so
//! `Button` gets `show`, `add` and `child` without casting. Leaf classes
//! carry their operations as inherent methods.

pub(crate) mod base;
mod bin;
mod button;
mod container;
mod gtk_box;
mod image;
mod label;
mod menu_item;
mod size_group;
mod window;

pub use base::{Widget, WidgetExt};
pub use bin::{Bin, BinExt};
pub use button::{Button, ButtonExt};
pub use container::{Container, ContainerExt};
pub use gtk_box::Box;
pub use image::Image;
pub use label::Label;
pub use menu_item::MenuItem;
pub use size_group::SizeGroup;
pub use window::{Window, WindowExt};
