//! Typed GTK3 facades for Horizon GTK.
//!
//! This crate wraps the raw toolkit ABI from `horizon-gtk-sys` in:
//!
//! - **Facades**: one type per toolkit class ([`Widget`], [`Container`],
//!   [`Window`], [`Button`], [`Label`], [`Box`], ...) with the class
//!   hierarchy expressed through [`IsA`](handle::IsA) and extension traits.
//! - **Handles**: [`Owned`] holds a strong reference and releases it once;
//!   [`Borrowed`] is a view with no release at all.
//! - **Signal bridge**: Rust closures as signal handlers, with
//!   [`SubscriptionToken`]s and [`SignalGuard`]s to disconnect them.
//! - **Backends**: the system `libgtk-3` or an in-process headless
//!   implementation, chosen through [`ToolkitConfig`].
//!
//! Every toolkit call must happen on the thread that ran
//! [`Toolkit::init`]; facades and handles are neither `Send` nor `Sync`.
//!
//! # Example
//!
//! ```
//! use horizon_gtk::prelude::*;
//! use horizon_gtk::{
//!     Application, ApplicationFlags, Button, Orientation, Toolkit, ToolkitConfig, Window,
//!     WindowType,
//! };
//!
//! # fn main() -> Result<(), horizon_gtk::Error> {
//! let _toolkit = Toolkit::init(&ToolkitConfig::headless())?;
//! let app = Application::new("org.example.Hello", ApplicationFlags::NON_UNIQUE);
//!
//! app.connect_activate(|app| {
//!     let window = Window::new(WindowType::Toplevel);
//!     window.set_title("Hello").unwrap();
//!     window.set_application(Some(app));
//!
//!     let column = horizon_gtk::Box::new(Orientation::Vertical, 6).unwrap();
//!     let button = Button::with_label("Quit").unwrap();
//!     let window_handle = window.clone();
//!     button
//!         .connect_clicked(move |_| window_handle.close())
//!         .unwrap();
//!     column.add(&*button);
//!     window.add(&*column);
//!     window.show_all();
//!     button.clicked();
//! })?;
//!
//! assert_eq!(app.run(), 0);
//! # Ok(())
//! # }
//! ```

pub mod accel_map;
mod application;
mod config;
mod enums;
mod error;
pub mod handle;
pub mod logging;
mod object;
pub mod prelude;
pub mod property;
pub mod signal;
mod thread_check;
mod toolkit;
mod widget;

pub use horizon_gtk_sys as ffi;
pub use horizon_gtk_sys::{Backend, LoadError};

pub use accel_map::{AccelKey, AccelMap};
pub use application::Application;
pub use config::{ENV_BACKEND, ENV_LIBRARY, ENV_SEARCH_PATH, ToolkitConfig};
pub use enums::{ApplicationFlags, ImageType, ModifierType, Orientation, SizeGroupMode, WindowType};
pub use error::{ConfigError, Error, PropertyError, Result, SignalError};
pub use handle::{Borrowed, Owned, WidgetList, WidgetSList};
pub use object::Object;
pub use signal::{ConnectFlags, Propagation, SignalGuard, SubscriptionToken};
pub use thread_check::{ThreadAffinity, are_thread_checks_enabled, native_thread_id, set_thread_checks_enabled};
pub use toolkit::Toolkit;
pub use widget::{Bin, Box, Button, Container, Image, Label, MenuItem, SizeGroup, Widget, Window};
