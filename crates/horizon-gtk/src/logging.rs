//! Logging and debugging facilities for Horizon GTK.
//!
//! # Tracing Integration
//!
//! Horizon GTK uses the `tracing` crate for instrumentation: toolkit
//! initialisation, signal connection and handle lifetimes are logged under
//! the [`targets`] below, and native toolkit warnings from the headless
//! backend are logged under [`targets::HEADLESS`]. Install a subscriber to
//! see them:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_gtk=debug,horizon_gtk::handle=trace")
//!     .init();
//! ```
//!
//! # Debug Visualization
//!
//! [`WidgetTreeDebug`] renders a widget and its container children:
//!
//! ```ignore
//! use horizon_gtk::logging::WidgetTreeDebug;
//!
//! println!("{}", WidgetTreeDebug::new().format_subtree(&window));
//! ```

use std::fmt::Write as FmtWrite;

use crate::handle::{Cast, IsA, ObjectType};
use crate::prelude::*;
use crate::{Container, Widget};

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Toolkit initialisation and backend binding.
    pub const TOOLKIT: &str = "horizon_gtk::toolkit";
    /// Signal connection and disconnection.
    pub const SIGNAL: &str = "horizon_gtk::signal";
    /// Handle adoption and release.
    pub const HANDLE: &str = "horizon_gtk::handle";
    /// Native warnings from the in-process backend.
    pub const HEADLESS: &str = "horizon_gtk_sys::headless";
    /// Library loading for the native backend.
    pub const NATIVE: &str = "horizon_gtk_sys::native";
}

/// Style options for widget tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact single-line representation.
    Compact,
}

/// Configuration for widget tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    pub style: TreeStyle,
    /// Whether to show instance addresses.
    pub show_addresses: bool,
    /// Whether to show toolkit type names.
    pub show_types: bool,
    /// Whether to mark hidden widgets.
    pub show_visibility: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_addresses: false,
            show_types: true,
            show_visibility: true,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Options for detailed debugging output.
    pub fn detailed() -> Self {
        Self {
            show_addresses: true,
            ..Default::default()
        }
    }

    /// Names only.
    pub fn minimal() -> Self {
        Self {
            show_types: false,
            show_visibility: false,
            ..Default::default()
        }
    }
}

/// Renders a widget hierarchy as text.
#[derive(Debug, Clone, Default)]
pub struct WidgetTreeDebug {
    options: TreeFormatOptions,
}

impl WidgetTreeDebug {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format `root` and every container child below it.
    pub fn format_subtree(&self, root: &impl IsA<Widget>) -> String {
        let mut output = String::new();
        self.format_into(root.upcast_ref(), 0, true, &mut Vec::new(), &mut output);
        output
    }

    /// `rails[i]` records whether the ancestor at depth `i + 1` was the last
    /// of its siblings.
    fn format_into(&self, widget: &Widget, depth: usize, is_last: bool, rails: &mut Vec<bool>, output: &mut String) {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return;
        }

        output.push_str(&self.build_prefix(depth, is_last, rails));

        let name = widget.name();
        output.push_str(if name.is_empty() { "(unnamed)" } else { &name });

        if self.options.show_addresses {
            let _ = write!(output, " [{:p}]", widget.as_ptr());
        }
        if self.options.show_types {
            let _ = write!(output, " ({})", widget.type_name());
        }
        if self.options.show_visibility && !widget.is_visible() {
            output.push_str(" hidden");
        }
        output.push('\n');

        let Some(container) = widget.downcast_ref::<Container>() else {
            return;
        };
        let children = container.children();
        let count = children.len();
        if depth > 0 {
            rails.push(is_last);
        }
        for (i, child) in children.iter().enumerate() {
            self.format_into(&child, depth + 1, i + 1 == count, rails, output);
        }
        if depth > 0 {
            rails.pop();
        }
    }

    fn build_prefix(&self, depth: usize, is_last: bool, rails: &[bool]) -> String {
        if depth == 0 {
            return String::new();
        }

        let (branch, corner, last) = match self.options.style {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500}", "\u{2514}\u{2500}\u{2500}"),
            TreeStyle::Compact => ("", "-", "-"),
        };

        let mut prefix = String::new();
        for &ancestor_was_last in rails {
            if ancestor_was_last {
                prefix.extend(std::iter::repeat_n(' ', branch.chars().count()));
            } else {
                prefix.push_str(branch);
            }
            prefix.extend(std::iter::repeat_n(' ', self.options.indent_size));
        }
        prefix.push_str(if is_last { last } else { corner });
        prefix.push(' ');
        prefix
    }
}
