//! Backend loading errors.

use std::path::PathBuf;

use crate::Backend;

/// Errors raised while loading a toolkit backend.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// No candidate library file could be opened.
    #[error("could not load the toolkit library (tried {})", format_paths(.tried))]
    LibraryNotFound {
        /// Every path that was attempted, in order.
        tried: Vec<PathBuf>,
    },

    /// A library was opened but failed to load.
    #[error("failed to load '{}': {message}", .path.display())]
    Open { path: PathBuf, message: String },

    /// A required symbol is missing from the loaded library.
    #[error("symbol '{symbol}' not found in '{}'", .path.display())]
    MissingSymbol { symbol: String, path: PathBuf },

    /// The native backend is not available on this architecture.
    #[error("no native backend for architecture '{0}'")]
    UnsupportedArchitecture(&'static str),

    /// The backend was compiled out.
    #[error("the {0} backend is disabled in this build")]
    BackendDisabled(Backend),

    /// A backend name did not match any known backend.
    #[error("unknown backend '{0}' (expected 'native' or 'headless')")]
    UnknownBackend(String),
}

fn format_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "nothing".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
