//! Error types for Horizon GTK.

use std::path::PathBuf;
use std::thread::ThreadId;

use horizon_gtk_sys::{Backend, LoadError};

/// The main error type for Horizon GTK operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The backend library could not be loaded.
    #[error("failed to load the toolkit: {0}")]
    Load(#[from] LoadError),

    /// `gtk_init_check` reported failure (typically: no display).
    #[error("the {backend} toolkit failed to initialise")]
    InitFailed {
        /// Backend that refused to initialise.
        backend: Backend,
    },

    /// The toolkit is already initialised on this thread with another backend.
    #[error("toolkit already initialised on this thread with the {current} backend")]
    AlreadyInitialized {
        /// Backend bound to this thread.
        current: Backend,
    },

    /// The native toolkit belongs to another thread.
    #[error("the native toolkit is bound to thread {owner:?}; it cannot be used from another thread")]
    WrongThread {
        /// Thread that initialised the native toolkit.
        owner: ThreadId,
    },

    /// Property-related error.
    #[error(transparent)]
    Property(#[from] PropertyError),

    /// Signal-related error.
    #[error(transparent)]
    Signal(#[from] SignalError),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised by property setters and string-taking constructors.
///
/// A setter that fails leaves the previous value in place.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropertyError {
    /// A numeric value outside the property's accepted range.
    #[error("value {value} is out of range for '{property}' (expected {min}..={max})")]
    OutOfRange {
        /// Property name.
        property: &'static str,
        /// Rejected value.
        value: i64,
        /// Smallest accepted value.
        min: i64,
        /// Largest accepted value.
        max: i64,
    },

    /// A string containing a NUL byte, which cannot cross the C ABI.
    #[error("'{property}' contains an interior NUL byte")]
    InteriorNul {
        /// Property name.
        property: &'static str,
    },

    /// A path that is not valid UTF-8.
    #[error("'{property}' path is not valid UTF-8: {}", .path.display())]
    NonUtf8Path {
        /// Property name.
        property: &'static str,
        /// Rejected path.
        path: PathBuf,
    },

    /// An accelerator path that does not look like `<Window>/Category/Action`.
    #[error("'{0}' is not a valid accelerator path")]
    InvalidAccelPath(String),
}

/// Signal connection errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignalError {
    /// The toolkit refused the connection (unknown signal, bad instance or
    /// malformed name). The toolkit logs the cause.
    #[error("the toolkit rejected a connection to '{signal}'")]
    Rejected {
        /// Detailed signal name that was requested.
        signal: String,
    },

    /// The signal name is empty or contains an interior NUL byte.
    #[error("invalid signal name {0:?}")]
    InvalidName(String),
}

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file '{}'", .path.display())]
    Io {
        /// File that was read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid TOML or has unknown fields.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// An environment variable names an unknown backend.
    #[error("invalid value for {variable}: {source}")]
    Env {
        /// Variable name.
        variable: &'static str,
        /// Parse failure.
        #[source]
        source: LoadError,
    },
}

/// A specialized Result type for Horizon GTK operations.
pub type Result<T> = std::result::Result<T, Error>;
