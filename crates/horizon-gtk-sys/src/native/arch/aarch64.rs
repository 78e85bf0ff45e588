//! Library locations for aarch64 Linux and BSD hosts.

/// Multiarch directories searched after any configured directories.
pub const LIBRARY_DIRS: &[&str] = &[
    "/usr/lib/aarch64-linux-gnu",
    "/lib/aarch64-linux-gnu",
    "/usr/lib64",
    "/usr/lib",
    "/usr/local/lib",
];

/// GNU target triplet for diagnostics.
pub const TRIPLET: &str = "aarch64-linux-gnu";
