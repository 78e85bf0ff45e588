//! Library locations for x86_64 Linux and BSD hosts.

/// Multiarch directories searched after any configured directories.
pub const LIBRARY_DIRS: &[&str] = &[
    "/usr/lib/x86_64-linux-gnu",
    "/lib/x86_64-linux-gnu",
    "/usr/lib64",
    "/usr/local/lib64",
    "/usr/lib",
    "/usr/local/lib",
];

/// GNU target triplet for diagnostics.
pub const TRIPLET: &str = "x86_64-linux-gnu";
