//! Toolkit configuration and builder.
//!
//! [`ToolkitConfig`] chooses the backend and tells the native backend where
//! to find `libgtk-3`. It can be built in code, read from a TOML file or
//! taken from the environment:
//!
//! ```toml
//! backend = "native"
//! library_path = "/opt/gtk/lib/libgtk-3.so.0"
//! search_dirs = ["/opt/gtk/lib"]
//! thread_checks = true
//! ```

use std::path::{Path, PathBuf};

use horizon_gtk_sys::{Backend, LoadOptions};
use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;

/// Environment variable naming the backend (`native` or `headless`).
pub const ENV_BACKEND: &str = "HORIZON_GTK_BACKEND";
/// Environment variable with an explicit toolkit library path.
pub const ENV_LIBRARY: &str = "HORIZON_GTK_LIBRARY";
/// Environment variable with extra library directories, in `PATH` syntax.
pub const ENV_SEARCH_PATH: &str = "HORIZON_GTK_SEARCH_PATH";

/// Configuration for [`Toolkit::init`](crate::Toolkit::init).
///
/// # Example
///
/// ```
/// use horizon_gtk::{Backend, ToolkitConfig};
///
/// let config = ToolkitConfig::new()
///     .with_backend(Backend::Native)
///     .with_search_dir("/opt/gtk/lib")
///     .with_thread_checks(true);
/// assert_eq!(config.backend(), Backend::Native);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolkitConfig {
    /// Backend to load.
    #[serde(deserialize_with = "deserialize_backend")]
    backend: Backend,
    /// Explicit library file (native only).
    library_path: Option<PathBuf>,
    /// Directories searched before the architecture defaults (native only).
    search_dirs: Vec<PathBuf>,
    /// Override for handle affinity checks; `None` keeps the build default.
    thread_checks: Option<bool>,
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self {
            backend: Backend::platform_default(),
            library_path: None,
            search_dirs: Vec::new(),
            thread_checks: None,
        }
    }
}

fn deserialize_backend<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Backend, D::Error> {
    let name = String::deserialize(deserializer)?;
    name.parse().map_err(serde::de::Error::custom)
}

impl ToolkitConfig {
    /// The platform default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration for the in-process backend.
    pub fn headless() -> Self {
        Self::new().with_backend(Backend::Headless)
    }

    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Defaults overridden by `HORIZON_GTK_BACKEND`, `HORIZON_GTK_LIBRARY`
    /// and `HORIZON_GTK_SEARCH_PATH`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var_os(key).map(|v| v.to_string_lossy().into_owned()))
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(backend) = lookup(ENV_BACKEND).filter(|v| !v.trim().is_empty()) {
            config.backend = backend.parse().map_err(|source| ConfigError::Env {
                variable: ENV_BACKEND,
                source,
            })?;
        }
        if let Some(path) = lookup(ENV_LIBRARY).filter(|v| !v.is_empty()) {
            config.library_path = Some(PathBuf::from(path));
        }
        if let Some(dirs) = lookup(ENV_SEARCH_PATH) {
            config.search_dirs = std::env::split_paths(&dirs)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
        }
        Ok(config)
    }

    /// Set the backend.
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Load exactly this library file instead of searching.
    pub fn with_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.library_path = Some(path.into());
        self
    }

    /// Add a directory searched before the architecture defaults.
    pub fn with_search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dirs.push(dir.into());
        self
    }

    /// Force handle affinity checks on or off.
    pub fn with_thread_checks(mut self, enabled: bool) -> Self {
        self.thread_checks = Some(enabled);
        self
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn library_path(&self) -> Option<&Path> {
        self.library_path.as_deref()
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    pub fn thread_checks(&self) -> Option<bool> {
        self.thread_checks
    }

    pub(crate) fn load_options(&self) -> LoadOptions {
        LoadOptions {
            library_path: self.library_path.clone(),
            search_dirs: self.search_dirs.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_toml_defaults() {
        let config = ToolkitConfig::from_toml_str("").unwrap();
        assert_eq!(config, ToolkitConfig::default());
    }

    #[test]
    fn test_toml_full() {
        let config = ToolkitConfig::from_toml_str(
            r#"
            backend = "headless"
            library_path = "/opt/gtk/libgtk-3.so.0"
            search_dirs = ["/a", "/b"]
            thread_checks = false
            "#,
        )
        .unwrap();
        assert_eq!(config.backend(), Backend::Headless);
        assert_eq!(config.library_path(), Some(Path::new("/opt/gtk/libgtk-3.so.0")));
        assert_eq!(config.search_dirs(), [PathBuf::from("/a"), PathBuf::from("/b")]);
        assert_eq!(config.thread_checks(), Some(false));
    }

    #[test]
    fn test_toml_rejects_unknown_backend_and_keys() {
        let err = ToolkitConfig::from_toml_str(r#"backend = "cocoa""#).unwrap_err();
        assert!(err.to_string().contains("cocoa"));
        assert!(ToolkitConfig::from_toml_str("colour = 1").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("toolkit.toml");
        std::fs::write(&path, "backend = \"headless\"\n").unwrap();
        assert_eq!(ToolkitConfig::load(&path).unwrap().backend(), Backend::Headless);

        let missing = dir.path().join("missing.toml");
        assert!(matches!(ToolkitConfig::load(&missing), Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_lookup_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_BACKEND, "Headless"),
            (ENV_LIBRARY, "/usr/lib/libgtk-3.so.0"),
        ]
        .into_iter()
        .collect();
        let config = ToolkitConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.backend(), Backend::Headless);
        assert_eq!(config.library_path(), Some(Path::new("/usr/lib/libgtk-3.so.0")));
        assert!(config.search_dirs().is_empty());
    }

    #[test]
    fn test_lookup_rejects_unknown_backend() {
        let result = ToolkitConfig::from_lookup(|k| (k == ENV_BACKEND).then(|| "motif".to_string()));
        assert!(matches!(
            result,
            Err(ConfigError::Env { variable: ENV_BACKEND, .. })
        ));
    }

    #[test]
    fn test_builder_and_load_options() {
        let config = ToolkitConfig::headless()
            .with_library_path("/x/libgtk-3.so.0")
            .with_search_dir("/y");
        let options = config.load_options();
        assert_eq!(options.library_path, Some(PathBuf::from("/x/libgtk-3.so.0")));
        assert_eq!(options.search_dirs, vec![PathBuf::from("/y")]);
    }
}
