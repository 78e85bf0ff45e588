//! Native backend: the system GTK3 library, loaded at run time.
//!
//! Symbols are resolved through the library handle, which also searches the
//! library's own dependencies, so GLib, GObject and GIO entry points resolve
//! through `libgtk-3` without opening those libraries separately.

#[cfg_attr(target_arch = "x86_64", path = "arch/x86_64.rs")]
#[cfg_attr(target_arch = "aarch64", path = "arch/aarch64.rs")]
mod arch;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use libloading::{Library, Symbol};
use parking_lot::Mutex;

use crate::{LoadError, LoadOptions, NativeApi};

pub use arch::{LIBRARY_DIRS, TRIPLET};

/// File names tried in each search directory and then through the dynamic
/// linker's own search path.
#[cfg(target_os = "macos")]
pub const SONAMES: &[&str] = &["libgtk-3.0.dylib", "libgtk-3.dylib"];
#[cfg(not(target_os = "macos"))]
pub const SONAMES: &[&str] = &["libgtk-3.so.0", "libgtk-3.so"];

const TARGET: &str = "horizon_gtk_sys::native";

struct Loaded {
    // Kept alive for the life of the process; `api` points into it.
    _library: NativeLibrary,
    api: NativeApi,
}

static NATIVE: OnceLock<Loaded> = OnceLock::new();
static LOAD_LOCK: Mutex<()> = Mutex::new(());

/// A loaded toolkit library.
pub struct NativeLibrary {
    library: Library,
    path: PathBuf,
}

impl NativeLibrary {
    /// Open a library from an explicit path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        // SAFETY: loading runs the library's initialisers; GTK's are sound to
        // run once per process.
        let library = unsafe { Library::new(path) }.map_err(|e| LoadError::Open {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self {
            library,
            path: path.to_path_buf(),
        })
    }

    /// Find and open the toolkit library.
    ///
    /// An explicit `library_path` is the only candidate when set. Otherwise
    /// each configured directory, then each architecture default directory,
    /// is tried with every soname, and finally the bare sonames are handed to
    /// the dynamic linker.
    pub fn locate(options: &LoadOptions) -> Result<Self, LoadError> {
        let candidates = Self::candidates(options);
        let mut tried = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let is_bare = candidate.parent().is_none_or(|p| p.as_os_str().is_empty());
            if !is_bare && !candidate.exists() {
                tried.push(candidate);
                continue;
            }
            match Self::open(&candidate) {
                Ok(library) => return Ok(library),
                Err(err) => {
                    tracing::debug!(target: TARGET, %err, "candidate rejected");
                    tried.push(candidate);
                }
            }
        }

        Err(LoadError::LibraryNotFound { tried })
    }

    fn candidates(options: &LoadOptions) -> Vec<PathBuf> {
        if let Some(path) = &options.library_path {
            return vec![path.clone()];
        }

        let dirs = options
            .search_dirs
            .iter()
            .cloned()
            .chain(LIBRARY_DIRS.iter().map(PathBuf::from));

        let mut candidates: Vec<PathBuf> = dirs
            .flat_map(|dir| SONAMES.iter().map(move |name| dir.join(name)))
            .collect();
        candidates.extend(SONAMES.iter().map(PathBuf::from));
        candidates
    }

    /// Resolve a function symbol.
    ///
    /// `name` must be NUL-terminated.
    ///
    /// # Safety
    ///
    /// `F` must be a function pointer type matching the symbol's C signature.
    pub unsafe fn function<F: Copy>(&self, name: &str) -> Result<F, LoadError> {
        // SAFETY: forwarded to the caller.
        let symbol: Symbol<'_, F> =
            unsafe { self.library.get(name.as_bytes()) }.map_err(|_| LoadError::MissingSymbol {
                symbol: name.trim_end_matches('\0').to_string(),
                path: self.path.clone(),
            })?;
        Ok(*symbol)
    }

    /// Path the library was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for NativeLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeLibrary")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Load the native backend once per process.
#[tracing::instrument(skip_all, target = "horizon_gtk_sys::native", level = "debug")]
pub(crate) fn load(options: &LoadOptions) -> Result<&'static NativeApi, LoadError> {
    if let Some(loaded) = NATIVE.get() {
        return Ok(&loaded.api);
    }

    let _guard = LOAD_LOCK.lock();
    if let Some(loaded) = NATIVE.get() {
        return Ok(&loaded.api);
    }

    let library = NativeLibrary::locate(options)?;
    let api = NativeApi::resolve(&library)?;
    tracing::info!(
        target: TARGET,
        path = %library.path().display(),
        triplet = TRIPLET,
        symbols = NativeApi::SYMBOLS.len(),
        "loaded toolkit library"
    );

    let loaded = NATIVE.get_or_init(|| Loaded {
        _library: library,
        api,
    });
    Ok(&loaded.api)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_path_is_only_candidate() {
        let options = LoadOptions {
            library_path: Some(PathBuf::from("/opt/gtk/libgtk-3.so.0")),
            search_dirs: vec![PathBuf::from("/ignored")],
        };
        assert_eq!(
            NativeLibrary::candidates(&options),
            vec![PathBuf::from("/opt/gtk/libgtk-3.so.0")]
        );
    }

    #[test]
    fn test_search_dirs_precede_arch_defaults() {
        let options = LoadOptions {
            library_path: None,
            search_dirs: vec![PathBuf::from("/custom")],
        };
        let candidates = NativeLibrary::candidates(&options);
        assert_eq!(candidates[0], PathBuf::from("/custom").join(SONAMES[0]));
        assert_eq!(
            candidates[SONAMES.len()],
            PathBuf::from(LIBRARY_DIRS[0]).join(SONAMES[0])
        );
        // Bare sonames close the list.
        assert_eq!(candidates.last().unwrap(), &PathBuf::from(SONAMES[SONAMES.len() - 1]));
    }

    #[test]
    fn test_missing_explicit_path_reports_it() {
        let options = LoadOptions {
            library_path: Some(PathBuf::from("/definitely/not/here/libgtk-3.so.0")),
            search_dirs: Vec::new(),
        };
        match NativeLibrary::locate(&options) {
            Err(LoadError::LibraryNotFound { tried }) => {
                assert_eq!(tried, vec![PathBuf::from("/definitely/not/here/libgtk-3.so.0")]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_file_that_is_not_a_library() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("libgtk-3.so.0");
        std::fs::write(&path, b"not an ELF object").unwrap();

        assert!(matches!(NativeLibrary::open(&path), Err(LoadError::Open { path: p, .. }) if p == path));

        let options = LoadOptions {
            library_path: Some(path.clone()),
            search_dirs: Vec::new(),
        };
        match NativeLibrary::locate(&options) {
            Err(LoadError::LibraryNotFound { tried }) => assert_eq!(tried, vec![path]),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_arch_defaults_match_triplet() {
        assert!(LIBRARY_DIRS.iter().any(|dir| dir.contains(TRIPLET)));
    }
}
