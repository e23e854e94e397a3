//! Load-once ownership of the driver binding.
//!
//! A `DriverLoader` is created by the application's composition root and
//! passed to whatever needs the driver. The first successful [`load`] opens
//! the library; every later call hands back the same binding without going
//! near the platform loader again. A failed load stores nothing, so the
//! caller may retry with another path or give up.
//!
//! ```no_run
//! use andor_idus::{AndorSdk, DriverLoader};
//!
//! let loader = DriverLoader::new();
//! let sdk = loader.load_default()?;
//! println!("{} camera(s)", sdk.available_cameras()?);
//! # Ok::<(), andor_idus::AndorError>(())
//! ```
//!
//! [`load`]: DriverLoader::load

use crate::error::AndorResult;
use crate::library::AndorLibrary;
use crate::sdk::AndorSdk;
use andor_sys::DEFAULT_LIBRARY_PATH;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Turns a path into a bound driver. The seam exists so the "load once"
/// rule can be exercised without a vendor DLL.
pub trait LibraryOpener: Send + Sync {
    /// Open `path` and return a binding with every export resolved.
    fn open(&self, path: &Path) -> AndorResult<Arc<dyn AndorSdk>>;
}

/// Opens the real driver through `libloading`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DynamicOpener;

impl LibraryOpener for DynamicOpener {
    fn open(&self, path: &Path) -> AndorResult<Arc<dyn AndorSdk>> {
        Ok(Arc::new(AndorLibrary::load(path)?))
    }
}

struct Loaded {
    path: PathBuf,
    sdk: Arc<dyn AndorSdk>,
}

/// Owner of the one driver binding for an application.
pub struct DriverLoader<O: LibraryOpener = DynamicOpener> {
    opener: O,
    loaded: Mutex<Option<Loaded>>,
}

impl Default for DriverLoader<DynamicOpener> {
    fn default() -> Self {
        Self::new()
    }
}

impl DriverLoader<DynamicOpener> {
    /// Loader backed by the platform dynamic loader.
    pub fn new() -> Self {
        Self::with_opener(DynamicOpener)
    }
}

impl<O: LibraryOpener> DriverLoader<O> {
    /// Loader that opens libraries through `opener`.
    pub fn with_opener(opener: O) -> Self {
        Self {
            opener,
            loaded: Mutex::new(None),
        }
    }

    /// Load from the conventional installation-relative location.
    pub fn load_default(&self) -> AndorResult<Arc<dyn AndorSdk>> {
        self.load(DEFAULT_LIBRARY_PATH)
    }

    /// Load the driver at `path`, or return the binding from an earlier
    /// successful load.
    ///
    /// A repeat call naming a different path keeps the existing binding and
    /// logs a warning; the driver is never swapped underneath its users.
    ///
    /// # Errors
    ///
    /// [`AndorError::LibraryLoad`](crate::AndorError::LibraryLoad) or
    /// [`AndorError::SymbolResolution`](crate::AndorError::SymbolResolution)
    /// from the first load attempt. The loader stays unloaded afterwards.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> AndorResult<Arc<dyn AndorSdk>> {
        let path = path.as_ref();
        // Held across the open so concurrent first calls load exactly once.
        let mut slot = self.loaded.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(loaded) = slot.as_ref() {
            if loaded.path != path {
                tracing::warn!(
                    loaded = %loaded.path.display(),
                    requested = %path.display(),
                    "Driver already loaded from a different path; ignoring new path"
                );
            } else {
                tracing::debug!(path = %path.display(), "Driver already loaded");
            }
            return Ok(Arc::clone(&loaded.sdk));
        }

        let sdk = self.opener.open(path)?;
        *slot = Some(Loaded {
            path: path.to_path_buf(),
            sdk: Arc::clone(&sdk),
        });
        Ok(sdk)
    }

    /// Whether a load has succeeded.
    pub fn is_loaded(&self) -> bool {
        self.loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Path of the loaded driver, if any.
    pub fn loaded_path(&self) -> Option<PathBuf> {
        self.loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|loaded| loaded.path.clone())
    }

    /// The loaded binding, if any, without attempting a load.
    pub fn get(&self) -> Option<Arc<dyn AndorSdk>> {
        self.loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|loaded| Arc::clone(&loaded.sdk))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AndorError;
    use crate::mock::MockAndorSdk;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing_test::traced_test;

    #[derive(Default)]
    struct CountingOpener {
        opens: AtomicUsize,
        paths: Mutex<Vec<PathBuf>>,
    }

    impl LibraryOpener for CountingOpener {
        fn open(&self, path: &Path) -> AndorResult<Arc<dyn AndorSdk>> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            self.paths.lock().unwrap().push(path.to_path_buf());
            Ok(Arc::new(MockAndorSdk::new()))
        }
    }

    #[test]
    fn test_second_load_does_not_reopen() {
        let loader = DriverLoader::with_opener(CountingOpener::default());
        let first = loader.load("lib/atmcd64d.dll").unwrap();
        let second = loader.load("lib/atmcd64d.dll").unwrap();

        assert_eq!(loader.opener.opens.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_default_path() {
        let loader = DriverLoader::with_opener(CountingOpener::default());
        loader.load_default().unwrap();
        assert_eq!(
            *loader.opener.paths.lock().unwrap(),
            vec![PathBuf::from("lib/atmcd64d.dll")]
        );
        assert_eq!(loader.loaded_path(), Some(PathBuf::from(DEFAULT_LIBRARY_PATH)));
    }

    #[test]
    #[traced_test]
    fn test_different_path_keeps_first_binding() {
        let loader = DriverLoader::with_opener(CountingOpener::default());
        loader.load("first.dll").unwrap();
        loader.load("second.dll").unwrap();

        assert_eq!(loader.opener.opens.load(Ordering::SeqCst), 1);
        assert_eq!(loader.loaded_path(), Some(PathBuf::from("first.dll")));
        assert!(logs_contain("Driver already loaded from a different path"));
    }

    #[test]
    fn test_failed_load_leaves_loader_empty() {
        let loader = DriverLoader::new();
        let err = match loader.load("no/such/dir/atmcd64d.dll") {
            Err(err) => err,
            Ok(_) => panic!("load of a missing file succeeded"),
        };
        assert!(matches!(err, AndorError::LibraryLoad { .. }));
        assert!(!loader.is_loaded());
        assert!(loader.get().is_none());
    }

    #[test]
    fn test_concurrent_first_loads_open_once() {
        let loader = Arc::new(DriverLoader::with_opener(CountingOpener::default()));
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let loader = Arc::clone(&loader);
                std::thread::spawn(move || loader.load_default().map(|_| ()))
            })
            .collect();
        for t in threads {
            t.join().unwrap().unwrap();
        }
        assert_eq!(loader.opener.opens.load(Ordering::SeqCst), 1);
    }
}
