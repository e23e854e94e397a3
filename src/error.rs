//! Custom error types for the driver binding.
//!
//! This module defines the primary error type, `AndorError`, for the crate.
//! Using the `thiserror` crate, it provides one place for everything that can
//! go wrong between "open the vendor library" and "read a head model".
//!
//! ## Error Hierarchy
//!
//! - **`LibraryLoad`**: the dynamic library could not be opened (missing file,
//!   architecture mismatch, missing transitive dependency). Fatal for the
//!   composition root.
//! - **`SymbolResolution`**: the library opened but one of the five required
//!   exports is missing, usually a driver version mismatch or the wrong DLL.
//!   Also fatal.
//! - **`Driver`**: an exported function ran and returned something other than
//!   `DRV_SUCCESS`.
//! - **`InvalidOutput`**: a call succeeded but wrote an impossible value,
//!   such as a negative camera count.
//! - **`Config`** / **`Configuration`**: figment extraction failures and
//!   semantic validation failures respectively.
//! - **`InvalidPath`**: a path could not be handed to the driver as a C string.

use crate::status::DriverStatus;
use thiserror::Error;

/// Convenience alias for results using the crate error type.
pub type AndorResult<T> = std::result::Result<T, AndorError>;

/// Everything that can go wrong between opening the driver and reading from it.
#[derive(Error, Debug)]
pub enum AndorError {
    /// The platform loader could not open the driver library.
    #[error("Failed to load driver library '{path}': {source}")]
    LibraryLoad {
        /// Path handed to the platform loader.
        path: String,
        /// Loader diagnostic.
        #[source]
        source: libloading::Error,
    },

    /// The library opened but a required export is missing.
    #[error("Symbol '{symbol}' not found in driver library '{path}': {source}")]
    SymbolResolution {
        /// Path of the opened library.
        path: String,
        /// Export name without the trailing NUL.
        symbol: String,
        /// Loader diagnostic.
        #[source]
        source: libloading::Error,
    },

    /// A driver call returned something other than `DRV_SUCCESS`.
    #[error("{function} failed: {status}")]
    Driver {
        /// Vendor export that was called.
        function: &'static str,
        /// Status it returned.
        status: DriverStatus,
    },

    /// A driver call reported success but wrote a value that cannot be right.
    #[error("{function} returned invalid output: {reason}")]
    InvalidOutput {
        /// Vendor export that was called.
        function: &'static str,
        /// What was wrong with the value.
        reason: String,
    },

    /// Figment could not extract the configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    /// The configuration extracted but failed validation.
    #[error("Configuration validation error: {0}")]
    Configuration(String),

    /// A path could not be passed to the driver as a C string.
    #[error("Invalid path '{0}': contains an interior NUL byte")]
    InvalidPath(String),
}

impl AndorError {
    /// Create a library load error.
    pub fn library_load(path: impl Into<String>, source: libloading::Error) -> Self {
        Self::LibraryLoad {
            path: path.into(),
            source,
        }
    }

    /// Create a symbol resolution error.
    pub fn symbol_resolution(
        path: impl Into<String>,
        symbol: impl Into<String>,
        source: libloading::Error,
    ) -> Self {
        Self::SymbolResolution {
            path: path.into(),
            symbol: symbol.into(),
            source,
        }
    }

    /// True for the two failures that leave no usable binding behind.
    pub fn is_load_failure(&self) -> bool {
        matches!(self, Self::LibraryLoad { .. } | Self::SymbolResolution { .. })
    }

    /// The library path involved in a load failure, if any.
    pub fn library_path(&self) -> Option<&str> {
        match self {
            Self::LibraryLoad { path, .. } | Self::SymbolResolution { path, .. } => Some(path),
            _ => None,
        }
    }
}

impl From<figment::Error> for AndorError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}
