//! Runtime binding for the Andor iDus / Shamrock driver library.
//!
//! The vendor driver (`atmcd64d.dll`) is opened at runtime, five of its
//! exports are resolved into a typed [`AndorSdk`], and the result is owned by
//! a [`DriverLoader`] that the application creates once and passes around.
//!
//! - [`library`]: `libloading`-backed binding table
//! - [`loader`]: load-once ownership, failure as a value
//! - [`sdk`] / [`mock`]: the typed interface and an in-memory stand-in
//! - [`camera`]: enumeration built on the five calls
//! - [`config`]: figment configuration for the `andor-probe` binary

pub mod camera;
pub mod config;
pub mod error;
pub mod library;
pub mod loader;
pub mod mock;
pub mod sdk;
pub mod status;

pub use camera::{discover_cameras, CameraInfo};
pub use config::AndorConfig;
pub use error::{AndorError, AndorResult};
pub use library::AndorLibrary;
pub use loader::{DriverLoader, DynamicOpener, LibraryOpener};
pub use mock::MockAndorSdk;
pub use sdk::{AndorSdk, CameraHandle};
pub use status::DriverStatus;
