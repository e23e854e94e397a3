//! Runtime loading of the Andor driver library.
//!
//! `AndorLibrary` opens the vendor DLL with `libloading` and resolves the five
//! exports the crate uses. Construction is all-or-nothing: a value of this
//! type always carries every entry point, so callers never see a partially
//! populated binding table.

use crate::error::{AndorError, AndorResult};
use crate::sdk::{c_buffer_to_string, path_to_c_buffer, AndorSdk, CameraHandle};
use crate::status::{check, DriverStatus};
use andor_sys::{
    GetAvailableCameras_t, GetCameraHandle_t, GetHeadModel_t, Initialize_t, SetCurrentCamera_t,
    MAX_PATH, SYM_GET_AVAILABLE_CAMERAS, SYM_GET_CAMERA_HANDLE, SYM_GET_HEAD_MODEL,
    SYM_INITIALIZE, SYM_SET_CURRENT_CAMERA,
};
use libloading::Library;
use std::os::raw::{c_char, c_long};
use std::path::Path;

/// Loaded driver with its resolved entry points.
pub struct AndorLibrary {
    /// Keeps the driver mapped for as long as the pointers below are used.
    #[allow(dead_code)]
    library: Library,

    path: String,

    initialize: Initialize_t,
    get_camera_handle: GetCameraHandle_t,
    get_available_cameras: GetAvailableCameras_t,
    set_current_camera: SetCurrentCamera_t,
    get_head_model: GetHeadModel_t,
}

impl AndorLibrary {
    /// Open the driver at `path` and resolve all five exports.
    ///
    /// # Errors
    ///
    /// - [`AndorError::LibraryLoad`] if the platform loader rejects `path`.
    /// - [`AndorError::SymbolResolution`] for the first missing export.
    ///
    /// # Safety
    ///
    /// Loading runs the library's initialisers. `path` must name the vendor
    /// driver (or something honouring its ABI); a different library exporting
    /// the same names with other signatures is undefined behaviour when called.
    pub fn load<P: AsRef<Path>>(path: P) -> AndorResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let library = unsafe { Library::new(path) }
            .map_err(|e| AndorError::library_load(&path_str, e))?;

        let initialize = resolve::<Initialize_t>(&library, &path_str, SYM_INITIALIZE)?;
        let get_camera_handle =
            resolve::<GetCameraHandle_t>(&library, &path_str, SYM_GET_CAMERA_HANDLE)?;
        let get_available_cameras =
            resolve::<GetAvailableCameras_t>(&library, &path_str, SYM_GET_AVAILABLE_CAMERAS)?;
        let set_current_camera =
            resolve::<SetCurrentCamera_t>(&library, &path_str, SYM_SET_CURRENT_CAMERA)?;
        let get_head_model = resolve::<GetHeadModel_t>(&library, &path_str, SYM_GET_HEAD_MODEL)?;

        tracing::info!(path = %path_str, "Loaded Andor driver library");

        Ok(Self {
            library,
            path: path_str,
            initialize,
            get_camera_handle,
            get_available_cameras,
            set_current_camera,
            get_head_model,
        })
    }

    /// Path the library was opened from.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw `Initialize` entry point.
    pub fn initialize_fn(&self) -> Initialize_t {
        self.initialize
    }

    /// Raw `GetCameraHandle` entry point.
    pub fn get_camera_handle_fn(&self) -> GetCameraHandle_t {
        self.get_camera_handle
    }

    /// Raw `GetAvailableCameras` entry point.
    pub fn get_available_cameras_fn(&self) -> GetAvailableCameras_t {
        self.get_available_cameras
    }

    /// Raw `SetCurrentCamera` entry point.
    pub fn set_current_camera_fn(&self) -> SetCurrentCamera_t {
        self.set_current_camera
    }

    /// Raw `GetHeadModel` entry point.
    pub fn get_head_model_fn(&self) -> GetHeadModel_t {
        self.get_head_model
    }
}

fn resolve<T: Copy>(library: &Library, path: &str, symbol: &[u8]) -> AndorResult<T> {
    let name = String::from_utf8_lossy(symbol.strip_suffix(b"\0").unwrap_or(symbol)).into_owned();
    unsafe { library.get::<T>(symbol) }
        .map(|sym| *sym)
        .map_err(|e| {
            tracing::debug!(path, symbol = %name, "Driver export failed to resolve");
            AndorError::symbol_resolution(path, name, e)
        })
}

impl AndorSdk for AndorLibrary {
    fn initialize(&self, dir: &Path) -> AndorResult<()> {
        let mut buf = path_to_c_buffer(dir, MAX_PATH)?;
        let code = unsafe { (self.initialize)(buf.as_mut_ptr() as *mut c_char) };
        check("Initialize", code)
    }

    fn camera_handle(&self, index: usize) -> AndorResult<CameraHandle> {
        let index = c_long::try_from(index).map_err(|_| AndorError::Driver {
            function: "GetCameraHandle",
            status: DriverStatus::P1Invalid,
        })?;
        let mut handle: c_long = 0;
        let code = unsafe { (self.get_camera_handle)(index, &mut handle) };
        check("GetCameraHandle", code)?;
        Ok(CameraHandle(i64::from(handle)))
    }

    fn available_cameras(&self) -> AndorResult<usize> {
        let mut total: c_long = 0;
        let code = unsafe { (self.get_available_cameras)(&mut total) };
        check("GetAvailableCameras", code)?;
        usize::try_from(total).map_err(|_| AndorError::InvalidOutput {
            function: "GetAvailableCameras",
            reason: format!("negative camera count {total}"),
        })
    }

    fn set_current_camera(&self, handle: CameraHandle) -> AndorResult<()> {
        let raw = c_long::try_from(handle.0).map_err(|_| AndorError::Driver {
            function: "SetCurrentCamera",
            status: DriverStatus::P1Invalid,
        })?;
        let code = unsafe { (self.set_current_camera)(raw) };
        check("SetCurrentCamera", code)
    }

    fn head_model(&self) -> AndorResult<String> {
        let mut buf = vec![0u8; MAX_PATH];
        let code = unsafe { (self.get_head_model)(buf.as_mut_ptr() as *mut c_char) };
        check("GetHeadModel", code)?;
        Ok(c_buffer_to_string(&buf))
    }

    fn source(&self) -> &str {
        &self.path
    }
}

// AndorLibrary is Send + Sync because it only stores function pointers and
// the Library handle, which are safe to share. Serialising calls into the
// driver itself is the caller's concern.
unsafe impl Send for AndorLibrary {}
unsafe impl Sync for AndorLibrary {}

impl std::fmt::Debug for AndorLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AndorLibrary")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_library_names_path() {
        let path = "definitely/not/here/atmcd64d.dll";
        let err = AndorLibrary::load(path).unwrap_err();
        assert!(matches!(err, AndorError::LibraryLoad { .. }));
        assert_eq!(err.library_path(), Some(path));
        assert!(err.to_string().contains(path));
    }

    // glibc's libc.so.6 loads anywhere glibc runs and exports none of the
    // driver's names.
    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    #[test]
    fn test_library_without_exports_fails_on_first_symbol() {
        let err = AndorLibrary::load("libc.so.6").unwrap_err();
        match err {
            AndorError::SymbolResolution { path, symbol, .. } => {
                assert_eq!(path, "libc.so.6");
                assert_eq!(symbol, "Initialize");
            }
            other => panic!("expected SymbolResolution, got {other:?}"),
        }
    }
}
