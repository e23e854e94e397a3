//! Raw FFI surface of the Andor SDK driver (`atmcd64d.dll` / `libandor.so`).
//!
//! The driver is never linked at build time. These are the signatures and
//! export names the runtime loader resolves, plus the status codes the
//! exported functions return.
//!
//! Every export uses the vendor's `__stdcall` convention, which Rust spells
//! `extern "system"` (identical to `extern "C"` off 32-bit Windows).

#![allow(non_camel_case_types)]

use std::os::raw::{c_char, c_long, c_uint};

/// `unsigned int __stdcall Initialize(char* dir)`
pub type Initialize_t = unsafe extern "system" fn(dir: *mut c_char) -> c_uint;

/// `unsigned int __stdcall GetCameraHandle(long cameraIndex, long* cameraHandle)`
pub type GetCameraHandle_t =
    unsafe extern "system" fn(camera_index: c_long, camera_handle: *mut c_long) -> c_uint;

/// `unsigned int __stdcall GetAvailableCameras(long* totalCameras)`
pub type GetAvailableCameras_t = unsafe extern "system" fn(total_cameras: *mut c_long) -> c_uint;

/// `unsigned int __stdcall SetCurrentCamera(long cameraHandle)`
pub type SetCurrentCamera_t = unsafe extern "system" fn(camera_handle: c_long) -> c_uint;

/// `unsigned int __stdcall GetHeadModel(char* name)`
pub type GetHeadModel_t = unsafe extern "system" fn(name: *mut c_char) -> c_uint;

// Export names, NUL-terminated for symbol lookup.
pub const SYM_INITIALIZE: &[u8] = b"Initialize\0";
pub const SYM_GET_CAMERA_HANDLE: &[u8] = b"GetCameraHandle\0";
pub const SYM_GET_AVAILABLE_CAMERAS: &[u8] = b"GetAvailableCameras\0";
pub const SYM_SET_CURRENT_CAMERA: &[u8] = b"SetCurrentCamera\0";
pub const SYM_GET_HEAD_MODEL: &[u8] = b"GetHeadModel\0";

/// Conventional installation-relative location of the 64-bit driver.
pub const DEFAULT_LIBRARY_PATH: &str = "lib/atmcd64d.dll";

/// Buffer size the SDK documents for string outputs (Windows `MAX_PATH`).
pub const MAX_PATH: usize = 260;

// Driver return codes (atmcd32d.h).
pub const DRV_SUCCESS: c_uint = 20002;
pub const DRV_VXDNOTINSTALLED: c_uint = 20003;
pub const DRV_ERROR_ACK: c_uint = 20013;
pub const DRV_P1INVALID: c_uint = 20066;
pub const DRV_NOT_INITIALIZED: c_uint = 20075;
pub const DRV_ERROR_NOCAMERA: c_uint = 20990;
pub const DRV_NOT_SUPPORTED: c_uint = 20991;
pub const DRV_NOT_AVAILABLE: c_uint = 20992;
