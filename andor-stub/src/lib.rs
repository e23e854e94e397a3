//! Stand-in for the Andor driver library.
//!
//! Built as a `cdylib`, this exports the same five `__stdcall` entry points
//! as `atmcd64d.dll` so the runtime loader can be exercised end to end
//! without vendor hardware. Behaviour is deterministic:
//!
//! - `GetAvailableCameras` works at any time and reports 2 cameras, or the
//!   value of `ANDOR_STUB_CAMERAS` (read on every call, may be negative).
//! - Every other call returns `DRV_NOT_INITIALIZED` until `Initialize`
//!   has succeeded, and `ShutDown` puts the library back in that state.
//! - Camera `i` has handle `100 + i`. Out-of-range indices and handles
//!   return `DRV_P1INVALID`, as do null pointers.
//! - Head models alternate between `DU420A-OE` and `DU401A-BV`.

#![allow(non_snake_case)]

use andor_sys::{DRV_NOT_INITIALIZED, DRV_P1INVALID, DRV_SUCCESS, MAX_PATH};
use std::os::raw::{c_char, c_long, c_uint};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

/// Environment variable overriding the reported camera count.
pub const CAMERAS_ENV: &str = "ANDOR_STUB_CAMERAS";

/// Handle of the camera at index 0.
pub const FIRST_HANDLE: c_long = 100;

/// Head models reported by the stub, cycled by camera index.
pub const HEAD_MODELS: [&str; 2] = ["DU420A-OE", "DU401A-BV"];

static INITIALIZED: AtomicBool = AtomicBool::new(false);
static CURRENT: AtomicI64 = AtomicI64::new(FIRST_HANDLE as i64);

fn camera_count() -> c_long {
    std::env::var(CAMERAS_ENV)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(2)
}

fn index_of(handle: c_long) -> Option<usize> {
    let index = handle.checked_sub(FIRST_HANDLE)?;
    if index < 0 || index >= camera_count() {
        return None;
    }
    usize::try_from(index).ok()
}

// =============================================================================
// Driver exports
// =============================================================================

/// `unsigned int Initialize(char* dir)`
///
/// # Safety
///
/// `dir` must be null or point to a NUL-terminated string.
#[no_mangle]
pub unsafe extern "system" fn Initialize(dir: *mut c_char) -> c_uint {
    if dir.is_null() {
        return DRV_P1INVALID;
    }
    INITIALIZED.store(true, Ordering::SeqCst);
    CURRENT.store(i64::from(FIRST_HANDLE), Ordering::SeqCst);
    DRV_SUCCESS
}

/// `unsigned int GetCameraHandle(long cameraIndex, long* cameraHandle)`
///
/// # Safety
///
/// `camera_handle` must be null or valid for a write.
#[no_mangle]
pub unsafe extern "system" fn GetCameraHandle(
    camera_index: c_long,
    camera_handle: *mut c_long,
) -> c_uint {
    if !INITIALIZED.load(Ordering::SeqCst) {
        return DRV_NOT_INITIALIZED;
    }
    if camera_handle.is_null() || camera_index < 0 || camera_index >= camera_count() {
        return DRV_P1INVALID;
    }
    *camera_handle = FIRST_HANDLE + camera_index;
    DRV_SUCCESS
}

/// `unsigned int GetAvailableCameras(long* totalCameras)`
///
/// # Safety
///
/// `total_cameras` must be null or valid for a write.
#[no_mangle]
pub unsafe extern "system" fn GetAvailableCameras(total_cameras: *mut c_long) -> c_uint {
    if total_cameras.is_null() {
        return DRV_P1INVALID;
    }
    *total_cameras = camera_count();
    DRV_SUCCESS
}

/// `unsigned int SetCurrentCamera(long cameraHandle)`
#[no_mangle]
pub extern "system" fn SetCurrentCamera(camera_handle: c_long) -> c_uint {
    if !INITIALIZED.load(Ordering::SeqCst) {
        return DRV_NOT_INITIALIZED;
    }
    if index_of(camera_handle).is_none() {
        return DRV_P1INVALID;
    }
    CURRENT.store(i64::from(camera_handle), Ordering::SeqCst);
    DRV_SUCCESS
}

/// `unsigned int GetHeadModel(char* name)`
///
/// # Safety
///
/// `name` must be null or valid for `MAX_PATH` bytes of writes.
#[no_mangle]
pub unsafe extern "system" fn GetHeadModel(name: *mut c_char) -> c_uint {
    if !INITIALIZED.load(Ordering::SeqCst) {
        return DRV_NOT_INITIALIZED;
    }
    if name.is_null() {
        return DRV_P1INVALID;
    }
    let current = c_long::try_from(CURRENT.load(Ordering::SeqCst)).unwrap_or(FIRST_HANDLE);
    let Some(index) = index_of(current) else {
        return DRV_P1INVALID;
    };
    let model = HEAD_MODELS[index % HEAD_MODELS.len()].as_bytes();
    let len = model.len().min(MAX_PATH - 1);
    std::ptr::copy_nonoverlapping(model.as_ptr(), name.cast::<u8>(), len);
    *name.add(len) = 0;
    DRV_SUCCESS
}

/// `unsigned int ShutDown(void)`. Not bound by the loader; lets tests return
/// the stub to its uninitialized state.
#[no_mangle]
pub extern "system" fn ShutDown() -> c_uint {
    INITIALIZED.store(false, Ordering::SeqCst);
    DRV_SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test: the exports share process-wide state.
    #[test]
    fn test_lifecycle_through_raw_exports() {
        ShutDown();
        let mut buf = vec![0 as c_char; MAX_PATH];
        unsafe {
            assert_eq!(GetHeadModel(buf.as_mut_ptr()), DRV_NOT_INITIALIZED);

            let mut dir = *b".\0";
            assert_eq!(Initialize(dir.as_mut_ptr().cast()), DRV_SUCCESS);

            let mut total: c_long = 0;
            assert_eq!(GetAvailableCameras(&mut total), DRV_SUCCESS);
            assert_eq!(total, 2);

            let mut handle: c_long = 0;
            assert_eq!(GetCameraHandle(1, &mut handle), DRV_SUCCESS);
            assert_eq!(handle, 101);
            assert_eq!(GetCameraHandle(2, &mut handle), DRV_P1INVALID);

            assert_eq!(SetCurrentCamera(101), DRV_SUCCESS);
            assert_eq!(SetCurrentCamera(99), DRV_P1INVALID);
            assert_eq!(GetHeadModel(buf.as_mut_ptr()), DRV_SUCCESS);
            let name = std::ffi::CStr::from_ptr(buf.as_ptr());
            assert_eq!(name.to_str().unwrap(), "DU401A-BV");
        }
        ShutDown();
    }
}
