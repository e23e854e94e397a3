//! Typed interface over the five driver exports.
//!
//! `AndorSdk` is what the rest of a program holds. The runtime-loaded
//! [`AndorLibrary`](crate::library::AndorLibrary) implements it against the
//! vendor DLL and [`MockAndorSdk`](crate::mock::MockAndorSdk) implements it in
//! memory, so code above this seam never touches raw pointers or status codes.

use crate::error::{AndorError, AndorResult};
use std::ffi::CString;
use std::fmt;
use std::path::Path;

/// Camera handle as returned by `GetCameraHandle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CameraHandle(pub i64);

impl fmt::Display for CameraHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The driver operations this crate binds.
///
/// Every method maps a non-`DRV_SUCCESS` return to [`AndorError::Driver`].
pub trait AndorSdk: Send + Sync {
    /// `Initialize`: start the driver, pointing it at the directory holding
    /// `detector.ini`.
    fn initialize(&self, dir: &Path) -> AndorResult<()>;

    /// `GetCameraHandle`: handle of the camera at `index`.
    fn camera_handle(&self, index: usize) -> AndorResult<CameraHandle>;

    /// `GetAvailableCameras`: number of cameras the driver can see.
    fn available_cameras(&self) -> AndorResult<usize>;

    /// `SetCurrentCamera`: route subsequent calls to `handle`.
    fn set_current_camera(&self, handle: CameraHandle) -> AndorResult<()>;

    /// `GetHeadModel`: head model string of the current camera.
    fn head_model(&self) -> AndorResult<String>;

    /// Where this binding came from (library path, or a label for stubs).
    fn source(&self) -> &str;
}

/// NUL-terminated, mutable copy of `path` suitable for a `char*` argument.
///
/// The buffer is at least `min_len` bytes so the driver may write into it.
pub fn path_to_c_buffer(path: &Path, min_len: usize) -> AndorResult<Vec<u8>> {
    let text = path.to_string_lossy().into_owned();
    let c_string = CString::new(text.clone()).map_err(|_| AndorError::InvalidPath(text))?;
    let mut buf = c_string.into_bytes_with_nul();
    if buf.len() < min_len {
        buf.resize(min_len, 0);
    }
    Ok(buf)
}

/// Decode a driver-filled `char` buffer up to the first NUL.
pub fn c_buffer_to_string(buf: &[u8]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_c_buffer_to_string_stops_at_nul() {
        let mut buf = [0u8; 16];
        buf[..8].copy_from_slice(b"DU420A-O");
        buf[9] = b'X';
        assert_eq!(c_buffer_to_string(&buf), "DU420A-O");
    }

    #[test]
    fn test_c_buffer_to_string_without_nul() {
        assert_eq!(c_buffer_to_string(b"iDus"), "iDus");
    }

    #[test]
    fn test_path_to_c_buffer_pads() {
        let buf = path_to_c_buffer(Path::new("C:/Andor"), 260).unwrap();
        assert_eq!(buf.len(), 260);
        assert_eq!(&buf[..9], b"C:/Andor\0");
    }

    #[test]
    fn test_path_to_c_buffer_keeps_long_paths() {
        let long = "x".repeat(300);
        let buf = path_to_c_buffer(Path::new(&long), 260).unwrap();
        assert_eq!(buf.len(), 301);
        assert_eq!(buf.last(), Some(&0));
    }

    #[cfg(unix)]
    #[test]
    fn test_path_to_c_buffer_rejects_interior_nul() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new(OsStr::from_bytes(b"bad\0path"));
        assert!(matches!(
            path_to_c_buffer(path, 0),
            Err(AndorError::InvalidPath(_))
        ));
    }
}
