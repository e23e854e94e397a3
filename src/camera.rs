//! Camera enumeration on top of an [`AndorSdk`].

use crate::error::AndorResult;
use crate::sdk::{AndorSdk, CameraHandle};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

/// One attached camera as the driver reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CameraInfo {
    /// Position passed to `GetCameraHandle`.
    pub index: usize,
    /// Handle the driver returned for `index`.
    pub handle: i64,
    /// Head model string, e.g. `DU420A-OE`.
    pub head_model: String,
}

impl CameraInfo {
    /// `handle` as a [`CameraHandle`].
    pub fn camera_handle(&self) -> CameraHandle {
        CameraHandle(self.handle)
    }
}

/// Initialize the driver with `init_dir` and describe every camera it sees.
///
/// Each camera is made current in turn to read its head model, so the last
/// camera listed is left selected.
pub fn discover_cameras(sdk: &dyn AndorSdk, init_dir: &Path) -> AndorResult<Vec<CameraInfo>> {
    sdk.initialize(init_dir)?;

    let count = sdk.available_cameras()?;
    info!(source = sdk.source(), count, "Enumerating Andor cameras");

    let mut cameras = Vec::with_capacity(count);
    for index in 0..count {
        let handle = sdk.camera_handle(index)?;
        sdk.set_current_camera(handle)?;
        let head_model = sdk.head_model()?;
        debug!(index, %handle, head_model = %head_model, "Found camera");
        cameras.push(CameraInfo {
            index,
            handle: handle.0,
            head_model,
        });
    }
    Ok(cameras)
}

/// Select the first camera whose head model starts with `prefix`.
pub fn select_by_model(
    sdk: &dyn AndorSdk,
    cameras: &[CameraInfo],
    prefix: &str,
) -> AndorResult<Option<CameraInfo>> {
    match cameras.iter().find(|c| c.head_model.starts_with(prefix)) {
        Some(camera) => {
            sdk.set_current_camera(camera.camera_handle())?;
            Ok(Some(camera.clone()))
        }
        None => Ok(None),
    }
}
