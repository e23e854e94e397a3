//! In-memory `AndorSdk` for tests and dry runs.
//!
//! Mirrors the driver's observable rules: nothing but `Initialize` works
//! before initialisation, indices outside the camera list are rejected with
//! `DRV_P1INVALID`, and `GetHeadModel` reports the currently selected camera.

use crate::error::{AndorError, AndorResult};
use crate::sdk::{AndorSdk, CameraHandle};
use crate::status::DriverStatus;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct MockState {
    initialized: bool,
    init_dir: Option<PathBuf>,
    current: Option<CameraHandle>,
    failures: HashMap<&'static str, DriverStatus>,
    calls: HashMap<&'static str, usize>,
}

/// Stub driver with a fixed list of camera heads.
pub struct MockAndorSdk {
    heads: Vec<(CameraHandle, String)>,
    state: Mutex<MockState>,
}

impl Default for MockAndorSdk {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAndorSdk {
    /// One iDus head, handle 100.
    pub fn new() -> Self {
        Self::with_cameras(["DU420A-OE"])
    }

    /// Cameras get handles 100, 101, ... in the given order.
    pub fn with_cameras<I, S>(models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let heads = models
            .into_iter()
            .enumerate()
            .map(|(i, model)| (CameraHandle(100 + i as i64), model.into()))
            .collect();
        Self {
            heads,
            state: Mutex::new(MockState::default()),
        }
    }

    /// Make every later call to `function` return `status`.
    pub fn fail_with(&self, function: &'static str, status: DriverStatus) {
        self.state().failures.insert(function, status);
    }

    /// How many times `function` has been called.
    pub fn call_count(&self, function: &str) -> usize {
        self.state().calls.get(function).copied().unwrap_or(0)
    }

    /// Directory passed to the last successful `Initialize`.
    pub fn init_dir(&self) -> Option<PathBuf> {
        self.state().init_dir.clone()
    }

    /// Handle selected by the last successful `SetCurrentCamera`.
    pub fn current_camera(&self) -> Option<CameraHandle> {
        self.state().current
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count the call, then apply injected failures and the init check.
    fn enter(&self, function: &'static str, needs_init: bool) -> AndorResult<MutexGuard<'_, MockState>> {
        let mut state = self.state();
        *state.calls.entry(function).or_insert(0) += 1;
        if let Some(status) = state.failures.get(function).copied() {
            return Err(AndorError::Driver { function, status });
        }
        if needs_init && !state.initialized {
            return Err(AndorError::Driver {
                function,
                status: DriverStatus::NotInitialized,
            });
        }
        Ok(state)
    }
}

impl AndorSdk for MockAndorSdk {
    fn initialize(&self, dir: &Path) -> AndorResult<()> {
        let mut state = self.enter("Initialize", false)?;
        state.initialized = true;
        state.init_dir = Some(dir.to_path_buf());
        state.current = self.heads.first().map(|(handle, _)| *handle);
        tracing::info!(dir = %dir.display(), cameras = self.heads.len(), "Mock Andor driver initialized");
        Ok(())
    }

    fn camera_handle(&self, index: usize) -> AndorResult<CameraHandle> {
        let _state = self.enter("GetCameraHandle", true)?;
        self.heads
            .get(index)
            .map(|(handle, _)| *handle)
            .ok_or(AndorError::Driver {
                function: "GetCameraHandle",
                status: DriverStatus::P1Invalid,
            })
    }

    fn available_cameras(&self) -> AndorResult<usize> {
        // The real driver answers this before Initialize as well.
        let _state = self.enter("GetAvailableCameras", false)?;
        Ok(self.heads.len())
    }

    fn set_current_camera(&self, handle: CameraHandle) -> AndorResult<()> {
        let mut state = self.enter("SetCurrentCamera", false)?;
        if !self.heads.iter().any(|(h, _)| *h == handle) {
            return Err(AndorError::Driver {
                function: "SetCurrentCamera",
                status: DriverStatus::P1Invalid,
            });
        }
        state.current = Some(handle);
        Ok(())
    }

    fn head_model(&self) -> AndorResult<String> {
        let state = self.enter("GetHeadModel", true)?;
        state
            .current
            .and_then(|current| self.heads.iter().find(|(h, _)| *h == current))
            .map(|(_, model)| model.clone())
            .ok_or(AndorError::Driver {
                function: "GetHeadModel",
                status: DriverStatus::NoCamera,
            })
    }

    fn source(&self) -> &str {
        "mock"
    }
}
