use super::types::{CaptureState, ScreenResult, VisibleView};
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Captured bytes waiting for the user's decision
#[derive(Debug, Clone)]
pub struct PendingImage {
    pub data: Vec<u8>,
    pub destination: PathBuf,
    pub captured_at: DateTime<Utc>,
}

impl PendingImage {
    pub fn new(data: Vec<u8>, destination: PathBuf) -> Self {
        Self {
            data,
            destination,
            captured_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Step of an in-flight capture request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStage {
    Focusing,
    Shooting,
}

/// Everything the screen mutates, owned by its event loop
#[derive(Debug)]
pub struct ScreenState {
    pub capture_state: CaptureState,
    pub view: VisibleView,
    /// Set from the accepted tap until a retake; further taps are ignored
    pub debounce: bool,
    pub stage: Option<CaptureStage>,
    pub pending: Option<PendingImage>,
    pub result: Option<ScreenResult>,
}

impl ScreenState {
    pub fn new() -> Self {
        Self {
            capture_state: CaptureState::Previewing,
            view: VisibleView::Camera,
            debounce: false,
            stage: None,
            pending: None,
            result: None,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.result.is_some()
    }

    /// Back to the live preview with no capture outstanding
    pub fn reset_to_preview(&mut self) {
        self.capture_state = CaptureState::Previewing;
        self.view = VisibleView::Camera;
        self.debounce = false;
        self.stage = None;
        self.pending = None;
    }
}

impl Default for ScreenState {
    fn default() -> Self {
        Self::new()
    }
}
