use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Terminal result a capture screen reports to its caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenResult {
    /// User kept the shot; writing it was attempted
    Accepted,
    /// User backed out without keeping a shot
    Canceled,
    /// Screen could not open the camera
    Failed,
}

impl ScreenResult {
    /// Process exit code for hosts that launch the screen as a program
    pub fn exit_code(&self) -> i32 {
        match self {
            ScreenResult::Accepted => 0,
            ScreenResult::Canceled => 1,
            ScreenResult::Failed => 2,
        }
    }
}

impl fmt::Display for ScreenResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScreenResult::Accepted => "accepted",
            ScreenResult::Canceled => "canceled",
            ScreenResult::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Parameters supplied by the caller when launching the screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchParams {
    /// Where an accepted capture is written
    pub output_path: PathBuf,
}

impl LaunchParams {
    pub fn new<P: Into<PathBuf>>(output_path: P) -> Self {
        Self {
            output_path: output_path.into(),
        }
    }
}

/// Capture lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// Live camera feed shown
    Previewing,
    /// Image bytes arrived, review not shown yet
    Captured,
    /// Still image with accept/retake/cancel controls shown
    Reviewing,
}

/// Which panel of the screen is visible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibleView {
    /// Preview, capture button and zoom controls
    Camera,
    /// Captured still and the accept/retake/cancel buttons
    Review,
}
