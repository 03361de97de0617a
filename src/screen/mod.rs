mod controller;
mod runtime;
mod state;
mod types;

#[cfg(test)]
mod tests;

pub use controller::CaptureScreen;
pub use runtime::{ScreenHandle, ScreenRuntime};
pub use state::{CaptureStage, PendingImage, ScreenState};
pub use types::{CaptureState, LaunchParams, ScreenResult, VisibleView};
