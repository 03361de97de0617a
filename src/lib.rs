pub mod camera;
pub mod config;
pub mod error;
pub mod events;
pub mod keyboard_input;
pub mod screen;
pub mod slider;
pub mod store;

pub use camera::{
    CameraDevice, CameraHandle, CameraProvider, SimulatedCameraBuilder, SimulatedCameraProvider,
    ZoomCapability,
};
pub use config::SnapcamConfig;
pub use error::{Result, SnapcamError};
pub use events::{EventBus, EventFilter, EventReceiver, ScreenEvent, ScreenMailbox, SnapcamEvent};
pub use keyboard_input::KeyboardInputHandler;
pub use screen::{
    CaptureScreen, CaptureState, LaunchParams, ScreenHandle, ScreenResult, ScreenRuntime,
    VisibleView,
};
pub use slider::{Orientation, PositionSlider, Rect};
pub use store::{FsImageStore, ImageStore};
