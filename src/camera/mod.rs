mod builder;
mod interface;
mod simulated;
mod zoom;

pub use builder::SimulatedCameraBuilder;
pub use interface::{CameraDevice, CameraHandle, CameraProvider};
pub use simulated::{placeholder_jpeg, CameraCall, CameraCallLog, SimulatedCamera, SimulatedCameraProvider};
pub use zoom::ZoomCapability;
