use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::slider::Orientation;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SnapcamConfig {
    pub camera: CameraConfig,
    pub slider: SliderConfig,
    pub screen: ScreenConfig,
    pub system: SystemConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CameraConfig {
    /// Camera device index (e.g., 0 for the back camera)
    #[serde(default = "default_camera_index")]
    pub index: u32,

    /// Capture resolution (width, height)
    #[serde(default = "default_camera_resolution")]
    pub resolution: (u32, u32),

    /// Still image served by the simulated camera; a placeholder is generated when unset
    pub still_image: Option<String>,

    /// Simulated autofocus duration in milliseconds
    #[serde(default = "default_autofocus_delay_ms")]
    pub autofocus_delay_ms: u64,

    /// Simulated shutter duration in milliseconds
    #[serde(default = "default_capture_delay_ms")]
    pub capture_delay_ms: u64,

    /// Maximum zoom level reported by the simulated camera (0 = zoom unsupported)
    #[serde(default = "default_max_zoom")]
    pub max_zoom: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SliderConfig {
    /// Axis the zoom slider runs along
    #[serde(default = "default_slider_orientation")]
    pub orientation: Orientation,

    /// Drawable bounds of the slider widget (width, height)
    #[serde(default = "default_slider_bounds")]
    pub bounds: (u32, u32),

    /// Intrinsic size of the indicator drawable (width, height)
    #[serde(default = "default_indicator_size")]
    pub indicator_size: (u32, u32),

    /// Intrinsic thickness of the track drawable; 0 falls back to the built-in default
    #[serde(default = "default_track_thickness")]
    pub track_thickness: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ScreenConfig {
    /// Destination for an accepted capture when the caller supplies none
    #[serde(default = "default_output_path")]
    pub output_path: String,

    /// Display rotation reported alongside each capture
    pub rotation: Option<Rotation>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SystemConfig {
    /// Event bus capacity
    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Rotate90,
    Rotate180,
    Rotate270,
}

impl Rotation {
    pub fn degrees(&self) -> u32 {
        match self {
            Rotation::Rotate90 => 90,
            Rotation::Rotate180 => 180,
            Rotation::Rotate270 => 270,
        }
    }
}

impl SnapcamConfig {
    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            .set_default("camera.index", default_camera_index())?
            .set_default(
                "camera.resolution",
                vec![default_camera_resolution().0, default_camera_resolution().1],
            )?
            .set_default(
                "camera.autofocus_delay_ms",
                default_autofocus_delay_ms() as i64,
            )?
            .set_default(
                "camera.capture_delay_ms",
                default_capture_delay_ms() as i64,
            )?
            .set_default("camera.max_zoom", default_max_zoom())?
            .set_default("slider.orientation", "Vertical")?
            .set_default(
                "slider.bounds",
                vec![default_slider_bounds().0, default_slider_bounds().1],
            )?
            .set_default(
                "slider.indicator_size",
                vec![default_indicator_size().0, default_indicator_size().1],
            )?
            .set_default("slider.track_thickness", default_track_thickness())?
            .set_default("screen.output_path", default_output_path())?
            .set_default(
                "system.event_bus_capacity",
                default_event_bus_capacity() as i64,
            )?
            .add_source(File::with_name(&path_str).required(false))
            // SNAPCAM_CAMERA__MAX_ZOOM=10 overrides camera.max_zoom
            .add_source(
                Environment::with_prefix("SNAPCAM")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: SnapcamConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.camera.resolution.0 == 0 || self.camera.resolution.1 == 0 {
            return Err(ConfigError::Message(
                "Camera resolution must be greater than 0".to_string(),
            ));
        }

        if self.slider.bounds.0 == 0 || self.slider.bounds.1 == 0 {
            return Err(ConfigError::Message(
                "Slider bounds must be greater than 0".to_string(),
            ));
        }

        if self.screen.output_path.trim().is_empty() {
            return Err(ConfigError::Message(
                "Screen output_path must not be empty".to_string(),
            ));
        }

        if self.system.event_bus_capacity == 0 {
            return Err(ConfigError::Message(
                "Event bus capacity must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for SnapcamConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig {
                index: default_camera_index(),
                resolution: default_camera_resolution(),
                still_image: None,
                autofocus_delay_ms: default_autofocus_delay_ms(),
                capture_delay_ms: default_capture_delay_ms(),
                max_zoom: default_max_zoom(),
            },
            slider: SliderConfig {
                orientation: default_slider_orientation(),
                bounds: default_slider_bounds(),
                indicator_size: default_indicator_size(),
                track_thickness: default_track_thickness(),
            },
            screen: ScreenConfig {
                output_path: default_output_path(),
                rotation: None,
            },
            system: SystemConfig {
                event_bus_capacity: default_event_bus_capacity(),
            },
        }
    }
}

// Default value functions
fn default_camera_index() -> u32 {
    0
}
fn default_camera_resolution() -> (u32, u32) {
    (640, 480)
}
fn default_autofocus_delay_ms() -> u64 {
    150
}
fn default_capture_delay_ms() -> u64 {
    100
}
fn default_max_zoom() -> u32 {
    30
}

fn default_slider_orientation() -> Orientation {
    Orientation::Vertical
}
fn default_slider_bounds() -> (u32, u32) {
    (48, 320)
}
fn default_indicator_size() -> (u32, u32) {
    (48, 48)
}
fn default_track_thickness() -> u32 {
    10
}

fn default_output_path() -> String {
    "./capture.jpg".to_string()
}

fn default_event_bus_capacity() -> usize {
    64
}
