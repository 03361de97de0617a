use super::simulated::{placeholder_jpeg, CameraCallLog, SimulatedCameraProvider, SimulatedSettings};
use super::zoom::ZoomCapability;
use crate::config::CameraConfig;
use crate::error::{Result, SnapcamError};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Builder for the simulated camera provider
pub struct SimulatedCameraBuilder {
    config: Option<CameraConfig>,
    image: Option<Vec<u8>>,
    zoom: Option<ZoomCapability>,
    autofocus_success: bool,
    available: bool,
    log: CameraCallLog,
}

impl SimulatedCameraBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            image: None,
            zoom: None,
            autofocus_success: true,
            available: true,
            log: CameraCallLog::new(),
        }
    }

    pub fn config(mut self, config: CameraConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Serve these bytes instead of the configured still image
    pub fn image(mut self, image: Vec<u8>) -> Self {
        self.image = Some(image);
        self
    }

    /// Override the zoom capability derived from `max_zoom`
    pub fn zoom(mut self, zoom: ZoomCapability) -> Self {
        self.zoom = Some(zoom);
        self
    }

    pub fn autofocus_success(mut self, success: bool) -> Self {
        self.autofocus_success = success;
        self
    }

    /// Make every acquire attempt fail
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    pub fn call_log(mut self, log: CameraCallLog) -> Self {
        self.log = log;
        self
    }

    pub fn build(self) -> Result<SimulatedCameraProvider> {
        let config = self
            .config
            .ok_or_else(|| SnapcamError::system("Camera configuration must be specified"))?;

        let image = match (self.image, &config.still_image) {
            (Some(image), _) => image,
            (None, Some(path)) => {
                info!("Simulated camera serving still image {}", path);
                std::fs::read(path)?
            }
            (None, None) => placeholder_jpeg(config.resolution),
        };

        let zoom = self.zoom.unwrap_or(if config.max_zoom == 0 {
            ZoomCapability::unsupported()
        } else {
            ZoomCapability::new(config.max_zoom)
        });

        let settings = SimulatedSettings {
            index: config.index,
            image: Arc::new(image),
            zoom,
            autofocus_success: self.autofocus_success,
            autofocus_delay: Duration::from_millis(config.autofocus_delay_ms),
            capture_delay: Duration::from_millis(config.capture_delay_ms),
        };

        Ok(SimulatedCameraProvider::new(settings, self.available, self.log))
    }
}

impl Default for SimulatedCameraBuilder {
    fn default() -> Self {
        Self::new()
    }
}
