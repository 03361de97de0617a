use super::zoom::ZoomCapability;
use crate::error::{CameraError, Result};
use crate::events::ScreenMailbox;
use tracing::{debug, info, warn};

/// Exclusive access to one device camera.
///
/// `autofocus` and `take_picture` return as soon as the request is issued;
/// completion is posted to the supplied mailbox as
/// [`ScreenEvent::AutofocusCompleted`](crate::events::ScreenEvent::AutofocusCompleted)
/// or [`ScreenEvent::PictureTaken`](crate::events::ScreenEvent::PictureTaken).
pub trait CameraDevice: Send {
    fn start_preview(&mut self) -> Result<()>;
    fn stop_preview(&mut self) -> Result<()>;
    fn autofocus(&mut self, reply: ScreenMailbox) -> Result<()>;
    fn take_picture(&mut self, reply: ScreenMailbox) -> Result<()>;
    fn zoom_capability(&self) -> ZoomCapability;
    fn set_zoom(&mut self, level: u32) -> Result<()>;
    fn release(&mut self);
}

/// Source of camera devices
pub trait CameraProvider: Send + Sync {
    fn acquire(&self) -> Result<Box<dyn CameraDevice>>;
}

/// Owned camera handle; once released every operation fails with
/// [`CameraError::Released`] without reaching the device.
pub struct CameraHandle {
    device: Option<Box<dyn CameraDevice>>,
}

impl CameraHandle {
    pub fn acquire(provider: &dyn CameraProvider) -> Result<Self> {
        let device = provider.acquire()?;
        info!("Camera acquired");
        Ok(Self {
            device: Some(device),
        })
    }

    pub fn is_released(&self) -> bool {
        self.device.is_none()
    }

    pub fn start_preview(&mut self) -> Result<()> {
        self.device()?.start_preview()
    }

    pub fn stop_preview(&mut self) -> Result<()> {
        self.device()?.stop_preview()
    }

    pub fn autofocus(&mut self, reply: ScreenMailbox) -> Result<()> {
        self.device()?.autofocus(reply)
    }

    pub fn take_picture(&mut self, reply: ScreenMailbox) -> Result<()> {
        self.device()?.take_picture(reply)
    }

    pub fn zoom_capability(&self) -> Result<ZoomCapability> {
        self.device
            .as_ref()
            .map(|device| device.zoom_capability())
            .ok_or_else(|| CameraError::Released.into())
    }

    pub fn set_zoom(&mut self, level: u32) -> Result<()> {
        self.device()?.set_zoom(level)
    }

    /// Release the camera; returns false when it was already released
    pub fn release(&mut self) -> bool {
        match self.device.take() {
            Some(mut device) => {
                if let Err(e) = device.stop_preview() {
                    warn!("Failed to stop preview before release: {}", e);
                }
                device.release();
                info!("Camera released");
                true
            }
            None => {
                debug!("Camera already released");
                false
            }
        }
    }

    fn device(&mut self) -> Result<&mut Box<dyn CameraDevice>> {
        self.device
            .as_mut()
            .ok_or_else(|| CameraError::Released.into())
    }
}

impl Drop for CameraHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for CameraHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraHandle")
            .field("released", &self.is_released())
            .finish()
    }
}
