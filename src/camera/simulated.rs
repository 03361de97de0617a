use super::interface::{CameraDevice, CameraProvider};
use super::zoom::ZoomCapability;
use crate::error::{CameraError, Result};
use crate::events::{ScreenEvent, ScreenMailbox};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Operation recorded by the simulated camera
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraCall {
    Acquire,
    StartPreview,
    StopPreview,
    Autofocus,
    TakePicture,
    SetZoom(u32),
    Release,
}

/// Shared record of every call made against a simulated camera
#[derive(Debug, Clone, Default)]
pub struct CameraCallLog {
    calls: Arc<Mutex<Vec<CameraCall>>>,
}

impl CameraCallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, call: CameraCall) {
        self.calls.lock().push(call);
    }

    pub fn calls(&self) -> Vec<CameraCall> {
        self.calls.lock().clone()
    }

    pub fn count(&self, call: &CameraCall) -> usize {
        self.calls.lock().iter().filter(|c| *c == call).count()
    }

    pub fn zoom_levels(&self) -> Vec<u32> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                CameraCall::SetZoom(level) => Some(*level),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub(super) struct SimulatedSettings {
    pub index: u32,
    pub image: Arc<Vec<u8>>,
    pub zoom: ZoomCapability,
    pub autofocus_success: bool,
    pub autofocus_delay: Duration,
    pub capture_delay: Duration,
}

/// Provider handing out a single simulated camera at a time
pub struct SimulatedCameraProvider {
    settings: SimulatedSettings,
    available: bool,
    in_use: Arc<AtomicBool>,
    log: CameraCallLog,
}

impl SimulatedCameraProvider {
    pub(super) fn new(settings: SimulatedSettings, available: bool, log: CameraCallLog) -> Self {
        Self {
            settings,
            available,
            in_use: Arc::new(AtomicBool::new(false)),
            log,
        }
    }

    pub fn call_log(&self) -> CameraCallLog {
        self.log.clone()
    }

    pub fn is_in_use(&self) -> bool {
        self.in_use.load(Ordering::SeqCst)
    }
}

impl CameraProvider for SimulatedCameraProvider {
    fn acquire(&self) -> Result<Box<dyn CameraDevice>> {
        if !self.available {
            return Err(CameraError::Unavailable {
                index: self.settings.index,
                details: "no camera present".to_string(),
            }
            .into());
        }

        if self.in_use.swap(true, Ordering::SeqCst) {
            return Err(CameraError::Unavailable {
                index: self.settings.index,
                details: "camera is held by another client".to_string(),
            }
            .into());
        }

        self.log.record(CameraCall::Acquire);
        info!("Simulated camera {} opened", self.settings.index);

        Ok(Box::new(SimulatedCamera {
            settings: self.settings.clone(),
            in_use: Arc::clone(&self.in_use),
            log: self.log.clone(),
        }))
    }
}

/// Camera that serves a fixed still image after simulated autofocus and shutter delays
pub struct SimulatedCamera {
    settings: SimulatedSettings,
    in_use: Arc<AtomicBool>,
    log: CameraCallLog,
}

impl SimulatedCamera {
    fn spawn_reply(&self, delay: Duration, reply: ScreenMailbox, event: ScreenEvent) -> Result<()> {
        let handle = tokio::runtime::Handle::try_current().map_err(|e| CameraError::Capture {
            details: format!("no runtime to deliver camera callback: {}", e),
        })?;

        handle.spawn(async move {
            tokio::time::sleep(delay).await;
            let event_type = event.event_type();
            if reply.post(event).is_err() {
                warn!("Screen went away before {} was delivered", event_type);
            }
        });

        Ok(())
    }
}

impl CameraDevice for SimulatedCamera {
    fn start_preview(&mut self) -> Result<()> {
        self.log.record(CameraCall::StartPreview);
        debug!("Simulated preview started");
        Ok(())
    }

    fn stop_preview(&mut self) -> Result<()> {
        self.log.record(CameraCall::StopPreview);
        Ok(())
    }

    fn autofocus(&mut self, reply: ScreenMailbox) -> Result<()> {
        self.log.record(CameraCall::Autofocus);
        let success = self.settings.autofocus_success;
        self.spawn_reply(
            self.settings.autofocus_delay,
            reply,
            ScreenEvent::AutofocusCompleted { success },
        )
    }

    fn take_picture(&mut self, reply: ScreenMailbox) -> Result<()> {
        self.log.record(CameraCall::TakePicture);
        let data = self.settings.image.as_ref().clone();
        self.spawn_reply(
            self.settings.capture_delay,
            reply,
            ScreenEvent::PictureTaken { data },
        )
    }

    fn zoom_capability(&self) -> ZoomCapability {
        self.settings.zoom
    }

    fn set_zoom(&mut self, level: u32) -> Result<()> {
        let zoom = self.settings.zoom;
        if !zoom.supported || level > zoom.max {
            return Err(CameraError::Parameter {
                details: format!("zoom level {} outside 0..={}", level, zoom.max),
            }
            .into());
        }
        self.log.record(CameraCall::SetZoom(level));
        Ok(())
    }

    fn release(&mut self) {
        self.log.record(CameraCall::Release);
        self.in_use.store(false, Ordering::SeqCst);
        debug!("Simulated camera {} closed", self.settings.index);
    }
}

/// Minimal JPEG stream (SOI, comment segment, EOI) standing in for a real capture
pub fn placeholder_jpeg(resolution: (u32, u32)) -> Vec<u8> {
    let comment = format!("snapcam placeholder {}x{}", resolution.0, resolution.1);
    let segment_len = (comment.len() + 2) as u16;

    let mut data = Vec::with_capacity(comment.len() + 8);
    data.extend_from_slice(&[0xFF, 0xD8]);
    data.extend_from_slice(&[0xFF, 0xFE]);
    data.extend_from_slice(&segment_len.to_be_bytes());
    data.extend_from_slice(comment.as_bytes());
    data.extend_from_slice(&[0xFF, 0xD9]);
    data
}
