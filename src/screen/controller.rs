use super::state::{CaptureStage, PendingImage, ScreenState};
use super::types::{CaptureState, LaunchParams, ScreenResult, VisibleView};
use crate::camera::{CameraHandle, CameraProvider, ZoomCapability};
use crate::config::{ScreenConfig, SnapcamConfig};
use crate::error::Result;
use crate::events::{EventBus, ScreenEvent, ScreenMailbox, SnapcamEvent, WeakScreenMailbox};
use crate::slider::{PositionSlider, Rect, SliderStyle};
use crate::store::ImageStore;
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};
use uuid::Uuid;

/// Camera capture screen: live preview with zoom, single capture, review, save.
///
/// Every method here runs on the screen's event loop. Camera completions
/// come back as [`ScreenEvent`]s through the loop's mailbox, never as direct
/// calls, so state changes are strictly serialized.
pub struct CaptureScreen {
    session_id: String,
    config: ScreenConfig,
    launch: LaunchParams,
    camera: CameraHandle,
    zoom: ZoomCapability,
    slider: PositionSlider,
    store: Arc<dyn ImageStore>,
    event_bus: EventBus,
    mailbox: WeakScreenMailbox,
    state: ScreenState,
}

impl CaptureScreen {
    /// Acquire the camera and bring up the preview.
    ///
    /// A camera that cannot be acquired closes the screen straight away:
    /// `ScreenClosed { Failed }` is published and no preview is ever shown.
    pub fn open(
        config: &SnapcamConfig,
        launch: LaunchParams,
        provider: &dyn CameraProvider,
        store: Arc<dyn ImageStore>,
        event_bus: EventBus,
        mailbox: &ScreenMailbox,
    ) -> Result<Self> {
        let session_id = Uuid::new_v4().to_string();
        info!(session = %session_id, "Opening capture screen");

        let mut camera = match CameraHandle::acquire(provider) {
            Ok(camera) => camera,
            Err(e) => {
                error!(session = %session_id, "Camera unavailable: {}", e);
                let _ = event_bus.publish(SnapcamEvent::ScreenClosed {
                    result: ScreenResult::Failed,
                });
                return Err(e);
            }
        };

        let zoom = camera.zoom_capability()?;
        debug!(session = %session_id, "Zoom capability: {:?}", zoom);

        let bounds = Rect::from_size(config.slider.bounds.0, config.slider.bounds.1);
        let mut slider = PositionSlider::new(config.slider.orientation, bounds)
            .with_style(SliderStyle::from_config(&config.slider));
        let listener_mailbox = mailbox.downgrade();
        slider.set_position_listener(move |value| {
            if listener_mailbox.post(ScreenEvent::ZoomChanged(value)).is_err() {
                debug!("Dropping zoom change {} for closed screen", value);
            }
        });

        if let Err(e) = camera.start_preview() {
            error!(session = %session_id, "Failed to start preview: {}", e);
            camera.release();
            let _ = event_bus.publish(SnapcamEvent::ScreenClosed {
                result: ScreenResult::Failed,
            });
            return Err(e);
        }

        let screen = Self {
            session_id,
            config: config.screen.clone(),
            launch,
            camera,
            zoom,
            slider,
            store,
            event_bus,
            mailbox: mailbox.downgrade(),
            state: ScreenState::new(),
        };

        screen.notify(SnapcamEvent::ScreenOpened {
            session_id: screen.session_id.clone(),
        });
        screen.notify(SnapcamEvent::PreviewShown);

        Ok(screen)
    }

    /// Apply one event; returns the terminal result once the screen closes
    pub async fn handle(&mut self, event: ScreenEvent) -> Option<ScreenResult> {
        if let Some(result) = self.state.result {
            debug!(
                session = %self.session_id,
                "Screen already closed ({}), ignoring {}",
                result,
                event.event_type()
            );
            return None;
        }

        trace!(session = %self.session_id, "Handling {}", event.event_type());

        match event {
            ScreenEvent::CaptureTapped => self.request_capture(),
            ScreenEvent::AutofocusCompleted { success } => self.on_autofocus_complete(success),
            ScreenEvent::PictureTaken { data } => self.on_image_captured(data),
            ScreenEvent::ZoomChanged(value) => self.on_zoom_change(value),
            ScreenEvent::ZoomIn => {
                if self.camera_controls_visible() {
                    self.slider.increment();
                }
            }
            ScreenEvent::ZoomOut => {
                if self.camera_controls_visible() {
                    self.slider.decrement();
                }
            }
            ScreenEvent::SliderTouched { x, y } => {
                if self.camera_controls_visible() {
                    self.slider.handle_touch(x, y);
                }
            }
            ScreenEvent::Accept => return self.accept().await,
            ScreenEvent::Retake => self.retake(),
            ScreenEvent::Cancel => return Some(self.cancel()),
            ScreenEvent::Pause => self.teardown(),
        }

        None
    }

    /// Capture button: start autofocus unless a capture is already in flight
    pub fn request_capture(&mut self) {
        if self.state.debounce {
            debug!(session = %self.session_id, "Capture already in progress, ignoring tap");
            return;
        }

        let Some(reply) = self.mailbox.upgrade() else {
            debug!(session = %self.session_id, "Event loop gone, ignoring tap");
            return;
        };

        match self.camera.autofocus(reply) {
            Ok(()) => {
                self.state.debounce = true;
                self.state.stage = Some(CaptureStage::Focusing);
                debug!(session = %self.session_id, "Autofocus started");
                self.notify(SnapcamEvent::CaptureRequested);
            }
            Err(e) => warn!(session = %self.session_id, "Could not start autofocus: {}", e),
        }
    }

    /// Autofocus finished; capture proceeds whether or not focus locked
    pub fn on_autofocus_complete(&mut self, success: bool) {
        debug!(session = %self.session_id, "Autofocus has completed (success: {})", success);

        if self.state.stage != Some(CaptureStage::Focusing) {
            debug!(session = %self.session_id, "No capture waiting on autofocus");
            return;
        }

        self.notify(SnapcamEvent::AutofocusCompleted { success });

        let Some(reply) = self.mailbox.upgrade() else {
            debug!(session = %self.session_id, "Event loop gone, skipping capture");
            return;
        };

        match self.camera.take_picture(reply) {
            Ok(()) => {
                self.state.stage = Some(CaptureStage::Shooting);
                self.state.debounce = true;
            }
            Err(e) => {
                warn!(session = %self.session_id, "Capture failed to start: {}", e);
                self.state.stage = None;
                self.state.debounce = false;
            }
        }
    }

    /// Image bytes arrived: hold them and switch to review
    pub fn on_image_captured(&mut self, data: Vec<u8>) {
        if self.state.stage != Some(CaptureStage::Shooting) {
            debug!(
                session = %self.session_id,
                "Discarding {} image bytes with no capture outstanding",
                data.len()
            );
            return;
        }

        self.state.capture_state = CaptureState::Captured;
        self.state.stage = None;

        let pending = PendingImage::new(data, self.launch.output_path.clone());
        if pending.is_empty() {
            warn!(session = %self.session_id, "Camera delivered an empty image");
        }
        info!(
            session = %self.session_id,
            "Picture taken at {}: {} bytes for {}",
            pending.captured_at.format("%Y-%m-%d %H:%M:%S%.3f UTC"),
            pending.len(),
            pending.destination.display()
        );
        let degrees = self.config.rotation.map_or(0, |rotation| rotation.degrees());
        debug!(session = %self.session_id, "Display rotation is {} degrees", degrees);

        let byte_count = pending.len();
        self.state.pending = Some(pending);
        self.state.capture_state = CaptureState::Reviewing;
        self.state.view = VisibleView::Review;
        self.notify(SnapcamEvent::ReviewShown { byte_count });
    }

    /// Map a normalized slider value onto the camera's zoom range
    pub fn on_zoom_change(&mut self, value: f64) {
        debug!(session = %self.session_id, "Zooming to {}", value);
        self.notify(SnapcamEvent::SliderMoved { position: value });

        let Some(level) = self.zoom.level_for(value) else {
            trace!("Zoom unsupported, ignoring slider change");
            return;
        };

        match self.camera.set_zoom(level) {
            Ok(()) => self.notify(SnapcamEvent::ZoomApplied { level }),
            Err(e) => warn!(session = %self.session_id, "Failed to apply zoom {}: {}", level, e),
        }
    }

    /// Keep the shot: write it out, then close with `Accepted`.
    ///
    /// A failed write is logged and the screen still reports `Accepted`.
    pub async fn accept(&mut self) -> Option<ScreenResult> {
        if self.state.capture_state != CaptureState::Reviewing {
            debug!(session = %self.session_id, "Nothing to accept yet");
            return None;
        }

        let Some(pending) = self.state.pending.take() else {
            warn!(session = %self.session_id, "Reviewing without a pending image");
            return None;
        };

        let path = pending.destination.display().to_string();
        match self.store.write(&pending.destination, &pending.data).await {
            Ok(()) => {
                info!(
                    session = %self.session_id,
                    "Saved capture taken at {} to {}",
                    pending.captured_at.to_rfc3339(),
                    path
                );
                self.notify(SnapcamEvent::ImageSaved {
                    path,
                    byte_count: pending.len(),
                });
            }
            Err(e) => {
                self.notify(SnapcamEvent::ImageSaveFailed {
                    path,
                    error: e.to_string(),
                });
            }
        }
        drop(pending);

        Some(self.close(ScreenResult::Accepted))
    }

    /// Throw the shot away and go back to the live preview
    pub fn retake(&mut self) {
        if self.state.capture_state != CaptureState::Reviewing {
            debug!(session = %self.session_id, "Nothing to retake");
            return;
        }

        self.state.reset_to_preview();

        match self.camera.start_preview() {
            Ok(()) => self.notify(SnapcamEvent::PreviewShown),
            Err(e) => warn!(session = %self.session_id, "Failed to restart preview: {}", e),
        }
    }

    /// Leave without writing anything
    pub fn cancel(&mut self) -> ScreenResult {
        self.state.pending = None;
        self.close(ScreenResult::Canceled)
    }

    /// Release the camera; safe to call repeatedly and with a capture in flight.
    ///
    /// An in-flight capture is abandoned, so its late callbacks are dropped.
    pub fn teardown(&mut self) {
        debug!(session = %self.session_id, "Camera got paused");
        if self.state.stage.take().is_some() {
            debug!(session = %self.session_id, "Abandoning capture in flight");
            self.state.debounce = false;
        }
        if self.camera.release() {
            self.notify(SnapcamEvent::CameraReleased);
        }
    }

    /// Record the terminal result and release the camera
    pub fn close(&mut self, result: ScreenResult) -> ScreenResult {
        if let Some(existing) = self.state.result {
            return existing;
        }

        self.teardown();
        self.state.pending = None;
        self.state.result = Some(result);
        self.notify(SnapcamEvent::ScreenClosed { result });
        result
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn state(&self) -> &ScreenState {
        &self.state
    }

    pub fn capture_state(&self) -> CaptureState {
        self.state.capture_state
    }

    pub fn view(&self) -> VisibleView {
        self.state.view
    }

    pub fn is_debounced(&self) -> bool {
        self.state.debounce
    }

    pub fn pending_image(&self) -> Option<&PendingImage> {
        self.state.pending.as_ref()
    }

    pub fn result(&self) -> Option<ScreenResult> {
        self.state.result
    }

    pub fn zoom_capability(&self) -> ZoomCapability {
        self.zoom
    }

    pub fn slider(&self) -> &PositionSlider {
        &self.slider
    }

    pub fn slider_mut(&mut self) -> &mut PositionSlider {
        &mut self.slider
    }

    pub fn camera_released(&self) -> bool {
        self.camera.is_released()
    }

    pub fn launch_params(&self) -> &LaunchParams {
        &self.launch
    }

    fn camera_controls_visible(&self) -> bool {
        self.state.view == VisibleView::Camera
    }

    fn notify(&self, event: SnapcamEvent) {
        // No subscribers is normal for headless hosts
        let _ = self.event_bus.publish(event);
    }
}

impl std::fmt::Debug for CaptureScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureScreen")
            .field("session_id", &self.session_id)
            .field("launch", &self.launch)
            .field("camera", &self.camera)
            .field("zoom", &self.zoom)
            .field("state", &self.state)
            .finish()
    }
}
