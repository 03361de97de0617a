use crate::error::EventBusError;
use crate::screen::ScreenResult;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};

/// Notices published by a capture screen for hosts and observers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SnapcamEvent {
    /// Screen acquired the camera and is about to show the preview
    ScreenOpened { session_id: String },
    /// Live preview is visible
    PreviewShown,
    /// Capture button accepted a tap and autofocus was started
    CaptureRequested,
    /// Autofocus reported back; capture follows regardless of the outcome
    AutofocusCompleted { success: bool },
    /// Still image arrived and the review controls are visible
    ReviewShown { byte_count: usize },
    /// Zoom slider moved to a new position
    SliderMoved { position: f64 },
    /// Zoom level was applied to the camera
    ZoomApplied { level: u32 },
    /// Accepted image was written out
    ImageSaved { path: String, byte_count: usize },
    /// Accepted image could not be written; the screen still reports success
    ImageSaveFailed { path: String, error: String },
    /// Camera handle was released
    CameraReleased,
    /// Screen closed with a terminal result
    ScreenClosed { result: ScreenResult },
}

impl SnapcamEvent {
    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            SnapcamEvent::ScreenOpened { session_id } => {
                format!("Capture screen {} opened", session_id)
            }
            SnapcamEvent::PreviewShown => "Preview shown".to_string(),
            SnapcamEvent::CaptureRequested => "Capture requested".to_string(),
            SnapcamEvent::AutofocusCompleted { success } => format!(
                "Autofocus {}",
                if *success { "succeeded" } else { "failed" }
            ),
            SnapcamEvent::ReviewShown { byte_count } => {
                format!("Reviewing captured image ({} bytes)", byte_count)
            }
            SnapcamEvent::SliderMoved { position } => {
                format!("Zoom slider moved to {:.2}", position)
            }
            SnapcamEvent::ZoomApplied { level } => format!("Zoom level {} applied", level),
            SnapcamEvent::ImageSaved { path, byte_count } => {
                format!("Saved {} bytes to {}", byte_count, path)
            }
            SnapcamEvent::ImageSaveFailed { path, error } => {
                format!("Failed to save {}: {}", path, error)
            }
            SnapcamEvent::CameraReleased => "Camera released".to_string(),
            SnapcamEvent::ScreenClosed { result } => format!("Screen closed: {}", result),
        }
    }

    /// Get the event type as a string for filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            SnapcamEvent::ScreenOpened { .. } => "screen_opened",
            SnapcamEvent::PreviewShown => "preview_shown",
            SnapcamEvent::CaptureRequested => "capture_requested",
            SnapcamEvent::AutofocusCompleted { .. } => "autofocus_completed",
            SnapcamEvent::ReviewShown { .. } => "review_shown",
            SnapcamEvent::SliderMoved { .. } => "slider_moved",
            SnapcamEvent::ZoomApplied { .. } => "zoom_applied",
            SnapcamEvent::ImageSaved { .. } => "image_saved",
            SnapcamEvent::ImageSaveFailed { .. } => "image_save_failed",
            SnapcamEvent::CameraReleased => "camera_released",
            SnapcamEvent::ScreenClosed { .. } => "screen_closed",
        }
    }
}

/// Broadcast bus for screen notices
pub struct EventBus {
    sender: broadcast::Sender<SnapcamEvent>,
    debug_logging: bool,
}

impl EventBus {
    /// Create a new event bus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            debug_logging: false,
        }
    }

    /// Create a new event bus with debug logging enabled
    pub fn with_debug_logging(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            debug_logging: true,
        }
    }

    /// Subscribe to events and get a receiver
    pub fn subscribe(&self) -> broadcast::Receiver<SnapcamEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: SnapcamEvent) -> Result<usize, EventBusError> {
        match &event {
            SnapcamEvent::ImageSaveFailed { path, error } => {
                error!("Failed to save captured image to {}: {}", path, error);
            }
            SnapcamEvent::ScreenClosed { result } => {
                info!("Capture screen closed: {}", result);
            }
            _ => {
                if self.debug_logging {
                    debug!("Event: {}", event.description());
                }
            }
        }

        self.sender
            .send(event)
            .map_err(|e| EventBusError::PublishFailed {
                details: e.to_string(),
            })
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            debug_logging: self.debug_logging,
        }
    }
}

/// Event filter for selective event handling
#[derive(Debug, Clone)]
pub enum EventFilter {
    /// Accept all events
    All,
    /// Accept only specific event types
    EventTypes(Vec<&'static str>),
}

impl EventFilter {
    /// Check if an event passes this filter
    pub fn matches(&self, event: &SnapcamEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::EventTypes(types) => types.contains(&event.event_type()),
        }
    }
}

/// Event receiver with filtering
pub struct EventReceiver {
    receiver: broadcast::Receiver<SnapcamEvent>,
    filter: EventFilter,
    name: String,
}

impl EventReceiver {
    /// Create a new event receiver with a filter
    pub fn new(
        receiver: broadcast::Receiver<SnapcamEvent>,
        filter: EventFilter,
        name: String,
    ) -> Self {
        Self {
            receiver,
            filter,
            name,
        }
    }

    /// Receive the next filtered event
    pub async fn recv(&mut self) -> Result<SnapcamEvent, EventBusError> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    if self.filter.matches(&event) {
                        debug!(
                            "Receiver '{}' received event: {}",
                            self.name,
                            event.description()
                        );
                        return Ok(event);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Receiver '{}' lagged behind by {} events", self.name, n);
                    return Err(EventBusError::PublishFailed {
                        details: format!("Receiver lagged behind by {} events", n),
                    });
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Event bus closed for receiver '{}'", self.name);
                    return Err(EventBusError::ChannelClosed);
                }
            }
        }
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&mut self) -> Result<Option<SnapcamEvent>, EventBusError> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.filter.matches(&event) {
                        return Ok(Some(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => {
                    return Ok(None);
                }
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    warn!("Receiver '{}' lagged behind by {} events", self.name, n);
                    return Err(EventBusError::PublishFailed {
                        details: format!("Receiver lagged behind by {} events", n),
                    });
                }
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(EventBusError::ChannelClosed);
                }
            }
        }
    }
}

/// Messages handled by the screen's event loop.
///
/// User actions and camera completions both arrive here, so every state
/// change on the screen happens in the order the loop receives them.
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenEvent {
    /// Capture button tapped
    CaptureTapped,
    /// Camera finished autofocusing
    AutofocusCompleted { success: bool },
    /// Camera delivered the still image
    PictureTaken { data: Vec<u8> },
    /// Zoom slider reported a new normalized position
    ZoomChanged(f64),
    /// Zoom-in button tapped
    ZoomIn,
    /// Zoom-out button tapped
    ZoomOut,
    /// Pointer touched the zoom slider at widget coordinates
    SliderTouched { x: f64, y: f64 },
    /// "Use photo" tapped
    Accept,
    /// "Retake" tapped
    Retake,
    /// "Cancel" tapped
    Cancel,
    /// Host paused the screen
    Pause,
}

impl ScreenEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            ScreenEvent::CaptureTapped => "capture_tapped",
            ScreenEvent::AutofocusCompleted { .. } => "autofocus_completed",
            ScreenEvent::PictureTaken { .. } => "picture_taken",
            ScreenEvent::ZoomChanged(_) => "zoom_changed",
            ScreenEvent::ZoomIn => "zoom_in",
            ScreenEvent::ZoomOut => "zoom_out",
            ScreenEvent::SliderTouched { .. } => "slider_touched",
            ScreenEvent::Accept => "accept",
            ScreenEvent::Retake => "retake",
            ScreenEvent::Cancel => "cancel",
            ScreenEvent::Pause => "pause",
        }
    }
}

/// Sending half of a screen's event loop
#[derive(Debug, Clone)]
pub struct ScreenMailbox {
    sender: mpsc::UnboundedSender<ScreenEvent>,
}

impl ScreenMailbox {
    /// Create a mailbox and the receiver the event loop drains
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ScreenEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Queue an event for the screen's event loop
    pub fn post(&self, event: ScreenEvent) -> Result<(), EventBusError> {
        self.sender
            .send(event)
            .map_err(|_| EventBusError::MailboxClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Handle that does not keep the event loop alive
    pub fn downgrade(&self) -> WeakScreenMailbox {
        WeakScreenMailbox {
            sender: self.sender.downgrade(),
        }
    }
}

/// Non-owning mailbox held by the screen itself, so the loop still ends
/// once every host-side mailbox is dropped
#[derive(Debug, Clone)]
pub struct WeakScreenMailbox {
    sender: mpsc::WeakUnboundedSender<ScreenEvent>,
}

impl WeakScreenMailbox {
    pub fn upgrade(&self) -> Option<ScreenMailbox> {
        self.sender.upgrade().map(|sender| ScreenMailbox { sender })
    }

    /// Queue an event if the loop is still reachable
    pub fn post(&self, event: ScreenEvent) -> Result<(), EventBusError> {
        self.upgrade()
            .ok_or(EventBusError::MailboxClosed)?
            .post(event)
    }
}
