use super::*;
use crate::camera::{CameraCall, CameraCallLog, SimulatedCameraBuilder, SimulatedCameraProvider, ZoomCapability};
use crate::config::SnapcamConfig;
use crate::error::{CameraError, SnapcamError};
use crate::events::{EventBus, EventFilter, EventReceiver, ScreenEvent, ScreenMailbox, SnapcamEvent};
use crate::store::{FsImageStore, ImageStore};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};

const IMAGE: &[u8] = &[0xFF, 0xD8, 0x01, 0x02, 0x03, 0xFF, 0xD9];

fn fast_config() -> SnapcamConfig {
    let mut config = SnapcamConfig::default();
    config.camera.autofocus_delay_ms = 1;
    config.camera.capture_delay_ms = 1;
    config
}

fn provider_with(builder: SimulatedCameraBuilder) -> SimulatedCameraProvider {
    builder
        .config(fast_config().camera)
        .image(IMAGE.to_vec())
        .build()
        .unwrap()
}

struct Harness {
    screen: CaptureScreen,
    mailbox: ScreenMailbox,
    receiver: mpsc::UnboundedReceiver<ScreenEvent>,
    provider: SimulatedCameraProvider,
    log: CameraCallLog,
    events: EventReceiver,
    output: PathBuf,
    _dir: TempDir,
}

impl Harness {
    fn open() -> Self {
        Self::open_with(SimulatedCameraBuilder::new())
    }

    fn open_with(builder: SimulatedCameraBuilder) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("capture.jpg");
        Self::open_at(builder, output, dir)
    }

    fn open_at(builder: SimulatedCameraBuilder, output: PathBuf, dir: TempDir) -> Self {
        let provider = provider_with(builder);
        let log = provider.call_log();
        let bus = EventBus::new(64);
        let events = EventReceiver::new(bus.subscribe(), EventFilter::All, "test".to_string());
        let (mailbox, receiver) = ScreenMailbox::channel();
        let store: Arc<dyn ImageStore> = Arc::new(FsImageStore::new());

        let screen = CaptureScreen::open(
            &fast_config(),
            LaunchParams::new(&output),
            &provider,
            store,
            bus,
            &mailbox,
        )
        .unwrap();

        Self {
            screen,
            mailbox,
            receiver,
            provider,
            log,
            events,
            output,
            _dir: dir,
        }
    }

    /// Deliver the next queued event (camera callback or slider notice)
    async fn pump(&mut self) -> Option<ScreenResult> {
        let event = timeout(Duration::from_secs(2), self.receiver.recv())
            .await
            .expect("timed out waiting for screen event")
            .expect("mailbox closed");
        self.screen.handle(event).await
    }

    /// Tap, autofocus, shutter
    async fn capture(&mut self) {
        assert!(self.screen.handle(ScreenEvent::CaptureTapped).await.is_none());
        self.pump().await;
        self.pump().await;
        assert_eq!(self.screen.capture_state(), CaptureState::Reviewing);
    }

    fn published(&mut self) -> Vec<SnapcamEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.events.try_recv().unwrap() {
            events.push(event);
        }
        events
    }
}

#[tokio::test]
async fn test_open_starts_preview() {
    let mut harness = Harness::open();

    assert_eq!(harness.screen.capture_state(), CaptureState::Previewing);
    assert_eq!(harness.screen.view(), VisibleView::Camera);
    assert!(!harness.screen.is_debounced());
    assert!(harness.provider.is_in_use());
    assert_eq!(
        harness.log.calls(),
        vec![CameraCall::Acquire, CameraCall::StartPreview]
    );

    let events = harness.published();
    assert!(matches!(events[0], SnapcamEvent::ScreenOpened { .. }));
    assert!(matches!(events[1], SnapcamEvent::PreviewShown));
}

#[tokio::test]
async fn test_unavailable_camera_fails_without_preview() {
    let provider = provider_with(SimulatedCameraBuilder::new().unavailable());
    let bus = EventBus::new(16);
    let mut events = EventReceiver::new(bus.subscribe(), EventFilter::All, "test".to_string());
    let (mailbox, _receiver) = ScreenMailbox::channel();

    let result = CaptureScreen::open(
        &fast_config(),
        LaunchParams::new("unused.jpg"),
        &provider,
        Arc::new(FsImageStore::new()),
        bus.clone(),
        &mailbox,
    );

    assert!(matches!(
        result,
        Err(SnapcamError::Camera(CameraError::Unavailable { .. }))
    ));
    match events.try_recv().unwrap() {
        Some(SnapcamEvent::ScreenClosed { result }) => assert_eq!(result, ScreenResult::Failed),
        other => panic!("expected ScreenClosed, got {:?}", other),
    }
    assert!(events.try_recv().unwrap().is_none());
    assert!(provider.call_log().calls().is_empty());
}

#[tokio::test]
async fn test_second_tap_is_debounced() {
    let mut harness = Harness::open();

    harness.screen.handle(ScreenEvent::CaptureTapped).await;
    assert!(harness.screen.is_debounced());
    harness.screen.handle(ScreenEvent::CaptureTapped).await;
    assert_eq!(harness.log.count(&CameraCall::Autofocus), 1);

    harness.pump().await;
    harness.screen.handle(ScreenEvent::CaptureTapped).await;
    harness.pump().await;

    assert_eq!(harness.screen.capture_state(), CaptureState::Reviewing);
    assert_eq!(harness.log.count(&CameraCall::Autofocus), 1);
    assert_eq!(harness.log.count(&CameraCall::TakePicture), 1);

    // Still ignored while the review is up
    harness.screen.handle(ScreenEvent::CaptureTapped).await;
    assert_eq!(harness.log.count(&CameraCall::Autofocus), 1);
}

#[tokio::test]
async fn test_autofocus_failure_still_captures() {
    let mut harness = Harness::open_with(SimulatedCameraBuilder::new().autofocus_success(false));

    harness.capture().await;

    assert_eq!(harness.log.count(&CameraCall::TakePicture), 1);
    assert_eq!(harness.screen.pending_image().unwrap().data, IMAGE);
    assert!(harness
        .published()
        .iter()
        .any(|e| matches!(e, SnapcamEvent::AutofocusCompleted { success: false })));
}

#[tokio::test]
async fn test_capture_shows_review() {
    let mut harness = Harness::open();
    let before = chrono::Utc::now();
    harness.capture().await;
    let after = chrono::Utc::now();

    assert_eq!(harness.screen.view(), VisibleView::Review);
    let pending = harness.screen.pending_image().unwrap();
    assert_eq!(pending.len(), IMAGE.len());
    assert_eq!(pending.destination, harness.output);
    assert!(pending.captured_at >= before && pending.captured_at <= after);
    assert!(harness
        .published()
        .iter()
        .any(|e| matches!(e, SnapcamEvent::ReviewShown { byte_count } if *byte_count == IMAGE.len())));
}

#[tokio::test]
async fn test_accept_writes_exact_bytes() {
    let mut harness = Harness::open();
    harness.capture().await;

    let result = harness.screen.handle(ScreenEvent::Accept).await;

    assert_eq!(result, Some(ScreenResult::Accepted));
    assert_eq!(std::fs::read(&harness.output).unwrap(), IMAGE);
    assert!(harness.screen.camera_released());
    assert!(!harness.provider.is_in_use());
    assert_eq!(harness.log.count(&CameraCall::Release), 1);
    assert!(harness.screen.pending_image().is_none());

    let events = harness.published();
    assert!(events
        .iter()
        .any(|e| matches!(e, SnapcamEvent::ImageSaved { byte_count, .. } if *byte_count == IMAGE.len())));
    assert!(matches!(
        events.last(),
        Some(SnapcamEvent::ScreenClosed {
            result: ScreenResult::Accepted
        })
    ));
}

#[tokio::test]
async fn test_accept_reports_success_when_write_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("missing").join("capture.jpg");
    let mut harness = Harness::open_at(SimulatedCameraBuilder::new(), output, dir);
    harness.capture().await;

    let result = harness.screen.handle(ScreenEvent::Accept).await;

    assert_eq!(result, Some(ScreenResult::Accepted));
    assert!(!harness.output.exists());
    assert!(harness.screen.camera_released());
    assert!(harness
        .published()
        .iter()
        .any(|e| matches!(e, SnapcamEvent::ImageSaveFailed { .. })));
}

#[tokio::test]
async fn test_accept_before_capture_is_ignored() {
    let mut harness = Harness::open();

    assert!(harness.screen.handle(ScreenEvent::Accept).await.is_none());
    assert!(harness.screen.handle(ScreenEvent::Retake).await.is_none());
    assert_eq!(harness.screen.capture_state(), CaptureState::Previewing);
    assert!(harness.screen.result().is_none());
    assert!(!harness.output.exists());
}

#[tokio::test]
async fn test_cancel_discards_capture() {
    let mut harness = Harness::open();
    harness.capture().await;

    let result = harness.screen.handle(ScreenEvent::Cancel).await;

    assert_eq!(result, Some(ScreenResult::Canceled));
    assert!(!harness.output.exists());
    assert!(harness.screen.pending_image().is_none());
    assert!(!harness.provider.is_in_use());
}

#[tokio::test]
async fn test_cancel_during_preview() {
    let mut harness = Harness::open();

    let result = harness.screen.handle(ScreenEvent::Cancel).await;

    assert_eq!(result, Some(ScreenResult::Canceled));
    assert!(harness.screen.camera_released());
    assert!(!harness.output.exists());
}

#[tokio::test]
async fn test_retake_returns_to_preview() {
    let mut harness = Harness::open();
    harness.capture().await;

    harness.screen.handle(ScreenEvent::Retake).await;

    assert_eq!(harness.screen.capture_state(), CaptureState::Previewing);
    assert_eq!(harness.screen.view(), VisibleView::Camera);
    assert!(!harness.screen.is_debounced());
    assert!(harness.screen.pending_image().is_none());
    assert_eq!(harness.log.count(&CameraCall::StartPreview), 2);

    harness.capture().await;
    assert_eq!(harness.log.count(&CameraCall::TakePicture), 2);
}

#[tokio::test]
async fn test_zoom_maps_onto_camera_range() {
    let mut harness = Harness::open();

    harness.screen.handle(ScreenEvent::ZoomChanged(0.0)).await;
    harness.screen.handle(ScreenEvent::ZoomChanged(1.0)).await;
    harness.screen.handle(ScreenEvent::ZoomChanged(0.5)).await;

    assert_eq!(harness.log.zoom_levels(), vec![0, 30, 15]);
}

#[tokio::test]
async fn test_unsupported_zoom_never_reaches_camera() {
    let mut harness =
        Harness::open_with(SimulatedCameraBuilder::new().zoom(ZoomCapability::unsupported()));

    harness.screen.handle(ScreenEvent::ZoomChanged(0.7)).await;
    harness.screen.handle(ScreenEvent::ZoomIn).await;
    harness.pump().await;

    assert!(harness.log.zoom_levels().is_empty());
    assert!((harness.screen.slider().position() - 0.1).abs() < 1e-9);
}

#[tokio::test]
async fn test_zoom_buttons_drive_slider_and_camera() {
    let mut harness = Harness::open();

    harness.screen.handle(ScreenEvent::ZoomIn).await;
    harness.pump().await;
    harness.screen.handle(ScreenEvent::ZoomIn).await;
    harness.pump().await;
    harness.screen.handle(ScreenEvent::ZoomOut).await;
    harness.pump().await;

    assert!((harness.screen.slider().position() - 0.1).abs() < 1e-9);
    assert_eq!(harness.log.zoom_levels(), vec![3, 6, 3]);
}

#[tokio::test]
async fn test_slider_touch_drives_zoom() {
    let mut harness = Harness::open();
    let bounds = harness.screen.slider().bounds();
    let x = bounds.center_x() as f64;
    let y = bounds.top as f64;

    harness.screen.handle(ScreenEvent::SliderTouched { x, y }).await;
    harness.pump().await;

    assert_eq!(harness.screen.slider().position(), 1.0);
    assert_eq!(harness.log.zoom_levels(), vec![30]);
}

#[tokio::test]
async fn test_zoom_controls_ignored_during_review() {
    let mut harness = Harness::open();
    harness.capture().await;

    harness.screen.handle(ScreenEvent::ZoomIn).await;
    harness.screen.handle(ScreenEvent::ZoomOut).await;

    assert_eq!(harness.screen.slider().position(), 0.0);
    assert!(harness.receiver.try_recv().is_err());
}

#[tokio::test]
async fn test_pause_releases_camera() {
    let mut harness = Harness::open();

    harness.screen.handle(ScreenEvent::Pause).await;
    assert!(harness.screen.camera_released());
    assert!(!harness.provider.is_in_use());

    harness.screen.handle(ScreenEvent::ZoomChanged(0.5)).await;
    harness.screen.handle(ScreenEvent::CaptureTapped).await;
    harness.screen.handle(ScreenEvent::Pause).await;

    assert!(harness.log.zoom_levels().is_empty());
    assert_eq!(harness.log.count(&CameraCall::Autofocus), 0);
    assert_eq!(harness.log.count(&CameraCall::Release), 1);

    assert_eq!(
        harness.screen.handle(ScreenEvent::Cancel).await,
        Some(ScreenResult::Canceled)
    );
    assert_eq!(harness.log.count(&CameraCall::Release), 1);
}

#[tokio::test]
async fn test_pause_with_capture_in_flight() {
    let mut harness = Harness::open();

    harness.screen.handle(ScreenEvent::CaptureTapped).await;
    harness.screen.handle(ScreenEvent::Pause).await;
    // Autofocus callback still arrives but the shutter is never reached
    harness.pump().await;

    assert_eq!(harness.log.count(&CameraCall::TakePicture), 0);
    assert_eq!(harness.screen.capture_state(), CaptureState::Previewing);
    assert!(!harness.screen.is_debounced());
}

#[tokio::test]
async fn test_pause_while_shutter_open_drops_picture() {
    let mut harness = Harness::open();

    harness.screen.handle(ScreenEvent::CaptureTapped).await;
    harness.pump().await;
    assert_eq!(harness.log.count(&CameraCall::TakePicture), 1);

    harness.screen.handle(ScreenEvent::Pause).await;
    assert!(!harness.screen.is_debounced());
    // Image bytes still arrive after the camera was released
    harness.pump().await;

    assert_eq!(harness.screen.capture_state(), CaptureState::Previewing);
    assert_eq!(harness.screen.view(), VisibleView::Camera);
    assert!(harness.screen.pending_image().is_none());
    assert!(!harness
        .published()
        .iter()
        .any(|e| matches!(e, SnapcamEvent::ReviewShown { .. })));

    // Retake has nothing to act on and never touches the released camera
    harness.screen.handle(ScreenEvent::Retake).await;
    assert_eq!(harness.log.count(&CameraCall::StartPreview), 1);
    assert!(harness.screen.camera_released());
}

#[tokio::test]
async fn test_stale_picture_is_discarded() {
    let mut harness = Harness::open();

    harness
        .screen
        .handle(ScreenEvent::PictureTaken {
            data: IMAGE.to_vec(),
        })
        .await;

    assert_eq!(harness.screen.capture_state(), CaptureState::Previewing);
    assert!(harness.screen.pending_image().is_none());
}

#[tokio::test]
async fn test_events_after_close_are_ignored() {
    let mut harness = Harness::open();
    harness.screen.handle(ScreenEvent::Cancel).await;

    assert!(harness.screen.handle(ScreenEvent::Accept).await.is_none());
    assert!(harness.screen.handle(ScreenEvent::Cancel).await.is_none());
    assert_eq!(harness.screen.result(), Some(ScreenResult::Canceled));
    drop(harness.mailbox);
}

async fn wait_for<F>(events: &mut EventReceiver, mut predicate: F) -> SnapcamEvent
where
    F: FnMut(&SnapcamEvent) -> bool,
{
    timeout(Duration::from_secs(2), async {
        loop {
            let event = events.recv().await.unwrap();
            if predicate(&event) {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for screen notice")
}

#[tokio::test]
async fn test_handle_runs_capture_to_acceptance() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("shot.jpg");
    let provider = provider_with(SimulatedCameraBuilder::new());
    let bus = EventBus::new(64);
    let mut events = EventReceiver::new(bus.subscribe(), EventFilter::All, "test".to_string());

    let handle = ScreenHandle::spawn(
        &fast_config(),
        LaunchParams::new(&output),
        &provider,
        Arc::new(FsImageStore::new()),
        bus,
    );
    assert!(handle.is_open());

    handle.post(ScreenEvent::CaptureTapped).unwrap();
    wait_for(&mut events, |e| matches!(e, SnapcamEvent::ReviewShown { .. })).await;
    handle.post(ScreenEvent::Accept).unwrap();

    assert_eq!(handle.wait().await, ScreenResult::Accepted);
    assert_eq!(std::fs::read(&output).unwrap(), IMAGE);
    assert!(!provider.is_in_use());
}

#[tokio::test]
async fn test_handle_reports_failure_for_unavailable_camera() {
    let provider = provider_with(SimulatedCameraBuilder::new().unavailable());

    let handle = ScreenHandle::spawn(
        &fast_config(),
        LaunchParams::new("unused.jpg"),
        &provider,
        Arc::new(FsImageStore::new()),
        EventBus::new(16),
    );

    assert!(!handle.is_open());
    assert!(matches!(
        handle.post(ScreenEvent::CaptureTapped),
        Err(SnapcamError::Screen(crate::error::ScreenError::Closed))
    ));
    assert_eq!(handle.wait().await, ScreenResult::Failed);
}

#[tokio::test]
async fn test_handle_cancel() {
    let provider = provider_with(SimulatedCameraBuilder::new());
    let handle = ScreenHandle::spawn(
        &fast_config(),
        LaunchParams::new("unused.jpg"),
        &provider,
        Arc::new(FsImageStore::new()),
        EventBus::new(16),
    );

    handle.cancel();

    assert_eq!(handle.wait().await, ScreenResult::Canceled);
    assert!(!provider.is_in_use());
}

#[tokio::test]
async fn test_dropping_every_mailbox_cancels() {
    let provider = provider_with(SimulatedCameraBuilder::new());
    let (runtime, mailbox) = ScreenRuntime::open(
        &fast_config(),
        LaunchParams::new("unused.jpg"),
        &provider,
        Arc::new(FsImageStore::new()),
        EventBus::new(16),
    )
    .unwrap();
    assert_eq!(runtime.screen().capture_state(), CaptureState::Previewing);

    drop(mailbox);

    let result = timeout(Duration::from_secs(2), runtime.run()).await.unwrap();
    assert_eq!(result, ScreenResult::Canceled);
    assert!(!provider.is_in_use());
}
