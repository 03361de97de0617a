use super::controller::CaptureScreen;
use super::types::{LaunchParams, ScreenResult};
use crate::camera::CameraProvider;
use crate::config::SnapcamConfig;
use crate::error::{Result, ScreenError};
use crate::events::{EventBus, ScreenEvent, ScreenMailbox};
use crate::store::ImageStore;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Serialized event loop driving one [`CaptureScreen`]
pub struct ScreenRuntime {
    screen: CaptureScreen,
    receiver: mpsc::UnboundedReceiver<ScreenEvent>,
    cancellation_token: CancellationToken,
}

impl ScreenRuntime {
    /// Open the screen and return its loop plus the mailbox hosts post to
    pub fn open(
        config: &SnapcamConfig,
        launch: LaunchParams,
        provider: &dyn CameraProvider,
        store: Arc<dyn ImageStore>,
        event_bus: EventBus,
    ) -> Result<(Self, ScreenMailbox)> {
        let (mailbox, receiver) = ScreenMailbox::channel();
        let screen = CaptureScreen::open(config, launch, provider, store, event_bus, &mailbox)?;

        Ok((
            Self {
                screen,
                receiver,
                cancellation_token: CancellationToken::new(),
            },
            mailbox,
        ))
    }

    pub fn screen(&self) -> &CaptureScreen {
        &self.screen
    }

    /// Token that closes the screen as canceled when triggered
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Run until the screen closes.
    ///
    /// Closing every host mailbox, or cancelling the token, tears the screen
    /// down and reports [`ScreenResult::Canceled`].
    pub async fn run(mut self) -> ScreenResult {
        info!(session = %self.screen.session_id(), "Capture screen is running");

        loop {
            tokio::select! {
                event = self.receiver.recv() => {
                    match event {
                        Some(event) => {
                            if let Some(result) = self.screen.handle(event).await {
                                return result;
                            }
                        }
                        None => {
                            debug!(session = %self.screen.session_id(), "All mailboxes dropped");
                            return self.screen.close(ScreenResult::Canceled);
                        }
                    }
                }
                _ = self.cancellation_token.cancelled() => {
                    debug!(session = %self.screen.session_id(), "Screen cancelled by host");
                    return self.screen.close(ScreenResult::Canceled);
                }
            }
        }
    }
}

/// Host-side handle to a screen running on its own task
pub struct ScreenHandle {
    mailbox: Option<ScreenMailbox>,
    task: JoinHandle<ScreenResult>,
    cancellation_token: CancellationToken,
}

impl ScreenHandle {
    /// Open a capture screen and start its loop.
    ///
    /// When the camera cannot be acquired the handle has no mailbox and
    /// [`wait`](Self::wait) resolves to [`ScreenResult::Failed`].
    pub fn spawn(
        config: &SnapcamConfig,
        launch: LaunchParams,
        provider: &dyn CameraProvider,
        store: Arc<dyn ImageStore>,
        event_bus: EventBus,
    ) -> Self {
        match ScreenRuntime::open(config, launch, provider, store, event_bus) {
            Ok((runtime, mailbox)) => {
                let cancellation_token = runtime.cancellation_token();
                Self {
                    mailbox: Some(mailbox),
                    task: tokio::spawn(runtime.run()),
                    cancellation_token,
                }
            }
            Err(e) => {
                error!("Capture screen failed to open: {}", e);
                Self {
                    mailbox: None,
                    task: tokio::spawn(async { ScreenResult::Failed }),
                    cancellation_token: CancellationToken::new(),
                }
            }
        }
    }

    /// Whether the screen opened successfully
    pub fn is_open(&self) -> bool {
        self.mailbox.is_some()
    }

    pub fn mailbox(&self) -> Option<ScreenMailbox> {
        self.mailbox.clone()
    }

    /// Queue an event for the screen
    pub fn post(&self, event: ScreenEvent) -> Result<()> {
        let mailbox = self.mailbox.as_ref().ok_or(ScreenError::Closed)?;
        mailbox.post(event)?;
        Ok(())
    }

    /// Close the screen as canceled from outside its loop
    pub fn cancel(&self) {
        self.cancellation_token.cancel();
    }

    /// Wait for the terminal result
    pub async fn wait(self) -> ScreenResult {
        let Self { mailbox, task, .. } = self;
        let result = match task.await {
            Ok(result) => result,
            Err(e) => {
                error!("{}", ScreenError::Task { details: e.to_string() });
                ScreenResult::Failed
            }
        };
        drop(mailbox);
        result
    }
}
