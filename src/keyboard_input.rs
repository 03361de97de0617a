use crate::error::Result;
use crate::events::{ScreenEvent, ScreenMailbox};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::time::Duration;
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Screen event bound to a key, if any
pub fn event_for_key(code: KeyCode) -> Option<ScreenEvent> {
    match code {
        KeyCode::Char(' ') => Some(ScreenEvent::CaptureTapped),
        KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Up => Some(ScreenEvent::ZoomIn),
        KeyCode::Char('-') | KeyCode::Down => Some(ScreenEvent::ZoomOut),
        KeyCode::Char('a') | KeyCode::Enter => Some(ScreenEvent::Accept),
        KeyCode::Char('r') => Some(ScreenEvent::Retake),
        KeyCode::Char('c') | KeyCode::Char('q') | KeyCode::Esc => Some(ScreenEvent::Cancel),
        KeyCode::Char('p') => Some(ScreenEvent::Pause),
        _ => None,
    }
}

/// Keyboard driver posting user actions to a capture screen
pub struct KeyboardInputHandler {
    mailbox: ScreenMailbox,
    cancellation_token: CancellationToken,
}

impl KeyboardInputHandler {
    pub fn new(mailbox: ScreenMailbox) -> Self {
        Self {
            mailbox,
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Start listening for keyboard input
    pub async fn start(&self) -> Result<()> {
        info!("Starting keyboard input - SPACE capture, +/- zoom, a accept, r retake, c cancel, p pause");

        let mailbox = self.mailbox.clone();
        let cancellation_token = self.cancellation_token.clone();

        task::spawn_blocking(move || {
            if let Err(e) = enable_raw_mode() {
                error!("Failed to enable raw mode for keyboard input: {}", e);
                return;
            }

            debug!("Raw mode enabled - keyboard handler active");

            loop {
                if cancellation_token.is_cancelled() || mailbox.is_closed() {
                    debug!("Keyboard input handler stopping");
                    break;
                }

                match event::poll(Duration::from_millis(100)) {
                    Ok(true) => {
                        if let Ok(Event::Key(key_event)) = event::read() {
                            if key_event.kind != KeyEventKind::Press {
                                continue;
                            }

                            match event_for_key(key_event.code) {
                                Some(screen_event) => {
                                    debug!("Key {:?} -> {}", key_event.code, screen_event.event_type());
                                    if let Err(e) = mailbox.post(screen_event) {
                                        warn!("Screen is no longer accepting input: {}", e);
                                        break;
                                    }
                                }
                                None => debug!("Key pressed: {:?}", key_event.code),
                            }
                        }
                    }
                    Ok(false) => {}
                    Err(e) => {
                        warn!("Error polling for keyboard events: {}", e);
                    }
                }
            }

            if let Err(e) = disable_raw_mode() {
                error!("Failed to disable raw mode: {}", e);
            } else {
                debug!("Raw mode disabled");
            }

            debug!("Keyboard input handler task exited");
        });

        Ok(())
    }

    /// Stop the keyboard input handler
    pub async fn stop(&self) -> Result<()> {
        info!("Stopping keyboard input handler");
        self.cancellation_token.cancel();

        // Give the polling task a chance to restore the terminal itself
        tokio::time::sleep(Duration::from_millis(200)).await;

        let _ = disable_raw_mode();

        Ok(())
    }
}
