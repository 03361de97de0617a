use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnapcamError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] toml::de::Error),

    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),

    #[error("Image store error: {0}")]
    Store(#[from] StoreError),

    #[error("Event bus error: {0}")]
    EventBus(#[from] EventBusError),

    #[error("Screen error: {0}")]
    Screen(#[from] ScreenError),

    #[error("System error: {message}")]
    System { message: String },
}

impl SnapcamError {
    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::System {
            message: message.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    #[error("Camera {index} is unavailable: {details}")]
    Unavailable { index: u32, details: String },

    #[error("Camera handle has already been released")]
    Released,

    #[error("Camera parameter rejected: {details}")]
    Parameter { details: String },

    #[error("Camera capture failed: {details}")]
    Capture { details: String },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to write {path}: {source}")]
    FileWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory {path}: {source}")]
    DirectoryCreation {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum EventBusError {
    #[error("Failed to publish event: {details}")]
    PublishFailed { details: String },

    #[error("Event channel closed")]
    ChannelClosed,

    #[error("Screen mailbox is closed")]
    MailboxClosed,
}

#[derive(Error, Debug)]
pub enum ScreenError {
    #[error("Screen has already been closed")]
    Closed,

    #[error("Screen task failed: {details}")]
    Task { details: String },
}

pub type Result<T> = std::result::Result<T, SnapcamError>;
