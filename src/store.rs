use crate::error::{Result, StoreError};
use async_trait::async_trait;
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Destination for accepted captures
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn write(&self, path: &Path, bytes: &[u8]) -> Result<()>;
}

/// Writes captures straight to the local filesystem
#[derive(Debug, Clone, Default)]
pub struct FsImageStore {
    create_parent_dirs: bool,
}

impl FsImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create missing parent directories before writing
    pub fn with_parent_dirs(mut self) -> Self {
        self.create_parent_dirs = true;
        self
    }
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        if self.create_parent_dirs {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StoreError::DirectoryCreation {
                        path: parent.display().to_string(),
                        source: e,
                    })?;
            }
        }

        fs::write(path, bytes)
            .await
            .map_err(|e| StoreError::FileWrite {
                path: path.display().to_string(),
                source: e,
            })?;

        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}
