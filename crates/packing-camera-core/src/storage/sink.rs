use crate::{
    CameraError, CoreResult,
    platform::{DirectoryPicker, Downloader, PermissionState},
    storage::{Blob, StorageTarget, WriteScope},
};

use std::{panic::Location, sync::Arc};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};

/// Where a finished recording ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    /// Written into the granted directory.
    Saved {
        /// Directory display name.
        directory: String,
        /// File entry name.
        filename: String,
    },
    /// Handed to the user as a one-shot download.
    Downloaded {
        /// Suggested download name.
        filename: String,
    },
}

impl PersistOutcome {
    /// File name the recording was stored under.
    pub fn filename(&self) -> &str {
        match self {
            PersistOutcome::Saved { filename, .. } | PersistOutcome::Downloaded { filename } => {
                filename
            }
        }
    }
}

/// Commits finished recordings to a directory capability or a download.
///
/// Persistent write access is revocable, so every persist re-checks the
/// permission and falls back to a download instead of failing.
pub struct StorageSink {
    picker: Arc<dyn DirectoryPicker>,
    downloader: Arc<dyn Downloader>,
}

impl StorageSink {
    /// Create a sink over a directory prompt and a download fallback.
    pub fn new(picker: Arc<dyn DirectoryPicker>, downloader: Arc<dyn Downloader>) -> Self {
        Self { picker, downloader }
    }

    /// Save `blob` as `filename`, or download it when saving isn't possible.
    ///
    /// # Errors
    ///
    /// Only `StorageUnavailable`, when the download fallback fails too.
    #[instrument(skip(self, target, blob), fields(byte_len = blob.len()))]
    pub async fn persist(
        &self,
        target: &mut StorageTarget,
        blob: &Blob,
        filename: &str,
    ) -> CoreResult<PersistOutcome> {
        match self.save_to_directory(target, blob, filename).await {
            Ok(Some(directory)) => {
                info!(directory = %directory, filename, "Recording saved");
                return Ok(PersistOutcome::Saved {
                    directory,
                    filename: filename.to_string(),
                });
            }
            Ok(None) => debug!("No writable directory, falling back to download"),
            Err(e) => warn!(error = %e, "Directory write failed, falling back to download"),
        }

        self.download(blob, filename).await?;

        info!(filename, "Recording downloaded");

        Ok(PersistOutcome::Downloaded {
            filename: filename.to_string(),
        })
    }

    /// `Ok(None)` when no capability could be used.
    async fn save_to_directory(
        &self,
        target: &mut StorageTarget,
        blob: &Blob,
        filename: &str,
    ) -> CoreResult<Option<String>> {
        if target.directory().is_none() {
            match self.picker.pick_directory().await {
                Ok(Some(directory)) => target.grant(directory),
                Ok(None) => {
                    info!("Directory prompt declined");
                    return Ok(None);
                }
                Err(e) => {
                    warn!(error = %e, "Directory prompt failed");
                    return Ok(None);
                }
            }
        }

        let Some(directory) = target.directory().cloned() else {
            return Ok(None);
        };

        let mut permission = directory.query_permission().await;
        if permission != PermissionState::Granted {
            debug!(?permission, "Write permission not granted, requesting");
            permission = directory.request_permission().await;
        }
        target.set_permission(permission);

        if permission != PermissionState::Granted {
            warn!(directory = %directory.name(), "Write permission denied");
            target.invalidate();
            return Ok(None);
        }

        let file = directory.create_writable(filename).await?;
        let mut scope = WriteScope::new(file);
        scope.write_all(blob.bytes())?;
        scope.close()?;

        Ok(Some(directory.name()))
    }

    async fn download(&self, blob: &Blob, filename: &str) -> CoreResult<()> {
        let staged =
            self.downloader
                .stage(blob)
                .await
                .map_err(|e| CameraError::StorageUnavailable {
                    reason: format!("Failed to stage download: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;

        let delivered = self.downloader.deliver(&staged, filename).await;
        self.downloader.release(staged);

        delivered.map_err(|e| CameraError::StorageUnavailable {
            reason: format!("Failed to deliver download: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}
