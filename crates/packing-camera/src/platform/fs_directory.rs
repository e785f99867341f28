//! Directory capability backed by a local folder.

use packing_camera_core::{
    CameraError, CoreResult,
    platform::{DirectoryHandle, DirectoryPicker, PermissionState, WritableFile},
};

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    panic::Location,
    path::PathBuf,
    sync::Arc,
};

use async_trait::async_trait;
use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};

/// Offers the configured save folder whenever a directory is requested.
///
/// Without a configured folder the prompt is always declined.
#[derive(Debug, Clone, Default)]
pub struct FsDirectoryPicker {
    directory: Option<PathBuf>,
}

impl FsDirectoryPicker {
    /// Picker answering with `directory`.
    pub fn new(directory: Option<PathBuf>) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl DirectoryPicker for FsDirectoryPicker {
    async fn pick_directory(&self) -> CoreResult<Option<Arc<dyn DirectoryHandle>>> {
        match &self.directory {
            Some(path) => {
                info!(directory = ?path, "Save folder offered");
                let directory: Arc<dyn DirectoryHandle> = Arc::new(FsDirectory::new(path.clone()));
                Ok(Some(directory))
            }
            None => {
                debug!("No save folder configured");
                Ok(None)
            }
        }
    }
}

/// A local folder recordings are written into.
#[derive(Debug, Clone)]
pub struct FsDirectory {
    path: PathBuf,
}

impl FsDirectory {
    /// Capability for `path`. The folder is created on permission request.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn permission(&self) -> PermissionState {
        match fs::metadata(&self.path) {
            Ok(meta) if meta.is_dir() && !meta.permissions().readonly() => {
                PermissionState::Granted
            }
            Ok(_) => PermissionState::Denied,
            Err(_) => PermissionState::Unknown,
        }
    }
}

#[async_trait]
impl DirectoryHandle for FsDirectory {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    async fn query_permission(&self) -> PermissionState {
        self.permission()
    }

    #[instrument(skip(self), fields(directory = %self.path.display()))]
    async fn request_permission(&self) -> PermissionState {
        if let Err(e) = fs::create_dir_all(&self.path) {
            warn!(error = %e, "Cannot create save folder");
            return PermissionState::Denied;
        }

        match self.permission() {
            PermissionState::Granted => PermissionState::Granted,
            _ => PermissionState::Denied,
        }
    }

    #[instrument(skip(self), fields(directory = %self.path.display()))]
    async fn create_writable(&self, filename: &str) -> CoreResult<Box<dyn WritableFile>> {
        if filename.is_empty() || filename.contains(['/', '\\']) || filename == ".." {
            return Err(CameraError::StorageWriteFailed {
                filename: filename.to_string(),
                reason: "File name must not contain path separators".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let path = self.path.join(filename);
        let file = File::create(&path).map_err(|e| CameraError::StorageWriteFailed {
            filename: filename.to_string(),
            reason: format!("Failed to create file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        debug!(path = ?path, "Writable file opened");

        Ok(Box::new(FsFile {
            filename: filename.to_string(),
            writer: Some(BufWriter::new(file)),
        }))
    }
}

struct FsFile {
    filename: String,
    writer: Option<BufWriter<File>>,
}

impl FsFile {
    #[track_caller]
    fn failed(&self, action: &str, e: std::io::Error) -> CameraError {
        CameraError::StorageWriteFailed {
            filename: self.filename.clone(),
            reason: format!("Failed to {}: {}", action, e),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl WritableFile for FsFile {
    #[track_caller]
    fn write_all(&mut self, data: &[u8]) -> CoreResult<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Err(CameraError::InvalidState {
                reason: format!("{} is already closed", self.filename),
                location: ErrorLocation::from(Location::caller()),
            });
        };

        match writer.write_all(data) {
            Ok(()) => Ok(()),
            Err(e) => Err(self.failed("write", e)),
        }
    }

    #[track_caller]
    fn close(&mut self) -> CoreResult<()> {
        let Some(mut writer) = self.writer.take() else {
            return Ok(());
        };

        writer.flush().map_err(|e| self.failed("flush", e))?;
        writer.get_ref().sync_all().map_err(|e| self.failed("sync", e))
    }
}
