use packing_camera_core::{
    Blob, CameraError, CoreResult,
    platform::{Downloader, StagedDownload},
};

use std::{
    fs,
    panic::Location,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use directories::UserDirs;
use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Download fallback: stages the blob as a temp file and copies it into the
/// user's downloads folder.
#[derive(Debug, Clone)]
pub struct DownloadFolder {
    staging_dir: PathBuf,
    target_dir: Option<PathBuf>,
}

impl DownloadFolder {
    /// Stage in `staging_dir`, deliver into `target_dir`.
    pub fn new(staging_dir: PathBuf, target_dir: Option<PathBuf>) -> Self {
        Self {
            staging_dir,
            target_dir,
        }
    }

    /// Stage in the system temp dir, deliver into the platform downloads
    /// folder when one exists.
    pub fn from_user_dirs() -> Self {
        let target_dir = UserDirs::new().and_then(|dirs| dirs.download_dir().map(Path::to_path_buf));
        if target_dir.is_none() {
            warn!("No downloads folder found, downloads will fail");
        }
        Self::new(std::env::temp_dir(), target_dir)
    }

    /// `filename`, or `name (n).ext` when that already exists in `dir`.
    fn unique_destination(dir: &Path, filename: &str) -> PathBuf {
        let candidate = dir.join(filename);
        if !candidate.exists() {
            return candidate;
        }

        let (stem, ext) = match filename.rsplit_once('.') {
            Some((stem, ext)) => (stem, format!(".{}", ext)),
            None => (filename, String::new()),
        };

        (1..)
            .map(|n| dir.join(format!("{} ({}){}", stem, n, ext)))
            .find(|path| !path.exists())
            .unwrap_or(candidate)
    }
}

#[async_trait]
impl Downloader for DownloadFolder {
    #[instrument(skip(self, blob), fields(byte_len = blob.len()))]
    async fn stage(&self, blob: &Blob) -> CoreResult<StagedDownload> {
        let path = self
            .staging_dir
            .join(format!("packing-camera-{}.part", Uuid::new_v4()));

        fs::write(&path, blob.bytes()).map_err(|e| CameraError::Platform {
            reason: format!("Failed to stage download at {:?}: {}", path, e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        debug!(path = ?path, "Download staged");

        Ok(StagedDownload {
            reference: path.to_string_lossy().into_owned(),
            byte_len: blob.len(),
        })
    }

    #[instrument(skip(self))]
    async fn deliver(&self, staged: &StagedDownload, filename: &str) -> CoreResult<()> {
        let Some(target_dir) = &self.target_dir else {
            return Err(CameraError::Platform {
                reason: "No downloads folder available".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        };

        if filename.is_empty() || filename.contains(['/', '\\']) {
            return Err(CameraError::Platform {
                reason: format!("Invalid download name '{}'", filename),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        fs::create_dir_all(target_dir).map_err(|e| CameraError::Platform {
            reason: format!("Failed to create downloads folder: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let destination = Self::unique_destination(target_dir, filename);
        fs::copy(&staged.reference, &destination).map_err(|e| CameraError::Platform {
            reason: format!("Failed to copy download to {:?}: {}", destination, e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(destination = ?destination, "Download delivered");

        Ok(())
    }

    fn release(&self, staged: StagedDownload) {
        if let Err(e) = fs::remove_file(&staged.reference) {
            warn!(reference = %staged.reference, error = %e, "Failed to remove staged download");
        }
    }
}
