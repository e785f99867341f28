use crate::{CoreResult, storage::Blob};

use std::{fmt, sync::Arc};

use async_trait::async_trait;

/// Permission state of a storage capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionState {
    /// Not yet queried.
    #[default]
    Unknown,
    /// Write access granted.
    Granted,
    /// Write access refused or revoked.
    Denied,
}

/// Persistent, revocable capability to a writable directory.
#[async_trait]
pub trait DirectoryHandle: Send + Sync + fmt::Debug {
    /// Display name of the directory.
    fn name(&self) -> String;

    /// Current write permission, without prompting.
    async fn query_permission(&self) -> PermissionState;

    /// Prompt for write permission.
    async fn request_permission(&self) -> PermissionState;

    /// Create or truncate `filename` inside the directory.
    async fn create_writable(&self, filename: &str) -> CoreResult<Box<dyn WritableFile>>;
}

/// Open write handle inside a directory capability.
pub trait WritableFile: Send {
    /// Append `data`.
    fn write_all(&mut self, data: &[u8]) -> CoreResult<()>;

    /// Flush and release the handle. Called exactly once.
    fn close(&mut self) -> CoreResult<()>;
}

/// Prompts the user for a directory capability.
#[async_trait]
pub trait DirectoryPicker: Send + Sync {
    /// `Ok(None)` when the user declines.
    async fn pick_directory(&self) -> CoreResult<Option<Arc<dyn DirectoryHandle>>>;
}

/// Temporary object created for a one-shot download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedDownload {
    /// Platform reference to the staged bytes (object URL, temp path, ...).
    pub reference: String,
    /// Size of the staged blob.
    pub byte_len: usize,
}

/// One-shot client-side download.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Create a temporary object holding `blob`.
    async fn stage(&self, blob: &Blob) -> CoreResult<StagedDownload>;

    /// Hand the staged object to the user under `filename`.
    async fn deliver(&self, staged: &StagedDownload, filename: &str) -> CoreResult<()>;

    /// Drop the temporary object. Must not fail.
    fn release(&self, staged: StagedDownload);
}
