use crate::platform::{DirectoryHandle, PermissionState};

use std::sync::Arc;

use tracing::info;

/// Directory capability held across recordings.
///
/// Lazily filled by the first persist; cleared again when permission turns
/// out to be denied so the next persist prompts afresh.
#[derive(Debug, Default, Clone)]
pub struct StorageTarget {
    directory: Option<Arc<dyn DirectoryHandle>>,
    permission: PermissionState,
}

impl StorageTarget {
    /// Empty target with unknown permission.
    pub fn new() -> Self {
        Self::default()
    }

    /// Target already holding a capability.
    pub fn with_directory(directory: Arc<dyn DirectoryHandle>) -> Self {
        Self {
            directory: Some(directory),
            permission: PermissionState::Unknown,
        }
    }

    /// Held capability, if any.
    pub fn directory(&self) -> Option<&Arc<dyn DirectoryHandle>> {
        self.directory.as_ref()
    }

    /// Last observed permission.
    pub fn permission(&self) -> PermissionState {
        self.permission
    }

    pub(crate) fn grant(&mut self, directory: Arc<dyn DirectoryHandle>) {
        info!(directory = %directory.name(), "Directory capability acquired");
        self.directory = Some(directory);
        self.permission = PermissionState::Unknown;
    }

    pub(crate) fn set_permission(&mut self, permission: PermissionState) {
        self.permission = permission;
    }

    /// Forget the capability and remember the denial.
    pub(crate) fn invalidate(&mut self) {
        if let Some(directory) = self.directory.take() {
            info!(directory = %directory.name(), "Directory capability invalidated");
        }
        self.permission = PermissionState::Denied;
    }
}
