use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where finished recordings are saved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory offered when a save location is requested. `None` means the
    /// prompt is declined and recordings go to the downloads folder.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}
