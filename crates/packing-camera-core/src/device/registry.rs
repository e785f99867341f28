use crate::{
    CameraError, CoreResult,
    platform::{CameraPlatform, CaptureDevice, DeviceKind},
};

use std::panic::Location;

use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};

/// Known video inputs and the active selection.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: Vec<CaptureDevice>,
    selected: Option<String>,
}

impl DeviceRegistry {
    /// Empty registry; call [`enumerate`](Self::enumerate) to populate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh the device list from the platform.
    ///
    /// Platform errors are logged and yield an empty list so the caller can
    /// still fall back to the default device. The first device is selected
    /// when nothing (or a vanished device) was selected.
    #[instrument(skip(self, platform))]
    pub async fn enumerate(&mut self, platform: &dyn CameraPlatform) -> &[CaptureDevice] {
        self.devices = match platform.enumerate_devices().await {
            Ok(devices) => devices
                .into_iter()
                .filter(|d| d.kind == DeviceKind::VideoInput)
                .collect(),
            Err(e) => {
                warn!(error = %e, "Device enumeration failed, continuing with no devices");
                Vec::new()
            }
        };

        let still_present = self
            .selected
            .as_deref()
            .is_some_and(|id| self.devices.iter().any(|d| d.id == id));

        if !still_present {
            self.selected = self.devices.first().map(|d| d.id.clone());
            debug!(selected = ?self.selected, "Default device selected");
        }

        info!(device_count = self.devices.len(), "Devices enumerated");

        &self.devices
    }

    /// Select a device from the last enumeration.
    ///
    /// # Errors
    ///
    /// Returns `DeviceNotFound` if `id` was not enumerated.
    #[track_caller]
    pub fn select(&mut self, id: &str) -> CoreResult<&CaptureDevice> {
        let device = self
            .devices
            .iter()
            .find(|d| d.id == id)
            .ok_or_else(|| CameraError::DeviceNotFound {
                device_id: id.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.selected = Some(device.id.clone());
        info!(device_id = %device.id, label = %device.label, "Device selected");

        Ok(device)
    }

    /// Currently selected device id.
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Devices from the last enumeration.
    pub fn devices(&self) -> &[CaptureDevice] {
        &self.devices
    }
}
