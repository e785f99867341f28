use crate::{
    CameraError,
    device::DeviceRegistry,
    platform::{CaptureDevice, DeviceKind},
    tests::fakes::FakeCamera,
};

use std::sync::atomic::Ordering;

/// WHAT: Enumeration keeps only video inputs and auto-selects the first
/// WHY: The UI needs a default camera without user interaction
#[tokio::test]
async fn given_mixed_devices_when_enumerating_then_only_cameras_kept_and_first_selected() {
    // Given: A platform reporting a microphone and two cameras
    let camera = FakeCamera::with_devices(vec![
        CaptureDevice {
            id: "mic-1".to_string(),
            label: "Headset".to_string(),
            kind: DeviceKind::AudioInput,
        },
        CaptureDevice::video_input("cam-a", "Front camera"),
        CaptureDevice::video_input("cam-b", "Overhead camera"),
    ]);
    let mut registry = DeviceRegistry::new();

    // When: Enumerating
    let ids: Vec<String> = registry
        .enumerate(camera.as_ref())
        .await
        .iter()
        .map(|d| d.id.clone())
        .collect();

    // Then: Cameras only, first one selected
    assert_eq!(ids, vec!["cam-a", "cam-b"]);
    assert_eq!(registry.selected(), Some("cam-a"));
}

/// WHAT: Enumeration failure degrades to an empty list
/// WHY: Permission or platform errors must not crash the pipeline
#[tokio::test]
async fn given_failing_platform_when_enumerating_then_empty_and_nothing_selected() {
    // Given: A platform that refuses enumeration
    let camera = FakeCamera::two_cameras();
    camera.fail_enumeration.store(true, Ordering::SeqCst);
    let mut registry = DeviceRegistry::new();

    // When: Enumerating
    let count = registry.enumerate(camera.as_ref()).await.len();

    // Then: No devices, no selection, no error
    assert_eq!(count, 0);
    assert_eq!(registry.selected(), None);
}

/// WHAT: Selecting an unknown id fails with DeviceNotFound
/// WHY: Only ids from the last enumeration are valid
#[tokio::test]
async fn given_unknown_id_when_selecting_then_device_not_found() {
    // Given: An enumerated registry
    let camera = FakeCamera::two_cameras();
    let mut registry = DeviceRegistry::new();
    registry.enumerate(camera.as_ref()).await;

    // When: Selecting an id that was never enumerated
    let result = registry.select("cam-z");

    // Then: DeviceNotFound and the selection is unchanged
    assert!(matches!(result, Err(CameraError::DeviceNotFound { .. })));
    assert_eq!(registry.selected(), Some("cam-a"));
}

/// WHAT: A user selection survives re-enumeration while still present
/// WHY: Refreshing the list must not silently switch cameras
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_selected_device_when_reenumerating_then_selection_kept() {
    // Given: The second camera selected
    let camera = FakeCamera::two_cameras();
    let mut registry = DeviceRegistry::new();
    registry.enumerate(camera.as_ref()).await;
    registry.select("cam-b").unwrap();

    // When: Enumerating again
    registry.enumerate(camera.as_ref()).await;

    // Then: Still the second camera
    assert_eq!(registry.selected(), Some("cam-b"));
}

/// WHAT: A vanished selection falls back to the first device
/// WHY: Unplugged cameras must not leave a dangling selection
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_selected_device_unplugged_when_reenumerating_then_first_selected() {
    // Given: The second camera selected, then unplugged
    let camera = FakeCamera::two_cameras();
    let mut registry = DeviceRegistry::new();
    registry.enumerate(camera.as_ref()).await;
    registry.select("cam-b").unwrap();
    camera.devices.lock().unwrap().retain(|d| d.id != "cam-b");

    // When: Enumerating again
    registry.enumerate(camera.as_ref()).await;

    // Then: Default policy picks the first remaining camera
    assert_eq!(registry.selected(), Some("cam-a"));
}
