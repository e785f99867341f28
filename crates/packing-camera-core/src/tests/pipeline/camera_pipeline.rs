use crate::{
    CameraError,
    encoder::RecorderPhase,
    overlay::OverlayState,
    pipeline::{AlertKind, CameraPipeline, PipelineEvent, PipelineSettings},
    platform::{EncoderEvent, PermissionState},
    storage::PersistOutcome,
    tests::fakes::{FakeDirectory, FakeEncoder, FakeSurface, Fakes, PickAnswer, shared},
};

use std::{
    sync::{Arc, atomic::Ordering},
    time::Duration,
};

use chrono::{Local, NaiveDateTime, TimeDelta};
use tokio::sync::mpsc::UnboundedReceiver;

const MIME: &str = "video/webm";

fn settings() -> PipelineSettings {
    PipelineSettings {
        overlay: OverlayState::default(),
        mime_type: MIME.to_string(),
    }
}

fn granted_fakes() -> (Fakes, Arc<FakeDirectory>) {
    let dir = FakeDirectory::new(PermissionState::Granted, PermissionState::Granted);
    let fakes = Fakes::new(
        FakeEncoder::supporting(MIME),
        PickAnswer::Grant(Arc::clone(&dir)),
    );
    (fakes, dir)
}

fn drain(events: &mut UnboundedReceiver<PipelineEvent>) -> Vec<PipelineEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

fn alerts(events: &[PipelineEvent]) -> Vec<AlertKind> {
    events
        .iter()
        .filter_map(|e| match e {
            PipelineEvent::Alert(alert) => Some(alert.kind),
            _ => None,
        })
        .collect()
}

/// WHAT: Full flow from camera start to a saved recording
/// WHY: This is the packing station's everyday path
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_live_camera_when_recording_and_stopping_then_saved_with_order_filename() {
    // Given: A live camera and an order code
    let (fakes, dir) = granted_fakes();
    let surface = FakeSurface::new(720, 480);
    let (mut pipeline, mut events) =
        CameraPipeline::new(fakes.platform(), shared(&surface), settings());
    pipeline.start_camera(None).await.unwrap();
    pipeline.set_overlay("ORD1", "Blue mug");
    let recording = pipeline.subscribe_recording();

    // When: Recording two chunks and stopping
    pipeline.start_recording().unwrap();
    assert!(*recording.borrow());
    fakes.encoder.emit(EncoderEvent::Data(vec![1, 2, 3]));
    fakes.encoder.emit(EncoderEvent::Data(vec![4, 5]));
    let outcome = pipeline.stop_recording().await.unwrap();

    // Then: Saved under the order's filename with the full contents
    let filename = outcome.filename().to_string();
    assert!(filename.starts_with("ORD1_"));
    assert!(filename.ends_with("_recorded-video.webm"));
    assert_eq!(dir.file(&filename), Some(vec![1, 2, 3, 4, 5]));
    assert!(!*recording.borrow());
    assert_eq!(pipeline.recorder_phase(), RecorderPhase::Idle);

    let events = drain(&mut events);
    assert_eq!(
        events.first(),
        Some(&PipelineEvent::CameraChanged {
            device_id: Some("cam-a".to_string())
        })
    );
    assert!(matches!(
        events.last(),
        Some(PipelineEvent::Persisted(PersistOutcome::Saved { .. }))
    ));
    assert!(alerts(&events).is_empty());

    pipeline.shutdown().await;
}

/// WHAT: Recording without a camera is rejected
/// WHY: The surface would be blank
#[tokio::test]
async fn given_no_camera_when_starting_recording_then_no_active_camera() {
    // Given: An idle pipeline
    let (fakes, _dir) = granted_fakes();
    let surface = FakeSurface::new(720, 480);
    let (mut pipeline, _events) =
        CameraPipeline::new(fakes.platform(), shared(&surface), settings());

    // When: Starting a recording
    let result = pipeline.start_recording();

    // Then: NoActiveCamera, encoder untouched
    assert!(matches!(result, Err(CameraError::NoActiveCamera { .. })));
    assert_eq!(fakes.encoder.opened.load(Ordering::SeqCst), 0);
}

/// WHAT: Unsupported MIME type raises an alert and leaves the flag false
/// WHY: The operator has to know why nothing records
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_unsupported_mime_when_starting_recording_then_alert() {
    // Given: An encoder that only does mp4
    let fakes = Fakes::new(FakeEncoder::supporting("video/mp4"), PickAnswer::Decline);
    let surface = FakeSurface::new(720, 480);
    let (mut pipeline, mut events) =
        CameraPipeline::new(fakes.platform(), shared(&surface), settings());
    pipeline.start_camera(None).await.unwrap();

    // When: Starting a recording
    let result = pipeline.start_recording();

    // Then: Error and alert
    assert!(matches!(result, Err(CameraError::EncoderUnsupported { .. })));
    assert!(!*pipeline.subscribe_recording().borrow());
    assert_eq!(alerts(&drain(&mut events)), vec![AlertKind::EncoderUnsupported]);

    pipeline.shutdown().await;
}

/// WHAT: A second start while recording fails without an alert
/// WHY: Fail-fast is a caller error, not a user-facing failure
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_recording_when_starting_again_then_invalid_state_without_alert() {
    // Given: A running recording
    let (fakes, _dir) = granted_fakes();
    let surface = FakeSurface::new(720, 480);
    let (mut pipeline, mut events) =
        CameraPipeline::new(fakes.platform(), shared(&surface), settings());
    pipeline.start_camera(None).await.unwrap();
    pipeline.start_recording().unwrap();

    // When: Starting again
    let result = pipeline.start_recording();

    // Then: InvalidState, no alert, still recording
    assert!(matches!(result, Err(CameraError::InvalidState { .. })));
    assert!(alerts(&drain(&mut events)).is_empty());
    assert!(pipeline.is_recording());

    pipeline.shutdown().await;
}

/// WHAT: An unavailable preferred camera falls back to the default
/// WHY: A remembered camera may have been unplugged
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_unavailable_preferred_camera_when_starting_then_alert_and_default_used() {
    // Given: cam-b is enumerated but cannot be opened
    let (fakes, _dir) = granted_fakes();
    fakes.camera.unavailable.lock().unwrap().push("cam-b".to_string());
    let surface = FakeSurface::new(720, 480);
    let (mut pipeline, mut events) =
        CameraPipeline::new(fakes.platform(), shared(&surface), settings());

    // When: Starting with cam-b preferred
    pipeline.start_camera(Some("cam-b")).await.unwrap();

    // Then: Alerted, then live on the default camera
    assert_eq!(pipeline.active_device(), Some("cam-a"));
    assert_eq!(alerts(&drain(&mut events)), vec![AlertKind::CameraAccess]);
    assert_eq!(fakes.camera.live_streams(), vec!["cam-a".to_string()]);

    pipeline.shutdown().await;
}

/// WHAT: Refused camera access raises an alert and returns the error
/// WHY: The pipeline cannot continue without a stream
#[tokio::test]
async fn given_access_refused_when_starting_camera_then_alert_and_error() {
    // Given: Access refused
    let (fakes, _dir) = granted_fakes();
    fakes.camera.deny_access.store(true, Ordering::SeqCst);
    let surface = FakeSurface::new(720, 480);
    let (mut pipeline, mut events) =
        CameraPipeline::new(fakes.platform(), shared(&surface), settings());

    // When: Starting the camera
    let result = pipeline.start_camera(None).await;

    // Then: AccessDenied, alert, not rendering
    assert!(matches!(result, Err(CameraError::AccessDenied { .. })));
    assert_eq!(alerts(&drain(&mut events)), vec![AlertKind::CameraAccess]);
    assert!(!pipeline.is_rendering());
}

/// WHAT: Selecting another device while live switches the stream
/// WHY: Operators toggle between front and overhead cameras
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_live_camera_when_selecting_other_device_then_switched() {
    // Given: cam-a live
    let (fakes, _dir) = granted_fakes();
    let surface = FakeSurface::new(720, 480);
    let (mut pipeline, mut events) =
        CameraPipeline::new(fakes.platform(), shared(&surface), settings());
    pipeline.start_camera(None).await.unwrap();
    drain(&mut events);

    // When: Selecting cam-b
    pipeline.select_device("cam-b").await.unwrap();

    // Then: One live stream on cam-b, still rendering
    assert_eq!(fakes.camera.live_streams(), vec!["cam-b".to_string()]);
    assert_eq!(pipeline.selected_device(), Some("cam-b"));
    assert!(pipeline.is_rendering());
    assert_eq!(
        drain(&mut events),
        vec![PipelineEvent::CameraChanged {
            device_id: Some("cam-b".to_string())
        }]
    );

    pipeline.shutdown().await;
}

/// WHAT: Selecting an unknown device is rejected and keeps the camera
/// WHY: A stale id from config must not drop the live stream
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_unknown_device_when_selecting_then_not_found_and_camera_kept() {
    // Given: cam-a live
    let (fakes, _dir) = granted_fakes();
    let surface = FakeSurface::new(720, 480);
    let (mut pipeline, _events) =
        CameraPipeline::new(fakes.platform(), shared(&surface), settings());
    pipeline.start_camera(None).await.unwrap();

    // When: Selecting a missing id
    let result = pipeline.select_device("cam-z").await;

    // Then: DeviceNotFound, cam-a still live
    assert!(matches!(result, Err(CameraError::DeviceNotFound { .. })));
    assert_eq!(pipeline.active_device(), Some("cam-a"));

    pipeline.shutdown().await;
}

/// WHAT: stop_camera twice releases once and emits one change
/// WHY: Teardown may run from several paths
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_live_camera_when_stopping_twice_then_single_release() {
    // Given: cam-a live
    let (fakes, _dir) = granted_fakes();
    let surface = FakeSurface::new(720, 480);
    let (mut pipeline, mut events) =
        CameraPipeline::new(fakes.platform(), shared(&surface), settings());
    pipeline.start_camera(None).await.unwrap();
    drain(&mut events);

    // When: Stopping twice
    pipeline.stop_camera();
    pipeline.stop_camera();

    // Then: Tracks stopped once, one CameraChanged(None)
    let opened = fakes.camera.opened.lock().unwrap().clone();
    assert_eq!(opened[0].stop_calls.load(Ordering::SeqCst), 1);
    assert!(!pipeline.is_rendering());
    assert_eq!(
        drain(&mut events),
        vec![PipelineEvent::CameraChanged { device_id: None }]
    );
}

/// WHAT: The render loop draws the overlay onto the shared surface
/// WHY: The encoder records what the surface shows
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_live_camera_with_order_when_rendering_then_surface_shows_overlay() {
    // Given: A live camera with an order code
    let (fakes, _dir) = granted_fakes();
    let surface = FakeSurface::new(720, 480);
    let (mut pipeline, _events) =
        CameraPipeline::new(fakes.platform(), shared(&surface), settings());
    pipeline.set_overlay("ORD5", "Kettle");
    pipeline.start_camera(None).await.unwrap();

    // When: Letting a few frames pass
    for _ in 0..200 {
        if surface.lock().unwrap().text.len() == 3 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    // Then: The order line is on the surface
    let first = surface.lock().unwrap().text.first().map(|l| l.text.clone());
    assert_eq!(first.as_deref(), Some("Order: ORD5"));

    pipeline.shutdown().await;
}

/// WHAT: Shutdown persists a running recording
/// WHY: Closing the app must not lose the last package
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_running_recording_when_shutting_down_then_persisted_and_released() {
    // Given: A running recording with data
    let (fakes, dir) = granted_fakes();
    let surface = FakeSurface::new(720, 480);
    let (mut pipeline, mut events) =
        CameraPipeline::new(fakes.platform(), shared(&surface), settings());
    pipeline.start_camera(None).await.unwrap();
    pipeline.set_overlay("ORD2", "Lamp");
    pipeline.start_recording().unwrap();
    fakes.encoder.emit(EncoderEvent::Data(vec![7, 7]));

    // When: Shutting down
    pipeline.shutdown().await;

    // Then: Saved and the camera released
    let events = drain(&mut events);
    assert!(events.iter().any(|e| matches!(e, PipelineEvent::Persisted(_))));
    assert_eq!(dir.files.lock().unwrap().len(), 1);
    assert!(fakes.camera.live_streams().is_empty());
}

/// WHAT: Recording continues across a camera switch
/// WHY: The encoder samples the surface, not the stream
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_recording_when_switching_camera_then_recording_kept() {
    // Given: A running recording on cam-a
    let (fakes, _dir) = granted_fakes();
    let surface = FakeSurface::new(720, 480);
    let (mut pipeline, _events) =
        CameraPipeline::new(fakes.platform(), shared(&surface), settings());
    pipeline.start_camera(None).await.unwrap();
    pipeline.start_recording().unwrap();

    // When: Switching to cam-b
    pipeline.switch_device("cam-b").await.unwrap();

    // Then: Still recording on the same encoder
    assert!(pipeline.is_recording());
    assert_eq!(fakes.encoder.opened.load(Ordering::SeqCst), 1);

    pipeline.shutdown().await;
}

/// WHAT: An encoder error mid-recording is alerted on the next pump
/// WHY: Otherwise the flag stays on and the failure shows only at stop
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_encoder_error_while_recording_when_pumping_then_alert_and_recording_ended() {
    // Given: A recording whose encoder crashes after one chunk
    let dir = FakeDirectory::new(PermissionState::Granted, PermissionState::Granted);
    let fakes = Fakes::new(FakeEncoder::manual(MIME), PickAnswer::Grant(Arc::clone(&dir)));
    let surface = FakeSurface::new(720, 480);
    let (mut pipeline, mut events) =
        CameraPipeline::new(fakes.platform(), shared(&surface), settings());
    pipeline.start_camera(None).await.unwrap();
    let recording = pipeline.subscribe_recording();
    pipeline.start_recording().unwrap();
    drain(&mut events);
    fakes.encoder.emit(EncoderEvent::Data(vec![1, 2]));
    fakes.encoder.emit(EncoderEvent::Error("encoder crashed".to_string()));

    // When: Pumping twice
    pipeline.pump_recording();
    pipeline.pump_recording();

    // Then: One alert, flag down, idle, nothing saved, a new start works
    assert_eq!(alerts(&drain(&mut events)), vec![AlertKind::Recording]);
    assert!(!*recording.borrow());
    assert_eq!(pipeline.recorder_phase(), RecorderPhase::Idle);
    assert!(dir.files.lock().unwrap().is_empty());
    assert!(matches!(
        pipeline.stop_recording().await,
        Err(CameraError::InvalidState { .. })
    ));
    assert!(pipeline.start_recording().is_ok());

    fakes.encoder.emit(EncoderEvent::Stopped);
    pipeline.shutdown().await;
}

/// WHAT: The filename time is taken when stop is pressed, not after finalizing
/// WHY: A slow encoder flush must not shift the recorded stop time
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_slow_finalize_when_stopping_then_filename_uses_stop_time() {
    // Given: A recording whose encoder needs over two seconds to flush
    let dir = FakeDirectory::new(PermissionState::Granted, PermissionState::Granted);
    let fakes = Fakes::new(FakeEncoder::manual(MIME), PickAnswer::Grant(Arc::clone(&dir)));
    let surface = FakeSurface::new(720, 480);
    let (mut pipeline, _events) =
        CameraPipeline::new(fakes.platform(), shared(&surface), settings());
    pipeline.start_camera(None).await.unwrap();
    pipeline.set_overlay("ORD1", "Blue mug");
    pipeline.start_recording().unwrap();
    fakes.encoder.emit(EncoderEvent::Data(vec![1]));

    let encoder = Arc::clone(&fakes.encoder);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(2100)).await;
        encoder.emit(EncoderEvent::Stopped);
    });

    // When: Stopping
    let pressed = Local::now();
    let outcome = pipeline.stop_recording().await.unwrap();

    // Then: The stamp is within the second the stop was pressed
    let stamp = outcome
        .filename()
        .strip_prefix("ORD1_")
        .and_then(|rest| rest.get(..19))
        .unwrap();
    let stamp = NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d_%H-%M-%S").unwrap();
    assert!(stamp < (pressed + TimeDelta::seconds(1)).naive_local());

    pipeline.shutdown().await;
}
