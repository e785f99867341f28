use crate::{
    overlay::{Compositor, OverlayState, TickOutcome},
    platform::{FrameClock, LiveStream, SharedSurface},
};

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use chrono::Local;
use tokio::{sync::watch, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Tick counters shared with a running render loop.
#[derive(Debug, Default)]
pub struct RenderStats {
    composited: AtomicU64,
    skipped: AtomicU64,
}

impl RenderStats {
    /// Ticks that drew a frame.
    pub fn composited(&self) -> u64 {
        self.composited.load(Ordering::Relaxed)
    }

    /// Ticks skipped because no frame was decoded yet.
    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }
}

/// Frame-clock driven compositing task.
///
/// Each iteration waits for the next display frame, then composites once.
/// The cancellation token is checked before every re-enqueue, so a cancelled
/// loop never draws again.
pub struct RenderLoop {
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
    stats: Arc<RenderStats>,
}

impl RenderLoop {
    /// Spawn the loop on the current runtime.
    pub fn spawn(
        stream: Arc<dyn LiveStream>,
        surface: SharedSurface,
        overlay: watch::Receiver<OverlayState>,
        mut clock: Box<dyn FrameClock>,
    ) -> Self {
        let token = CancellationToken::new();
        let stats = Arc::new(RenderStats::default());

        let loop_token = token.clone();
        let loop_stats = Arc::clone(&stats);
        let compositor = Compositor;

        let handle = tokio::spawn(async move {
            debug!(device_id = %stream.device_id(), "Render loop started");

            while !loop_token.is_cancelled() {
                tokio::select! {
                    biased;
                    _ = loop_token.cancelled() => break,
                    _ = clock.next_frame() => {}
                }

                let outcome = {
                    let state = overlay.borrow();
                    compositor.render_tick(stream.as_ref(), &surface, &state, Local::now())
                };

                match outcome {
                    TickOutcome::Skipped => loop_stats.skipped.fetch_add(1, Ordering::Relaxed),
                    TickOutcome::Composited { .. } => {
                        loop_stats.composited.fetch_add(1, Ordering::Relaxed)
                    }
                };
            }

            debug!(
                composited = loop_stats.composited(),
                skipped = loop_stats.skipped(),
                "Render loop stopped"
            );
        });

        Self {
            token,
            handle: Some(handle),
            stats,
        }
    }

    /// Cancel the pending iteration. Idempotent.
    pub fn cancel(&mut self) {
        if !self.token.is_cancelled() {
            self.token.cancel();
            info!("Render loop cancelled");
        }
        self.handle.take();
    }

    /// Cancel and wait for the task to finish its current tick.
    pub async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }

    /// Whether the loop is still scheduled.
    pub fn is_running(&self) -> bool {
        !self.token.is_cancelled() && self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Shared tick counters.
    pub fn stats(&self) -> Arc<RenderStats> {
        Arc::clone(&self.stats)
    }
}

impl Drop for RenderLoop {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
