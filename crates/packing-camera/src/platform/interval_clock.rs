use packing_camera_core::platform::{DisplayScheduler, FrameClock};

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{Interval, MissedTickBehavior};

/// Display scheduler ticking at a fixed refresh rate.
#[derive(Debug, Clone, Copy)]
pub struct IntervalDisplay {
    period: Duration,
}

impl IntervalDisplay {
    /// Scheduler for a `refresh_hz` display. Zero is treated as 1 Hz.
    pub fn new(refresh_hz: u32) -> Self {
        Self {
            period: Duration::from_secs(1) / refresh_hz.max(1),
        }
    }
}

impl DisplayScheduler for IntervalDisplay {
    fn frame_clock(&self) -> Box<dyn FrameClock> {
        Box::new(IntervalClock {
            period: self.period,
            interval: None,
        })
    }
}

/// Frame clock that skips missed ticks instead of bursting.
struct IntervalClock {
    period: Duration,
    // Created on first use so the clock can be built outside the runtime.
    interval: Option<Interval>,
}

#[async_trait]
impl FrameClock for IntervalClock {
    async fn next_frame(&mut self) {
        let period = self.period;
        let interval = self.interval.get_or_insert_with(|| {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval
        });
        interval.tick().await;
    }
}
