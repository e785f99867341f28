use async_trait::async_trait;

/// Host frame scheduler: resolves once per display refresh.
#[async_trait]
pub trait FrameClock: Send {
    /// Wait for the next display frame.
    async fn next_frame(&mut self);
}

/// Creates a fresh frame clock for each render loop.
pub trait DisplayScheduler: Send + Sync {
    /// New clock bound to the display's refresh cadence.
    fn frame_clock(&self) -> Box<dyn FrameClock>;
}
