use std::sync::atomic::{AtomicU64, Ordering};

/// Render counters, readable from any thread while the synth plays.
#[derive(Debug, Default)]
pub struct Diagnostics {
    buffers: AtomicU64,
    control_ticks: AtomicU64,
    frames_late: AtomicU64,
    events_dropped: AtomicU64,
}

impl Diagnostics {
    /// Buffers rendered by `fill_buffer`.
    pub fn buffers(&self) -> u64 {
        self.buffers.load(Ordering::Relaxed)
    }

    pub fn control_ticks(&self) -> u64 {
        self.control_ticks.load(Ordering::Relaxed)
    }

    /// Frames of buffers that took longer to render than they last. Only
    /// counted when diagnostics are enabled in the engine config.
    pub fn frames_late(&self) -> u64 {
        self.frames_late.load(Ordering::Relaxed)
    }

    /// Notifications lost because an event queue was full.
    pub fn events_dropped(&self) -> u64 {
        self.events_dropped.load(Ordering::Relaxed)
    }

    pub(crate) fn record_buffer(&self) {
        self.buffers.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_tick(&self) {
        self.control_ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_late(&self, frames: u64) {
        self.frames_late.fetch_add(frames, Ordering::Relaxed);
    }

    #[cfg_attr(not(feature = "rtrb"), allow(dead_code))]
    pub(crate) fn record_dropped(&self) {
        self.events_dropped.fetch_add(1, Ordering::Relaxed);
    }
}
