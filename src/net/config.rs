//! Constructor-time knobs for a [`crate::net::engine::Connection`].
//!
//! There is no file-backed configuration layer for this transport; window
//! capacity, resend timeout, and segment size are gathered into one
//! construction-time value in the style of `PacketConfig`.

use std::time::Duration;

/// Sliding window capacity used by both [`crate::net::window::SenderWindow`]
/// and [`crate::net::window::ReceiverWindow`].
pub const DEFAULT_WINDOW_CAPACITY: usize = 10_000;

/// Default retransmission interval.
pub const DEFAULT_RESEND_TIMEOUT: Duration = Duration::from_secs(1);

/// Default segmentation chunk size.
pub const DEFAULT_SEGMENT_SIZE: usize = 512;

/// Configuration for a [`crate::net::engine::Connection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportConfig {
    window_capacity: usize,
    resend_timeout: Duration,
    segment_size: usize,
}

impl TransportConfig {
    /// Start from the default configuration and customize with the builder methods below.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sliding window capacity. Must be non-zero.
    pub fn window_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "window capacity must be non-zero");
        self.window_capacity = capacity;
        self
    }

    /// Set the retransmission timer interval.
    pub fn resend_timeout(mut self, timeout: Duration) -> Self {
        self.resend_timeout = timeout;
        self
    }

    /// Set the maximum segment size used to chunk outbound payloads. Must be non-zero.
    pub fn segment_size(mut self, size: usize) -> Self {
        assert!(size > 0, "segment size must be non-zero");
        self.segment_size = size;
        self
    }

    pub fn get_window_capacity(&self) -> usize {
        self.window_capacity
    }

    pub fn get_resend_timeout(&self) -> Duration {
        self.resend_timeout
    }

    pub fn get_segment_size(&self) -> usize {
        self.segment_size
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            resend_timeout: DEFAULT_RESEND_TIMEOUT,
            segment_size: DEFAULT_SEGMENT_SIZE,
        }
    }
}
