//! Client-side session agent: mirrors the server's board from the broadcast
//! stream, stages moves locally, and feeds a renderer.

pub mod net;
pub mod pending;
pub mod session;
pub mod view;

use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch, for beam display timing.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
