//! The batching window: resources announced within one assignment period are
//! dispatched together.

use bevy_ecs::prelude::{Entity, Resource};

/// Waiting resources accumulated since `start_time`, in arrival order.
///
/// The window's right edge is `start_time + batch_frame`; the first arrival
/// past it closes the window (the epoch), and unmatched resources carry over
/// into the window the closing arrival opens.
#[derive(Debug, Default, Resource)]
pub struct BatchWindow {
    pub start_time: Option<u64>,
    pub pending: Vec<Entity>,
}

impl BatchWindow {
    /// Whether an event at `timestamp` still falls inside this window. An
    /// unopened window accepts everything; the first event past the right
    /// edge triggers the dispatch epoch.
    pub fn accepts(&self, timestamp: u64, batch_frame: u64) -> bool {
        match self.start_time {
            None => true,
            Some(start) => timestamp <= start + batch_frame,
        }
    }
}
