use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::batch::BatchWindow;
use crate::clock::{CurrentEvent, EventKind, EventSubject};
use crate::ecs::{RequestState, SimFault, TripRequest};
use crate::error::SimError;
use crate::telemetry::SimTelemetry;

/// A resource becomes available: it turns Waiting and joins the batching
/// window. The epoch system has already flushed the window if this arrival
/// crossed the horizon, so the arrival always fits the window it lands in.
pub fn resource_announce_system(
    event: Res<CurrentEvent>,
    mut window: ResMut<BatchWindow>,
    mut telemetry: ResMut<SimTelemetry>,
    mut fault: ResMut<SimFault>,
    mut requests: Query<&mut TripRequest>,
) {
    if event.0.kind != EventKind::ResourceAnnounce {
        return;
    }
    let EventSubject::Resource(announced) = event.0.subject else {
        return;
    };

    telemetry.total_resources += 1;
    match requests.get_mut(announced) {
        Ok(mut request) => request.state = RequestState::Waiting,
        Err(_) => {
            fault.set(SimError::Invariant(format!(
                "announce event for unknown resource {announced:?}"
            )));
            return;
        }
    }

    if window.start_time.is_none() {
        window.start_time = Some(event.0.timestamp);
    }
    window.pending.push(announced);
}
