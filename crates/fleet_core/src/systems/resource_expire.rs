use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::batch::BatchWindow;
use crate::clock::{CurrentEvent, EventKind, EventSubject};
use crate::ecs::{RequestState, TripRequest};
use crate::telemetry::SimTelemetry;

/// Reaps a resource whose lifetime ran out while it was still waiting.
/// Expiration is a normal outcome; events for already-assigned resources are
/// stale and ignored.
pub fn resource_expire_system(
    event: Res<CurrentEvent>,
    mut window: ResMut<BatchWindow>,
    mut telemetry: ResMut<SimTelemetry>,
    mut requests: Query<&mut TripRequest>,
) {
    if event.0.kind != EventKind::ResourceExpire {
        return;
    }
    let EventSubject::Resource(entity) = event.0.subject else {
        return;
    };
    let Ok(mut request) = requests.get_mut(entity) else {
        return;
    };
    if request.state != RequestState::Waiting {
        return;
    }
    request.state = RequestState::Expired;
    telemetry.expired_resources += 1;
    window.pending.retain(|&pending| pending != entity);
}
