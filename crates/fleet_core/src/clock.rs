use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bevy_ecs::prelude::{Entity, Resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// An agent finishes traversing the road it is cruising on.
    AgentMove,
    /// A resource becomes available and enters the batching window.
    ResourceAnnounce,
    /// A waiting resource's lifetime runs out.
    ResourceExpire,
    /// An approaching agent reaches its resource's pickup point.
    AgentArriveAtResource,
    /// An occupied agent reaches the dropoff point.
    AgentArriveAtDropoff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSubject {
    Agent(Entity),
    Resource(Entity),
}

/// A scheduled occurrence in simulated time.
///
/// `generation` is compared against the subject agent's current generation
/// counter on pop; a mismatch means the event was cancelled after it was
/// scheduled and it is discarded silently. Resource events carry generation 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub timestamp: u64,
    pub kind: EventKind,
    pub subject: EventSubject,
    pub generation: u64,
}

/// Heap entry: `seq` is assigned at insertion so that events with equal
/// timestamps pop in FIFO order, which keeps runs reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScheduledEvent {
    event: Event,
    seq: u64,
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap a min-heap by (timestamp, seq).
        other
            .event
            .timestamp
            .cmp(&self.event.timestamp)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The event that the runner is currently dispatching to systems.
#[derive(Debug, Clone, Copy, Resource)]
pub struct CurrentEvent(pub Event);

/// The global event queue and the only source of simulated time.
///
/// Scheduling an event in the past is permitted: a window flush may create
/// expirations whose natural time precedes the flushing arrival. `pop_next`
/// keeps `now` monotone regardless.
#[derive(Debug, Default, Resource)]
pub struct SimulationClock {
    now: u64,
    next_seq: u64,
    events: BinaryHeap<ScheduledEvent>,
}

impl SimulationClock {
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn schedule(&mut self, event: Event) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(ScheduledEvent { event, seq });
    }

    /// Timestamp of the next event without popping it.
    pub fn peek_time(&self) -> Option<u64> {
        self.events.peek().map(|s| s.event.timestamp)
    }

    pub fn pop_next(&mut self) -> Option<Event> {
        let scheduled = self.events.pop()?;
        self.now = self.now.max(scheduled.event.timestamp);
        Some(scheduled.event)
    }

    /// Pops the next event unless its timestamp exceeds `cutoff`.
    /// `None` with a non-empty queue means the simulation end was reached.
    pub fn pop_next_until(&mut self, cutoff: Option<u64>) -> Option<Event> {
        let t = self.peek_time()?;
        if cutoff.is_some_and(|c| t > c) {
            return None;
        }
        self.pop_next()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
