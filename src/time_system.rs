//! Speed-based turn scheduling.
//!
//! Every live actor sits in one pairing heap keyed by the game time of its
//! next turn. Faster actors come back sooner: an actor with speed `s` waits
//! `tick / s` time units between turns. Equal times are broken by insertion
//! order so a run is fully determined by its seed.

use hecs::{Entity, World};

use crate::components::{Actor, TurnTicket};
use crate::pairing_heap::{NodeHandle, PairingHeap};

/// Heap key: (time of next turn, insertion sequence)
pub type TurnKey = (u64, u64);

// =============================================================================
// SCHEDULER
// =============================================================================

#[derive(Debug)]
pub struct Scheduler {
    queue: PairingHeap<TurnKey, Entity>,
    /// Next insertion sequence number
    sequence: u64,
    /// Time units per turn at speed 1
    tick: u64,
    /// Time of the turn most recently handed out
    now: u64,
}

impl Scheduler {
    pub fn new(tick: u64) -> Self {
        Self {
            queue: PairingHeap::new(),
            sequence: 0,
            tick,
            now: 0,
        }
    }

    /// Current game time
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Queue `entity` for its next turn, one turn delay after the current
    /// time, and tag it with a `TurnTicket`.
    ///
    /// Returns `None` if the entity has no `Actor` component.
    pub fn schedule(&mut self, world: &mut World, entity: Entity) -> Option<NodeHandle> {
        let delay = world.get::<&Actor>(entity).ok()?.turn_delay(self.tick);
        let key = (self.now + delay, self.sequence);
        self.sequence += 1;

        let handle = self.queue.insert(key, entity);
        if world.insert_one(entity, TurnTicket(handle)).is_err() {
            self.queue.delete(handle);
            return None;
        }
        Some(handle)
    }

    /// Pop the actor whose turn comes next and advance the clock to it.
    pub fn next(&mut self, world: &mut World) -> Option<(u64, Entity)> {
        let ((time, _), entity) = self.queue.extract_min()?;
        debug_assert!(time >= self.now, "turn order went backwards: {} -> {}", self.now, time);
        self.now = time;
        let _ = world.remove_one::<TurnTicket>(entity);
        Some((time, entity))
    }

    /// Peek at the next turn without taking it
    #[allow(dead_code)] // Public API for debugging/inspection
    pub fn peek(&self) -> Option<(u64, Entity)> {
        self.queue.peek_min().map(|((time, _), &entity)| (time, entity))
    }

    /// Take a queued actor out of the schedule (e.g. when it is killed).
    /// Returns false if it was not queued.
    pub fn remove(&mut self, world: &mut World, entity: Entity) -> bool {
        let Ok(TurnTicket(handle)) = world.remove_one::<TurnTicket>(entity) else {
            return false;
        };
        self.queue.delete(handle).is_some()
    }
}
