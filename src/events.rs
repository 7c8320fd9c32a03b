//! Game event system for decoupled communication between systems.
//!
//! Movement and tunneling emit events; the binary logs them and tests
//! inspect them without reaching into the world.

use hecs::Entity;

/// Game events that systems can emit and subscribe to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// An actor stepped to a new cell
    ActorMoved {
        entity: Entity,
        from: (i32, i32),
        to: (i32, i32),
    },
    /// A tunneler dug into rock without breaking through
    TerrainEroded {
        entity: Entity,
        position: (i32, i32),
        hardness_left: u8,
    },
    /// A tunneler broke through rock, leaving a corridor
    TerrainOpened {
        entity: Entity,
        position: (i32, i32),
    },
    /// A monster was killed by the actor moving onto it
    ActorKilled {
        killer: Entity,
        victim: Entity,
        position: (i32, i32),
    },
    /// The player was killed
    PlayerKilled {
        killer: Entity,
        position: (i32, i32),
    },
}

/// Simple event queue - events are pushed during a turn, drained afterwards
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Push an event to be processed later
    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Drain all events for processing
    pub fn drain(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.events.drain(..)
    }

    /// Check if there are pending events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_empties_queue() {
        let mut world = hecs::World::new();
        let a = world.spawn(());
        let mut queue = EventQueue::new();
        queue.push(GameEvent::ActorMoved { entity: a, from: (1, 1), to: (1, 2) });
        queue.push(GameEvent::TerrainOpened { entity: a, position: (2, 2) });
        assert_eq!(queue.len(), 2);

        let drained: Vec<_> = queue.drain().collect();
        assert_eq!(drained.len(), 2);
        assert!(queue.is_empty());
        assert_eq!(drained[1], GameEvent::TerrainOpened { entity: a, position: (2, 2) });
    }
}
