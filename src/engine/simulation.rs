//! Game simulation - turn execution and outcome detection.

use hecs::Entity;
use log::{debug, info};
use rand::Rng;

use crate::components::Behavior;
use crate::config::GameConfig;
use crate::dungeon::Dungeon;
use crate::events::{EventQueue, GameEvent};
use crate::pathfinding::Direction;
use crate::systems::{self, MoveResult};
use crate::time_system::Scheduler;

// =============================================================================
// COLLABORATORS
// =============================================================================

/// What the player does with a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    Stay,
    Move(Direction),
}

/// Source of player decisions
pub trait PlayerController {
    fn next_action(&mut self, dungeon: &Dungeon) -> PlayerAction;
}

/// A player that never moves
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleController;

impl PlayerController for IdleController {
    fn next_action(&mut self, _dungeon: &Dungeon) -> PlayerAction {
        PlayerAction::Stay
    }
}

/// Receives a read-only view of the dungeon after every player turn
pub trait FrameSink {
    fn present(&mut self, dungeon: &Dungeon);
}

/// Frame sink for headless runs
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn present(&mut self, _dungeon: &Dungeon) {}
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every monster is dead
    Victory,
    /// A monster stepped onto the player
    Defeat,
    /// The turn cap was reached first
    TurnLimit,
}

// =============================================================================
// SIMULATION
// =============================================================================

pub struct Simulation {
    dungeon: Dungeon,
    scheduler: Scheduler,
    events: EventQueue,
    tunnel_decrement: u8,
    max_turns: Option<u64>,
    /// Actor turns taken so far, player and monsters alike
    turns: u64,
}

impl Simulation {
    /// Schedule every monster, then the player, for their first turn.
    pub fn new(mut dungeon: Dungeon, config: &GameConfig) -> Self {
        let mut scheduler = Scheduler::new(config.simulation.tick);

        let monsters: Vec<Entity> = dungeon
            .world
            .query::<&Behavior>()
            .iter()
            .map(|(entity, _)| entity)
            .collect();
        for monster in monsters {
            scheduler.schedule(&mut dungeon.world, monster);
        }
        scheduler.schedule(&mut dungeon.world, dungeon.player);

        Self {
            dungeon,
            scheduler,
            events: EventQueue::new(),
            tunnel_decrement: config.actors.tunnel_decrement,
            max_turns: config.simulation.max_turns,
            turns: 0,
        }
    }

    pub fn dungeon(&self) -> &Dungeon {
        &self.dungeon
    }

    pub fn into_dungeon(self) -> Dungeon {
        self.dungeon
    }

    pub fn turns(&self) -> u64 {
        self.turns
    }

    /// Current game time
    pub fn time(&self) -> u64 {
        self.scheduler.now()
    }

    /// Events emitted since the last drain
    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    /// Run turns until the game is decided.
    pub fn run(
        &mut self,
        controller: &mut impl PlayerController,
        sink: &mut impl FrameSink,
        rng: &mut impl Rng,
    ) -> Outcome {
        puffin::profile_function!();

        loop {
            let outcome = self.step(controller, sink, rng);
            for event in self.events.drain() {
                log_event(&event);
            }
            if let Some(outcome) = outcome {
                info!(
                    "game over: {:?} after {} turns at time {}",
                    outcome,
                    self.turns,
                    self.scheduler.now()
                );
                return outcome;
            }
        }
    }

    /// Take the next actor's turn. Returns the outcome once the game is decided.
    pub fn step(
        &mut self,
        controller: &mut impl PlayerController,
        sink: &mut impl FrameSink,
        rng: &mut impl Rng,
    ) -> Option<Outcome> {
        puffin::profile_function!();

        if self.scheduler.len() < 2 {
            return Some(Outcome::Victory);
        }
        if self.max_turns.is_some_and(|max| self.turns >= max) {
            return Some(Outcome::TurnLimit);
        }

        let Some((_, entity)) = self.scheduler.next(&mut self.dungeon.world) else {
            return Some(Outcome::Victory);
        };
        self.turns += 1;

        let is_player = self.dungeon.is_player(entity);
        let target = if is_player {
            match controller.next_action(&self.dungeon) {
                PlayerAction::Stay => None,
                PlayerAction::Move(dir) => self.dungeon.position_of(entity).map(|p| dir.step(p.as_tuple())),
            }
        } else {
            systems::decide_move(&mut self.dungeon, entity, rng)
        };

        if let Some(target) = target {
            let result = systems::move_actor(
                &mut self.dungeon,
                entity,
                target,
                self.tunnel_decrement,
                &mut self.events,
            );
            if let MoveResult::Moved { victim: Some(victim) } = result {
                if self.dungeon.is_player(victim) {
                    return Some(Outcome::Defeat);
                }
                self.scheduler.remove(&mut self.dungeon.world, victim);
                self.dungeon.despawn(victim);
            }
        }

        if is_player {
            sink.present(&self.dungeon);
        }

        self.scheduler.schedule(&mut self.dungeon.world, entity);
        None
    }
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::ActorMoved { entity, from, to } => {
            debug!("{:?} moved {:?} -> {:?}", entity, from, to)
        }
        GameEvent::TerrainEroded {
            entity,
            position,
            hardness_left,
        } => debug!("{:?} dug at {:?}, {} hardness left", entity, position, hardness_left),
        GameEvent::TerrainOpened { entity, position } => {
            debug!("{:?} broke through at {:?}", entity, position)
        }
        GameEvent::ActorKilled {
            killer,
            victim,
            position,
        } => info!("{:?} killed {:?} at {:?}", killer, victim, position),
        GameEvent::PlayerKilled { killer, position } => {
            info!("player killed by {:?} at {:?}", killer, position)
        }
    }
}
