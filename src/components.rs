use bitflags::bitflags;

use crate::constants::PLAYER_GLYPH;
use crate::pairing_heap::NodeHandle;
use crate::pathfinding::CostField;

/// Position component - grid coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn as_tuple(&self) -> (i32, i32) {
        (self.x, self.y)
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Player marker component
#[derive(Debug, Clone, Copy)]
pub struct Player;

/// Anything that takes turns. Higher speed means shorter waits.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub speed: u32,
}

impl Actor {
    pub fn new(speed: u32) -> Self {
        debug_assert!(speed > 0, "actor speed must be positive");
        Self { speed }
    }

    /// Time between two turns, never zero so the clock always advances
    pub fn turn_delay(&self, tick: u64) -> u64 {
        (tick / self.speed.max(1) as u64).max(1)
    }
}

bitflags! {
    /// Monster behavior traits, combined freely.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Behavior: u8 {
        /// Remembers where it last saw the player and plans routes
        const INTELLIGENT = 0b0001;
        /// Always knows where the player is
        const TELEPATHIC = 0b0010;
        /// Digs through rock
        const TUNNELER = 0b0100;
        /// Sometimes moves at random
        const ERRATIC = 0b1000;
    }
}

impl Behavior {
    pub fn is_intelligent(&self) -> bool {
        self.contains(Behavior::INTELLIGENT)
    }

    pub fn is_telepathic(&self) -> bool {
        self.contains(Behavior::TELEPATHIC)
    }

    pub fn is_tunneler(&self) -> bool {
        self.contains(Behavior::TUNNELER)
    }

    pub fn is_erratic(&self) -> bool {
        self.contains(Behavior::ERRATIC)
    }

    /// Hex digit of the flag bits
    pub fn glyph(&self) -> char {
        char::from_digit(self.bits() as u32, 16).unwrap_or('?')
    }
}

/// Last known player position for intelligent monsters
#[derive(Debug, Clone, Copy, Default)]
pub struct Memory {
    pub last_seen: Option<Position>,
}

/// One of the two player-centred fields owned by the dungeon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharedField {
    Walker,
    Tunneler,
}

/// The cost field an actor is currently steering by.
///
/// `Shared` borrows one of the dungeon's fields by name; `Owned` is a private
/// field that is dropped along with the actor.
#[derive(Debug, Clone, Default)]
pub enum FieldRef {
    #[default]
    None,
    Shared(SharedField),
    Owned(CostField),
}

#[derive(Debug, Clone, Default)]
pub struct Navigation(pub FieldRef);

/// Character drawn for an actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph(pub char);

impl Glyph {
    pub fn player() -> Self {
        Self(PLAYER_GLYPH)
    }

    pub fn for_behavior(behavior: Behavior) -> Self {
        Self(behavior.glyph())
    }
}

/// Scheduler entry of an actor waiting for its next turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnTicket(pub NodeHandle);
