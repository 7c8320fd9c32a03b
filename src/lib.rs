//! Procedural dungeons, Dijkstra cost fields and a speed-ordered turn loop.
//!
//! - `pairing_heap`: mergeable priority queue shared by pathfinding and the scheduler
//! - `pathfinding`: multi-source cost fields under walker, tunneler and corridor policies
//! - `dungeon_gen`: BSP room layout and corridor carving
//! - `engine`: session setup and the turn loop

pub mod components;
pub mod config;
pub mod constants;
pub mod dungeon;
pub mod dungeon_gen;
pub mod engine;
pub mod error;
pub mod events;
pub mod grid;
pub mod pairing_heap;
pub mod pathfinding;
pub mod persistence;
pub mod render;
pub mod spawning;
pub mod systems;
pub mod tile;
pub mod time_system;
