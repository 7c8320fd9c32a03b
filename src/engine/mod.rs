//! Game engine - builds a session and runs it to completion.
//!
//! The engine handles:
//! - Dungeon setup (load with fallback to generation, monster population)
//! - The turn loop and outcome detection
//!
//! The application shell (main.rs) only handles:
//! - Argument parsing and persistence
//! - Choosing the player controller and frame sink

pub mod initialization;
mod simulation;

pub use initialization::{ensure_stairs, generate_layout, initialize_dungeon};
pub use simulation::*;
