//! Game constants organized by domain.
//!
//! Centralizing magic numbers makes tuning easier and documents intent.
//! These are the defaults behind `GameConfig`; a config file can override them.

mod actors;
mod dungeon;
mod files;
mod pathing;
mod time;

pub use actors::*;
pub use dungeon::*;
pub use files::*;
pub use pathing::*;
pub use time::*;
