//! Game systems organized by domain.
//!
//! - `ai`: monster decision-making
//! - `movement`: relocation, tunneling and kills

pub mod ai;
pub mod movement;

pub use ai::decide_move;
pub use movement::{move_actor, MoveResult};
