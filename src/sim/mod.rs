//! Deterministic puzzle engine
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One discrete update per tick
//! - Seeded RNG only
//! - Stable iteration order (block list order)
//! - No rendering or platform dependencies

pub mod board;
pub mod exit;
pub mod geometry;
pub mod moves;
pub mod stage;
pub mod state;
pub mod tick;
pub mod view;

pub use board::{Board, CellKind, Exit, Generation, Placement, Side, generate_board};
pub use exit::try_start_shred;
pub use geometry::{bounding_box, bounding_size, occupied_cells};
pub use moves::is_legal;
pub use stage::StageError;
pub use state::{Block, BlockColor, BlockState, GamePhase, GameState, RngState, WinMessage};
pub use tick::{TickInput, advance_animations, tick};
pub use view::{Rect, exit_arrow, shred_clip};
