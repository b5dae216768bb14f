//! Start-up, wiring and shutdown of the board.

pub mod board_system;
pub mod tracing;

pub use board_system::BoardSystem;
