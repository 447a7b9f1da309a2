//! Brickfall - a brick-breaking arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, brick behaviors, game state)
//! - `tuning`: Data-driven game balance
//!
//! The interesting machinery lives in `sim::behavior` and `sim::factory`:
//! every brick owns one randomly assigned behavior that fires when a ball
//! clears it, and behaviors compose recursively (bounded) into duals.

pub mod sim;
pub mod tuning;

pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    use glam::Vec2;

    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;

    /// Playfield dimensions (origin top-left, +y down)
    pub const PLAYFIELD_WIDTH: f32 = 700.0;
    pub const PLAYFIELD_HEIGHT: f32 = 500.0;
    /// Solid border along the left, right and top edges
    pub const WALL_THICKNESS: f32 = 10.0;

    /// Paddle defaults - the main paddle rides near the bottom edge
    pub const PADDLE_SIZE: Vec2 = Vec2::new(100.0, 15.0);
    pub const PADDLE_BOTTOM_MARGIN: f32 = 30.0;

    /// Ball defaults (square collider, like the bricks)
    pub const BALL_SIZE: Vec2 = Vec2::new(20.0, 20.0);

    /// Brick defaults
    pub const BRICK_HEIGHT: f32 = 15.0;
    pub const BRICK_GAP: f32 = 1.0;

    /// Heart collectible defaults
    pub const HEART_SIZE: Vec2 = Vec2::new(20.0, 15.0);
}

/// Center of the playfield
#[inline]
pub fn playfield_center() -> Vec2 {
    Vec2::new(consts::PLAYFIELD_WIDTH / 2.0, consts::PLAYFIELD_HEIGHT / 2.0)
}
