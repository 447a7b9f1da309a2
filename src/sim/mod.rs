//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod behavior;
pub mod collision;
pub mod factory;
pub mod rect;
pub mod state;
pub mod tick;

pub use behavior::{BrickBehavior, HitBrick};
pub use collision::{Bounce, moving_toward, rect_bounce, reflect_velocity};
pub use factory::{BehaviorFactory, LevelError};
pub use rect::Rect;
pub use state::{
    Ball, BallKind, Brick, BrickTally, Camera, CameraMode, ExtraPaddle, GamePhase, GameState,
    Heart, Lives, Paddle,
};
pub use tick::{TickInput, build_level, tick};
