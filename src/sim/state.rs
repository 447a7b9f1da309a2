//! Game state and core simulation types
//!
//! All state that must be persisted for determinism lives here. Entity
//! vectors are only ever mutated through idempotent add/remove operations so
//! brick behaviors stay composable without defensive checks at call sites.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::behavior::BrickBehavior;
use super::rect::Rect;
use crate::consts::*;
use crate::playfield_center;
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// All bricks cleared
    Won,
    /// Last ball lost on the last life
    Lost,
}

/// Which flavor of ball an entity is
///
/// Mini balls clear bricks exactly like the main ball, but they never drive
/// the camera and cost nothing when they fall out of the playfield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallKind {
    Main,
    Mini,
}

/// A ball entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub kind: BallKind,
    /// Center position
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    /// Total reflections off anything (walls, paddles, bricks)
    pub bounces: u32,
}

impl Ball {
    pub fn rect(&self) -> Rect {
        Rect::centered(self.pos, self.size)
    }

    /// Count one reflection (call alongside every velocity flip)
    pub fn record_bounce(&mut self) {
        self.bounces += 1;
    }
}

/// A player-controlled paddle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    pub rect: Rect,
}

impl Paddle {
    pub fn new(center: Vec2) -> Self {
        Self {
            rect: Rect::centered(center, PADDLE_SIZE),
        }
    }

    /// Slide horizontally by `dir` (-1, 0, or +1), clamped to the playfield
    pub fn slide(&mut self, dir: f32, speed: f32, dt: f32) {
        self.rect.pos.x += dir * speed * dt;
        let max_x = PLAYFIELD_WIDTH - self.rect.size.x;
        self.rect.pos.x = self.rect.pos.x.clamp(0.0, max_x);
    }
}

/// The short-lived second paddle deployed by a brick behavior
///
/// At most one exists at a time (`GameState::extra_paddle` is an `Option`).
/// It rides the same input as the main paddle and despawns after a fixed
/// number of ball hits against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraPaddle {
    pub paddle: Paddle,
    /// Ball hits taken so far
    pub hits: u8,
}

impl ExtraPaddle {
    /// Deploy centered on the playfield
    pub fn new() -> Self {
        Self {
            paddle: Paddle::new(playfield_center()),
            hits: 0,
        }
    }

    pub fn register_ball_hit(&mut self) {
        self.hits += 1;
    }

    /// True once the paddle has soaked its full hit allowance
    pub fn worn_out(&self, max_hits: u8) -> bool {
        self.hits >= max_hits
    }
}

impl Default for ExtraPaddle {
    fn default() -> Self {
        Self::new()
    }
}

/// Player life pool, capped at a maximum
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Lives {
    current: u8,
    max: u8,
}

impl Lives {
    pub fn new(start: u8, max: u8) -> Self {
        Self {
            current: start.min(max),
            max,
        }
    }

    /// Gain one life, capped at the maximum
    pub fn gain(&mut self) {
        if self.current < self.max {
            self.current += 1;
        }
    }

    pub fn lose(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    pub fn remaining(&self) -> u8 {
        self.current
    }
}

/// Remaining-brick count driving win detection
///
/// Signed on purpose: a host that delivers a second collision to an
/// already-removed brick shows up as a negative value in tests instead of
/// being silently clamped away. Writers are `clear_one` (brick clearing)
/// and `credit_one` (dual-behavior compensation); everything else reads.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BrickTally(i32);

impl BrickTally {
    /// Account for newly built bricks
    pub fn add(&mut self, n: u32) {
        self.0 += n as i32;
    }

    /// One brick cleared
    pub fn clear_one(&mut self) {
        self.0 -= 1;
    }

    /// Compensation credit from a dual behavior
    pub fn credit_one(&mut self) {
        self.0 += 1;
    }

    pub fn remaining(&self) -> i32 {
        self.0
    }

    pub fn cleared(&self) -> bool {
        self.0 <= 0
    }
}

/// Camera follow state machine: Fixed -> FollowBall -> Fixed
///
/// Activation happens in a brick behavior; deactivation happens in the tick
/// once the main ball has bounced enough times past the recorded baseline.
/// Both transitions live here so the two halves can't drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraMode {
    /// Whole playfield in view
    Fixed,
    /// Zoomed onto the main ball
    FollowBall {
        /// Main-ball bounce count captured at activation
        hit_baseline: u32,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Camera {
    pub mode: CameraMode,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            mode: CameraMode::Fixed,
        }
    }

    pub fn is_following(&self) -> bool {
        matches!(self.mode, CameraMode::FollowBall { .. })
    }

    /// Start following the main ball. No-op while already following.
    pub fn start_follow(&mut self, hit_baseline: u32) {
        if self.mode == CameraMode::Fixed {
            self.mode = CameraMode::FollowBall { hit_baseline };
        }
    }

    /// Drop back to fixed once the ball has bounced `span` more times than
    /// the baseline recorded at activation
    pub fn update(&mut self, main_ball_bounces: u32, span: u32) {
        if let CameraMode::FollowBall { hit_baseline } = self.mode {
            if main_ball_bounces > hit_baseline + span {
                self.mode = CameraMode::Fixed;
            }
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

/// A falling extra-life collectible
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Heart {
    pub id: u32,
    pub rect: Rect,
    pub vel: Vec2,
}

/// A destructible brick with exactly one owned behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brick {
    pub id: u32,
    pub rect: Rect,
    pub behavior: BrickBehavior,
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Balance knobs for this run
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub lives: Lives,
    pub tally: BrickTally,
    pub camera: Camera,
    pub paddle: Paddle,
    pub extra_paddle: Option<ExtraPaddle>,
    pub balls: Vec<Ball>,
    pub bricks: Vec<Brick>,
    pub hearts: Vec<Heart>,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub(crate) rng: Pcg32,
    next_id: u32,
}

impl GameState {
    /// Create a fresh game with the main ball served from the center.
    /// Bricks are laid out separately by [`super::tick::build_level`].
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let paddle_center = Vec2::new(
            PLAYFIELD_WIDTH / 2.0,
            PLAYFIELD_HEIGHT - PADDLE_BOTTOM_MARGIN,
        );
        let mut state = Self {
            seed,
            lives: Lives::new(tuning.start_lives, tuning.max_lives),
            tuning,
            phase: GamePhase::Playing,
            tally: BrickTally::default(),
            camera: Camera::new(),
            paddle: Paddle::new(paddle_center),
            extra_paddle: None,
            balls: Vec::new(),
            bricks: Vec::new(),
            hearts: Vec::new(),
            time_ticks: 0,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        };

        let vel = state.random_diagonal_vel();
        let id = state.next_entity_id();
        state.balls.push(Ball {
            id,
            kind: BallKind::Main,
            pos: playfield_center(),
            vel,
            size: BALL_SIZE,
            bounces: 0,
        });

        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Fixed-speed velocity with independently random x/y signs
    pub fn random_diagonal_vel(&mut self) -> Vec2 {
        let speed = self.tuning.ball_speed;
        let vx = if self.rng.random_bool(0.5) {
            -speed
        } else {
            speed
        };
        let vy = if self.rng.random_bool(0.5) {
            -speed
        } else {
            speed
        };
        Vec2::new(vx, vy)
    }

    /// Put the main ball back at the center with a fresh random heading
    pub fn serve_main_ball(&mut self) {
        let vel = self.random_diagonal_vel();
        let center = playfield_center();
        if let Some(ball) = self.balls.iter_mut().find(|b| b.kind == BallKind::Main) {
            ball.pos = center;
            ball.vel = vel;
        }
    }

    /// Spawn a mini ball and return its id
    pub fn spawn_mini_ball(&mut self, center: Vec2, vel: Vec2) -> u32 {
        let id = self.next_entity_id();
        let size = BALL_SIZE * self.tuning.mini_ball_scale;
        self.balls.push(Ball {
            id,
            kind: BallKind::Mini,
            pos: center,
            vel,
            size,
            bounces: 0,
        });
        id
    }

    /// Spawn a falling heart and return its id
    pub fn spawn_heart(&mut self, center: Vec2) -> u32 {
        let id = self.next_entity_id();
        let vel = Vec2::new(0.0, self.tuning.heart_fall_speed);
        self.hearts.push(Heart {
            id,
            rect: Rect::centered(center, HEART_SIZE),
            vel,
        });
        id
    }

    pub fn brick(&self, id: u32) -> Option<&Brick> {
        self.bricks.iter().find(|b| b.id == id)
    }

    /// Remove a brick from the live set. No-op for absent ids; returns
    /// whether the brick was actually there, so clearing accounting can
    /// follow the removal instead of the delivery.
    pub fn remove_brick(&mut self, id: u32) -> bool {
        let before = self.bricks.len();
        self.bricks.retain(|b| b.id != id);
        self.bricks.len() != before
    }

    /// Resolve an entity id to a ball kind, if it is a live ball
    pub fn ball_kind(&self, id: u32) -> Option<BallKind> {
        self.balls.iter().find(|b| b.id == id).map(|b| b.kind)
    }

    pub fn main_ball(&self) -> Option<&Ball> {
        self.balls.iter().find(|b| b.kind == BallKind::Main)
    }

    /// Total bounce count of the main ball (0 if it is gone)
    pub fn main_ball_bounces(&self) -> u32 {
        self.main_ball().map(|b| b.bounces).unwrap_or(0)
    }
}
