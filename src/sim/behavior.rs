//! Brick hit behaviors
//!
//! Every brick owns exactly one behavior, fired the first time a ball
//! connects with it. All behaviors clear the brick; the augmenting variants
//! add one side effect each, and `Dual` stacks two behaviors on one brick.
//!
//! Behaviors run inside the tick with full access to the game state, so
//! their side effects (spawning balls and hearts, deploying the extra
//! paddle, grabbing the camera) go through the same entity operations the
//! rest of the simulation uses.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use super::state::{BallKind, ExtraPaddle, GameState};

/// The brick a hit landed on, captured before any removal happens
///
/// Carrying the rect in the event keeps spawn positions valid even after an
/// earlier behavior in a dual has already removed the brick.
#[derive(Debug, Clone, Copy)]
pub struct HitBrick {
    pub id: u32,
    pub rect: Rect,
}

/// What happens when a ball clears a brick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BrickBehavior {
    /// Remove the brick and count it cleared
    Plain,
    /// Clear, then burst two mini balls out of the brick
    SplitBalls,
    /// Clear, then deploy a second paddle if none is active
    ExtraPaddle,
    /// Clear, then zoom the camera onto the main ball
    CameraFocus,
    /// Clear, then drop a heart collectible
    DropHeart,
    /// Apply two behaviors back to back, plus a tally credit
    Dual(Box<BrickBehavior>, Box<BrickBehavior>),
}

impl BrickBehavior {
    /// Apply this behavior for a single contact event.
    ///
    /// `other` is the id of whatever struck the brick; anything that does
    /// not resolve to a live ball is a no-op. The host delivers at most one
    /// event per physical contact - the tick drops events whose brick is
    /// already gone, so a behavior never fires twice for one brick.
    pub fn on_hit(&self, hit: HitBrick, other: u32, state: &mut GameState) {
        let Some(kind) = state.ball_kind(other) else {
            return;
        };

        match self {
            BrickBehavior::Plain => clear_brick(hit, state),
            BrickBehavior::SplitBalls => {
                clear_brick(hit, state);
                split_mini_balls(hit.rect.center(), state);
            }
            BrickBehavior::ExtraPaddle => {
                clear_brick(hit, state);
                deploy_extra_paddle(state);
            }
            BrickBehavior::CameraFocus => {
                clear_brick(hit, state);
                // Mini balls never grab the camera
                if kind == BallKind::Main {
                    let baseline = state.main_ball_bounces();
                    state.camera.start_follow(baseline);
                }
            }
            BrickBehavior::DropHeart => {
                clear_brick(hit, state);
                state.spawn_heart(hit.rect.center());
            }
            BrickBehavior::Dual(first, second) => {
                first.on_hit(hit, other, state);
                second.on_hit(hit, other, state);
                state.tally.credit_one();
            }
        }
    }
}

/// Remove the brick and account for it.
///
/// The tally follows the removal, not the delivery: both halves of a dual
/// try to clear the same brick, and only the half that finds it still
/// standing gets to decrement.
fn clear_brick(hit: HitBrick, state: &mut GameState) {
    if state.remove_brick(hit.id) {
        state.tally.clear_one();
    }
}

/// Two mini balls from the brick center, mirror-image headings
fn split_mini_balls(center: Vec2, state: &mut GameState) {
    let speed = state.tuning.ball_speed;
    let flip_x = state.rng.random_bool(0.5);
    let flip_y = state.rng.random_bool(0.5);
    for (fx, fy) in [(flip_x, flip_y), (!flip_x, !flip_y)] {
        let vel = Vec2::new(
            if fx { -speed } else { speed },
            if fy { -speed } else { speed },
        );
        state.spawn_mini_ball(center, vel);
    }
}

fn deploy_extra_paddle(state: &mut GameState) {
    if state.extra_paddle.is_none() {
        state.extra_paddle = Some(ExtraPaddle::new());
        log::debug!("extra paddle deployed");
    }
}
