//! Fixed timestep simulation tick
//!
//! The host loop that drives the game: paddle motion from per-tick input,
//! ball physics against walls, paddles and bricks, brick-behavior dispatch,
//! heart and extra-paddle upkeep, and the win/lose checks.
//!
//! Collision events reach each brick at most once: every event carries the
//! brick's geometry, and events whose brick is already gone are dropped
//! before dispatch.

use glam::Vec2;
use rand::Rng;

use super::behavior::HitBrick;
use super::collision::{moving_toward, rect_bounce, reflect_velocity};
use super::factory::{BehaviorFactory, LevelError};
use super::rect::Rect;
use super::state::{BallKind, Brick, GamePhase, GameState};
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Slide the paddles left
    pub move_left: bool,
    /// Slide the paddles right
    pub move_right: bool,
    /// Clear the level immediately (debug/testing)
    pub force_clear: bool,
}

/// Lay out the brick grid and assign one behavior per brick
///
/// The factory is consulted exactly once per brick; its seed comes off the
/// game RNG so a run seed fully determines the level.
pub fn build_level(state: &mut GameState) -> Result<(), LevelError> {
    let rows = state.tuning.brick_rows;
    let per_row = state.tuning.bricks_per_row;
    let factory_seed: u64 = state.rng.random();
    let mut factory = BehaviorFactory::new(rows * per_row, factory_seed)?;

    let usable = PLAYFIELD_WIDTH - 2.0 * WALL_THICKNESS;
    let brick_w = (usable - (per_row as f32 - 1.0) * BRICK_GAP) / per_row as f32;

    for row in 0..rows {
        for col in 0..per_row {
            let pos = Vec2::new(
                WALL_THICKNESS + col as f32 * (brick_w + BRICK_GAP),
                WALL_THICKNESS + row as f32 * (BRICK_HEIGHT + BRICK_GAP),
            );
            let id = state.next_entity_id();
            let behavior = factory.next_behavior();
            state.bricks.push(Brick {
                id,
                rect: Rect::new(pos, Vec2::new(brick_w, BRICK_HEIGHT)),
                behavior,
            });
            state.tally.add(1);
        }
    }

    log::info!(
        "built level: {} bricks ({rows} rows x {per_row})",
        state.bricks.len()
    );
    Ok(())
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if state.phase != GamePhase::Playing {
        return;
    }
    state.time_ticks += 1;

    move_paddles(state, input, dt);

    let hits = move_balls(state, dt);
    for (brick_id, ball_id) in hits {
        // A brick fires once: a second ball arriving in the same tick finds
        // it already gone and the event is dropped.
        let Some((rect, behavior)) = state.brick(brick_id).map(|b| (b.rect, b.behavior.clone()))
        else {
            continue;
        };
        behavior.on_hit(HitBrick { id: brick_id, rect }, ball_id, state);
    }

    update_hearts(state, dt);
    retire_worn_extra_paddle(state);
    handle_lost_balls(state);

    let span = state.tuning.camera_follow_hit_span;
    let bounces = state.main_ball_bounces();
    state.camera.update(bounces, span);

    check_level_end(state, input);
}

fn move_paddles(state: &mut GameState, input: &TickInput, dt: f32) {
    let mut dir = 0.0;
    if input.move_left {
        dir -= 1.0;
    }
    if input.move_right {
        dir += 1.0;
    }
    let speed = state.tuning.paddle_speed;
    state.paddle.slide(dir, speed, dt);
    // The extra paddle rides the same input
    if let Some(extra) = &mut state.extra_paddle {
        extra.paddle.slide(dir, speed, dt);
    }
}

/// Integrate ball motion and resolve reflections. Returns the brick contact
/// events (brick id, ball id) for behavior dispatch after movement settles.
fn move_balls(state: &mut GameState, dt: f32) -> Vec<(u32, u32)> {
    let mut brick_hits = Vec::new();
    let paddle_rect = state.paddle.rect;
    let extra_rect = state.extra_paddle.as_ref().map(|p| p.paddle.rect);
    let mut extra_paddle_hits: u8 = 0;

    // Brick snapshot: geometry doesn't change mid-tick, and resolving
    // against a snapshot lets every ball see the same wall of bricks.
    let brick_rects: Vec<(u32, Rect)> = state.bricks.iter().map(|b| (b.id, b.rect)).collect();

    for ball in state.balls.iter_mut() {
        ball.pos += ball.vel * dt;

        // Side and top walls (the bottom is open)
        let rect = ball.rect();
        if rect.left() < WALL_THICKNESS && ball.vel.x < 0.0 {
            ball.vel.x = -ball.vel.x;
            ball.pos.x = WALL_THICKNESS + ball.size.x / 2.0;
            ball.record_bounce();
        }
        if rect.right() > PLAYFIELD_WIDTH - WALL_THICKNESS && ball.vel.x > 0.0 {
            ball.vel.x = -ball.vel.x;
            ball.pos.x = PLAYFIELD_WIDTH - WALL_THICKNESS - ball.size.x / 2.0;
            ball.record_bounce();
        }
        if ball.rect().top() < WALL_THICKNESS && ball.vel.y < 0.0 {
            ball.vel.y = -ball.vel.y;
            ball.pos.y = WALL_THICKNESS + ball.size.y / 2.0;
            ball.record_bounce();
        }

        // Paddles
        for (solid, is_extra) in [(Some(paddle_rect), false), (extra_rect, true)] {
            let Some(solid) = solid else { continue };
            let Some(bounce) = rect_bounce(&ball.rect(), &solid) else {
                continue;
            };
            if moving_toward(ball.vel, bounce.normal) {
                ball.vel = reflect_velocity(ball.vel, bounce.normal);
                ball.pos += bounce.normal * (bounce.penetration + 0.5);
                ball.record_bounce();
                if is_extra {
                    extra_paddle_hits += 1;
                }
            }
        }

        // Bricks: at most one contact per ball per tick
        for &(brick_id, brick_rect) in &brick_rects {
            let Some(bounce) = rect_bounce(&ball.rect(), &brick_rect) else {
                continue;
            };
            if !moving_toward(ball.vel, bounce.normal) {
                continue;
            }
            ball.vel = reflect_velocity(ball.vel, bounce.normal);
            ball.pos += bounce.normal * (bounce.penetration + 0.5);
            ball.record_bounce();
            brick_hits.push((brick_id, ball.id));
            break;
        }
    }

    if extra_paddle_hits > 0 {
        if let Some(extra) = &mut state.extra_paddle {
            for _ in 0..extra_paddle_hits {
                extra.register_ball_hit();
            }
        }
    }

    brick_hits
}

/// Hearts fall; the main paddle catches them for a life, the void eats the
/// rest. Only the main paddle catches - the extra paddle doesn't count.
fn update_hearts(state: &mut GameState, dt: f32) {
    let paddle_rect = state.paddle.rect;
    let mut caught = 0u32;
    state.hearts.retain_mut(|heart| {
        heart.rect.pos += heart.vel * dt;
        if heart.rect.intersects(&paddle_rect) {
            caught += 1;
            return false;
        }
        heart.rect.top() <= PLAYFIELD_HEIGHT
    });
    for _ in 0..caught {
        state.lives.gain();
        log::debug!("heart caught, lives now {}", state.lives.remaining());
    }
}

fn retire_worn_extra_paddle(state: &mut GameState) {
    let limit = state.tuning.extra_paddle_max_hits;
    if state.extra_paddle.as_ref().is_some_and(|p| p.worn_out(limit)) {
        state.extra_paddle = None;
        log::debug!("extra paddle worn out");
    }
}

/// Balls that leave through the open bottom: minis vanish, the main ball
/// costs a life (or the game) and re-serves from the center.
fn handle_lost_balls(state: &mut GameState) {
    state
        .balls
        .retain(|b| b.kind == BallKind::Main || b.rect().top() <= PLAYFIELD_HEIGHT);

    let main_lost = state
        .main_ball()
        .is_some_and(|b| b.pos.y > PLAYFIELD_HEIGHT);
    if main_lost {
        if state.lives.remaining() <= 1 {
            state.phase = GamePhase::Lost;
            log::info!("out of lives after {} ticks", state.time_ticks);
        } else {
            state.lives.lose();
            state.serve_main_ball();
            log::debug!("ball lost, {} lives left", state.lives.remaining());
        }
    }
}

fn check_level_end(state: &mut GameState, input: &TickInput) {
    if state.phase == GamePhase::Playing && (state.tally.cleared() || input.force_clear) {
        state.phase = GamePhase::Won;
        log::info!("level cleared in {} ticks", state.time_ticks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::behavior::BrickBehavior;
    use crate::sim::state::{CameraMode, ExtraPaddle};
    use crate::tuning::Tuning;

    fn push_brick(state: &mut GameState, rect: Rect, behavior: BrickBehavior) -> u32 {
        let id = state.next_entity_id();
        state.bricks.push(Brick { id, rect, behavior });
        state.tally.add(1);
        id
    }

    #[test]
    fn test_build_level_fills_the_grid() {
        let mut state = GameState::new(5, Tuning::default());
        build_level(&mut state).unwrap();

        let expected = (state.tuning.brick_rows * state.tuning.bricks_per_row) as usize;
        assert_eq!(state.bricks.len(), expected);
        assert_eq!(state.tally.remaining(), expected as i32);

        // The grid stays inside the walls
        for brick in &state.bricks {
            assert!(brick.rect.left() >= WALL_THICKNESS);
            assert!(brick.rect.right() <= PLAYFIELD_WIDTH - WALL_THICKNESS + 0.01);
        }
    }

    #[test]
    fn test_build_level_rejects_empty_grid() {
        let tuning = Tuning {
            brick_rows: 0,
            ..Tuning::default()
        };
        let mut state = GameState::new(5, tuning);
        assert_eq!(build_level(&mut state).unwrap_err(), LevelError::NoBricks);
    }

    #[test]
    fn test_ball_reflects_off_side_wall() {
        let mut state = GameState::new(5, Tuning::default());
        push_brick(
            &mut state,
            Rect::new(Vec2::new(300.0, 20.0), Vec2::new(80.0, 15.0)),
            BrickBehavior::Plain,
        );
        let ball = &mut state.balls[0];
        ball.pos = Vec2::new(WALL_THICKNESS + 8.0, 250.0);
        ball.vel = Vec2::new(-250.0, 0.0);

        tick(&mut state, &TickInput::default(), SIM_DT);

        let ball = state.main_ball().unwrap();
        assert!(ball.vel.x > 0.0);
        assert_eq!(ball.bounces, 1);
    }

    #[test]
    fn test_brick_hit_dispatches_behavior() {
        let mut state = GameState::new(5, Tuning::default());
        let brick_id = push_brick(
            &mut state,
            Rect::new(Vec2::new(100.0, 100.0), Vec2::new(80.0, 15.0)),
            BrickBehavior::Plain,
        );
        let ball = &mut state.balls[0];
        ball.pos = Vec2::new(140.0, 122.0);
        ball.vel = Vec2::new(0.0, -250.0);

        tick(&mut state, &TickInput::default(), SIM_DT);

        assert!(state.brick(brick_id).is_none());
        assert_eq!(state.tally.remaining(), 0);
        assert_eq!(state.phase, GamePhase::Won);
        // The ball bounced back down
        assert!(state.main_ball().unwrap().vel.y > 0.0);
    }

    #[test]
    fn test_one_brick_fires_once_for_two_balls() {
        let mut state = GameState::new(5, Tuning::default());
        let brick_id = push_brick(
            &mut state,
            Rect::new(Vec2::new(100.0, 100.0), Vec2::new(80.0, 15.0)),
            BrickBehavior::DropHeart,
        );
        // Two balls converging on the same brick in the same tick
        state.balls[0].pos = Vec2::new(120.0, 122.0);
        state.balls[0].vel = Vec2::new(0.0, -250.0);
        state.spawn_mini_ball(Vec2::new(160.0, 122.0), Vec2::new(0.0, -250.0));

        tick(&mut state, &TickInput::default(), SIM_DT);

        assert!(state.brick(brick_id).is_none());
        // Only the first event dispatched: one heart, one decrement
        assert_eq!(state.hearts.len(), 1);
        assert_eq!(state.tally.remaining(), 0);
    }

    #[test]
    fn test_mini_ball_drops_out_the_bottom() {
        let mut state = GameState::new(5, Tuning::default());
        push_brick(
            &mut state,
            Rect::new(Vec2::new(300.0, 20.0), Vec2::new(80.0, 15.0)),
            BrickBehavior::Plain,
        );
        state.spawn_mini_ball(Vec2::new(350.0, 520.0), Vec2::new(0.0, 250.0));

        tick(&mut state, &TickInput::default(), SIM_DT);

        assert_eq!(state.balls.len(), 1);
        assert_eq!(state.balls[0].kind, BallKind::Main);
    }

    #[test]
    fn test_main_ball_loss_costs_a_life_and_reserves() {
        let mut state = GameState::new(5, Tuning::default());
        push_brick(
            &mut state,
            Rect::new(Vec2::new(300.0, 20.0), Vec2::new(80.0, 15.0)),
            BrickBehavior::Plain,
        );
        state.balls[0].pos = Vec2::new(350.0, 520.0);
        state.balls[0].vel = Vec2::new(0.0, 250.0);

        tick(&mut state, &TickInput::default(), SIM_DT);

        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.lives.remaining(), 2);
        let ball = state.main_ball().unwrap();
        assert_eq!(ball.pos, crate::playfield_center());
    }

    #[test]
    fn test_losing_the_last_life_ends_the_game() {
        let tuning = Tuning {
            start_lives: 1,
            ..Tuning::default()
        };
        let mut state = GameState::new(5, tuning);
        push_brick(
            &mut state,
            Rect::new(Vec2::new(300.0, 20.0), Vec2::new(80.0, 15.0)),
            BrickBehavior::Plain,
        );
        state.balls[0].pos = Vec2::new(350.0, 520.0);
        state.balls[0].vel = Vec2::new(0.0, 250.0);

        tick(&mut state, &TickInput::default(), SIM_DT);

        assert_eq!(state.phase, GamePhase::Lost);
    }

    #[test]
    fn test_heart_caught_by_main_paddle() {
        let mut state = GameState::new(5, Tuning::default());
        push_brick(
            &mut state,
            Rect::new(Vec2::new(300.0, 20.0), Vec2::new(80.0, 15.0)),
            BrickBehavior::Plain,
        );
        // Use up a life so the catch is visible under the cap
        state.lives.lose();
        let paddle_center = state.paddle.rect.center();
        state.spawn_heart(paddle_center - Vec2::new(0.0, 20.0));

        for _ in 0..30 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }

        assert!(state.hearts.is_empty());
        assert_eq!(state.lives.remaining(), 3);
    }

    #[test]
    fn test_unclaimed_heart_falls_out() {
        let mut state = GameState::new(5, Tuning::default());
        push_brick(
            &mut state,
            Rect::new(Vec2::new(300.0, 20.0), Vec2::new(80.0, 15.0)),
            BrickBehavior::Plain,
        );
        let lives_before = state.lives.remaining();
        state.spawn_heart(Vec2::new(100.0, 520.0));

        tick(&mut state, &TickInput::default(), SIM_DT);

        assert!(state.hearts.is_empty());
        assert_eq!(state.lives.remaining(), lives_before);
    }

    #[test]
    fn test_extra_paddle_retires_after_final_hit() {
        let mut state = GameState::new(5, Tuning::default());
        push_brick(
            &mut state,
            Rect::new(Vec2::new(300.0, 20.0), Vec2::new(80.0, 15.0)),
            BrickBehavior::Plain,
        );
        let mut extra = ExtraPaddle::new();
        extra.hits = 3;
        let extra_center = extra.paddle.rect.center();
        state.extra_paddle = Some(extra);

        // Drop a mini ball onto the extra paddle
        state.spawn_mini_ball(extra_center - Vec2::new(0.0, 14.0), Vec2::new(0.0, 250.0));

        tick(&mut state, &TickInput::default(), SIM_DT);

        assert!(state.extra_paddle.is_none());
    }

    #[test]
    fn test_camera_releases_after_bounce_span() {
        let mut state = GameState::new(5, Tuning::default());
        push_brick(
            &mut state,
            Rect::new(Vec2::new(300.0, 20.0), Vec2::new(80.0, 15.0)),
            BrickBehavior::Plain,
        );
        state.camera.start_follow(5);
        state.balls[0].bounces = 10;
        state.balls[0].pos = crate::playfield_center();
        state.balls[0].vel = Vec2::new(0.0, -250.0);

        tick(&mut state, &TickInput::default(), SIM_DT);

        assert_eq!(state.camera.mode, CameraMode::Fixed);
    }

    #[test]
    fn test_force_clear_wins_immediately() {
        let mut state = GameState::new(5, Tuning::default());
        build_level(&mut state).unwrap();

        let input = TickInput {
            force_clear: true,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);

        assert_eq!(state.phase, GamePhase::Won);
    }

    #[test]
    fn test_determinism() {
        // Two runs with the same seed and inputs stay in lockstep
        let mut a = GameState::new(99999, Tuning::default());
        let mut b = GameState::new(99999, Tuning::default());
        build_level(&mut a).unwrap();
        build_level(&mut b).unwrap();

        let input = TickInput {
            move_right: true,
            ..Default::default()
        };
        for _ in 0..1200 {
            tick(&mut a, &input, SIM_DT);
            tick(&mut b, &input, SIM_DT);
        }

        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.phase, b.phase);
        assert_eq!(a.tally.remaining(), b.tally.remaining());
        assert_eq!(a.balls.len(), b.balls.len());
        for (x, y) in a.balls.iter().zip(&b.balls) {
            assert_eq!(x.pos, y.pos);
            assert_eq!(x.vel, y.vel);
        }
    }
}
