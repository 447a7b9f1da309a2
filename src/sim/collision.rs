//! Collision detection and response for axis-aligned geometry
//!
//! Balls are resolved against solid rects (bricks, paddles, walls) by the
//! axis of least penetration, which gives the surface normal for reflection.

use glam::Vec2;

use super::rect::Rect;

/// Result of resolving a moving rect against a solid one
#[derive(Debug, Clone, Copy)]
pub struct Bounce {
    /// Surface normal at the contact (pointing away from the solid)
    pub normal: Vec2,
    /// Penetration depth along the normal (for position correction)
    pub penetration: f32,
}

/// Check a moving rect against a solid rect
///
/// Returns the bounce normal along the axis of least overlap, signed by the
/// relative center positions, or `None` when the rects don't overlap.
pub fn rect_bounce(moving: &Rect, solid: &Rect) -> Option<Bounce> {
    if !moving.intersects(solid) {
        return None;
    }

    let delta = moving.center() - solid.center();
    let overlap_x = (moving.size.x + solid.size.x) / 2.0 - delta.x.abs();
    let overlap_y = (moving.size.y + solid.size.y) / 2.0 - delta.y.abs();

    if overlap_x < overlap_y {
        Some(Bounce {
            normal: Vec2::new(delta.x.signum(), 0.0),
            penetration: overlap_x,
        })
    } else {
        Some(Bounce {
            normal: Vec2::new(0.0, delta.y.signum()),
            penetration: overlap_y,
        })
    }
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// True when the velocity points into the surface
#[inline]
pub fn moving_toward(velocity: Vec2, normal: Vec2) -> bool {
    velocity.dot(normal) < 0.0
}
