//! Distance and angle primitives shared by all movement logic.

use glam::Vec2;

/// Euclidean distance between two points.
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Angle of the vector `to - from`, in radians.
///
/// Coincident points have no direction; they yield angle 0.
#[inline]
pub fn steering_angle(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    if d.x == 0.0 && d.y == 0.0 {
        0.0
    } else {
        d.y.atan2(d.x)
    }
}

/// Unit vector `(cos, sin)` for an angle.
#[inline]
pub fn heading(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Gap between two circle edges: negative when they overlap.
#[inline]
pub fn edge_gap(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> f32 {
    distance(a_pos, b_pos) - a_radius - b_radius
}
