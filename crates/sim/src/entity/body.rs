//! Base body type and common motion.

use crate::geometry::distance;
use glam::Vec2;
use protocol::Color;
use protocol::packets::{BodyKind, DrawCircle};

/// Common data shared by every circular body.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyData {
    /// Centre in world coordinates.
    pub position: Vec2,
    /// Drawn size and collision extent. Always positive.
    pub radius: f32,
    /// Displacement applied per tick.
    pub velocity: Vec2,
    /// Cosmetic only.
    pub color: Color,
}

impl BodyData {
    /// Create a body at rest.
    pub fn new(position: Vec2, radius: f32, color: Color) -> Self {
        Self {
            position,
            radius,
            velocity: Vec2::ZERO,
            color,
        }
    }

    /// One tick of integration. Bodies are not clamped to the world.
    #[inline]
    pub fn advance(&mut self) {
        self.position += self.velocity;
    }

    /// Slow down when the body edge is within `threshold` of `target`.
    #[inline]
    pub fn dampen_near_target(&mut self, target: Vec2, threshold: f32, factor: f32) {
        if distance(self.position, target) - self.radius < threshold {
            self.velocity *= factor;
        }
    }

    /// Called when this body absorbs mass (food or another cell).
    #[inline]
    pub fn on_eat(&mut self, mass: f32) {
        self.radius += mass;
    }

    /// Draw-data for this body.
    #[inline]
    pub fn snapshot(&self, kind: BodyKind) -> DrawCircle {
        DrawCircle {
            kind,
            x: self.position.x,
            y: self.position.y,
            radius: self.radius,
            color: self.color,
        }
    }
}

/// Capability shared by Player, Cell and Food.
pub trait MovableBody {
    /// Kind reported to the renderer.
    const KIND: BodyKind;

    /// Get the common body data.
    fn body(&self) -> &BodyData;

    /// Get mutable body data.
    fn body_mut(&mut self) -> &mut BodyData;

    fn position(&self) -> Vec2 {
        self.body().position
    }

    fn radius(&self) -> f32 {
        self.body().radius
    }

    fn advance(&mut self) {
        self.body_mut().advance();
    }

    fn snapshot(&self) -> DrawCircle {
        self.body().snapshot(Self::KIND)
    }
}
