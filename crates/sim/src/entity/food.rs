//! Food particle.

use super::body::{BodyData, MovableBody};
use glam::Vec2;
use protocol::Color;
use protocol::packets::BodyKind;

/// A passive food particle that the player and its cells can eat.
#[derive(Debug, Clone)]
pub struct Food {
    data: BodyData,
    /// Growth credited to whoever eats this (radius / mass ratio).
    pub mass: f32,
    /// Set once eaten; the field compacts consumed food out after each pass.
    pub consumed: bool,
}

impl Food {
    /// Create a new food particle.
    pub fn new(position: Vec2, radius: f32, color: Color, mass_ratio: f32) -> Self {
        Self {
            data: BodyData::new(position, radius, color),
            mass: radius / mass_ratio,
            consumed: false,
        }
    }
}

impl MovableBody for Food {
    const KIND: BodyKind = BodyKind::Food;

    fn body(&self) -> &BodyData {
        &self.data
    }

    fn body_mut(&mut self) -> &mut BodyData {
        &mut self.data
    }
}
