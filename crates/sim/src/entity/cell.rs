//! Split cell.

use super::body::{BodyData, MovableBody};
use glam::Vec2;
use protocol::Color;
use protocol::packets::BodyKind;
use std::time::Duration;

/// Whether split cells may merge yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePhase {
    /// Within the split window: siblings repel, nothing merges.
    #[default]
    Immune,
    /// Window elapsed: overlapping cells are absorbed.
    Mergeable,
}

impl MergePhase {
    /// Derive the phase from the most recent split time.
    ///
    /// No split yet means no cells exist to merge; treated as immune.
    pub fn at(now: Duration, last_split: Option<Duration>, max_split_time: Duration) -> Self {
        match last_split {
            Some(t) if now.saturating_sub(t) > max_split_time => MergePhase::Mergeable,
            _ => MergePhase::Immune,
        }
    }
}

/// A detached fragment of the player, owned by the player.
#[derive(Debug, Clone)]
pub struct Cell {
    pub cell_data: BodyData,
    /// Phase as of the last interaction pass.
    pub phase: MergePhase,
}

impl Cell {
    /// Create a new cell at rest.
    pub fn new(position: Vec2, radius: f32, color: Color) -> Self {
        Self {
            cell_data: BodyData::new(position, radius, color),
            phase: MergePhase::Immune,
        }
    }
}

impl MovableBody for Cell {
    const KIND: BodyKind = BodyKind::Cell;

    fn body(&self) -> &BodyData {
        &self.cell_data
    }

    fn body_mut(&mut self) -> &mut BodyData {
        &mut self.cell_data
    }
}
