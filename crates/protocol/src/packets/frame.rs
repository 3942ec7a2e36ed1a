//! Simulation -> renderer frame snapshots.

use super::OutputOpcode;
use crate::{BinaryReader, BinaryWriter, Color, ProtocolError};

/// What a drawable circle represents.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyKind {
    /// The controlled player body.
    #[default]
    Player = 0,
    /// A split cell owned by the player.
    Cell = 1,
    /// A food particle.
    Food = 2,
}

impl TryFrom<u8> for BodyKind {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(BodyKind::Player),
            1 => Ok(BodyKind::Cell),
            2 => Ok(BodyKind::Food),
            other => Err(ProtocolError::InvalidBodyKind(other)),
        }
    }
}

/// One circle for the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCircle {
    pub kind: BodyKind,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub color: Color,
}

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    /// Tick number that produced this frame.
    pub tick: u64,
    /// Whether a split request would currently be accepted.
    pub can_split: bool,
    /// Player radius plus all cell radii.
    pub total_mass: f32,
    /// Player first, then cells in split order, then food.
    pub circles: Vec<DrawCircle>,
}

// opcode + tick + flag + mass + count
const HEADER_LEN: usize = 1 + 8 + 1 + 4 + 4;
// kind + x + y + radius + rgb
const CIRCLE_LEN: usize = 1 + 12 + 3;

impl Frame {
    /// Number of food circles in the frame.
    pub fn food_count(&self) -> usize {
        self.circles
            .iter()
            .filter(|c| c.kind == BodyKind::Food)
            .count()
    }

    /// Number of split cells in the frame.
    pub fn cell_count(&self) -> usize {
        self.circles
            .iter()
            .filter(|c| c.kind == BodyKind::Cell)
            .count()
    }

    /// Build a Frame packet (0x30).
    pub fn build(&self) -> BinaryWriter {
        let mut w = BinaryWriter::with_capacity(HEADER_LEN + self.circles.len() * CIRCLE_LEN);
        w.put_u8(OutputOpcode::Frame as u8);
        w.put_u64(self.tick);
        w.put_u8(self.can_split as u8);
        w.put_f32(self.total_mass);
        w.put_u32(self.circles.len() as u32);
        for circle in &self.circles {
            w.put_u8(circle.kind as u8);
            w.put_f32(circle.x);
            w.put_f32(circle.y);
            w.put_f32(circle.radius);
            w.put_u8(circle.color.r);
            w.put_u8(circle.color.g);
            w.put_u8(circle.color.b);
        }
        w
    }

    /// Parse a Frame packet from raw bytes.
    pub fn parse(data: &[u8]) -> Result<Self, ProtocolError> {
        let mut reader = BinaryReader::new(data.to_vec());
        let opcode = reader.try_get_u8().ok_or(ProtocolError::UnexpectedEof)?;
        if opcode != OutputOpcode::Frame as u8 {
            return Err(ProtocolError::InvalidOpcode(opcode));
        }

        let tick = reader.try_get_u64().ok_or(ProtocolError::UnexpectedEof)?;
        let can_split = reader.try_get_u8().ok_or(ProtocolError::UnexpectedEof)? != 0;
        let total_mass = reader.try_get_f32().ok_or(ProtocolError::UnexpectedEof)?;
        let count = reader.try_get_u32().ok_or(ProtocolError::UnexpectedEof)? as usize;

        // Don't trust the count for preallocation beyond what the buffer holds
        if reader.remaining() < count.saturating_mul(CIRCLE_LEN) {
            return Err(ProtocolError::UnexpectedEof);
        }

        let mut circles = Vec::with_capacity(count);
        for _ in 0..count {
            let kind = BodyKind::try_from(reader.get_u8())?;
            let x = reader.try_get_f32().ok_or(ProtocolError::UnexpectedEof)?;
            let y = reader.try_get_f32().ok_or(ProtocolError::UnexpectedEof)?;
            let radius = reader.try_get_f32().ok_or(ProtocolError::UnexpectedEof)?;
            let color = Color::new(reader.get_u8(), reader.get_u8(), reader.get_u8());
            circles.push(DrawCircle {
                kind,
                x,
                y,
                radius,
                color,
            });
        }

        Ok(Frame {
            tick,
            can_split,
            total_mass,
            circles,
        })
    }
}
