//! Input -> simulation packet parsing and building.

use super::InputOpcode;
use crate::{BinaryReader, BinaryWriter, Position, ProtocolError};

/// A command for the simulation, consumed at the start of the next tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputPacket {
    /// Pointer position in world coordinates (0x10).
    TargetMoved { x: f32, y: f32 },
    /// Split request (0x11).
    Split,
    /// Food respawn timer fired (0x20).
    Respawn,
}

impl InputPacket {
    /// Convenience constructor from a world position.
    pub fn target(position: Position) -> Self {
        InputPacket::TargetMoved {
            x: position.x,
            y: position.y,
        }
    }

    /// Parse an input packet from raw bytes.
    pub fn parse(data: &[u8]) -> Result<Self, ProtocolError> {
        let mut reader = BinaryReader::new(data.to_vec());
        let opcode = reader.try_get_u8().ok_or(ProtocolError::UnexpectedEof)?;

        match opcode {
            0x10 => {
                let x = reader.try_get_f32().ok_or(ProtocolError::UnexpectedEof)?;
                let y = reader.try_get_f32().ok_or(ProtocolError::UnexpectedEof)?;
                if !x.is_finite() || !y.is_finite() {
                    return Err(ProtocolError::NonFinite);
                }
                Ok(InputPacket::TargetMoved { x, y })
            }
            0x11 => Ok(InputPacket::Split),
            0x20 => Ok(InputPacket::Respawn),
            _ => Err(ProtocolError::InvalidOpcode(opcode)),
        }
    }

    /// Build the wire form of this packet.
    pub fn build(&self) -> BinaryWriter {
        match *self {
            InputPacket::TargetMoved { x, y } => {
                let mut w = BinaryWriter::with_capacity(9);
                w.put_u8(InputOpcode::TargetMoved as u8);
                w.put_f32(x);
                w.put_f32(y);
                w
            }
            InputPacket::Split => {
                let mut w = BinaryWriter::with_capacity(1);
                w.put_u8(InputOpcode::Split as u8);
                w
            }
            InputPacket::Respawn => {
                let mut w = BinaryWriter::with_capacity(1);
                w.put_u8(InputOpcode::Respawn as u8);
                w
            }
        }
    }
}
