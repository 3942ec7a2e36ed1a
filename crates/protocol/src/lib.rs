//! Shared protocol crate for blob-arena.
//!
//! This crate contains:
//! - Binary reading/writing utilities
//! - Input messages fed into the simulation and the per-frame draw snapshot
//! - Shared types (Color, Position, etc.)

mod binary;
mod error;
pub mod packets;

pub use binary::{BinaryReader, BinaryWriter};
pub use error::ProtocolError;

/// RGB color used for bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Default body palette (orange, yellow, lime, cyan, blue, violet, pink).
pub const PALETTE: [Color; 7] = [
    Color::new(0xFF, 0x57, 0x33),
    Color::new(0xFF, 0xE3, 0x33),
    Color::new(0x83, 0xFF, 0x33),
    Color::new(0x33, 0xEC, 0xFF),
    Color::new(0x33, 0x52, 0xFF),
    Color::new(0xAC, 0x33, 0xFF),
    Color::new(0xFF, 0x33, 0x80),
];

/// Represents a 2D position using glam's Vec2.
pub type Position = glam::Vec2;
