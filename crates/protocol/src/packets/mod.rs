//! Packet definitions crossing the simulation boundary.
//!
//! Input packets flow from the pointer/keyboard/timer collaborators into the
//! simulation; frame packets flow from the simulation to a renderer.

mod frame;
mod input;

pub use frame::*;
pub use input::*;

/// Opcodes for input -> simulation packets.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOpcode {
    /// Pointer moved to a new world position.
    TargetMoved = 0x10,
    /// Split (Space key).
    Split = 0x11,
    /// Periodic food respawn timer fired.
    Respawn = 0x20,
}

/// Opcodes for simulation -> renderer packets.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputOpcode {
    /// Full frame of drawable circles.
    Frame = 0x30,
}
