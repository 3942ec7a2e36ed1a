//! Simulation entities (bodies).
//!
//! This module defines every body type in the arena.

mod body;
mod cell;
mod food;
mod player;

pub use body::{BodyData, MovableBody};
pub use cell::{Cell, MergePhase};
pub use food::Food;
pub use player::{MergeReport, Player};
