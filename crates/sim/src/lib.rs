//! Blob arena simulation library.

pub mod ai;
pub mod config;
pub mod driver;
pub mod entity;
pub mod geometry;
pub mod simulation;
pub mod world;

// Re-export commonly used types
pub use config::Config;
pub use driver::{Driver, run_loop};
pub use simulation::{SimulationState, TickSummary};
