//! Automatic input sources.

mod autopilot;

pub use autopilot::Autopilot;
