use glam::Vec2;
use protocol::packets::{BodyKind, DrawCircle, Frame, InputPacket};
use tracing::debug;

/// Frames between target decisions.
const DECISION_INTERVAL: u32 = 2;
/// Frames to wait after requesting a split.
const SPLIT_COOLDOWN: u32 = 50;
/// Split to chase food farther than this many player radii away.
const SPLIT_REACH: f32 = 3.0;

/// Steers the player from what a renderer would see: the latest frame.
///
/// Stands in for pointer and keyboard capture in headless runs.
#[derive(Debug)]
pub struct Autopilot {
    /// Current target position.
    pub target: Vec2,
    /// Where to head when there is no food at all.
    pub home: Vec2,
    /// Frames until next decision.
    pub decision_cooldown: u32,
    /// Cooldown for splitting (frames).
    pub split_cooldown: u32,
}

impl Autopilot {
    pub fn new(home: Vec2) -> Self {
        Self {
            target: home,
            home,
            decision_cooldown: 0,
            split_cooldown: 0,
        }
    }

    /// Look at a frame and produce the input for the next tick.
    pub fn update(&mut self, frame: &Frame) -> Vec<InputPacket> {
        let mut out = Vec::new();

        if self.split_cooldown > 0 {
            self.split_cooldown -= 1;
        }
        if self.decision_cooldown > 0 {
            self.decision_cooldown -= 1;
            return out;
        }
        self.decision_cooldown = DECISION_INTERVAL;

        let Some(me) = frame.circles.iter().find(|c| c.kind == BodyKind::Player) else {
            return out;
        };
        let my_pos = Vec2::new(me.x, me.y);

        let target = nearest_food(my_pos, &frame.circles).unwrap_or(self.home);
        if target != self.target {
            self.target = target;
            out.push(InputPacket::target(target));
        }

        let far = my_pos.distance(target) > me.radius * SPLIT_REACH;
        if frame.can_split && far && self.split_cooldown == 0 {
            debug!("Autopilot splitting toward ({:.0}, {:.0})", target.x, target.y);
            self.split_cooldown = SPLIT_COOLDOWN;
            out.push(InputPacket::Split);
        }

        out
    }
}

fn nearest_food(from: Vec2, circles: &[DrawCircle]) -> Option<Vec2> {
    circles
        .iter()
        .filter(|c| c.kind == BodyKind::Food)
        .map(|c| Vec2::new(c.x, c.y))
        .min_by(|a, b| from.distance_squared(*a).total_cmp(&from.distance_squared(*b)))
}
