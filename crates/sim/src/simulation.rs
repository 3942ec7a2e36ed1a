//! Simulation state and the per-frame tick.

use crate::config::Config;
use crate::entity::{MergeReport, MovableBody, Player};
use crate::world::{self, ConsumptionReport, FoodField, WorldBorder};
use glam::Vec2;
use protocol::packets::{Frame, InputPacket};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, info};

/// What happened during one tick, for logging and tests.
#[derive(Debug, Clone, Default)]
pub struct TickSummary {
    pub consumption: ConsumptionReport,
    pub merges: MergeReport,
    /// Food added by respawn inputs applied this tick.
    pub respawned: usize,
    /// Whether a split input was accepted this tick.
    pub split: bool,
}

/// All mutable simulation state, owned by a single tick driver.
#[derive(Debug)]
pub struct SimulationState {
    pub config: Config,
    pub player: Player,
    pub food: FoodField,
    /// Last pointer position.
    pub target: Vec2,
    pub tick_count: u64,
    /// Summary of the most recent tick.
    pub last_tick: TickSummary,
    rng: Pcg32,
    pending: VecDeque<InputPacket>,
}

impl SimulationState {
    /// Build the initial world: a full food field and a player placed as far
    /// from any food as the sampling finds.
    pub fn new(config: Config) -> Self {
        let seed = config.runtime.seed.unwrap_or_else(rand::random);
        Self::with_seed(config, seed)
    }

    /// Same as [`SimulationState::new`] with an explicit RNG seed.
    pub fn with_seed(config: Config, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let border = WorldBorder::new(config.world.width, config.world.height);

        let mut food = FoodField::new(border, config.food.clone());
        food.populate(&mut rng);

        let spawn = world::place_farthest_from(
            &food.positions(),
            config.player.initial_radius,
            &border,
            config.player.spawn_candidates,
            &mut rng,
        );
        let color = world::random_color(&mut rng);
        let player = Player::new(
            config.player.name.clone(),
            spawn,
            config.player.initial_radius,
            color,
        );

        info!(
            "World initialized: {}x{}, {} food, player '{}' at ({:.0}, {:.0})",
            border.width,
            border.height,
            food.len(),
            player.name,
            spawn.x,
            spawn.y
        );

        Self {
            config,
            target: spawn,
            player,
            food,
            tick_count: 0,
            last_tick: TickSummary::default(),
            rng,
            pending: VecDeque::new(),
        }
    }

    /// Queue an input; it is applied at the start of the next tick.
    pub fn push_input(&mut self, packet: InputPacket) {
        self.pending.push_back(packet);
    }

    /// Number of inputs waiting for the next tick.
    pub fn pending_inputs(&self) -> usize {
        self.pending.len()
    }

    /// Whether a split would currently be accepted.
    pub fn can_split(&self) -> bool {
        self.player.can_split(&self.config.player)
    }

    /// Apply queued input in arrival order.
    fn drain_inputs(&mut self, now: Duration, summary: &mut TickSummary) {
        while let Some(packet) = self.pending.pop_front() {
            match packet {
                InputPacket::TargetMoved { x, y } => {
                    self.target = Vec2::new(x, y);
                    self.player
                        .steer_toward(self.target, self.config.player.speed_factor);
                }
                InputPacket::Split => {
                    summary.split |= self.player.split(now, &self.config.player).is_some();
                }
                InputPacket::Respawn => {
                    summary.respawned += self.food.respawn(&mut self.rng);
                }
            }
        }
    }

    /// Run one frame and return what to draw.
    pub fn tick(&mut self, now: Duration) -> Frame {
        self.tick_count += 1;
        let mut summary = TickSummary::default();

        self.drain_inputs(now, &mut summary);

        // Main body
        let player_config = &self.config.player;
        self.player.advance();
        self.player.player_data.dampen_near_target(
            self.target,
            player_config.damping_distance,
            player_config.damping_factor,
        );

        // Cells
        self.player
            .steer_cells(self.target, self.config.split.cell_return_factor);
        self.player.advance_cells();

        // Food
        summary.consumption = self
            .food
            .resolve_consumption(&mut self.player, self.config.food.eat_threshold);

        // Merge / separate
        summary.merges = self
            .player
            .resolve_cell_interactions(now, &self.config.split);

        let merged = summary.merges.into_parent + summary.merges.into_sibling;
        if summary.consumption.eaten > 0 || merged > 0 {
            debug!(
                "Tick #{}: ate {} food, {} merges, mass {:.2}",
                self.tick_count,
                summary.consumption.eaten,
                merged,
                self.player.total_mass()
            );
        }

        self.last_tick = summary;
        self.snapshot()
    }

    /// Drawable state: player, cells in split order, then food.
    pub fn snapshot(&self) -> Frame {
        let mut circles = Vec::with_capacity(1 + self.player.cells.len() + self.food.len());
        circles.push(self.player.snapshot());
        circles.extend(self.player.cells.iter().map(|c| c.snapshot()));
        circles.extend(self.food.iter().map(|f| f.snapshot()));

        Frame {
            tick: self.tick_count,
            can_split: self.can_split(),
            total_mass: self.player.total_mass(),
            circles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::packets::BodyKind;

    fn state() -> SimulationState {
        SimulationState::with_seed(Config::default(), 12345)
    }

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_initial_world() {
        let state = state();
        assert_eq!(state.food.len(), 100);
        assert_eq!(state.player.player_data.radius, 20.0);
        assert!(state.food.border.contains(state.player.position()));

        let frame = state.snapshot();
        assert_eq!(frame.tick, 0);
        assert_eq!(frame.circles.len(), 101);
        assert_eq!(frame.circles[0].kind, BodyKind::Player);
        assert_eq!(frame.food_count(), 100);
        assert!(!frame.can_split);
    }

    #[test]
    fn test_same_seed_same_world() {
        let a = state().snapshot();
        let b = state().snapshot();
        assert_eq!(a, b);
    }

    #[test]
    fn test_inputs_apply_at_tick_start() {
        let mut state = state();
        let start = state.player.position();
        let target = start + Vec2::new(200.0, 0.0);

        state.push_input(InputPacket::target(target));
        assert_eq!(state.pending_inputs(), 1);
        assert_eq!(state.player.player_data.velocity, Vec2::ZERO);

        state.tick(secs(0));
        assert_eq!(state.pending_inputs(), 0);
        assert_eq!(state.target, target);
        // radius 20 * 0.05 = 1 unit per tick, unless food was eaten
        assert!(state.player.position().x > start.x);
    }

    #[test]
    fn test_split_input_ignored_when_small() {
        let mut state = state();
        state.push_input(InputPacket::Split);
        let frame = state.tick(secs(1));
        assert!(!state.last_tick.split);
        assert_eq!(frame.cell_count(), 0);
        assert_eq!(state.player.last_split, None);
    }

    #[test]
    fn test_split_then_remerge_conserves_mass() {
        let mut state = state();
        state.player.player_data.radius = 100.0;
        state.player.player_data.velocity = Vec2::ZERO;
        // park the player in an empty corner of the world
        state.player.player_data.position = Vec2::new(-5000.0, -5000.0);
        state.target = state.player.position();

        state.push_input(InputPacket::Split);
        let frame = state.tick(secs(1));
        assert!(state.last_tick.split);
        assert_eq!(frame.cell_count(), 1);
        assert!((frame.total_mass - 100.0).abs() < 1e-3);

        // still immune at 21s, mergeable after
        state.tick(secs(21));
        assert_eq!(state.player.cells.len(), 1);
        state.tick(secs(22));
        assert!(state.player.cells.is_empty());
        assert!((state.player.total_mass() - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_respawn_input_respects_cap() {
        let mut state = state();
        state.push_input(InputPacket::Respawn);
        state.tick(secs(5));
        // field is already full
        assert_eq!(state.last_tick.respawned, 0);
        assert!(state.food.len() <= 100);
    }

    #[test]
    fn test_player_eats_food_under_it() {
        let mut state = state();
        let food_pos = state.food.iter().next().map(|f| f.position()).unwrap();
        let before = state.food.len();
        state.player.player_data.position = food_pos;
        state.target = food_pos;

        state.tick(secs(0));
        assert!(state.food.len() < before);
        assert!(state.player.player_data.radius > 20.0);
        assert!(state.last_tick.consumption.eaten >= 1);
    }
}
