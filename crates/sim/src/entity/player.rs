//! The controlled player and the cells it owns.
//!
//! The main body chases the pointer. Splitting moves half of the main body's
//! radius into a new [`Cell`] which then steers back toward the pointer,
//! scaled by how far it has drifted from its parent. For `max_split_time`
//! after the most recent split every cell is [`MergePhase::Immune`] and
//! overlapping siblings are pushed apart; afterwards overlapping cells are
//! absorbed back into the parent or into each other.

use super::body::{BodyData, MovableBody};
use super::cell::{Cell, MergePhase};
use crate::config::{PlayerConfig, SplitConfig};
use crate::geometry::{distance, edge_gap, heading, steering_angle};
use fixedbitset::FixedBitSet;
use glam::Vec2;
use protocol::Color;
use protocol::packets::BodyKind;
use std::time::Duration;
use tracing::debug;

/// Outcome of one interaction pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Cells absorbed into the main body (at most one per pass).
    pub into_parent: usize,
    /// Cells absorbed into a sibling.
    pub into_sibling: usize,
    /// Sibling pairs pushed apart.
    pub separated: usize,
}

/// The player-controlled entity.
#[derive(Debug, Clone)]
pub struct Player {
    pub player_data: BodyData,
    pub name: String,
    /// Split cells in split order.
    pub cells: Vec<Cell>,
    /// Simulation time of the most recent split.
    pub last_split: Option<Duration>,
    // Reusable buffer for the sibling pass
    absorbed: FixedBitSet,
}

impl Player {
    /// Create a player at rest.
    pub fn new(name: impl Into<String>, position: Vec2, radius: f32, color: Color) -> Self {
        Self {
            player_data: BodyData::new(position, radius, color),
            name: name.into(),
            cells: Vec::new(),
            last_split: None,
            absorbed: FixedBitSet::new(),
        }
    }

    /// Main body radius plus every cell radius.
    pub fn total_mass(&self) -> f32 {
        self.bodies().map(|b| b.radius).sum()
    }

    /// The main body followed by every cell.
    pub fn bodies(&self) -> impl Iterator<Item = &BodyData> {
        std::iter::once(&self.player_data).chain(self.cells.iter().map(|c| &c.cell_data))
    }

    /// Mutable view of the main body followed by every cell.
    pub fn bodies_mut(&mut self) -> impl Iterator<Item = &mut BodyData> {
        std::iter::once(&mut self.player_data)
            .chain(self.cells.iter_mut().map(|c| &mut c.cell_data))
    }

    /// Whether a split request would be accepted right now.
    ///
    /// Both halves must keep a positive radius.
    pub fn can_split(&self, config: &PlayerConfig) -> bool {
        let radius = self.player_data.radius;
        let half = split_radius(radius);
        let big_enough = radius > 2.0 * config.initial_radius && half > 0.0 && half < radius;
        let under_cap = config.cell_cap().is_none_or(|cap| self.cells.len() < cap);
        big_enough && under_cap
    }

    /// Point the main body at `target`. Larger bodies move slower.
    pub fn steer_toward(&mut self, target: Vec2, speed_factor: f32) {
        let data = &mut self.player_data;
        if data.position == target {
            data.velocity = Vec2::ZERO;
            return;
        }
        let dir = heading(steering_angle(data.position, target));
        data.velocity = dir / (data.radius * speed_factor);
    }

    /// Point every cell at `target`, scaled by its edge gap from the parent.
    ///
    /// Split direction is not preserved; only the pointer direction matters.
    pub fn steer_cells(&mut self, target: Vec2, return_factor: f32) {
        let parent = &self.player_data;
        for cell in &mut self.cells {
            let data = &mut cell.cell_data;
            let from_parent = distance(data.position, parent.position);
            let scale = (from_parent - data.radius - parent.radius) * return_factor;
            data.velocity = heading(steering_angle(data.position, target)) * scale;
        }
    }

    /// Advance every cell by its velocity.
    pub fn advance_cells(&mut self) {
        for cell in &mut self.cells {
            cell.advance();
        }
    }

    /// Split half of the main body into a new cell at the player's centre.
    ///
    /// Returns the new cell's index, or `None` if the player is too small or
    /// already at the cell cap. Rejection leaves the player untouched.
    pub fn split(&mut self, now: Duration, config: &PlayerConfig) -> Option<usize> {
        if !self.can_split(config) {
            return None;
        }

        let new_radius = split_radius(self.player_data.radius);
        self.player_data.radius -= new_radius;

        let data = &self.player_data;
        let cell = Cell::new(data.position, new_radius, data.color);
        self.cells.push(cell);
        self.last_split = Some(now);

        debug!(
            "{} split: main radius {:.1}, new cell radius {:.1}, {} cells",
            self.name,
            self.player_data.radius,
            new_radius,
            self.cells.len()
        );
        Some(self.cells.len() - 1)
    }

    /// Merge or separate cells for this tick.
    pub fn resolve_cell_interactions(
        &mut self,
        now: Duration,
        config: &SplitConfig,
    ) -> MergeReport {
        let mut report = MergeReport::default();
        if self.cells.is_empty() {
            return report;
        }

        let phase = MergePhase::at(now, self.last_split, config.max_split_time());
        for cell in &mut self.cells {
            cell.phase = phase;
        }

        if phase == MergePhase::Mergeable {
            let parent = &self.player_data;
            let hit = self.cells.iter().position(|c| {
                let d = &c.cell_data;
                let gap = edge_gap(d.position, d.radius, parent.position, parent.radius);
                gap < config.merge_overlap
            });
            if let Some(i) = hit {
                let cell = self.cells.remove(i);
                self.player_data.on_eat(cell.cell_data.radius);
                report.into_parent = 1;
                debug!(
                    "{} re-merged cell {} into main body (radius {:.1})",
                    self.name, i, self.player_data.radius
                );
            }
        }

        let n = self.cells.len();
        self.absorbed.clear();
        self.absorbed.grow(n);

        for i in 0..n {
            if self.absorbed.contains(i) {
                continue;
            }
            for j in (i + 1)..n {
                if self.absorbed.contains(j) {
                    continue;
                }
                let (a, b) = pair_mut(&mut self.cells, i, j);
                let (a, b) = (&mut a.cell_data, &mut b.cell_data);
                let gap = edge_gap(a.position, a.radius, b.position, b.radius);

                match phase {
                    MergePhase::Immune => {
                        if gap < config.separation_gap {
                            // Push both one step apart along the pair axis
                            let dir = heading(steering_angle(b.position, a.position));
                            a.position += dir * config.separation_step;
                            b.position -= dir * config.separation_step;
                            report.separated += 1;
                        }
                    }
                    MergePhase::Mergeable => {
                        if gap < config.merge_overlap {
                            a.on_eat(b.radius);
                            self.absorbed.insert(j);
                            report.into_sibling += 1;
                        }
                    }
                }
            }
        }

        if report.into_sibling > 0 {
            let absorbed = &self.absorbed;
            let mut idx = 0;
            self.cells.retain(|_| {
                let keep = !absorbed.contains(idx);
                idx += 1;
                keep
            });
            debug!(
                "{} merged {} sibling cells, {} left",
                self.name,
                report.into_sibling,
                self.cells.len()
            );
        }

        report
    }
}

impl MovableBody for Player {
    const KIND: BodyKind = BodyKind::Player;

    fn body(&self) -> &BodyData {
        &self.player_data
    }

    fn body_mut(&mut self) -> &mut BodyData {
        &mut self.player_data
    }
}

/// Radius moved into the new cell on a split.
#[inline]
fn split_radius(radius: f32) -> f32 {
    (radius / 2.0).round()
}

/// Borrow two distinct cells mutably (`i < j`).
#[inline]
fn pair_mut(cells: &mut [Cell], i: usize, j: usize) -> (&mut Cell, &mut Cell) {
    debug_assert!(i < j);
    let (head, tail) = cells.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn player(radius: f32) -> Player {
        Player::new("test", Vec2::new(500.0, 500.0), radius, Color::new(10, 20, 30))
    }

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_steer_toward_scales_with_radius() {
        let mut small = player(20.0);
        small.steer_toward(Vec2::new(600.0, 500.0), 0.05);
        assert!((small.player_data.velocity.x - 1.0).abs() < EPS);
        assert!(small.player_data.velocity.y.abs() < EPS);

        let mut big = player(40.0);
        big.steer_toward(Vec2::new(500.0, 900.0), 0.05);
        assert!(big.player_data.velocity.x.abs() < EPS);
        assert!((big.player_data.velocity.y - 0.5).abs() < EPS);

        // same target, same radius: same answer
        let before = big.player_data.velocity;
        big.steer_toward(Vec2::new(500.0, 900.0), 0.05);
        assert_eq!(big.player_data.velocity, before);
    }

    #[test]
    fn test_steer_toward_own_centre_stops() {
        let mut p = player(20.0);
        p.player_data.velocity = Vec2::new(3.0, 3.0);
        p.steer_toward(Vec2::new(500.0, 500.0), 0.05);
        assert_eq!(p.player_data.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_split_conserves_mass() {
        let mut p = player(45.0);
        let config = PlayerConfig::default();
        let before = p.total_mass();

        let idx = p.split(secs(1), &config);
        assert_eq!(idx, Some(0));
        assert_eq!(p.cells.len(), 1);
        assert_eq!(p.cells[0].cell_data.radius, 23.0);
        assert!((p.player_data.radius - 22.0).abs() < EPS);
        assert!((p.total_mass() - before).abs() < EPS);
        assert_eq!(p.cells[0].cell_data.position, p.player_data.position);
        assert_eq!(p.last_split, Some(secs(1)));
    }

    #[test]
    fn test_split_rejected_when_too_small() {
        let config = PlayerConfig::default();
        let mut p = player(40.0);
        assert!(!p.can_split(&config));
        assert_eq!(p.split(secs(1), &config), None);
        assert_eq!(p.player_data.radius, 40.0);
        assert!(p.cells.is_empty());
        assert_eq!(p.last_split, None);
    }

    #[test]
    fn test_split_never_empties_main_body() {
        let config = PlayerConfig {
            initial_radius: 0.4,
            ..PlayerConfig::default()
        };

        // round(1.0 / 2) = 1 would take the whole body
        let mut p = player(1.0);
        assert!(!p.can_split(&config));
        assert_eq!(p.split(secs(1), &config), None);
        assert_eq!(p.player_data.radius, 1.0);
        assert!(p.cells.is_empty());
        assert_eq!(p.last_split, None);

        // round(0.9 / 2) = 0 would make an empty cell
        let mut p = player(0.9);
        assert_eq!(p.split(secs(1), &config), None);
        assert!(p.cells.is_empty());

        let mut p = player(3.0);
        assert_eq!(p.split(secs(1), &config), Some(0));
        assert_eq!(p.cells[0].cell_data.radius, 2.0);
        assert_eq!(p.player_data.radius, 1.0);
        p.steer_toward(Vec2::new(600.0, 500.0), 0.05);
        assert!(p.player_data.velocity.is_finite());
    }

    #[test]
    fn test_split_rejected_at_cap() {
        let config = PlayerConfig {
            max_cells: 2,
            ..PlayerConfig::default()
        };
        let mut p = player(400.0);
        assert!(p.split(secs(1), &config).is_some());
        assert!(p.split(secs(2), &config).is_some());

        let radius = p.player_data.radius;
        assert_eq!(p.split(secs(3), &config), None);
        assert_eq!(p.cells.len(), 2);
        assert_eq!(p.player_data.radius, radius);
        assert_eq!(p.last_split, Some(secs(2)));
    }

    #[test]
    fn test_unbounded_cells() {
        let config = PlayerConfig {
            max_cells: 0,
            ..PlayerConfig::default()
        };
        let mut p = player(1_000_000.0);
        for t in 0..12 {
            assert!(p.split(secs(t), &config).is_some());
        }
        assert_eq!(p.cells.len(), 12);
    }

    #[test]
    fn test_steer_cells_returns_toward_parent() {
        let mut p = player(20.0);
        p.cells.push(Cell::new(Vec2::new(600.0, 500.0), 10.0, Color::default()));

        // edge gap 70, pointer straight up from the cell
        p.steer_cells(Vec2::new(600.0, 400.0), 0.0112);
        let v = p.cells[0].cell_data.velocity;
        assert!(v.x.abs() < EPS);
        assert!((v.y - -(70.0 * 0.0112)).abs() < EPS);

        p.advance_cells();
        assert!(p.cells[0].cell_data.position.y < 500.0);
    }

    #[test]
    fn test_no_remerge_inside_window() {
        let split = SplitConfig::default();
        let mut p = player(100.0);
        p.split(secs(10), &PlayerConfig::default());
        let before = p.total_mass();

        // fully overlapping the parent, but still immune
        let report = p.resolve_cell_interactions(secs(30), &split);
        assert_eq!(report.into_parent, 0);
        assert_eq!(p.cells.len(), 1);
        assert_eq!(p.cells[0].phase, MergePhase::Immune);

        let report = p.resolve_cell_interactions(secs(31), &split);
        assert_eq!(report.into_parent, 1);
        assert!(p.cells.is_empty());
        assert!((p.player_data.radius - before).abs() < EPS);
    }

    #[test]
    fn test_unbounded_split_window_never_merges() {
        let split = SplitConfig {
            max_split_time_secs: 1e20,
            ..SplitConfig::default()
        };
        let mut p = player(100.0);
        p.split(secs(1), &PlayerConfig::default());

        let report = p.resolve_cell_interactions(secs(2), &split);
        assert_eq!(report, MergeReport::default());
        let report = p.resolve_cell_interactions(secs(1_000_000), &split);
        assert_eq!(report.into_parent, 0);
        assert_eq!(p.cells.len(), 1);
        assert_eq!(p.cells[0].phase, MergePhase::Immune);
    }

    #[test]
    fn test_one_parent_merge_per_tick() {
        let split = SplitConfig::default();
        let config = PlayerConfig::default();
        let mut p = player(400.0);
        p.split(secs(0), &config);
        p.split(secs(0), &config);
        // keep siblings apart so only the parent merge applies
        p.cells[0].cell_data.position += Vec2::new(0.0, 1.0);
        p.cells[1].cell_data.position += Vec2::new(0.0, -1.0);
        p.cells[0].cell_data.radius = 5.0;
        p.cells[1].cell_data.radius = 5.0;
        p.player_data.radius = 100.0;
        let before = p.total_mass();

        let report = p.resolve_cell_interactions(secs(21), &split);
        assert_eq!(report.into_parent, 1);
        assert_eq!(p.cells.len(), 1);

        let report = p.resolve_cell_interactions(secs(22), &split);
        assert_eq!(report.into_parent, 1);
        assert!(p.cells.is_empty());
        assert!((p.total_mass() - before).abs() < EPS);
    }

    #[test]
    fn test_immune_siblings_pushed_apart() {
        let split = SplitConfig::default();
        let mut p = player(20.0);
        p.player_data.position = Vec2::new(-1000.0, -1000.0);
        p.last_split = Some(secs(0));
        p.cells.push(Cell::new(Vec2::new(100.0, 100.0), 10.0, Color::default()));
        p.cells.push(Cell::new(Vec2::new(110.0, 100.0), 10.0, Color::default()));

        let report = p.resolve_cell_interactions(secs(1), &split);
        assert_eq!(report.separated, 1);
        assert_eq!(p.cells.len(), 2);
        assert_eq!(p.cells[0].cell_data.position, Vec2::new(99.0, 100.0));
        assert_eq!(p.cells[1].cell_data.position, Vec2::new(111.0, 100.0));
    }

    #[test]
    fn test_coincident_siblings_separate_along_x() {
        let split = SplitConfig::default();
        let mut p = player(20.0);
        p.player_data.position = Vec2::new(-1000.0, -1000.0);
        p.last_split = Some(secs(0));
        p.cells.push(Cell::new(Vec2::new(50.0, 50.0), 10.0, Color::default()));
        p.cells.push(Cell::new(Vec2::new(50.0, 50.0), 10.0, Color::default()));

        p.resolve_cell_interactions(secs(1), &split);
        assert_eq!(p.cells[0].cell_data.position, Vec2::new(51.0, 50.0));
        assert_eq!(p.cells[1].cell_data.position, Vec2::new(49.0, 50.0));
    }

    #[test]
    fn test_mergeable_siblings_absorb_without_skipping() {
        let split = SplitConfig::default();
        let mut p = player(20.0);
        p.player_data.position = Vec2::new(-1000.0, -1000.0);
        p.last_split = Some(secs(0));
        // 0 and 1 overlap heavily, 2 is far away, 3 overlaps 2
        p.cells.push(Cell::new(Vec2::new(0.0, 0.0), 20.0, Color::default()));
        p.cells.push(Cell::new(Vec2::new(5.0, 0.0), 15.0, Color::default()));
        p.cells.push(Cell::new(Vec2::new(300.0, 0.0), 12.0, Color::default()));
        p.cells.push(Cell::new(Vec2::new(302.0, 0.0), 8.0, Color::default()));
        let before = p.total_mass();

        let report = p.resolve_cell_interactions(secs(25), &split);
        assert_eq!(report.into_parent, 0);
        assert_eq!(report.into_sibling, 2);
        assert_eq!(p.cells.len(), 2);
        assert_eq!(p.cells[0].cell_data.radius, 35.0);
        assert_eq!(p.cells[1].cell_data.radius, 20.0);
        assert_eq!(p.cells[1].cell_data.position, Vec2::new(300.0, 0.0));
        assert!((p.total_mass() - before).abs() < EPS);
        assert!(p.cells.iter().all(|c| c.phase == MergePhase::Mergeable));
    }
}
