//! Food field and world bounds.
//!
//! Owns every food particle in the arena: batch spawning, the periodic
//! respawn policy, consumption by the player's bodies and removal of eaten
//! food.

use crate::config::FoodConfig;
use crate::entity::{Food, MovableBody, Player};
use crate::geometry::distance;
use glam::Vec2;
use protocol::{Color, PALETTE};
use rand::Rng;
use tracing::debug;

/// World bounds. The canvas origin is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBorder {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
    pub width: f32,
    pub height: f32,
}

impl WorldBorder {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            min_x: 0.0,
            min_y: 0.0,
            max_x: width,
            max_y: height,
            width,
            height,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    /// Get a uniform random position at least `inset` away from every edge.
    ///
    /// Axes too narrow for the inset collapse to their midpoint.
    #[inline]
    pub fn random_position(&self, inset: f32, rng: &mut impl Rng) -> Vec2 {
        Vec2::new(
            random_axis(rng, self.min_x + inset, self.max_x - inset),
            random_axis(rng, self.min_y + inset, self.max_y - inset),
        )
    }
}

#[inline]
fn random_axis(rng: &mut impl Rng, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.random_range(lo..hi)
    } else {
        (lo + hi) / 2.0
    }
}

/// Pick a random palette color.
#[inline]
pub fn random_color(rng: &mut impl Rng) -> Color {
    PALETTE[rng.random_range(0..PALETTE.len())]
}

/// Sample `candidate_count` points and return the one farthest from its
/// nearest neighbour in `existing`.
///
/// The first candidate with the best score wins. With nothing to avoid a
/// single random point is returned.
pub fn place_farthest_from(
    existing: &[Vec2],
    radius: f32,
    border: &WorldBorder,
    candidate_count: usize,
    rng: &mut impl Rng,
) -> Vec2 {
    let first = border.random_position(radius, rng);
    if existing.is_empty() {
        return first;
    }

    let nearest = |candidate: Vec2| {
        existing
            .iter()
            .map(|&p| distance(p, candidate))
            .fold(f32::INFINITY, f32::min)
    };

    let mut best = first;
    let mut best_score = nearest(first);
    for _ in 1..candidate_count {
        let candidate = border.random_position(radius, rng);
        let score = nearest(candidate);
        if score > best_score {
            best = candidate;
            best_score = score;
        }
    }
    best
}

/// Draw a respawn batch size in `[min, max]` and return it if the field can
/// take it without reaching `max_food`, otherwise 0.
///
/// This is a soft cap: a batch that would cross it is skipped entirely
/// rather than truncated.
pub fn respawn_count(
    current_count: usize,
    max_food: usize,
    min: usize,
    max: usize,
    rng: &mut impl Rng,
) -> usize {
    let batch = rng.random_range(min..=max.max(min));
    if current_count + batch < max_food {
        batch
    } else {
        0
    }
}

/// Food eaten during one consumption pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsumptionReport {
    /// Number of food particles eaten.
    pub eaten: usize,
    /// Radius gained per consumer: index 0 is the main body, then cells.
    pub gained: Vec<f32>,
}

/// The collection of passive food bodies.
#[derive(Debug)]
pub struct FoodField {
    foods: Vec<Food>,
    /// World bounds for placement.
    pub border: WorldBorder,
    config: FoodConfig,
}

impl FoodField {
    /// Create an empty field.
    pub fn new(border: WorldBorder, config: FoodConfig) -> Self {
        Self {
            foods: Vec::with_capacity(config.max_food),
            border,
            config,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.foods.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Food> {
        self.foods.iter()
    }

    /// Centres of all food, for spawn placement.
    pub fn positions(&self) -> Vec<Vec2> {
        self.foods.iter().map(|f| f.position()).collect()
    }

    /// Create `count` food at random positions inside the margin.
    pub fn spawn_batch(&self, count: usize, rng: &mut impl Rng) -> Vec<Food> {
        let (min_r, max_r) = (self.config.min_radius, self.config.max_radius);
        (0..count)
            .map(|_| {
                let pos = self.border.random_position(self.config.margin, rng);
                let radius = if max_r > min_r {
                    rng.random_range(min_r..=max_r)
                } else {
                    min_r
                };
                Food::new(pos, radius, random_color(rng), self.config.mass_ratio)
            })
            .collect()
    }

    /// Append a batch in one step, between ticks.
    pub fn add_batch(&mut self, batch: Vec<Food>) {
        self.foods.extend(batch);
    }

    /// Startup fill: `max_food` particles.
    pub fn populate(&mut self, rng: &mut impl Rng) -> usize {
        let batch = self.spawn_batch(self.config.max_food, rng);
        let count = batch.len();
        self.add_batch(batch);
        count
    }

    /// Periodic respawn. Returns the number of food added (possibly 0).
    pub fn respawn(&mut self, rng: &mut impl Rng) -> usize {
        let count = respawn_count(
            self.foods.len(),
            self.config.max_food,
            self.config.respawn_min,
            self.config.respawn_max,
            rng,
        );
        if count > 0 {
            let batch = self.spawn_batch(count, rng);
            self.add_batch(batch);
            debug!("Respawned {} food ({} total)", count, self.foods.len());
        }
        count
    }

    /// Let the player's main body and cells eat any food within reach.
    ///
    /// Consumers are tried in order (main body first); a particle is credited
    /// to the first one that reaches it. Eaten food is removed afterwards.
    pub fn resolve_consumption(
        &mut self,
        player: &mut Player,
        threshold: f32,
    ) -> ConsumptionReport {
        let mut report = ConsumptionReport {
            eaten: 0,
            gained: vec![0.0; 1 + player.cells.len()],
        };

        for food in &mut self.foods {
            if food.consumed {
                continue;
            }
            let food_pos = food.position();
            for (k, consumer) in player.bodies_mut().enumerate() {
                if distance(food_pos, consumer.position) - consumer.radius < threshold {
                    food.consumed = true;
                    consumer.on_eat(food.mass);
                    report.gained[k] += food.mass;
                    report.eaten += 1;
                    break;
                }
            }
        }

        self.remove_consumed();
        report
    }

    /// Compact eaten food out of the field. Returns how many were removed.
    pub fn remove_consumed(&mut self) -> usize {
        let before = self.foods.len();
        self.foods.retain(|f| !f.consumed);
        before - self.foods.len()
    }
}
