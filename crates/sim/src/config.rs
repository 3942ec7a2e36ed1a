//! Simulation configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Longest timer the driver will schedule. Larger or infinite settings
/// saturate here.
pub const MAX_TIMER: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Convert a seconds setting to a timer in `[min, MAX_TIMER]`.
fn timer_secs(secs: f32, min: f32) -> Duration {
    Duration::try_from_secs_f32(secs.max(min)).map_or(MAX_TIMER, |d| d.min(MAX_TIMER))
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub food: FoodConfig,
    #[serde(default)]
    pub split: SplitConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

impl Config {
    /// Load configuration from `config.toml` or use defaults.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new("config.toml"))
    }

    /// Load configuration from `path`, writing a default file if it is missing.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Self::from_toml_str(&contents)
        } else {
            info!("No {} found, creating default config", path.display());
            let default_config = Self::default();
            std::fs::write(path, toml::to_string_pretty(&default_config)?)?;
            Ok(default_config)
        }
    }

    /// Parse configuration text. Missing sections and keys take defaults.
    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}

/// World (canvas) dimensions. Supplied by the environment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorldConfig {
    #[serde(default = "default_world_width")]
    pub width: f32,
    #[serde(default = "default_world_height")]
    pub height: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: default_world_width(),
            height: default_world_height(),
        }
    }
}

fn default_world_width() -> f32 {
    1280.0
}
fn default_world_height() -> f32 {
    720.0
}

/// Player configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerConfig {
    #[serde(default = "default_player_name")]
    pub name: String,
    /// Starting radius; a split needs more than twice this.
    #[serde(default = "default_initial_radius")]
    pub initial_radius: f32,
    /// Maximum number of split cells. 0 means unbounded.
    #[serde(default = "default_max_cells")]
    pub max_cells: usize,
    /// Distance from the pointer (beyond the body edge) where damping starts.
    #[serde(default = "default_damping_distance")]
    pub damping_distance: f32,
    /// Velocity multiplier applied per tick inside the damping distance.
    #[serde(default = "default_damping_factor")]
    pub damping_factor: f32,
    /// Speed divisor factor: velocity = heading / (radius * speed_factor).
    #[serde(default = "default_speed_factor")]
    pub speed_factor: f32,
    /// Candidate count for farthest-point spawn placement.
    #[serde(default = "default_spawn_candidates")]
    pub spawn_candidates: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            name: default_player_name(),
            initial_radius: default_initial_radius(),
            max_cells: default_max_cells(),
            damping_distance: default_damping_distance(),
            damping_factor: default_damping_factor(),
            speed_factor: default_speed_factor(),
            spawn_candidates: default_spawn_candidates(),
        }
    }
}

impl PlayerConfig {
    /// The split-cell cap, if any.
    pub fn cell_cap(&self) -> Option<usize> {
        (self.max_cells > 0).then_some(self.max_cells)
    }
}

fn default_player_name() -> String {
    "Blob".to_string()
}
fn default_initial_radius() -> f32 {
    20.0
}
fn default_max_cells() -> usize {
    8
}
fn default_damping_distance() -> f32 {
    10.0
}
fn default_damping_factor() -> f32 {
    0.95
}
fn default_speed_factor() -> f32 {
    0.05
}
fn default_spawn_candidates() -> usize {
    10
}

/// Food configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FoodConfig {
    /// Soft cap on the number of food particles.
    #[serde(default = "default_max_food")]
    pub max_food: usize,
    /// Food mass = radius / mass_ratio.
    #[serde(default = "default_mass_ratio")]
    pub mass_ratio: f32,
    #[serde(default = "default_food_min_radius")]
    pub min_radius: f32,
    #[serde(default = "default_food_max_radius")]
    pub max_radius: f32,
    /// Inset from the world edge for spawned food.
    #[serde(default = "default_food_margin")]
    pub margin: f32,
    #[serde(default = "default_respawn_min")]
    pub respawn_min: usize,
    #[serde(default = "default_respawn_max")]
    pub respawn_max: usize,
    #[serde(default = "default_respawn_interval")]
    pub respawn_interval_secs: f32,
    /// Food is eaten when `distance - consumer_radius` drops below this.
    #[serde(default = "default_eat_threshold")]
    pub eat_threshold: f32,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            max_food: default_max_food(),
            mass_ratio: default_mass_ratio(),
            min_radius: default_food_min_radius(),
            max_radius: default_food_max_radius(),
            margin: default_food_margin(),
            respawn_min: default_respawn_min(),
            respawn_max: default_respawn_max(),
            respawn_interval_secs: default_respawn_interval(),
            eat_threshold: default_eat_threshold(),
        }
    }
}

impl FoodConfig {
    pub fn respawn_interval(&self) -> Duration {
        timer_secs(self.respawn_interval_secs, 0.001)
    }
}

fn default_max_food() -> usize {
    100
}
fn default_mass_ratio() -> f32 {
    50.0
}
fn default_food_min_radius() -> f32 {
    3.0
}
fn default_food_max_radius() -> f32 {
    10.0
}
fn default_food_margin() -> f32 {
    5.0
}
fn default_respawn_min() -> usize {
    20
}
fn default_respawn_max() -> usize {
    40
}
fn default_respawn_interval() -> f32 {
    5.0
}
fn default_eat_threshold() -> f32 {
    5.0
}

/// Split and re-merge configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SplitConfig {
    /// Seconds after a split during which cells repel instead of merging.
    #[serde(default = "default_max_split_time")]
    pub max_split_time_secs: f32,
    /// Scale applied to a cell's edge gap from its parent when steering.
    #[serde(default = "default_cell_return_factor")]
    pub cell_return_factor: f32,
    /// Edge gap below which mergeable bodies are absorbed.
    #[serde(default = "default_merge_overlap")]
    pub merge_overlap: f32,
    /// Edge gap below which immune siblings are pushed apart.
    #[serde(default = "default_separation_gap")]
    pub separation_gap: f32,
    /// Distance each sibling is pushed per tick while immune.
    #[serde(default = "default_separation_step")]
    pub separation_step: f32,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            max_split_time_secs: default_max_split_time(),
            cell_return_factor: default_cell_return_factor(),
            merge_overlap: default_merge_overlap(),
            separation_gap: default_separation_gap(),
            separation_step: default_separation_step(),
        }
    }
}

impl SplitConfig {
    pub fn max_split_time(&self) -> Duration {
        timer_secs(self.max_split_time_secs, 0.0)
    }
}

fn default_max_split_time() -> f32 {
    20.0
}
fn default_cell_return_factor() -> f32 {
    0.0112
}
fn default_merge_overlap() -> f32 {
    -10.0
}
fn default_separation_gap() -> f32 {
    1.0
}
fn default_separation_step() -> f32 {
    1.0
}

/// Driver loop settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RuntimeConfig {
    /// Frame interval in milliseconds (~60Hz).
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Fixed RNG seed for reproducible runs. Random when unset.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Log frame statistics every N ticks (0 disables).
    #[serde(default = "default_stats_every")]
    pub stats_every_ticks: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            seed: None,
            stats_every_ticks: default_stats_every(),
        }
    }
}

impl RuntimeConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1)).min(MAX_TIMER)
    }
}

fn default_tick_interval() -> u64 {
    16
}
fn default_stats_every() -> u64 {
    600
}
