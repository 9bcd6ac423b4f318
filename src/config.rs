//! Terrain tuning
//!
//! Every constant the generator, guard and lifecycle read lives here so a
//! game can rebalance without touching code. Loaded from JSON; missing
//! fields fall back to the defaults below.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::{jump_airtime, jump_apex};

/// Horizontal playfield and visible window size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Playfield {
    pub width: f32,
    /// Height of the visible window (world units)
    pub height: f32,
}

impl Default for Playfield {
    fn default() -> Self {
        Self {
            width: 480.0,
            height: 800.0,
        }
    }
}

/// Constants supplied by the player-physics collaborator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerPhysics {
    /// Downward acceleration (units/s²)
    pub gravity: f32,
    /// Upward speed granted by a normal landing (units/s)
    pub jump_velocity: f32,
    /// Horizontal steering speed (units/s)
    pub move_speed: f32,
    /// Scale applied to the ideal jump apex (1.0 = exact kinematics)
    pub reach_factor: f32,
}

impl Default for PlayerPhysics {
    fn default() -> Self {
        Self {
            gravity: 1800.0,
            jump_velocity: 768.0,
            move_speed: 300.0,
            reach_factor: 1.0,
        }
    }
}

impl PlayerPhysics {
    /// Largest vertical gap a player can clear (`MaxJumpReach`)
    pub fn max_jump_reach(&self) -> f32 {
        jump_apex(self.jump_velocity, self.gravity) * self.reach_factor
    }

    /// Largest horizontal drift during one full jump
    pub fn horizontal_reach(&self) -> f32 {
        self.move_speed * jump_airtime(self.jump_velocity, self.gravity)
    }
}

/// Probability of each special platform kind for one draw.
/// Whatever is left over is `Static`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct KindOdds {
    pub breakable: f32,
    pub moving: f32,
    pub boost: f32,
}

impl KindOdds {
    pub const fn new(breakable: f32, moving: f32, boost: f32) -> Self {
        Self {
            breakable,
            moving,
            boost,
        }
    }

    /// Linear blend between two odds tables, `t` clamped to [0, 1]
    pub fn lerp(&self, other: &KindOdds, t: f32) -> KindOdds {
        let t = t.clamp(0.0, 1.0);
        KindOdds {
            breakable: self.breakable + (other.breakable - self.breakable) * t,
            moving: self.moving + (other.moving - self.moving) * t,
            boost: self.boost + (other.boost - self.boost) * t,
        }
    }

    fn total(&self) -> f32 {
        self.breakable + self.moving + self.boost
    }

    fn check(&self, name: &str) -> Result<(), ConfigError> {
        let parts = [self.breakable, self.moving, self.boost];
        if parts.iter().any(|p| !(0.0..=1.0).contains(p)) || self.total() > 1.0 {
            return Err(ConfigError::Invalid(format!(
                "{name}: probabilities must lie in [0, 1] and sum to at most 1"
            )));
        }
        Ok(())
    }
}

/// Platform geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformTuning {
    pub height: f32,
    pub min_width: f32,
    pub max_width: f32,
    pub moving_speed_min: f32,
    pub moving_speed_max: f32,
    /// Half-width of a mover's oscillation range around its spawn x
    pub moving_amplitude: f32,
}

impl Default for PlatformTuning {
    fn default() -> Self {
        Self {
            height: 14.0,
            min_width: 60.0,
            max_width: 110.0,
            moving_speed_min: 40.0,
            moving_speed_max: 110.0,
            moving_amplitude: 90.0,
        }
    }
}

/// Placement sampler overlap test and retry budget
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementTuning {
    pub max_retries: u32,
    /// Platforms closer than this vertically are candidates for overlap
    pub vertical_clearance: f32,
    /// Extra horizontal space required on top of the half-widths
    pub horizontal_padding: f32,
    /// Largest x perturbation applied per retry
    pub jitter: f32,
}

impl Default for PlacementTuning {
    fn default() -> Self {
        Self {
            max_retries: 10,
            vertical_clearance: 30.0,
            horizontal_padding: 8.0,
            jitter: 140.0,
        }
    }
}

/// Initial layout generator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutTuning {
    pub rows: u32,
    pub min_gap: f32,
    pub max_gap: f32,
    /// Rows below this index use `early_odds`
    pub early_rows: u32,
    /// Rows below this index (and past `early_rows`) use `mid_odds`
    pub mid_rows: u32,
    pub early_odds: KindOdds,
    pub mid_odds: KindOdds,
    pub late_odds: KindOdds,
}

impl Default for LayoutTuning {
    fn default() -> Self {
        Self {
            rows: 28,
            min_gap: 60.0,
            max_gap: 105.0,
            early_rows: 5,
            mid_rows: 12,
            early_odds: KindOdds::new(0.0, 0.05, 0.0),
            mid_odds: KindOdds::new(0.12, 0.12, 0.0),
            late_odds: KindOdds::new(0.22, 0.16, 0.04),
        }
    }
}

/// Reachability auditor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditTuning {
    pub band_height: f32,
}

impl Default for AuditTuning {
    fn default() -> Self {
        Self { band_height: 120.0 }
    }
}

/// Incremental generator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    pub attempts_per_call: u32,
    /// How far above the player to keep generated, in playfield heights
    pub lookahead: f32,
    /// Ascent since the last extension that triggers the next one
    pub scroll_step: f32,
    pub min_gap: f32,
    /// Upper gap bound at progress 0
    pub max_gap_start: f32,
    /// Upper gap bound at progress 1 (never above `MaxJumpReach`)
    pub max_gap_end: f32,
    pub start_odds: KindOdds,
    pub full_odds: KindOdds,
    /// Boost platforms are suppressed below this progress
    pub boost_min_progress: f32,
    pub hazard_chance_start: f32,
    pub hazard_chance_end: f32,
    pub pickup_chance: f32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            attempts_per_call: 80,
            lookahead: 1.5,
            scroll_step: 120.0,
            min_gap: 60.0,
            max_gap_start: 100.0,
            max_gap_end: 150.0,
            start_odds: KindOdds::new(0.08, 0.08, 0.02),
            full_odds: KindOdds::new(0.30, 0.25, 0.05),
            boost_min_progress: 0.35,
            hazard_chance_start: 0.0,
            hazard_chance_end: 0.12,
            pickup_chance: 0.06,
        }
    }
}

/// Runtime guard
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardTuning {
    pub cooldown_ms: u64,
    /// Danger zone extent above the player
    pub zone_above: f32,
    /// Danger zone extent below the player
    pub zone_below: f32,
    /// Distance below the player where a rescue platform is placed
    pub drop_offset: f32,
}

impl Default for GuardTuning {
    fn default() -> Self {
        Self {
            cooldown_ms: 600,
            zone_above: 40.0,
            zone_below: 240.0,
            drop_offset: 90.0,
        }
    }
}

impl GuardTuning {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

/// Breakable/moving lifecycle and pruning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleTuning {
    pub regen_delay_ms: u64,
    /// Extra distance below the visible window before a platform is dropped
    pub prune_margin: f32,
    /// Impulse multiplier when a breakable gives way
    pub break_impulse_factor: f32,
    /// Impulse multiplier for boost platforms
    pub boost_factor: f32,
}

impl Default for LifecycleTuning {
    fn default() -> Self {
        Self {
            regen_delay_ms: 5000,
            prune_margin: 120.0,
            break_impulse_factor: 0.85,
            boost_factor: 1.6,
        }
    }
}

impl LifecycleTuning {
    pub fn regen_delay(&self) -> Duration {
        Duration::from_millis(self.regen_delay_ms)
    }
}

/// Complete terrain tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub max_platforms: usize,
    pub playfield: Playfield,
    pub physics: PlayerPhysics,
    pub platform: PlatformTuning,
    pub placement: PlacementTuning,
    pub layout: LayoutTuning,
    pub audit: AuditTuning,
    pub spawn: SpawnTuning,
    pub guard: GuardTuning,
    pub lifecycle: LifecycleTuning,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            max_platforms: 64,
            playfield: Playfield::default(),
            physics: PlayerPhysics::default(),
            platform: PlatformTuning::default(),
            placement: PlacementTuning::default(),
            layout: LayoutTuning::default(),
            audit: AuditTuning::default(),
            spawn: SpawnTuning::default(),
            guard: GuardTuning::default(),
            lifecycle: LifecycleTuning::default(),
        }
    }
}

impl TerrainConfig {
    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: TerrainConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded terrain config from {}", path.display());
        Ok(config)
    }

    /// `MaxJumpReach` for the configured physics
    pub fn max_jump_reach(&self) -> f32 {
        self.physics.max_jump_reach()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(msg: &str) -> Result<(), ConfigError> {
            Err(ConfigError::Invalid(msg.to_string()))
        }

        if self.max_platforms < 2 {
            return invalid("max_platforms must be at least 2");
        }
        if self.playfield.width <= 0.0 || self.playfield.height <= 0.0 {
            return invalid("playfield dimensions must be positive");
        }
        if self.physics.gravity <= 0.0 || self.physics.jump_velocity <= 0.0 {
            return invalid("gravity and jump_velocity must be positive");
        }
        if self.physics.reach_factor <= 0.0 {
            return invalid("reach_factor must be positive");
        }
        let p = &self.platform;
        if p.height <= 0.0 || p.min_width <= 0.0 || p.min_width > p.max_width {
            return invalid("platform widths must satisfy 0 < min_width <= max_width");
        }
        if p.min_width > self.playfield.width {
            return invalid("min_width does not fit in the playfield");
        }
        if p.moving_speed_min > p.moving_speed_max || p.moving_speed_min < 0.0 {
            return invalid("moving speeds must satisfy 0 <= min <= max");
        }
        if self.layout.rows == 0 {
            return invalid("layout needs at least one row");
        }
        if self.layout.min_gap <= 0.0 || self.layout.min_gap > self.layout.max_gap {
            return invalid("layout gaps must satisfy 0 < min_gap <= max_gap");
        }
        if self.spawn.min_gap <= 0.0
            || self.spawn.min_gap > self.spawn.max_gap_start
            || self.spawn.min_gap > self.spawn.max_gap_end
        {
            return invalid("spawn gaps must satisfy 0 < min_gap <= max_gap");
        }
        if self.layout.min_gap > self.max_jump_reach() || self.spawn.min_gap > self.max_jump_reach()
        {
            return invalid("min_gap exceeds the jump reach");
        }
        if self.audit.band_height <= 0.0 {
            return invalid("band_height must be positive");
        }
        if self.spawn.scroll_step <= 0.0 || self.spawn.lookahead <= 0.0 {
            return invalid("scroll_step and lookahead must be positive");
        }
        if self.guard.zone_above < 0.0
            || self.guard.zone_below <= 0.0
            || self.guard.drop_offset > self.guard.zone_below
        {
            return invalid("guard drop_offset must lie inside the danger zone");
        }
        for chance in [
            self.spawn.hazard_chance_start,
            self.spawn.hazard_chance_end,
            self.spawn.pickup_chance,
            self.spawn.boost_min_progress,
        ] {
            if !(0.0..=1.0).contains(&chance) {
                return invalid("chances must lie in [0, 1]");
            }
        }
        self.layout.early_odds.check("layout.early_odds")?;
        self.layout.mid_odds.check("layout.mid_odds")?;
        self.layout.late_odds.check("layout.late_odds")?;
        self.spawn.start_odds.check("spawn.start_odds")?;
        self.spawn.full_odds.check("spawn.full_odds")?;
        Ok(())
    }
}
