//! Skyward - terrain core for an endless vertical platformer
//!
//! Core modules:
//! - `terrain`: Deterministic platform generation, safety and lifecycle
//! - `config`: Data-driven tuning loaded from JSON
//! - `error`: Configuration errors
//! - `logging`: env_logger setup for binaries

pub mod config;
pub mod error;
pub mod logging;
pub mod terrain;

pub use config::TerrainConfig;
pub use error::ConfigError;

/// Engine-wide constants that are not part of the tunable config
pub mod consts {
    /// Largest frame delta fed to physics/oscillation (seconds)
    pub const MAX_FRAME_DT: f32 = 0.05;

    /// Vertical band of the initial spawn row above the playfield bottom
    pub const SPAWN_ROW_OFFSET: f32 = 40.0;

    /// Share of the horizontal jump reach used when scattering new rows,
    /// leaving room for width differences and sampler jitter
    pub const CANDIDATE_REACH_FRACTION: f32 = 0.75;

    /// Hard cap on gap-repair insertions in a single audit pass
    pub const MAX_AUDIT_INSERTIONS: usize = 64;
}

/// Highest vertical rise of a full jump: `v² / 2g`
#[inline]
pub fn jump_apex(jump_velocity: f32, gravity: f32) -> f32 {
    if gravity <= 0.0 {
        return 0.0;
    }
    jump_velocity * jump_velocity / (2.0 * gravity)
}

/// Time spent airborne by a full jump that lands at takeoff height
#[inline]
pub fn jump_airtime(jump_velocity: f32, gravity: f32) -> f32 {
    if gravity <= 0.0 {
        return 0.0;
    }
    2.0 * jump_velocity / gravity
}
