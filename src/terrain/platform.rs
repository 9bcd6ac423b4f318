//! Platform entity
//!
//! The landing surfaces the player climbs. All state that renderers and
//! physics need (geometry, kind, broken timer, mover range) lives here.

use std::time::Duration;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::{Rect, clamp_span};
use crate::config::{PlayerPhysics, TerrainConfig};

/// Stable platform identifier, unique within a field
pub type PlatformId = u32;

/// Platform types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlatformKind {
    #[default]
    Static,
    /// Oscillates horizontally inside its range
    Moving,
    /// Gives way when landed on, regenerates after a delay
    Breakable,
    /// Launches the player higher than a normal jump
    Boost,
}

impl PlatformKind {
    pub const ALL: [PlatformKind; 4] = [
        PlatformKind::Static,
        PlatformKind::Moving,
        PlatformKind::Breakable,
        PlatformKind::Boost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformKind::Static => "static",
            PlatformKind::Moving => "moving",
            PlatformKind::Breakable => "breakable",
            PlatformKind::Boost => "boost",
        }
    }
}

/// Platform state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlatformState {
    #[default]
    Intact,
    /// Broken at `since` (run clock); cannot be landed on
    Broken { since: Duration },
}

/// Horizontal oscillation of a `Moving` platform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Oscillation {
    /// Signed speed (units/s)
    pub velocity: f32,
    /// Leftmost x of the platform's left edge
    pub min_x: f32,
    /// Rightmost x of the platform's left edge
    pub max_x: f32,
}

/// A platform entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub id: PlatformId,
    /// Top-left corner (y grows downward)
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    pub kind: PlatformKind,
    #[serde(default)]
    pub state: PlatformState,
    /// Present only for `Moving` platforms
    #[serde(default)]
    pub motion: Option<Oscillation>,
}

impl Platform {
    #[inline]
    pub fn x(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.pos.x + self.width * 0.5
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.width, self.height)
    }

    pub fn is_broken(&self) -> bool {
        matches!(self.state, PlatformState::Broken { .. })
    }

    /// Can never give way (audit notion of safety)
    pub fn is_solid(&self) -> bool {
        self.kind != PlatformKind::Breakable
    }

    /// Can be landed on right now
    pub fn is_safe(&self) -> bool {
        self.kind != PlatformKind::Breakable || self.state == PlatformState::Intact
    }

    /// Turn into a plain static platform in place
    pub fn harden(&mut self) {
        self.kind = PlatformKind::Static;
        self.state = PlatformState::Intact;
        self.motion = None;
    }

    /// Whether `other` is a jump target from this platform: strictly
    /// higher by at most `MaxJumpReach`, centres within horizontal reach
    pub fn reaches(&self, other: &Platform, physics: &PlayerPhysics) -> bool {
        let rise = self.y() - other.y();
        rise > 0.0
            && rise <= physics.max_jump_reach()
            && (self.center_x() - other.center_x()).abs() <= physics.horizontal_reach()
    }
}

/// Build a platform with a randomized width, clamped to the playfield.
///
/// `x` is the requested left edge. Movers oscillate in a range centred on
/// the clamped x.
pub fn create_platform<R: Rng + ?Sized>(
    id: PlatformId,
    x: f32,
    y: f32,
    kind: PlatformKind,
    cfg: &TerrainConfig,
    rng: &mut R,
) -> Platform {
    let tuning = &cfg.platform;
    let field_width = cfg.playfield.width;

    let width = if tuning.max_width > tuning.min_width {
        rng.random_range(tuning.min_width..=tuning.max_width)
    } else {
        tuning.min_width
    }
    .min(field_width);
    let x = clamp_span(x, width, field_width);

    let motion = (kind == PlatformKind::Moving).then(|| {
        let speed = if tuning.moving_speed_max > tuning.moving_speed_min {
            rng.random_range(tuning.moving_speed_min..=tuning.moving_speed_max)
        } else {
            tuning.moving_speed_min
        };
        let direction = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        Oscillation {
            velocity: speed * direction,
            min_x: clamp_span(x - tuning.moving_amplitude, width, field_width),
            max_x: clamp_span(x + tuning.moving_amplitude, width, field_width),
        }
    });

    Platform {
        id,
        pos: Vec2::new(x, y),
        width,
        height: tuning.height,
        kind,
        state: PlatformState::Intact,
        motion,
    }
}
