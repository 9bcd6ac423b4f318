//! Reachability auditor
//!
//! Static repair pass run after (re)generation:
//! 1. every coarse y-band holding platforms must hold at least one solid one
//! 2. no consecutive vertical gap may exceed `MaxJumpReach`
//! 3. the field is cut back to `max_platforms`
//!
//! It cannot see runtime changes (a breakable breaking later); the runtime
//! guard covers those.

use std::collections::BTreeMap;

use super::field::PlatformField;
use super::platform::PlatformKind;
use super::sampler::spawn_placed;
use crate::config::TerrainConfig;
use crate::consts::MAX_AUDIT_INSERTIONS;

/// What an audit pass changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuditReport {
    /// Breakables forced to Static by the band rule
    pub hardened: usize,
    /// Static platforms synthesized into oversized gaps
    pub inserted: usize,
    /// Entries dropped to respect `max_platforms`
    pub truncated: usize,
}

/// Run all three repair steps. `anchor_y` is where the player is (or will
/// spawn); truncation drops the entries farthest from it.
pub fn audit_reachability(
    field: &mut PlatformField,
    cfg: &TerrainConfig,
    anchor_y: f32,
) -> AuditReport {
    field.sort_by_y();
    let hardened = repair_bands(field, cfg.audit.band_height);
    let inserted = repair_gaps(field, cfg);
    let truncated = field.truncate_farthest(anchor_y, cfg.max_platforms);

    let report = AuditReport {
        hardened,
        inserted,
        truncated,
    };
    if report != AuditReport::default() {
        log::debug!(
            "Audit: hardened={} inserted={} truncated={}",
            hardened,
            inserted,
            truncated
        );
    }
    report
}

/// Band index for a y coordinate
#[inline]
fn band_of(y: f32, band_height: f32) -> i64 {
    (y / band_height).floor() as i64
}

/// Force the first platform of every band without a solid platform to
/// `Static`. Empty bands are left to the gap rule.
pub fn repair_bands(field: &mut PlatformField, band_height: f32) -> usize {
    // band -> (index of first platform, band has a solid platform)
    let mut bands: BTreeMap<i64, (usize, bool)> = BTreeMap::new();
    for (i, platform) in field.platforms().iter().enumerate() {
        let entry = bands
            .entry(band_of(platform.y(), band_height))
            .or_insert((i, false));
        entry.1 |= platform.is_solid();
    }

    let platforms = field.platforms_mut();
    let mut hardened = 0;
    for (first, has_solid) in bands.into_values() {
        if !has_solid {
            platforms[first].harden();
            hardened += 1;
        }
    }
    hardened
}

/// Split every gap larger than `MaxJumpReach` at its midpoint until none
/// remain (or the insertion cap is reached). Leaves the field sorted.
pub fn repair_gaps(field: &mut PlatformField, cfg: &TerrainConfig) -> usize {
    let reach = cfg.max_jump_reach();
    let mut inserted = 0;

    while inserted < MAX_AUDIT_INSERTIONS {
        let Some((upper, lower)) = field
            .platforms()
            .windows(2)
            .find(|w| w[1].y() - w[0].y() > reach)
            .map(|w| (w[0].clone(), w[1].clone()))
        else {
            break;
        };

        let mid_y = (upper.y() + lower.y()) * 0.5;
        let mid_center = (upper.center_x() + lower.center_x()) * 0.5;
        let candidate_x = mid_center - cfg.platform.max_width * 0.5;
        let (id, _) = spawn_placed(field, candidate_x, mid_y, PlatformKind::Static, cfg);
        field.sort_by_y();
        inserted += 1;

        log::debug!(
            "Gap {:.1} between y={:.1} and y={:.1} exceeds reach {:.1}, inserted platform {}",
            lower.y() - upper.y(),
            upper.y(),
            lower.y(),
            reach,
            id
        );
    }

    if inserted == MAX_AUDIT_INSERTIONS {
        log::warn!("Audit insertion cap reached; remaining gaps left to the runtime guard");
    }
    inserted
}
