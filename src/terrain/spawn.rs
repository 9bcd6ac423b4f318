//! Incremental generator
//!
//! Extends the field upward as the player climbs. Each call fills the space
//! between the current topmost platform and a ceiling above the player,
//! within a fixed attempt budget. A budget that runs out just leaves a gap
//! for the auditor (or later the runtime guard) to patch.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::audit::{AuditReport, audit_reachability};
use super::field::PlatformField;
use super::lifecycle::prune;
use super::odds::KindTable;
use super::platform::{PlatformId, PlatformKind};
use super::sampler::{reachable_candidate_x, spawn_placed};
use crate::config::TerrainConfig;
use crate::consts::CANDIDATE_REACH_FRACTION;

/// Things tied to a platform that other systems act on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttachmentKind {
    Hazard,
    Pickup,
}

/// A hazard or pickup riding on a platform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub platform_id: PlatformId,
    pub kind: AttachmentKind,
    /// Offset from the platform's left edge
    pub offset_x: f32,
}

/// Result of one `extend_above` call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpawnReport {
    /// New platforms still present after auditing and pruning
    pub appended: Vec<PlatformId>,
    pub attachments: usize,
    pub attempts: u32,
    /// Attempt budget ran out before the ceiling was reached
    pub budget_exhausted: bool,
    pub audit: AuditReport,
    pub pruned: usize,
}

/// Progress scalar from height climbed, clamped to [0, 1]
pub fn progress_for_height(climbed: f32, full_difficulty_height: f32) -> f32 {
    if full_difficulty_height <= 0.0 {
        return 1.0;
    }
    (climbed / full_difficulty_height).clamp(0.0, 1.0)
}

/// Largest gap drawn at `progress`, never above `MaxJumpReach`
pub fn max_gap_for_progress(progress: f32, cfg: &TerrainConfig) -> f32 {
    let t = progress.clamp(0.0, 1.0);
    let tuning = &cfg.spawn;
    let gap = tuning.max_gap_start + (tuning.max_gap_end - tuning.max_gap_start) * t;
    gap.min(cfg.max_jump_reach()).max(tuning.min_gap)
}

/// Append platforms above the current top until it clears the ceiling
/// (`player_y - lookahead * playfield height`), the field is full, or the
/// attempt budget is spent. Then audit, prune below `visible_bottom_y`
/// and re-sort.
pub fn extend_above(
    field: &mut PlatformField,
    cfg: &TerrainConfig,
    player_y: f32,
    visible_bottom_y: f32,
    progress: f32,
) -> SpawnReport {
    let progress = progress.clamp(0.0, 1.0);
    let tuning = &cfg.spawn;
    let field_width = cfg.playfield.width;
    let probe_width = cfg.platform.max_width.min(field_width);
    let horizontal_reach = cfg.physics.horizontal_reach() * CANDIDATE_REACH_FRACTION;
    let ceiling = player_y - cfg.playfield.height * tuning.lookahead;
    let max_gap = max_gap_for_progress(progress, cfg);
    let hazard_chance = (tuning.hazard_chance_start
        + (tuning.hazard_chance_end - tuning.hazard_chance_start) * progress)
        .clamp(0.0, 1.0);
    let pickup_chance = tuning.pickup_chance.clamp(0.0, 1.0);
    let table = KindTable::for_progress(progress, tuning);

    let mut report = SpawnReport::default();
    let mut new_ids = Vec::new();

    // Nothing to build on: seed a floor just under the player
    if field.is_empty() {
        let (id, _) = spawn_placed(
            field,
            (field_width - probe_width) * 0.5,
            player_y + cfg.guard.drop_offset,
            PlatformKind::Static,
            cfg,
        );
        new_ids.push(id);
    }

    let topmost = field
        .platforms()
        .iter()
        .min_by(|a, b| a.y().total_cmp(&b.y()))
        .map(|top| (top.y(), top.center_x()));
    let (mut top_y, mut prev_center) = topmost.unwrap_or((player_y, field_width * 0.5));

    while top_y > ceiling
        && field.len() < cfg.max_platforms
        && report.attempts < tuning.attempts_per_call
    {
        report.attempts += 1;

        let gap = field.rng().random_range(tuning.min_gap..=max_gap);
        let y = top_y - gap;
        let kind = table.draw(field.rng());
        let candidate_x =
            reachable_candidate_x(prev_center, horizontal_reach, probe_width, field_width, field.rng());
        let (id, _) = spawn_placed(field, candidate_x, y, kind, cfg);

        let Some((width, center)) = field.get(id).map(|p| (p.width, p.center_x())) else {
            continue;
        };
        top_y = y;
        prev_center = center;
        new_ids.push(id);

        let hazard_ok = matches!(kind, PlatformKind::Static | PlatformKind::Moving);
        if hazard_ok && hazard_chance > 0.0 && field.rng().random_bool(hazard_chance as f64) {
            let offset_x = field.rng().random_range(0.0..=width);
            field.push_attachment(Attachment {
                platform_id: id,
                kind: AttachmentKind::Hazard,
                offset_x,
            });
            report.attachments += 1;
        }
        if pickup_chance > 0.0 && field.rng().random_bool(pickup_chance as f64) {
            let offset_x = field.rng().random_range(0.0..=width);
            field.push_attachment(Attachment {
                platform_id: id,
                kind: AttachmentKind::Pickup,
                offset_x,
            });
            report.attachments += 1;
        }
    }

    report.budget_exhausted = top_y > ceiling && report.attempts >= tuning.attempts_per_call;
    if report.budget_exhausted {
        log::debug!(
            "Spawn budget exhausted at y={:.1} (ceiling {:.1}); leaving gap",
            top_y,
            ceiling
        );
    }

    report.audit = audit_reachability(field, cfg, player_y);
    report.pruned = prune(field, cfg, visible_bottom_y);
    field.sort_by_y();

    report.appended = new_ids
        .into_iter()
        .filter(|id| field.get(*id).is_some())
        .collect();

    if !report.appended.is_empty() {
        log::debug!(
            "Extended above y={:.1}: +{} platforms ({} attachments, progress {:.2}, {} total)",
            player_y,
            report.appended.len(),
            report.attachments,
            progress,
            field.len()
        );
    }
    report
}
