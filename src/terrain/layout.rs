//! Initial layout generator
//!
//! Builds the starting field bottom-up: a static spawn row near the bottom
//! of the playfield, then rows whose special-kind odds rise by tier.

use rand::Rng;

use super::audit::audit_reachability;
use super::field::PlatformField;
use super::odds::KindTable;
use super::platform::PlatformKind;
use super::sampler::{reachable_candidate_x, spawn_placed};
use crate::config::TerrainConfig;
use crate::consts::{CANDIDATE_REACH_FRACTION, SPAWN_ROW_OFFSET};

/// y of the spawn row (row 0)
pub fn spawn_row_y(cfg: &TerrainConfig) -> f32 {
    cfg.playfield.height - SPAWN_ROW_OFFSET
}

/// Generate the starting field for `seed`
pub fn generate_initial(cfg: &TerrainConfig, seed: u64) -> PlatformField {
    let mut field = PlatformField::new(seed);
    let tuning = &cfg.layout;
    let field_width = cfg.playfield.width;
    let probe_width = cfg.platform.max_width.min(field_width);
    let max_gap = tuning.max_gap.min(cfg.max_jump_reach()).max(tuning.min_gap);
    let horizontal_reach = cfg.physics.horizontal_reach() * CANDIDATE_REACH_FRACTION;

    // Row 0: centred static floor
    let mut y = spawn_row_y(cfg);
    let (first, _) = spawn_placed(
        &mut field,
        (field_width - probe_width) * 0.5,
        y,
        PlatformKind::Static,
        cfg,
    );
    let mut prev_center = field.get(first).map_or(field_width * 0.5, |p| p.center_x());

    let mut overlapping = 0;
    for row in 1..tuning.rows {
        let gap = field.rng().random_range(tuning.min_gap..=max_gap);
        y -= gap;

        let kind = KindTable::for_row(row, tuning).draw(field.rng());
        let candidate_x =
            reachable_candidate_x(prev_center, horizontal_reach, probe_width, field_width, field.rng());
        let (id, placement) = spawn_placed(&mut field, candidate_x, y, kind, cfg);
        if placement.overlapping {
            overlapping += 1;
        }
        if let Some(p) = field.get(id) {
            prev_center = p.center_x();
        }
    }

    let report = audit_reachability(&mut field, cfg, spawn_row_y(cfg));
    field.sort_by_y();

    log::info!(
        "Initial layout: {} platforms over {} rows (seed {}, {} overlapping, audit {:?})",
        field.len(),
        tuning.rows,
        seed,
        overlapping,
        report
    );
    field
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_layout_scenario() {
        let cfg = TerrainConfig::default();
        let field = generate_initial(&cfg, 12345);

        assert!(field.len() >= cfg.layout.rows as usize);
        assert!(field.len() <= cfg.max_platforms);

        // Bottom-most entry is the static spawn row
        let bottom = field.platforms().last().expect("non-empty");
        assert_eq!(bottom.kind, PlatformKind::Static);
        assert_eq!(bottom.y(), spawn_row_y(&cfg));

        // Sorted by y, non-decreasing
        assert!(field.platforms().windows(2).all(|w| w[0].y() <= w[1].y()));
        assert!(field.max_gap() <= cfg.max_jump_reach());
    }

    #[test]
    fn test_early_rows_are_plain() {
        let cfg = TerrainConfig::default();
        let field = generate_initial(&cfg, 77);
        // The lowest rows use the early tier, which never rolls breakables
        let lowest: Vec<_> = field.platforms().iter().rev().take(cfg.layout.early_rows as usize).collect();
        assert!(lowest.iter().all(|p| p.kind != PlatformKind::Breakable));
    }

    #[test]
    fn test_deterministic_per_seed() {
        let cfg = TerrainConfig::default();
        let a = generate_initial(&cfg, 99999);
        let b = generate_initial(&cfg, 99999);
        let c = generate_initial(&cfg, 11111);
        assert_eq!(a.platforms(), b.platforms());
        assert_ne!(a.platforms(), c.platforms());
    }

    #[test]
    fn test_row_count_capped_by_max_platforms() {
        let mut cfg = TerrainConfig::default();
        cfg.max_platforms = 10;
        let field = generate_initial(&cfg, 5);
        assert_eq!(field.len(), 10);
        // Truncation keeps the rows nearest the spawn row
        assert_eq!(field.max_y(), Some(spawn_row_y(&cfg)));
    }

    #[test]
    fn test_wide_gaps_are_repaired() {
        let mut cfg = TerrainConfig::default();
        cfg.layout.min_gap = 150.0;
        cfg.layout.max_gap = 160.0;
        cfg.physics.reach_factor = 0.8;
        let field = generate_initial(&cfg, 8);
        assert!(field.max_gap() <= cfg.max_jump_reach());
    }
}
