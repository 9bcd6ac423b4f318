//! Placement sampler
//!
//! Bounded-retry collision avoidance used by every spawn site. Overlap
//! avoidance is best-effort: once the retry budget is spent the last
//! candidate is accepted as-is, which at worst produces a visual overlap.

use rand::Rng;

use super::field::PlatformField;
use super::geometry::clamp_span;
use super::platform::{Platform, PlatformId, PlatformKind};
use crate::config::{PlacementTuning, TerrainConfig};

/// Proximity rule deciding whether a candidate crowds an existing platform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapTest {
    /// Vertical distance below which two platforms may collide
    pub vertical_clearance: f32,
    /// Extra horizontal space on top of the half-widths
    pub horizontal_padding: f32,
}

impl From<&PlacementTuning> for OverlapTest {
    fn from(tuning: &PlacementTuning) -> Self {
        Self {
            vertical_clearance: tuning.vertical_clearance,
            horizontal_padding: tuning.horizontal_padding,
        }
    }
}

impl OverlapTest {
    /// Conflict = vertically close AND centres closer than half the
    /// combined widths (plus padding)
    pub fn conflicts(&self, x: f32, y: f32, width: f32, other: &Platform) -> bool {
        let dy = (y - other.y()).abs();
        let dx = (x + width * 0.5 - other.center_x()).abs();
        dy < self.vertical_clearance && dx < (width + other.width) * 0.5 + self.horizontal_padding
    }

    pub fn conflicts_any(&self, x: f32, y: f32, width: f32, existing: &[Platform]) -> bool {
        existing.iter().any(|p| self.conflicts(x, y, width, p))
    }
}

/// Outcome of a placement search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    /// Candidates evaluated, including the first
    pub attempts: u32,
    /// True when retries ran out and the last candidate still overlaps
    pub overlapping: bool,
}

/// Find an x near `candidate_x` for a span of `width` at height `y` that
/// does not crowd `existing`, perturbing x up to `max_retries` times.
#[allow(clippy::too_many_arguments)]
pub fn place_without_overlap<R: Rng + ?Sized>(
    candidate_x: f32,
    y: f32,
    width: f32,
    existing: &[Platform],
    test: &OverlapTest,
    max_retries: u32,
    jitter: f32,
    field_width: f32,
    rng: &mut R,
) -> Placement {
    let mut x = clamp_span(candidate_x, width, field_width);
    let mut attempts = 1;

    while test.conflicts_any(x, y, width, existing) {
        if attempts > max_retries {
            log::trace!(
                "Placement at y={:.1} still overlaps after {} retries, accepting x={:.1}",
                y,
                max_retries,
                x
            );
            return Placement {
                x,
                attempts,
                overlapping: true,
            };
        }
        let offset = if jitter > 0.0 {
            rng.random_range(-jitter..=jitter)
        } else {
            0.0
        };
        x = clamp_span(x + offset, width, field_width);
        attempts += 1;
    }

    Placement {
        x,
        attempts,
        overlapping: false,
    }
}

/// Pick a left edge whose centre lies within `reach` of `from_center`
pub fn reachable_candidate_x<R: Rng + ?Sized>(
    from_center: f32,
    reach: f32,
    width: f32,
    field_width: f32,
    rng: &mut R,
) -> f32 {
    let offset = if reach > 0.0 {
        rng.random_range(-reach..=reach)
    } else {
        0.0
    };
    clamp_span(from_center + offset - width * 0.5, width, field_width)
}

/// Place and spawn one platform in `field`. The sampler probes with the
/// widest possible platform so the final (randomized) width always fits
/// the cleared slot.
pub fn spawn_placed(
    field: &mut PlatformField,
    candidate_x: f32,
    y: f32,
    kind: PlatformKind,
    cfg: &TerrainConfig,
) -> (PlatformId, Placement) {
    let probe_width = cfg.platform.max_width.min(cfg.playfield.width);
    let test = OverlapTest::from(&cfg.placement);

    // Copy out nearby rows; the RNG borrow needs the field mutably
    let existing: Vec<Platform> = field
        .platforms()
        .iter()
        .filter(|p| (p.y() - y).abs() < test.vertical_clearance)
        .cloned()
        .collect();
    let placement = place_without_overlap(
        candidate_x,
        y,
        probe_width,
        &existing,
        &test,
        cfg.placement.max_retries,
        cfg.placement.jitter,
        cfg.playfield.width,
        field.rng(),
    );

    let id = field.spawn(placement.x, y, kind, cfg);
    (id, placement)
}
