//! Weighted platform-kind tables
//!
//! A table is an ordered list of (cumulative probability, kind) pairs
//! evaluated by a single uniform draw. Tables are pure functions of the
//! tuning and the progress scalar, so difficulty ramps can be tested
//! without an RNG.

use rand::Rng;

use super::platform::PlatformKind;
use crate::config::{KindOdds, LayoutTuning, SpawnTuning};

#[derive(Debug, Clone, PartialEq)]
pub struct KindTable {
    /// Ascending cumulative thresholds; the last entry is always 1.0
    entries: Vec<(f32, PlatformKind)>,
}

impl KindTable {
    /// Build from per-kind odds; leftover probability becomes `Static`
    pub fn from_odds(odds: &KindOdds) -> Self {
        let mut entries = Vec::with_capacity(4);
        let mut acc = 0.0;
        for (p, kind) in [
            (odds.breakable, PlatformKind::Breakable),
            (odds.moving, PlatformKind::Moving),
            (odds.boost, PlatformKind::Boost),
        ] {
            if p > 0.0 {
                acc = (acc + p).min(1.0);
                entries.push((acc, kind));
            }
        }
        entries.push((1.0, PlatformKind::Static));
        Self { entries }
    }

    /// Table for incremental spawns at `progress` (clamped to [0, 1]).
    /// Breakable/moving density rises with progress; boost is absent
    /// until `boost_min_progress`.
    pub fn for_progress(progress: f32, tuning: &SpawnTuning) -> Self {
        let progress = progress.clamp(0.0, 1.0);
        let mut odds = tuning.start_odds.lerp(&tuning.full_odds, progress);
        if progress < tuning.boost_min_progress {
            odds.boost = 0.0;
        }
        Self::from_odds(&odds)
    }

    /// Table for the initial layout row `row`
    pub fn for_row(row: u32, tuning: &LayoutTuning) -> Self {
        let odds = if row < tuning.early_rows {
            &tuning.early_odds
        } else if row < tuning.mid_rows {
            &tuning.mid_odds
        } else {
            &tuning.late_odds
        };
        Self::from_odds(odds)
    }

    /// Kind selected by a roll in [0, 1)
    pub fn pick(&self, roll: f32) -> PlatformKind {
        self.entries
            .iter()
            .find(|(threshold, _)| roll < *threshold)
            .map(|&(_, kind)| kind)
            .unwrap_or(PlatformKind::Static)
    }

    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> PlatformKind {
        self.pick(rng.random::<f32>())
    }

    pub fn entries(&self) -> &[(f32, PlatformKind)] {
        &self.entries
    }

    /// Probability mass assigned to `kind`
    pub fn probability(&self, kind: PlatformKind) -> f32 {
        let mut prev = 0.0;
        let mut total = 0.0;
        for &(threshold, k) in &self.entries {
            if k == kind {
                total += threshold - prev;
            }
            prev = threshold;
        }
        total
    }
}
