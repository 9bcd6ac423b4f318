//! Runtime guard
//!
//! Per-tick safety net for softlocks the static audit cannot foresee:
//! breakables change safety after spawn. When no safe platform is left in
//! the danger zone around the player, one static platform is synthesized
//! below the player.
//!
//! Insertions are rate-limited by a wall-clock cooldown. Frame-count or
//! per-frame flags would let a persisting danger condition stack a new
//! platform every frame.

use std::time::Duration;

use glam::Vec2;

use super::field::PlatformField;
use super::platform::{PlatformId, PlatformKind};
use super::sampler::spawn_placed;
use crate::config::{GuardTuning, TerrainConfig};

/// Vertical band `[top, bottom]` scanned around the player
pub fn danger_zone(player_y: f32, tuning: &GuardTuning) -> (f32, f32) {
    (player_y - tuning.zone_above, player_y + tuning.zone_below)
}

/// True when the danger zone holds no currently-safe platform
pub fn in_danger(field: &PlatformField, tuning: &GuardTuning, player: Vec2) -> bool {
    let (top, bottom) = danger_zone(player.y, tuning);
    !field
        .platforms()
        .iter()
        .any(|p| p.y() >= top && p.y() <= bottom && p.is_safe())
}

/// Rate-limited rescue platform spawner
#[derive(Debug, Clone, Default)]
pub struct RuntimeGuard {
    /// Run-clock time of the last insertion
    last_fired: Option<Duration>,
    /// Total insertions this run
    insertions: u64,
}

impl RuntimeGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_fired(&self) -> Option<Duration> {
        self.last_fired
    }

    pub fn insertions(&self) -> u64 {
        self.insertions
    }

    /// Whether an insertion happened less than `cooldown` before `now`
    pub fn is_cooling_down(&self, now: Duration, cooldown: Duration) -> bool {
        self.last_fired
            .is_some_and(|last| now.saturating_sub(last) < cooldown)
    }

    /// Scan the danger zone and insert at most one static platform.
    /// Returns the inserted platform's id.
    pub fn tick(
        &mut self,
        field: &mut PlatformField,
        cfg: &TerrainConfig,
        player: Vec2,
        now: Duration,
    ) -> Option<PlatformId> {
        let tuning = &cfg.guard;
        if self.is_cooling_down(now, tuning.cooldown()) || !in_danger(field, tuning, player) {
            return None;
        }

        // Make room first so the rescue platform itself is never the one cut
        if field.len() >= cfg.max_platforms {
            field.truncate_farthest(player.y, cfg.max_platforms - 1);
        }

        let y = player.y + tuning.drop_offset;
        let candidate_x = player.x - cfg.platform.max_width * 0.5;
        let (id, placement) = spawn_placed(field, candidate_x, y, PlatformKind::Static, cfg);
        field.sort_by_y();

        self.last_fired = Some(now);
        self.insertions += 1;
        log::debug!(
            "Runtime guard inserted platform {} at ({:.1}, {:.1}) after {} attempts",
            id,
            placement.x,
            y,
            placement.attempts
        );
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::platform::PlatformState;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_inserts_when_zone_empty() {
        let cfg = TerrainConfig::default();
        let mut field = PlatformField::new(1);
        let mut guard = RuntimeGuard::new();
        let player = Vec2::new(240.0, 400.0);

        let id = guard.tick(&mut field, &cfg, player, ms(0)).expect("inserted");
        let p = field.get(id).expect("present");
        assert_eq!(p.kind, PlatformKind::Static);
        assert_eq!(p.y(), player.y + cfg.guard.drop_offset);
        assert!(!in_danger(&field, &cfg.guard, player));
        assert_eq!(guard.last_fired(), Some(ms(0)));
    }

    #[test]
    fn test_safe_zone_left_alone() {
        let cfg = TerrainConfig::default();
        let mut field = PlatformField::new(1);
        field.spawn(200.0, 500.0, PlatformKind::Moving, &cfg);
        let mut guard = RuntimeGuard::new();
        assert!(guard.tick(&mut field, &cfg, Vec2::new(240.0, 400.0), ms(0)).is_none());
        assert_eq!(field.len(), 1);
        assert_eq!(guard.insertions(), 0);
    }

    #[test]
    fn test_broken_breakables_do_not_count() {
        let cfg = TerrainConfig::default();
        let mut field = PlatformField::new(1);
        let id = field.spawn(200.0, 500.0, PlatformKind::Breakable, &cfg);
        let player = Vec2::new(240.0, 400.0);
        assert!(!in_danger(&field, &cfg.guard, player));

        field.get_mut(id).expect("platform").state = PlatformState::Broken { since: ms(0) };
        assert!(in_danger(&field, &cfg.guard, player));
    }

    #[test]
    fn test_zone_bounds() {
        let cfg = TerrainConfig::default();
        let mut field = PlatformField::new(1);
        let player = Vec2::new(240.0, 400.0);
        // Just outside both edges
        field.spawn(200.0, 400.0 - 41.0, PlatformKind::Static, &cfg);
        field.spawn(200.0, 400.0 + 241.0, PlatformKind::Static, &cfg);
        assert!(in_danger(&field, &cfg.guard, player));
        // On the upper edge
        field.spawn(200.0, 360.0, PlatformKind::Static, &cfg);
        assert!(!in_danger(&field, &cfg.guard, player));
    }

    #[test]
    fn test_cooldown_limits_insertions() {
        let cfg = TerrainConfig::default();
        assert_eq!(cfg.guard.cooldown(), ms(600));
        let mut field = PlatformField::new(2);
        let mut guard = RuntimeGuard::new();

        assert!(guard.tick(&mut field, &cfg, Vec2::new(240.0, 400.0), ms(0)).is_some());

        // Player far from the rescue platform: still in danger
        let stranded = Vec2::new(240.0, -2000.0);
        assert!(in_danger(&field, &cfg.guard, stranded));
        assert!(guard.tick(&mut field, &cfg, stranded, ms(100)).is_none());
        assert_eq!(field.len(), 1);

        assert!(guard.tick(&mut field, &cfg, stranded, ms(650)).is_some());
        assert_eq!(field.len(), 2);
        assert_eq!(guard.insertions(), 2);
    }

    #[test]
    fn test_many_ticks_in_window_insert_once() {
        let cfg = TerrainConfig::default();
        let mut field = PlatformField::new(3);
        let mut guard = RuntimeGuard::new();
        let mut player = Vec2::new(240.0, 0.0);
        let mut inserted = 0;
        // 120 Hz for 590 ms while the player keeps falling past everything
        for tick in 0..=70u64 {
            player.y -= 500.0;
            if guard.tick(&mut field, &cfg, player, ms(tick * 590 / 70)).is_some() {
                inserted += 1;
            }
        }
        assert_eq!(inserted, 1);
    }

    #[test]
    fn test_full_field_stays_within_capacity() {
        let mut cfg = TerrainConfig::default();
        cfg.max_platforms = 4;
        let mut field = PlatformField::new(4);
        for i in 0..4 {
            field.spawn(100.0, -1000.0 - i as f32 * 100.0, PlatformKind::Static, &cfg);
        }
        field.sort_by_y();
        let mut guard = RuntimeGuard::new();
        let id = guard
            .tick(&mut field, &cfg, Vec2::new(240.0, 400.0), ms(0))
            .expect("inserted");
        assert_eq!(field.len(), 4);
        assert!(field.get(id).is_some());
    }
}
