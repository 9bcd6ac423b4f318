//! Platform lifecycle
//!
//! Landing responses (including breaking), breakable regeneration, mover
//! oscillation and pruning. Every time-based rule reads the run clock
//! passed in by the caller, never a frame count.

use std::time::Duration;

use super::field::PlatformField;
use super::platform::{PlatformId, PlatformKind, PlatformState};
use crate::config::TerrainConfig;

/// Physics response to landing on a platform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LandingOutcome {
    /// Normal jump off a static or moving platform
    Bounce { impulse: f32 },
    /// Boost platform launch
    Boosted { impulse: f32 },
    /// Breakable gave way; the reduced jump still fires
    Broke { impulse: f32 },
    /// Breakable was the only support in reach and became static
    Hardened { impulse: f32 },
    /// Broken or unknown platform: fall through
    PassThrough,
}

impl LandingOutcome {
    /// Upward speed to apply, if any
    pub fn impulse(&self) -> Option<f32> {
        match *self {
            LandingOutcome::Bounce { impulse }
            | LandingOutcome::Boosted { impulse }
            | LandingOutcome::Broke { impulse }
            | LandingOutcome::Hardened { impulse } => Some(impulse),
            LandingOutcome::PassThrough => None,
        }
    }
}

/// Whether some other currently-safe platform sits within the
/// reachability horizon above platform `id`
pub fn has_safe_alternative(field: &PlatformField, cfg: &TerrainConfig, id: PlatformId) -> bool {
    let Some(base) = field.get(id) else {
        return false;
    };
    field
        .platforms()
        .iter()
        .any(|other| other.id != id && other.is_safe() && base.reaches(other, &cfg.physics))
}

/// Resolve the player landing on platform `id` at `now`
pub fn land_on(
    field: &mut PlatformField,
    cfg: &TerrainConfig,
    id: PlatformId,
    now: Duration,
) -> LandingOutcome {
    let jump = cfg.physics.jump_velocity;
    let Some((kind, broken)) = field.get(id).map(|p| (p.kind, p.is_broken())) else {
        return LandingOutcome::PassThrough;
    };
    if broken {
        return LandingOutcome::PassThrough;
    }

    match kind {
        PlatformKind::Static | PlatformKind::Moving => LandingOutcome::Bounce { impulse: jump },
        PlatformKind::Boost => LandingOutcome::Boosted {
            impulse: jump * cfg.lifecycle.boost_factor,
        },
        PlatformKind::Breakable => {
            let alternative = has_safe_alternative(field, cfg, id);
            let Some(platform) = field.get_mut(id) else {
                return LandingOutcome::PassThrough;
            };
            if alternative {
                platform.state = PlatformState::Broken { since: now };
                log::debug!("Platform {} broke at {:?}", id, now);
                LandingOutcome::Broke {
                    impulse: jump * cfg.lifecycle.break_impulse_factor,
                }
            } else {
                platform.harden();
                log::debug!("Platform {} is the only support in reach, hardened", id);
                LandingOutcome::Hardened { impulse: jump }
            }
        }
    }
}

/// Restore every broken platform whose delay has elapsed. Regenerated
/// platforms stay `Breakable`. Returns their ids.
pub fn regenerate_tick(field: &mut PlatformField, cfg: &TerrainConfig, now: Duration) -> Vec<PlatformId> {
    let delay = cfg.lifecycle.regen_delay();
    let mut restored = Vec::new();
    for platform in field.platforms_mut() {
        let PlatformState::Broken { since } = platform.state else {
            continue;
        };
        if now.saturating_sub(since) >= delay {
            platform.state = PlatformState::Intact;
            platform.kind = PlatformKind::Breakable;
            restored.push(platform.id);
        }
    }
    restored
}

/// Advance movers by `dt` seconds, bouncing at the range ends
pub fn advance_moving(field: &mut PlatformField, dt: f32) {
    for platform in field.platforms_mut() {
        let Some(motion) = platform.motion.as_mut() else {
            continue;
        };
        let mut x = platform.pos.x + motion.velocity * dt;
        if x <= motion.min_x {
            x = motion.min_x;
            motion.velocity = motion.velocity.abs();
        } else if x >= motion.max_x {
            x = motion.max_x;
            motion.velocity = -motion.velocity.abs();
        }
        platform.pos.x = x;
    }
}

/// Drop platforms that have scrolled below the visible window plus the
/// prune margin. Returns how many were dropped.
pub fn prune(field: &mut PlatformField, cfg: &TerrainConfig, visible_bottom_y: f32) -> usize {
    let limit = visible_bottom_y + cfg.lifecycle.prune_margin;
    let removed = field.retain(|p| p.y() <= limit);
    if removed > 0 {
        log::trace!("Pruned {} platforms below y={:.1}", removed, limit);
    }
    removed
}

/// Drop the entries farthest from the player until `max_platforms` hold
pub fn enforce_capacity(field: &mut PlatformField, cfg: &TerrainConfig, player_y: f32) -> usize {
    field.truncate_farthest(player_y, cfg.max_platforms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::platform::Oscillation;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn field_of(rows: &[(f32, f32, PlatformKind)]) -> (PlatformField, TerrainConfig) {
        let cfg = TerrainConfig::default();
        let mut field = PlatformField::new(21);
        for &(x, y, kind) in rows {
            field.spawn(x, y, kind, &cfg);
        }
        field.sort_by_y();
        (field, cfg)
    }

    fn id_at(field: &PlatformField, y: f32) -> PlatformId {
        field
            .platforms()
            .iter()
            .find(|p| p.y() == y)
            .map(|p| p.id)
            .expect("platform at y")
    }

    #[test]
    fn test_breaks_when_alternative_exists() {
        let (mut field, cfg) = field_of(&[
            (150.0, 500.0, PlatformKind::Breakable),
            (150.0, 400.0, PlatformKind::Static),
        ]);
        let id = id_at(&field, 500.0);
        let outcome = land_on(&mut field, &cfg, id, ms(1234));

        let expected = cfg.physics.jump_velocity * cfg.lifecycle.break_impulse_factor;
        assert_eq!(outcome, LandingOutcome::Broke { impulse: expected });
        assert!(expected < cfg.physics.jump_velocity);
        let p = field.get(id).expect("still present");
        assert_eq!(p.state, PlatformState::Broken { since: ms(1234) });
        assert_eq!(p.kind, PlatformKind::Breakable);
    }

    #[test]
    fn test_hardens_when_only_support() {
        // Nothing above within reach, only a platform below
        let (mut field, cfg) = field_of(&[
            (150.0, 500.0, PlatformKind::Breakable),
            (150.0, 600.0, PlatformKind::Static),
            (150.0, 200.0, PlatformKind::Static),
        ]);
        let id = id_at(&field, 500.0);
        let outcome = land_on(&mut field, &cfg, id, ms(0));
        assert_eq!(
            outcome,
            LandingOutcome::Hardened {
                impulse: cfg.physics.jump_velocity
            }
        );
        let p = field.get(id).expect("still present");
        assert_eq!(p.kind, PlatformKind::Static);
        assert_eq!(p.state, PlatformState::Intact);
    }

    #[test]
    fn test_broken_neighbor_is_not_an_alternative() {
        let (mut field, cfg) = field_of(&[
            (150.0, 500.0, PlatformKind::Breakable),
            (150.0, 420.0, PlatformKind::Breakable),
        ]);
        let upper = id_at(&field, 420.0);
        field.get_mut(upper).expect("upper").state = PlatformState::Broken { since: ms(0) };

        let lower = id_at(&field, 500.0);
        assert!(!has_safe_alternative(&field, &cfg, lower));
        assert!(matches!(
            land_on(&mut field, &cfg, lower, ms(10)),
            LandingOutcome::Hardened { .. }
        ));
    }

    #[test]
    fn test_out_of_horizontal_reach_is_not_an_alternative() {
        let mut cfg = TerrainConfig::default();
        cfg.physics.move_speed = 50.0;
        let mut field = PlatformField::new(1);
        let low = field.spawn(0.0, 500.0, PlatformKind::Breakable, &cfg);
        field.spawn(400.0, 420.0, PlatformKind::Static, &cfg);
        field.sort_by_y();
        assert!(!has_safe_alternative(&field, &cfg, low));
    }

    #[test]
    fn test_broken_platform_passes_through() {
        let (mut field, cfg) = field_of(&[
            (150.0, 500.0, PlatformKind::Breakable),
            (150.0, 400.0, PlatformKind::Static),
        ]);
        let id = id_at(&field, 500.0);
        land_on(&mut field, &cfg, id, ms(0));
        assert_eq!(land_on(&mut field, &cfg, id, ms(5)), LandingOutcome::PassThrough);
        assert_eq!(land_on(&mut field, &cfg, 9999, ms(5)), LandingOutcome::PassThrough);
    }

    #[test]
    fn test_boost_and_static_impulses() {
        let (mut field, cfg) = field_of(&[
            (150.0, 500.0, PlatformKind::Boost),
            (150.0, 400.0, PlatformKind::Static),
        ]);
        let boost = id_at(&field, 500.0);
        let plain = id_at(&field, 400.0);
        let boosted = land_on(&mut field, &cfg, boost, ms(0)).impulse().expect("impulse");
        let normal = land_on(&mut field, &cfg, plain, ms(0)).impulse().expect("impulse");
        assert!(boosted > normal);
        assert_eq!(normal, cfg.physics.jump_velocity);
    }

    #[test]
    fn test_regeneration_timing() {
        let (mut field, cfg) = field_of(&[(150.0, 500.0, PlatformKind::Breakable)]);
        assert_eq!(cfg.lifecycle.regen_delay(), ms(5000));
        let id = id_at(&field, 500.0);
        field.get_mut(id).expect("platform").state = PlatformState::Broken { since: ms(0) };

        assert!(regenerate_tick(&mut field, &cfg, ms(4999)).is_empty());
        assert!(field.get(id).expect("platform").is_broken());

        assert_eq!(regenerate_tick(&mut field, &cfg, ms(5000)), vec![id]);
        let p = field.get(id).expect("platform");
        assert_eq!(p.state, PlatformState::Intact);
        assert_eq!(p.kind, PlatformKind::Breakable);
    }

    #[test]
    fn test_regeneration_relative_to_break_time() {
        let (mut field, cfg) = field_of(&[(150.0, 500.0, PlatformKind::Breakable)]);
        let id = id_at(&field, 500.0);
        field.get_mut(id).expect("platform").state = PlatformState::Broken { since: ms(10_000) };
        assert!(regenerate_tick(&mut field, &cfg, ms(14_999)).is_empty());
        assert_eq!(regenerate_tick(&mut field, &cfg, ms(15_000)).len(), 1);
    }

    #[test]
    fn test_mover_bounces_inside_range() {
        let (mut field, _) = field_of(&[(200.0, 500.0, PlatformKind::Static)]);
        {
            let p = &mut field.platforms_mut()[0];
            p.kind = PlatformKind::Moving;
            p.pos.x = 200.0;
            p.motion = Some(Oscillation {
                velocity: 100.0,
                min_x: 150.0,
                max_x: 250.0,
            });
        }

        advance_moving(&mut field, 0.3);
        assert!((field.platforms()[0].x() - 230.0).abs() < 1e-3);

        advance_moving(&mut field, 0.3);
        let p = &field.platforms()[0];
        assert_eq!(p.x(), 250.0);
        assert!(p.motion.expect("mover").velocity < 0.0);

        for _ in 0..100 {
            advance_moving(&mut field, 0.05);
            let p = &field.platforms()[0];
            assert!(p.x() >= 150.0 && p.x() <= 250.0);
        }
    }

    #[test]
    fn test_static_platforms_do_not_move() {
        let (mut field, _) = field_of(&[(120.0, 500.0, PlatformKind::Static)]);
        let before = field.platforms()[0].x();
        advance_moving(&mut field, 1.0);
        assert_eq!(field.platforms()[0].x(), before);
    }

    #[test]
    fn test_prune_below_window() {
        let (mut field, cfg) = field_of(&[
            (100.0, 100.0, PlatformKind::Static),
            (100.0, 300.0, PlatformKind::Static),
            (100.0, 500.0, PlatformKind::Static),
        ]);
        // Window bottom 250, margin 120 -> keep y <= 370
        let removed = prune(&mut field, &cfg, 250.0);
        assert_eq!(removed, 1);
        assert_eq!(field.max_y(), Some(300.0));
    }

    #[test]
    fn test_enforce_capacity_keeps_nearest() {
        let (mut field, mut cfg) = field_of(&[
            (100.0, 100.0, PlatformKind::Static),
            (100.0, 200.0, PlatformKind::Static),
            (100.0, 300.0, PlatformKind::Static),
            (100.0, 400.0, PlatformKind::Static),
        ]);
        cfg.max_platforms = 2;
        assert_eq!(enforce_capacity(&mut field, &cfg, 120.0), 2);
        let ys: Vec<f32> = field.platforms().iter().map(|p| p.y()).collect();
        assert_eq!(ys, vec![100.0, 200.0]);
    }
}
