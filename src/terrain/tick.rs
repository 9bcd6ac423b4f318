//! Per-frame terrain update
//!
//! One `update` call per rendered frame. Physics runs outside this module
//! and hands in the player position, the run clock and the frame delta.

use std::time::Duration;

use glam::Vec2;

use super::field::PlatformField;
use super::guard::RuntimeGuard;
use super::layout::{generate_initial, spawn_row_y};
use super::lifecycle::{LandingOutcome, advance_moving, land_on, prune, regenerate_tick};
use super::platform::PlatformId;
use super::spawn::extend_above;
use crate::config::TerrainConfig;
use crate::consts::MAX_FRAME_DT;

/// Inputs from the physics/camera collaborators for a single frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickInput {
    pub player_pos: Vec2,
    /// Run clock (real elapsed time since the run started)
    pub now: Duration,
    /// Frame delta in seconds (clamped to `MAX_FRAME_DT`)
    pub dt: f32,
    /// Difficulty ramp in [0, 1]
    pub progress: f32,
    /// Lowest y visible on screen
    pub visible_bottom_y: f32,
}

/// Something that changed in the field this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TerrainEvent {
    Spawned { count: usize },
    Regenerated { id: PlatformId },
    GuardInserted { id: PlatformId },
    Pruned { count: usize },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub events: Vec<TerrainEvent>,
}

/// Field, guard and scroll tracking for one run
#[derive(Debug, Clone)]
pub struct Terrain {
    config: TerrainConfig,
    field: PlatformField,
    guard: RuntimeGuard,
    /// Player y at the last incremental extension
    last_extend_y: f32,
}

impl Terrain {
    /// Start a run: generate the initial layout for `seed`
    pub fn new(config: TerrainConfig, seed: u64) -> Self {
        let field = generate_initial(&config, seed);
        let last_extend_y = spawn_row_y(&config);
        Self {
            config,
            field,
            guard: RuntimeGuard::new(),
            last_extend_y,
        }
    }

    /// Where the player should start: just above the spawn row
    pub fn spawn_point(&self) -> Vec2 {
        let y = spawn_row_y(&self.config);
        let x = self
            .field
            .platforms()
            .iter()
            .rev()
            .find(|p| p.y() == y)
            .map_or(self.config.playfield.width * 0.5, |p| p.center_x());
        Vec2::new(x, y)
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    pub fn field(&self) -> &PlatformField {
        &self.field
    }

    pub fn field_mut(&mut self) -> &mut PlatformField {
        &mut self.field
    }

    pub fn guard(&self) -> &RuntimeGuard {
        &self.guard
    }

    /// Resolve a landing reported by collision detection
    pub fn land(&mut self, id: PlatformId, now: Duration) -> LandingOutcome {
        land_on(&mut self.field, &self.config, id, now)
    }

    /// Advance the terrain by one frame
    pub fn update(&mut self, input: &TickInput) -> TickReport {
        let mut report = TickReport::default();
        let dt = input.dt.clamp(0.0, MAX_FRAME_DT);

        advance_moving(&mut self.field, dt);

        for id in regenerate_tick(&mut self.field, &self.config, input.now) {
            report.events.push(TerrainEvent::Regenerated { id });
        }

        if input.player_pos.y <= self.last_extend_y - self.config.spawn.scroll_step {
            self.last_extend_y = input.player_pos.y;
            let spawned = extend_above(
                &mut self.field,
                &self.config,
                input.player_pos.y,
                input.visible_bottom_y,
                input.progress,
            );
            if !spawned.appended.is_empty() {
                report.events.push(TerrainEvent::Spawned {
                    count: spawned.appended.len(),
                });
            }
            if spawned.pruned > 0 {
                report.events.push(TerrainEvent::Pruned {
                    count: spawned.pruned,
                });
            }
        }

        if let Some(id) = self
            .guard
            .tick(&mut self.field, &self.config, input.player_pos, input.now)
        {
            report.events.push(TerrainEvent::GuardInserted { id });
        }

        let pruned = prune(&mut self.field, &self.config, input.visible_bottom_y);
        if pruned > 0 {
            report.events.push(TerrainEvent::Pruned { count: pruned });
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::platform::PlatformKind;
    use proptest::prelude::*;

    fn input_at(terrain: &Terrain, player_pos: Vec2, now_ms: u64) -> TickInput {
        TickInput {
            player_pos,
            now: Duration::from_millis(now_ms),
            dt: 1.0 / 60.0,
            progress: 0.5,
            visible_bottom_y: player_pos.y + terrain.config().playfield.height * 0.5,
        }
    }

    #[test]
    fn test_idle_player_changes_nothing() {
        let mut terrain = Terrain::new(TerrainConfig::default(), 12345);
        let spawn = terrain.spawn_point();
        let before = terrain.field().len();
        let report = terrain.update(&input_at(&terrain, spawn, 16));
        assert!(report.events.is_empty());
        assert_eq!(terrain.field().len(), before);
    }

    #[test]
    fn test_climbing_triggers_extension() {
        let mut terrain = Terrain::new(TerrainConfig::default(), 7);
        let mut pos = terrain.spawn_point();
        let mut spawned = 0;
        for frame in 0..400u64 {
            pos.y -= 10.0;
            let report = terrain.update(&input_at(&terrain, pos, frame * 16));
            spawned += report
                .events
                .iter()
                .filter(|e| matches!(e, TerrainEvent::Spawned { .. }))
                .count();
            assert!(terrain.field().len() <= terrain.config().max_platforms);
        }
        assert!(spawned > 0);
        let top = terrain.field().min_y().expect("non-empty");
        assert!(top < pos.y);
    }

    #[test]
    fn test_break_then_regenerate_through_update() {
        let mut terrain = Terrain::new(TerrainConfig::default(), 3);
        let spawn = terrain.spawn_point();
        let cfg = terrain.config().clone();

        // Turn the row above the spawn row into a breakable with support above
        let id = terrain.field().platforms()[terrain.field().len() - 2].id;
        terrain.field_mut().get_mut(id).expect("row").kind = PlatformKind::Breakable;
        let outcome = terrain.land(id, Duration::from_millis(1000));
        assert!(matches!(outcome, LandingOutcome::Broke { .. }));

        terrain.update(&input_at(&terrain, spawn, 1000 + cfg.lifecycle.regen_delay_ms - 1));
        assert!(terrain.field().get(id).expect("row").is_broken());

        let report = terrain.update(&input_at(&terrain, spawn, 1000 + cfg.lifecycle.regen_delay_ms));
        assert!(report.events.contains(&TerrainEvent::Regenerated { id }));
        let p = terrain.field().get(id).expect("row");
        assert!(!p.is_broken());
        assert_eq!(p.kind, PlatformKind::Breakable);
    }

    #[test]
    fn test_guard_rescues_stranded_player() {
        let mut terrain = Terrain::new(TerrainConfig::default(), 5);
        // Far above everything generated, no scroll extension yet
        let stranded = Vec2::new(240.0, terrain.spawn_point().y - 100.0);
        terrain.field_mut().retain(|p| p.y() < stranded.y - 1000.0);
        let report = terrain.update(&input_at(&terrain, stranded, 0));
        assert!(
            report
                .events
                .iter()
                .any(|e| matches!(e, TerrainEvent::GuardInserted { .. }))
        );
    }

    #[test]
    fn test_huge_dt_is_clamped() {
        let mut terrain = Terrain::new(TerrainConfig::default(), 11);
        let spawn = terrain.spawn_point();
        let mut input = input_at(&terrain, spawn, 0);
        input.dt = 30.0;
        terrain.update(&input);
        for p in terrain.field().platforms() {
            if let Some(motion) = p.motion {
                assert!(p.x() >= motion.min_x && p.x() <= motion.max_x);
            }
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn initial_layout_respects_reach_and_capacity(seed in any::<u64>()) {
            let cfg = TerrainConfig::default();
            let terrain = Terrain::new(cfg.clone(), seed);
            let field = terrain.field();
            prop_assert!(field.len() <= cfg.max_platforms);
            prop_assert!(field.max_gap() <= cfg.max_jump_reach());
            prop_assert!(field.platforms().windows(2).all(|w| w[0].y() <= w[1].y()));
        }

        #[test]
        fn climbing_keeps_invariants(seed in any::<u64>(), progress in 0.0f32..=1.0, speed in 2.0f32..40.0) {
            let cfg = TerrainConfig::default();
            let mut terrain = Terrain::new(cfg.clone(), seed);
            let mut pos = terrain.spawn_point();
            for frame in 0..300u64 {
                pos.y -= speed;
                let input = TickInput {
                    player_pos: pos,
                    now: Duration::from_millis(frame * 16),
                    dt: 1.0 / 60.0,
                    progress,
                    visible_bottom_y: pos.y + cfg.playfield.height * 0.5,
                };
                terrain.update(&input);
                let field = terrain.field();
                prop_assert!(field.len() <= cfg.max_platforms);
                prop_assert!(field.max_gap() <= cfg.max_jump_reach());
            }
        }
    }
}
