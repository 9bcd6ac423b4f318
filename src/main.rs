//! Skyward headless runner
//!
//! Drives the terrain core with a simple auto-climbing player so the
//! generator, guard and lifecycle can be watched from a terminal:
//!
//! `skyward [seed] [frames] [config.json]`

use std::collections::BTreeMap;
use std::time::Duration;

use glam::Vec2;
use serde::Serialize;

use skyward::TerrainConfig;
use skyward::terrain::{
    LandingOutcome, PlatformKind, Terrain, TerrainEvent, TickInput, progress_for_height,
};

/// Simulated frame rate of the runner
const FRAME_DT: f32 = 1.0 / 60.0;
/// Height at which the difficulty ramp reaches 1.0
const FULL_DIFFICULTY_HEIGHT: f32 = 20_000.0;
/// Camera keeps the player at this fraction of the screen from the top
const CAMERA_LEAD: f32 = 0.4;

/// Minimal stand-in for the physics collaborator
struct Bot {
    /// Feet position
    pos: Vec2,
    vel: Vec2,
}

impl Bot {
    /// Integrate one frame and resolve a landing, if any
    fn step(&mut self, terrain: &mut Terrain, now: Duration, dt: f32) -> Option<LandingOutcome> {
        let physics = terrain.config().physics;
        self.steer(terrain);

        let prev_y = self.pos.y;
        self.vel.y += physics.gravity * dt;
        self.pos += self.vel * dt;
        self.pos.x = self.pos.x.clamp(0.0, terrain.config().playfield.width);

        if self.vel.y <= 0.0 {
            return None;
        }

        // Falling: did the feet cross a platform top this frame?
        let landed = terrain
            .field()
            .platforms()
            .iter()
            .filter(|p| p.is_safe())
            .filter(|p| prev_y <= p.y() && self.pos.y >= p.y())
            .find(|p| self.pos.x >= p.x() && self.pos.x <= p.x() + p.width)
            .map(|p| (p.id, p.y()));

        let (id, top) = landed?;
        let outcome = terrain.land(id, now);
        if let Some(impulse) = outcome.impulse() {
            self.pos.y = top;
            self.vel.y = -impulse;
        }
        Some(outcome)
    }

    /// Head for the highest safe platform the current arc can still reach
    fn steer(&mut self, terrain: &Terrain) {
        let physics = terrain.config().physics;
        let rise = if self.vel.y < 0.0 {
            self.vel.y * self.vel.y / (2.0 * physics.gravity)
        } else {
            0.0
        };
        let apex = self.pos.y - rise;

        let target = terrain
            .field()
            .platforms()
            .iter()
            .filter(|p| p.is_safe() && p.y() >= apex)
            .min_by(|a, b| a.y().total_cmp(&b.y()))
            .map(|p| p.center_x());

        self.vel.x = match target {
            Some(x) if (x - self.pos.x).abs() > 4.0 => physics.move_speed * (x - self.pos.x).signum(),
            _ => 0.0,
        };
    }
}

/// Final snapshot printed as JSON
#[derive(Debug, Serialize)]
struct RunSummary {
    seed: u64,
    frames: u64,
    fell: bool,
    height_climbed: f32,
    platforms: usize,
    by_kind: BTreeMap<&'static str, usize>,
    attachments: usize,
    max_gap: f32,
    max_jump_reach: f32,
    landings: u64,
    breaks: u64,
    hardened: u64,
    guard_insertions: u64,
    spawned: usize,
    regenerated: usize,
}

fn main() {
    skyward::logging::init();

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(12345u64);
    let frames = args.next().and_then(|s| s.parse().ok()).unwrap_or(3600u64);
    let config = match args.next() {
        Some(path) => match TerrainConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Failed to load config {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => TerrainConfig::default(),
    };

    log::info!("Skyward (headless) starting: seed={} frames={}", seed, frames);

    let mut terrain = Terrain::new(config, seed);
    let start = terrain.spawn_point();
    let jump = terrain.config().physics.jump_velocity;
    let height = terrain.config().playfield.height;
    let mut bot = Bot {
        pos: start,
        vel: Vec2::new(0.0, -jump),
    };
    let mut camera_top = start.y - height * CAMERA_LEAD;

    let mut summary = RunSummary {
        seed,
        frames: 0,
        fell: false,
        height_climbed: 0.0,
        platforms: 0,
        by_kind: BTreeMap::new(),
        attachments: 0,
        max_gap: 0.0,
        max_jump_reach: terrain.config().max_jump_reach(),
        landings: 0,
        breaks: 0,
        hardened: 0,
        guard_insertions: 0,
        spawned: 0,
        regenerated: 0,
    };

    for frame in 0..frames {
        let now = Duration::from_secs_f64(frame as f64 * FRAME_DT as f64);

        match bot.step(&mut terrain, now, FRAME_DT) {
            Some(LandingOutcome::PassThrough) | None => {}
            Some(outcome) => {
                summary.landings += 1;
                match outcome {
                    LandingOutcome::Broke { .. } => summary.breaks += 1,
                    LandingOutcome::Hardened { .. } => summary.hardened += 1,
                    _ => {}
                }
            }
        }

        camera_top = camera_top.min(bot.pos.y - height * CAMERA_LEAD);
        let visible_bottom_y = camera_top + height;
        if bot.pos.y > visible_bottom_y {
            log::warn!("Player fell out of view at frame {} (y={:.1})", frame, bot.pos.y);
            summary.fell = true;
            break;
        }

        summary.height_climbed = summary.height_climbed.max(start.y - bot.pos.y);
        let input = TickInput {
            player_pos: bot.pos,
            now,
            dt: FRAME_DT,
            progress: progress_for_height(summary.height_climbed, FULL_DIFFICULTY_HEIGHT),
            visible_bottom_y,
        };
        for event in terrain.update(&input).events {
            match event {
                TerrainEvent::Spawned { count } => summary.spawned += count,
                TerrainEvent::Regenerated { .. } => summary.regenerated += 1,
                TerrainEvent::GuardInserted { id } => {
                    log::info!("Guard inserted platform {} at frame {}", id, frame)
                }
                TerrainEvent::Pruned { .. } => {}
            }
        }

        summary.max_gap = summary.max_gap.max(terrain.field().max_gap());
        summary.frames = frame + 1;

        if frame % 60 == 0 {
            log::info!(
                "t={:>5.1}s climbed={:>7.1} platforms={:>2} progress={:.2}",
                now.as_secs_f32(),
                summary.height_climbed,
                terrain.field().len(),
                input.progress
            );
        }
    }

    let field = terrain.field();
    summary.platforms = field.len();
    summary.attachments = field.attachments().len();
    summary.guard_insertions = terrain.guard().insertions();
    for kind in PlatformKind::ALL {
        let count = field.platforms().iter().filter(|p| p.kind == kind).count();
        summary.by_kind.insert(kind.as_str(), count);
    }

    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to serialize summary: {}", e),
    }
}
