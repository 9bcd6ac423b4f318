//! The owned platform collection
//!
//! A `PlatformField` is the single owner of every platform and attachment
//! in a run. Components borrow it mutably for the duration of a call; there
//! is no module-level state.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::platform::{Platform, PlatformId, PlatformKind, create_platform};
use super::spawn::Attachment;
use crate::config::TerrainConfig;

/// Platforms sorted ascending by y (index 0 is the topmost), their
/// attachments, and the run RNG
#[derive(Debug, Clone)]
pub struct PlatformField {
    /// Run seed for reproducibility
    pub seed: u64,
    platforms: Vec<Platform>,
    attachments: Vec<Attachment>,
    rng: Pcg32,
    next_id: PlatformId,
}

impl PlatformField {
    /// Create an empty field with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            platforms: Vec::new(),
            attachments: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Build a field from explicit platforms (ids are reassigned)
    pub fn from_platforms(seed: u64, platforms: impl IntoIterator<Item = Platform>) -> Self {
        let mut field = Self::new(seed);
        for mut platform in platforms {
            platform.id = field.next_entity_id();
            field.platforms.push(platform);
        }
        field.sort_by_y();
        field
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> PlatformId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn platforms_mut(&mut self) -> &mut [Platform] {
        &mut self.platforms
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }

    pub fn get(&self, id: PlatformId) -> Option<&Platform> {
        self.platforms.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: PlatformId) -> Option<&mut Platform> {
        self.platforms.iter_mut().find(|p| p.id == id)
    }

    /// Smallest y in the field (the topmost platform)
    pub fn min_y(&self) -> Option<f32> {
        self.platforms.iter().map(|p| p.y()).reduce(f32::min)
    }

    /// Largest y in the field (the bottom-most platform)
    pub fn max_y(&self) -> Option<f32> {
        self.platforms.iter().map(|p| p.y()).reduce(f32::max)
    }

    /// Create a platform through `create_platform` and append it.
    /// Callers re-sort once their batch is done.
    pub fn spawn(
        &mut self,
        x: f32,
        y: f32,
        kind: PlatformKind,
        cfg: &TerrainConfig,
    ) -> PlatformId {
        let id = self.next_entity_id();
        let platform = create_platform(id, x, y, kind, cfg, &mut self.rng);
        self.platforms.push(platform);
        id
    }

    pub fn push_attachment(&mut self, attachment: Attachment) {
        self.attachments.push(attachment);
    }

    /// Restore ascending-y order (stable, ties broken by id)
    pub fn sort_by_y(&mut self) {
        self.platforms
            .sort_by(|a, b| a.y().total_cmp(&b.y()).then(a.id.cmp(&b.id)));
    }

    /// Largest vertical gap between consecutive platforms
    pub fn max_gap(&self) -> f32 {
        self.platforms
            .windows(2)
            .map(|w| w[1].y() - w[0].y())
            .fold(0.0, f32::max)
    }

    /// Keep platforms matching `keep`; returns how many were dropped
    pub fn retain(&mut self, keep: impl FnMut(&Platform) -> bool) -> usize {
        let before = self.platforms.len();
        self.platforms.retain(keep);
        let removed = before - self.platforms.len();
        if removed > 0 {
            self.drop_orphaned_attachments();
        }
        removed
    }

    /// Drop entries farthest (vertically) from `anchor_y` until at most
    /// `max` remain. Returns how many were dropped.
    pub fn truncate_farthest(&mut self, anchor_y: f32, max: usize) -> usize {
        if self.platforms.len() <= max {
            return 0;
        }
        self.platforms.sort_by(|a, b| {
            (a.y() - anchor_y)
                .abs()
                .total_cmp(&(b.y() - anchor_y).abs())
                .then(a.id.cmp(&b.id))
        });
        let removed = self.platforms.len() - max;
        self.platforms.truncate(max);
        self.sort_by_y();
        self.drop_orphaned_attachments();
        removed
    }

    fn drop_orphaned_attachments(&mut self) {
        let platforms = &self.platforms;
        self.attachments
            .retain(|a| platforms.iter().any(|p| p.id == a.platform_id));
    }
}
