//! Deterministic terrain module
//!
//! Everything about platform existence, placement, safety and lifecycle
//! lives here. This module must stay pure and deterministic:
//! - Seeded RNG only (owned by the `PlatformField`)
//! - Run-clock timestamps passed in, never read from the system
//! - Stable iteration order (ascending y, ties by id)
//! - No rendering, input or physics dependencies

pub mod audit;
pub mod field;
pub mod geometry;
pub mod guard;
pub mod layout;
pub mod lifecycle;
pub mod odds;
pub mod platform;
pub mod sampler;
pub mod spawn;
pub mod tick;

pub use audit::{AuditReport, audit_reachability};
pub use field::PlatformField;
pub use geometry::{Rect, rects_overlap};
pub use guard::{RuntimeGuard, danger_zone, in_danger};
pub use layout::{generate_initial, spawn_row_y};
pub use lifecycle::{
    LandingOutcome, advance_moving, enforce_capacity, has_safe_alternative, land_on, prune,
    regenerate_tick,
};
pub use odds::KindTable;
pub use platform::{Oscillation, Platform, PlatformId, PlatformKind, PlatformState, create_platform};
pub use sampler::{OverlapTest, Placement, place_without_overlap, spawn_placed};
pub use spawn::{Attachment, AttachmentKind, SpawnReport, extend_above, progress_for_height};
pub use tick::{Terrain, TerrainEvent, TickInput, TickReport};
