//! Chunked spatial sprite engine.
//!
//! Sprites live in a [`SpriteStore`] arena and are indexed by two uniform
//! grids: a per-layer render grid used for viewport-culled, depth-sorted
//! drawing, and a collision grid used to resolve axis-aligned overlaps. The
//! [`SpriteWorld`] keeps the three in sync; the [`app`] module wraps it in a
//! fixed-timestep window loop.

pub mod app;
pub mod camera;
pub mod config;
pub mod geometry;
pub mod movement;
pub mod spatial;
pub mod sprite;
pub mod world;

pub use app::{
    run_app, run_app_with_metrics, AppError, InputAction, InputSnapshot, LoopConfig,
    LoopMetricsSnapshot, MetricsHandle, PressedEdges, Renderer, Scene, SceneCommand, SceneKey,
    SLOW_FRAME_ENV_VAR,
};
pub use camera::{Camera2D, Viewport};
pub use config::{CellSize, ConfigError, SpatialConfig, SPATIAL_CONFIG_ENV_VAR};
pub use geometry::{CellCoord, Rect, Vec2};
pub use spatial::{CollisionManager, DrawTarget, GridAnchor, RenderManager, SpatialGrid};
pub use sprite::{
    Animation, DepthLayer, Motion, Sprite, SpriteDesc, SpriteId, SpriteKind, SpriteStore,
};
pub use world::{FrameStats, SpriteWorld};
