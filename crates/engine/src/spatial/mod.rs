mod cell;
mod collision;
mod grid;
mod render;

pub use cell::Cell;
pub use collision::CollisionManager;
pub use grid::{GridAnchor, SpatialGrid};
pub use render::{DrawTarget, RenderManager};
