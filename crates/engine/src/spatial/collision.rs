use tracing::trace;

use crate::config::SpatialConfig;
use crate::geometry::{CellCoord, Rect};
use crate::sprite::{SpriteId, SpriteStore};

use super::grid::{GridAnchor, SpatialGrid};

/// Collision grid keyed on the top-left of each sprite's hitbox.
///
/// Queries only look at the 3x3 block of cells around a hitbox, which is
/// complete as long as collision cells are at least as large as the largest
/// hitbox.
#[derive(Debug, Clone)]
pub struct CollisionManager {
    grid: SpatialGrid,
}

impl CollisionManager {
    pub fn new(config: &SpatialConfig) -> Self {
        Self {
            grid: SpatialGrid::new(config.collision_cell_size.as_vec2(), GridAnchor::Hitbox),
        }
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    pub fn add(&mut self, sprites: &SpriteStore, id: SpriteId) -> bool {
        let Some(sprite) = sprites.get(id) else {
            return false;
        };
        self.grid.add(sprite);
        true
    }

    pub fn add_persistent(&mut self, sprites: &SpriteStore, id: SpriteId) -> bool {
        let Some(sprite) = sprites.get(id) else {
            return false;
        };
        self.grid.add_persistent(sprite);
        true
    }

    /// Returns whether the removed sprite was persistent.
    pub fn remove(&mut self, id: SpriteId) -> bool {
        self.grid.remove(id)
    }

    pub fn update(&mut self, sprites: &SpriteStore) -> usize {
        self.grid.update(sprites)
    }

    pub fn location(&self, id: SpriteId) -> Option<CellCoord> {
        self.grid.location(id)
    }

    pub fn contains(&self, id: SpriteId) -> bool {
        self.grid.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = SpriteId> + '_ {
        self.grid.iter()
    }

    pub fn len(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    pub fn empty(&mut self) -> Vec<SpriteId> {
        self.grid.empty()
    }

    pub fn empty_including_persistent(&mut self) -> Vec<SpriteId> {
        self.grid.empty_including_persistent()
    }

    /// Whether any tracked hitbox other than `ignore` overlaps `hitbox`.
    pub fn check_collision(
        &self,
        sprites: &SpriteStore,
        hitbox: Rect,
        ignore: Option<SpriteId>,
    ) -> bool {
        let center = CellCoord::containing(hitbox.top_left(), self.grid.cell_size());
        self.neighbours(center)
            .filter(|id| Some(*id) != ignore)
            .filter_map(|id| sprites.get(id))
            .any(|other| other.hitbox.overlaps(&hitbox))
    }

    /// Pushes the hitbox of moving sprite `id` out of everything it overlaps.
    ///
    /// The side of each contact is the one closest to the sprite's previous
    /// hitbox; for a moving obstacle its previous hitbox is used as well. The
    /// edge is then set flush against the obstacle's current hitbox. Overlaps
    /// are handled one at a time in scan order against the progressively
    /// corrected hitbox, so the first contact found can decide the outcome of
    /// a corner hit.
    ///
    /// Returns whether any overlap was resolved. Static or unknown sprites are
    /// never displaced.
    pub fn resolve(&self, sprites: &mut SpriteStore, id: SpriteId) -> bool {
        let Some(sprite) = sprites.get(id) else {
            return false;
        };
        let Some(motion) = sprite.motion() else {
            return false;
        };
        let previous = motion.previous_hitbox;
        let mut hitbox = sprite.hitbox;
        let center = self.grid.coord_of(sprite);
        let mut resolved = false;

        for other_id in self.neighbours(center) {
            if other_id == id {
                continue;
            }
            let Some(other) = sprites.get(other_id) else {
                continue;
            };
            if !other.hitbox.overlaps(&hitbox) {
                continue;
            }

            let obstacle = other.hitbox;
            let compare = other.previous_hitbox();
            let distances = [
                (previous.right() - compare.left()).abs(),
                (previous.left() - compare.right()).abs(),
                (previous.bottom() - compare.top()).abs(),
                (previous.top() - compare.bottom()).abs(),
            ];
            match closest_side(distances) {
                0 => hitbox.set_right(obstacle.left()),
                1 => hitbox.set_left(obstacle.right()),
                2 => hitbox.set_bottom(obstacle.top()),
                _ => hitbox.set_top(obstacle.bottom()),
            }
            trace!(sprite = id.0, obstacle = other_id.0, "collision_resolved");
            resolved = true;
        }

        if resolved {
            if let Some(sprite) = sprites.get_mut(id) {
                sprite.hitbox = hitbox;
            }
        }
        resolved
    }

    fn neighbours(&self, center: CellCoord) -> impl Iterator<Item = SpriteId> + '_ {
        center
            .neighborhood()
            .filter_map(move |coord| self.grid.cell(coord))
            .flat_map(|cell| cell.iter())
    }
}

/// Index of the smallest distance; earlier sides win ties.
fn closest_side(distances: [f32; 4]) -> usize {
    let mut best = 0;
    for (index, distance) in distances.iter().enumerate().skip(1) {
        if *distance < distances[best] {
            best = index;
        }
    }
    best
}
