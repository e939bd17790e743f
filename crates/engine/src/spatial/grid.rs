use std::collections::HashMap;

use tracing::{debug, trace};

use crate::geometry::{CellCoord, Vec2};
use crate::sprite::{Sprite, SpriteId, SpriteStore};

use super::cell::Cell;

/// Which point of a sprite decides the cell that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridAnchor {
    /// Top-left of the render rectangle.
    SpriteRect,
    /// Top-left of the hitbox; sprites with an inset hitbox are found by
    /// collision queries where they collide, not where they are drawn.
    Hitbox,
}

impl GridAnchor {
    pub fn point(self, sprite: &Sprite) -> Vec2 {
        match self {
            GridAnchor::SpriteRect => sprite.rect.top_left(),
            GridAnchor::Hitbox => sprite.hitbox.top_left(),
        }
    }
}

/// Sparse uniform grid of [`Cell`]s plus the location table mapping each
/// tracked sprite to the coordinate of the cell that holds it.
///
/// Cells are created on first access and never pruned; once created a
/// coordinate keeps the same cell for the lifetime of the grid.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: Vec2,
    anchor: GridAnchor,
    cells: HashMap<CellCoord, Cell>,
    locations: HashMap<SpriteId, CellCoord>,
}

impl SpatialGrid {
    pub fn new(cell_size: Vec2, anchor: GridAnchor) -> Self {
        Self {
            cell_size,
            anchor,
            cells: HashMap::new(),
            locations: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> Vec2 {
        self.cell_size
    }

    pub fn anchor(&self) -> GridAnchor {
        self.anchor
    }

    pub fn get_or_create(&mut self, coord: CellCoord) -> &mut Cell {
        self.cells.entry(coord).or_insert_with(|| Cell::new(coord))
    }

    pub fn cell(&self, coord: CellCoord) -> Option<&Cell> {
        self.cells.get(&coord)
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn coord_of(&self, sprite: &Sprite) -> CellCoord {
        CellCoord::containing(self.anchor.point(sprite), self.cell_size)
    }

    pub fn location(&self, id: SpriteId) -> Option<CellCoord> {
        self.locations.get(&id).copied()
    }

    pub fn contains(&self, id: SpriteId) -> bool {
        self.locations.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn add(&mut self, sprite: &Sprite) {
        self.insert(sprite, false);
    }

    pub fn add_persistent(&mut self, sprite: &Sprite) {
        self.insert(sprite, true);
    }

    fn insert(&mut self, sprite: &Sprite, persistent: bool) {
        let coord = self.coord_of(sprite);
        let mut persistent = persistent;
        if let Some(previous) = self.location(sprite.id) {
            if previous != coord {
                // Re-adding a tracked sprite moves it; it never ends up in two cells.
                persistent |= self.get_or_create(previous).remove(sprite.id);
            }
        }

        let movable = sprite.is_moving();
        let cell = self.get_or_create(coord);
        if persistent {
            cell.add_persistent(sprite.id, movable);
        } else {
            cell.add(sprite.id, movable);
        }
        self.locations.insert(sprite.id, coord);
    }

    /// Removes `id` from whichever cell holds it. Returns whether it was
    /// persistent; an untracked id is a no-op returning `false`.
    pub fn remove(&mut self, id: SpriteId) -> bool {
        let Some(coord) = self.locations.remove(&id) else {
            return false;
        };
        self.cells
            .get_mut(&coord)
            .map(|cell| cell.remove(id))
            .unwrap_or(false)
    }

    pub fn is_persistent(&self, id: SpriteId) -> bool {
        self.location(id)
            .and_then(|coord| self.cells.get(&coord))
            .is_some_and(|cell| cell.is_persistent(id))
    }

    /// Migration pass. Walks a sorted snapshot of the existing coordinates, so
    /// cells created by migrations during the pass are not visited and the
    /// order does not depend on hash iteration. Returns the number of
    /// sprites that changed cell.
    pub fn update(&mut self, sprites: &SpriteStore) -> usize {
        let anchor = self.anchor;
        let cell_size = self.cell_size;
        let mut migrated = 0usize;
        let mut exited = Vec::new();

        for coord in self.sorted_coords() {
            if let Some(cell) = self.cells.get(&coord) {
                cell.update(
                    |id| {
                        sprites
                            .get(id)
                            .map(|sprite| CellCoord::containing(anchor.point(sprite), cell_size))
                    },
                    |id| exited.push(id),
                );
            }
            for id in exited.drain(..) {
                if self.on_sprite_exit_cell(coord, id, sprites) {
                    migrated += 1;
                }
            }
        }
        migrated
    }

    fn on_sprite_exit_cell(
        &mut self,
        from: CellCoord,
        id: SpriteId,
        sprites: &SpriteStore,
    ) -> bool {
        debug_assert_eq!(self.location(id), Some(from), "location table out of sync");
        let was_persistent = self
            .cells
            .get_mut(&from)
            .map(|cell| cell.remove(id))
            .unwrap_or(false);

        let Some(sprite) = sprites.get(id) else {
            self.locations.remove(&id);
            debug!(sprite = id.0, "stale_sprite_dropped_from_grid");
            return false;
        };

        let to = self.coord_of(sprite);
        let movable = sprite.is_moving();
        let cell = self.get_or_create(to);
        if was_persistent {
            cell.add_persistent(id, movable);
        } else {
            cell.add(id, movable);
        }
        self.locations.insert(id, to);
        trace!(
            sprite = id.0,
            from_x = from.x,
            from_y = from.y,
            to_x = to.x,
            to_y = to.y,
            "sprite_migrated"
        );
        true
    }

    fn sorted_coords(&self) -> Vec<CellCoord> {
        let mut coords: Vec<CellCoord> = self.cells.keys().copied().collect();
        coords.sort_unstable();
        coords
    }

    /// Every tracked sprite, cell by cell in coordinate order.
    pub fn iter(&self) -> impl Iterator<Item = SpriteId> + '_ {
        self.sorted_coords()
            .into_iter()
            .filter_map(move |coord| self.cells.get(&coord))
            .flat_map(Cell::iter)
    }

    /// Existing cells inside the inclusive coordinate range, row by row.
    pub fn cells_in_range(
        &self,
        min: CellCoord,
        max: CellCoord,
    ) -> impl Iterator<Item = &Cell> + '_ {
        (min.y..=max.y)
            .flat_map(move |y| (min.x..=max.x).map(move |x| CellCoord::new(x, y)))
            .filter_map(move |coord| self.cells.get(&coord))
    }

    /// Drops all non-persistent sprites; returns the dropped ids.
    pub fn empty(&mut self) -> Vec<SpriteId> {
        let mut dropped = Vec::new();
        for coord in self.sorted_coords() {
            if let Some(cell) = self.cells.get_mut(&coord) {
                dropped.extend(cell.clear());
            }
        }
        for id in &dropped {
            self.locations.remove(id);
        }
        dropped
    }

    /// Drops every sprite, persistent ones included; returns the dropped ids.
    pub fn empty_including_persistent(&mut self) -> Vec<SpriteId> {
        let mut dropped = Vec::new();
        for coord in self.sorted_coords() {
            if let Some(cell) = self.cells.get_mut(&coord) {
                dropped.extend(cell.clear_including_persistent());
            }
        }
        self.locations.clear();
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::sprite::{DepthLayer, SpriteDesc};

    fn render_grid() -> SpatialGrid {
        SpatialGrid::new(Vec2::new(192.0, 192.0), GridAnchor::SpriteRect)
    }

    fn spawn(store: &mut SpriteStore, x: f32, y: f32, moving: bool) -> SpriteId {
        let mut desc = SpriteDesc::new("test", Rect::new(x, y, 16.0, 16.0), DepthLayer::Main);
        if moving {
            desc = desc.moving(100.0);
        }
        store.insert(&desc)
    }

    fn move_to(store: &mut SpriteStore, id: SpriteId, x: f32, y: f32) {
        let sprite = store.get_mut(id).expect("sprite");
        sprite.rect.x = x;
        sprite.rect.y = y;
        sprite.hitbox = sprite.rect;
    }

    #[test]
    fn sprite_crossing_boundary_migrates_on_update() {
        let mut store = SpriteStore::default();
        let mut grid = render_grid();
        let id = spawn(&mut store, 190.0, 190.0, true);
        grid.add(store.get(id).expect("sprite"));
        assert_eq!(grid.location(id), Some(CellCoord::new(0, 0)));

        move_to(&mut store, id, 200.0, 190.0);
        assert_eq!(grid.location(id), Some(CellCoord::new(0, 0)));
        assert_eq!(grid.update(&store), 1);
        assert_eq!(grid.location(id), Some(CellCoord::new(1, 0)));
        assert!(grid.cell(CellCoord::new(1, 0)).expect("cell").contains(id));
        assert!(!grid.cell(CellCoord::new(0, 0)).expect("cell").contains(id));
    }

    #[test]
    fn location_matches_floor_after_every_back_and_forth_move() {
        let mut store = SpriteStore::default();
        let mut grid = render_grid();
        let id = spawn(&mut store, 0.0, 0.0, true);
        grid.add(store.get(id).expect("sprite"));

        let path = [
            (191.0, 5.0),
            (193.0, 5.0),
            (-1.0, 5.0),
            (-1.0, -400.0),
            (500.0, 384.0),
            (0.0, 0.0),
        ];
        for (x, y) in path {
            move_to(&mut store, id, x, y);
            grid.update(&store);
            let expected = CellCoord::containing(Vec2::new(x, y), grid.cell_size());
            assert_eq!(grid.location(id), Some(expected), "position=({x}, {y})");
            let holders = grid
                .cells
                .values()
                .filter(|cell| cell.contains(id))
                .count();
            assert_eq!(holders, 1);
        }
    }

    #[test]
    fn static_sprites_are_not_migrated() {
        let mut store = SpriteStore::default();
        let mut grid = render_grid();
        let id = spawn(&mut store, 10.0, 10.0, false);
        grid.add(store.get(id).expect("sprite"));

        move_to(&mut store, id, 400.0, 10.0);
        assert_eq!(grid.update(&store), 0);
        assert_eq!(grid.location(id), Some(CellCoord::new(0, 0)));
    }

    #[test]
    fn migration_preserves_persistence() {
        let mut store = SpriteStore::default();
        let mut grid = render_grid();
        let id = spawn(&mut store, 10.0, 10.0, true);
        grid.add_persistent(store.get(id).expect("sprite"));

        move_to(&mut store, id, 10.0, 250.0);
        grid.update(&store);
        assert_eq!(grid.location(id), Some(CellCoord::new(0, 1)));
        assert!(grid.is_persistent(id));

        grid.empty();
        assert_eq!(grid.iter().collect::<Vec<_>>(), vec![id]);
    }

    #[test]
    fn empty_keeps_persistent_until_full_clear() {
        let mut store = SpriteStore::default();
        let mut grid = render_grid();
        let player = spawn(&mut store, 10.0, 10.0, true);
        let tree = spawn(&mut store, 300.0, 10.0, false);
        let rock = spawn(&mut store, -300.0, 10.0, false);
        grid.add_persistent(store.get(player).expect("player"));
        grid.add(store.get(tree).expect("tree"));
        grid.add(store.get(rock).expect("rock"));

        let mut dropped = grid.empty();
        dropped.sort();
        assert_eq!(dropped, vec![tree, rock]);
        assert_eq!(grid.iter().collect::<Vec<_>>(), vec![player]);
        assert_eq!(grid.location(tree), None);

        assert_eq!(grid.empty_including_persistent(), vec![player]);
        assert!(grid.is_empty());
        assert_eq!(grid.iter().count(), 0);
    }

    #[test]
    fn double_add_and_missing_remove_are_no_ops() {
        let mut store = SpriteStore::default();
        let mut grid = render_grid();
        let id = spawn(&mut store, 10.0, 10.0, false);
        let sprite = store.get(id).expect("sprite").clone();
        grid.add(&sprite);
        grid.add(&sprite);
        assert_eq!(grid.iter().count(), 1);

        assert!(!grid.remove(SpriteId(999)));
        assert!(!grid.remove(id));
        assert!(!grid.remove(id));
        assert_eq!(grid.iter().count(), 0);
    }

    #[test]
    fn re_adding_after_teleport_moves_instead_of_duplicating() {
        let mut store = SpriteStore::default();
        let mut grid = render_grid();
        let id = spawn(&mut store, 10.0, 10.0, false);
        grid.add_persistent(store.get(id).expect("sprite"));

        move_to(&mut store, id, 1000.0, 1000.0);
        grid.add(store.get(id).expect("sprite"));
        assert_eq!(grid.iter().count(), 1);
        assert_eq!(grid.location(id), Some(CellCoord::new(5, 5)));
        assert!(grid.is_persistent(id));
    }

    #[test]
    fn stale_ids_are_dropped_by_update() {
        let mut store = SpriteStore::default();
        let mut grid = render_grid();
        let id = spawn(&mut store, 10.0, 10.0, true);
        grid.add(store.get(id).expect("sprite"));
        store.remove(id);

        assert_eq!(grid.update(&store), 0);
        assert!(!grid.contains(id));
        assert_eq!(grid.iter().count(), 0);
    }

    #[test]
    fn hitbox_anchor_uses_hitbox_position() {
        let mut store = SpriteStore::default();
        let id = store.insert(
            &SpriteDesc::new("tree", Rect::new(120.0, 0.0, 64.0, 128.0), DepthLayer::Main)
                .with_hitbox(Rect::new(140.0, 100.0, 24.0, 20.0)),
        );
        let sprite = store.get(id).expect("tree");
        let collision = SpatialGrid::new(Vec2::new(128.0, 64.0), GridAnchor::Hitbox);
        let render = SpatialGrid::new(Vec2::new(128.0, 64.0), GridAnchor::SpriteRect);
        assert_eq!(collision.coord_of(sprite), CellCoord::new(1, 1));
        assert_eq!(render.coord_of(sprite), CellCoord::new(0, 0));
    }
}
