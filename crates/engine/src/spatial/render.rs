use crate::camera::Camera2D;
use crate::config::SpatialConfig;
use crate::geometry::{CellCoord, Rect, Vec2};
use crate::sprite::{DepthLayer, Sprite, SpriteId, SpriteStore};

use super::grid::{GridAnchor, SpatialGrid};

/// Receives the depth-sorted draw calls of [`RenderManager::draw`].
pub trait DrawTarget {
    fn draw_sprite(&mut self, sprite: &Sprite, screen_rect: Rect);
}

/// One [`SpatialGrid`] per [`DepthLayer`], keyed on the top-left of each
/// sprite's render rectangle. Every layer's grid exists from construction.
#[derive(Debug, Clone)]
pub struct RenderManager {
    layers: Vec<SpatialGrid>,
    viewport_margin_cells: u32,
    draw_list: Vec<SpriteId>,
}

impl RenderManager {
    pub fn new(config: &SpatialConfig) -> Self {
        let cell_size = config.render_cell_size.as_vec2();
        Self {
            layers: DepthLayer::ALL
                .iter()
                .map(|_| SpatialGrid::new(cell_size, GridAnchor::SpriteRect))
                .collect(),
            viewport_margin_cells: config.viewport_margin_cells,
            draw_list: Vec::new(),
        }
    }

    pub fn layer_grid(&self, layer: DepthLayer) -> &SpatialGrid {
        &self.layers[layer.ordinal()]
    }

    fn layer_grid_mut(&mut self, layer: DepthLayer) -> &mut SpatialGrid {
        &mut self.layers[layer.ordinal()]
    }

    /// Adds `id` to the grid of its sprite's layer. Returns `false` when the
    /// sprite does not exist.
    pub fn add(&mut self, sprites: &SpriteStore, id: SpriteId) -> bool {
        let Some(sprite) = sprites.get(id) else {
            return false;
        };
        self.layer_grid_mut(sprite.layer()).add(sprite);
        true
    }

    pub fn add_persistent(&mut self, sprites: &SpriteStore, id: SpriteId) -> bool {
        let Some(sprite) = sprites.get(id) else {
            return false;
        };
        self.layer_grid_mut(sprite.layer()).add_persistent(sprite);
        true
    }

    /// Returns whether the removed sprite was persistent.
    pub fn remove(&mut self, id: SpriteId) -> bool {
        match self.location(id) {
            Some((layer, _)) => self.layer_grid_mut(layer).remove(id),
            None => false,
        }
    }

    pub fn location(&self, id: SpriteId) -> Option<(DepthLayer, CellCoord)> {
        DepthLayer::ALL.iter().find_map(|layer| {
            self.layer_grid(*layer)
                .location(id)
                .map(|coord| (*layer, coord))
        })
    }

    pub fn contains(&self, id: SpriteId) -> bool {
        self.location(id).is_some()
    }

    pub fn is_persistent(&self, id: SpriteId) -> bool {
        self.location(id)
            .is_some_and(|(layer, _)| self.layer_grid(layer).is_persistent(id))
    }

    /// Moves a sprite to another depth layer at runtime, e.g. a seed that
    /// sprouted into a plant tall enough to occlude its neighbours.
    pub fn change_layer(
        &mut self,
        sprites: &mut SpriteStore,
        id: SpriteId,
        layer: DepthLayer,
        keep_persistent: bool,
    ) -> bool {
        let Some(sprite) = sprites.get_mut(id) else {
            return false;
        };
        self.remove(id);
        sprite.layer = layer;
        let grid = self.layer_grid_mut(layer);
        if keep_persistent {
            grid.add_persistent(sprite);
        } else {
            grid.add(sprite);
        }
        true
    }

    /// Collects the sprites to paint for a viewport centred on `center`, in
    /// draw order: layers ascending, then by hitbox bottom within a layer so
    /// that sprites whose feet are lower on screen are painted on top.
    pub fn visible_sprites(
        &self,
        sprites: &SpriteStore,
        camera: &Camera2D,
        center: Vec2,
        out: &mut Vec<SpriteId>,
    ) {
        out.clear();
        let extent = camera.visible_extent(center);
        let margin = self.viewport_margin_cells.min(i32::MAX as u32) as i32;
        let mut layer_sprites: Vec<(f32, SpriteId)> = Vec::new();

        for layer in DepthLayer::ALL {
            let grid = self.layer_grid(layer);
            if grid.is_empty() {
                continue;
            }
            let (min, max) = visible_cell_range(extent, grid.cell_size(), margin);

            layer_sprites.clear();
            for cell in grid.cells_in_range(min, max) {
                layer_sprites.extend(
                    cell.iter()
                        .filter_map(|id| sprites.get(id))
                        .map(|sprite| (sprite.hitbox.bottom(), sprite.id)),
                );
            }
            layer_sprites.sort_by(|left, right| {
                left.0
                    .total_cmp(&right.0)
                    .then_with(|| left.1.cmp(&right.1))
            });
            out.extend(layer_sprites.iter().map(|(_, id)| *id));
        }
    }

    /// Paints the visible sprites back to front. Returns how many were drawn.
    pub fn draw<T: DrawTarget>(
        &mut self,
        sprites: &SpriteStore,
        camera: &Camera2D,
        center: Vec2,
        target: &mut T,
    ) -> usize {
        let mut draw_list = std::mem::take(&mut self.draw_list);
        self.visible_sprites(sprites, camera, center, &mut draw_list);
        for id in &draw_list {
            if let Some(sprite) = sprites.get(*id) {
                target.draw_sprite(sprite, camera.world_to_screen(sprite.rect));
            }
        }
        let drawn = draw_list.len();
        self.draw_list = draw_list;
        drawn
    }

    /// Runs `on_sprite` for every tracked sprite (layers ascending, cells in
    /// coordinate order), then the migration pass of every layer. Returns the
    /// number of migrations.
    pub fn update<F>(&mut self, sprites: &mut SpriteStore, mut on_sprite: F) -> usize
    where
        F: FnMut(SpriteId, &mut SpriteStore),
    {
        let ids: Vec<SpriteId> = self.iter().collect();
        for id in ids {
            on_sprite(id, sprites);
        }
        self.migrate(sprites)
    }

    /// Cutscene variant of [`RenderManager::update`]: sprites only refresh
    /// their frame state and animation, nothing moves or migrates.
    pub fn update_blocked(&mut self, sprites: &mut SpriteStore, dt_seconds: f32) {
        for id in self.iter() {
            if let Some(sprite) = sprites.get_mut(id) {
                sprite.begin_frame(dt_seconds);
            }
        }
    }

    pub fn migrate(&mut self, sprites: &SpriteStore) -> usize {
        self.layers.iter_mut().map(|grid| grid.update(sprites)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = SpriteId> + '_ {
        self.layers.iter().flat_map(SpatialGrid::iter)
    }

    pub fn len(&self) -> usize {
        self.layers.iter().map(SpatialGrid::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(SpatialGrid::is_empty)
    }

    pub fn empty(&mut self) -> Vec<SpriteId> {
        self.layers.iter_mut().flat_map(SpatialGrid::empty).collect()
    }

    pub fn empty_including_persistent(&mut self) -> Vec<SpriteId> {
        self.layers
            .iter_mut()
            .flat_map(SpatialGrid::empty_including_persistent)
            .collect()
    }
}

fn visible_cell_range(extent: Rect, cell_size: Vec2, margin: i32) -> (CellCoord, CellCoord) {
    let min = CellCoord::containing(extent.top_left(), cell_size);
    let max = CellCoord::containing(Vec2::new(extent.right(), extent.bottom()), cell_size);
    (
        CellCoord::new(min.x.saturating_sub(margin), min.y.saturating_sub(margin)),
        CellCoord::new(max.x.saturating_add(margin), max.y.saturating_add(margin)),
    )
}
