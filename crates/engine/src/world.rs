use std::collections::BTreeSet;

use tracing::debug;

use crate::camera::Camera2D;
use crate::config::SpatialConfig;
use crate::geometry::{Rect, Vec2};
use crate::movement::{move_and_collide, teleport};
use crate::spatial::{CollisionManager, DrawTarget, RenderManager};
use crate::sprite::{Animation, DepthLayer, Sprite, SpriteDesc, SpriteId, SpriteStore};

/// Counters from the most recent [`SpriteWorld::update`] and
/// [`SpriteWorld::draw`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub migrations: usize,
    pub collisions: usize,
    pub visible_sprites: usize,
}

/// Sprite arena plus the two spatial grids that index it.
///
/// All structural changes go through the world so that the store, the render
/// grid and the collision grid never disagree about which sprites exist.
#[derive(Debug)]
pub struct SpriteWorld {
    sprites: SpriteStore,
    render: RenderManager,
    collisions: CollisionManager,
    camera: Camera2D,
    focus: Option<SpriteId>,
    stats: FrameStats,
}

impl SpriteWorld {
    pub fn new(config: &SpatialConfig) -> Self {
        Self {
            sprites: SpriteStore::default(),
            render: RenderManager::new(config),
            collisions: CollisionManager::new(config),
            camera: Camera2D::default(),
            focus: None,
            stats: FrameStats::default(),
        }
    }

    pub fn spawn(&mut self, desc: &SpriteDesc) -> SpriteId {
        let id = self.sprites.insert(desc);
        if desc.persistent {
            self.render.add_persistent(&self.sprites, id);
        } else {
            self.render.add(&self.sprites, id);
        }
        if desc.collidable {
            if desc.persistent {
                self.collisions.add_persistent(&self.sprites, id);
            } else {
                self.collisions.add(&self.sprites, id);
            }
        }
        id
    }

    pub fn despawn(&mut self, id: SpriteId) -> bool {
        self.render.remove(id);
        self.collisions.remove(id);
        if self.focus == Some(id) {
            self.focus = None;
        }
        let removed = self.sprites.remove(id).is_some();
        if removed {
            debug!(sprite = id.0, "sprite_despawned");
        }
        removed
    }

    pub fn get(&self, id: SpriteId) -> Option<&Sprite> {
        self.sprites.get(id)
    }

    /// Geometry, kind and layer stay behind the world's own operations so the
    /// grids always agree with the store; only cosmetic state is writable.
    pub fn set_color(&mut self, id: SpriteId, color: [u8; 4]) -> bool {
        match self.sprites.get_mut(id) {
            Some(sprite) => {
                sprite.color = color;
                true
            }
            None => false,
        }
    }

    pub fn animation_mut(&mut self, id: SpriteId) -> Option<&mut Animation> {
        self.sprites
            .get_mut(id)
            .and_then(|sprite| sprite.animation.as_mut())
    }

    pub fn sprites(&self) -> &SpriteStore {
        &self.sprites
    }

    pub fn render(&self) -> &RenderManager {
        &self.render
    }

    pub fn collisions(&self) -> &CollisionManager {
        &self.collisions
    }

    pub fn camera(&self) -> &Camera2D {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera2D {
        &mut self.camera
    }

    pub fn focus(&self) -> Option<SpriteId> {
        self.focus
    }

    /// Sprite the camera follows after every update.
    pub fn set_focus(&mut self, focus: Option<SpriteId>) {
        self.focus = focus;
        self.follow_focus();
    }

    /// Sets the walking direction of a moving sprite, normalised so diagonal
    /// movement is not faster. Returns `false` for static or unknown sprites.
    pub fn set_direction(&mut self, id: SpriteId, direction: Vec2) -> bool {
        match self.sprites.get_mut(id).and_then(Sprite::motion_mut) {
            Some(motion) => {
                motion.direction = direction.normalized_or_zero();
                true
            }
            None => false,
        }
    }

    pub fn teleport(&mut self, id: SpriteId, center: Vec2) -> bool {
        if !teleport(&mut self.sprites, id, center) {
            return false;
        }
        self.rehome(id);
        if self.focus == Some(id) {
            self.follow_focus();
        }
        true
    }

    /// Replaces both rectangles of `id` and moves it to the matching cells.
    pub fn reshape(&mut self, id: SpriteId, rect: Rect, hitbox: Rect) -> bool {
        let Some(sprite) = self.sprites.get_mut(id) else {
            return false;
        };
        sprite.rect = rect;
        sprite.hitbox = hitbox;
        sprite.record_previous_hitbox();
        self.rehome(id);
        true
    }

    pub fn change_layer(&mut self, id: SpriteId, layer: DepthLayer) -> bool {
        let keep_persistent = self.render.is_persistent(id);
        self.render
            .change_layer(&mut self.sprites, id, layer, keep_persistent)
    }

    pub fn check_collision(&self, hitbox: Rect, ignore: Option<SpriteId>) -> bool {
        self.collisions.check_collision(&self.sprites, hitbox, ignore)
    }

    /// One simulation tick: every sprite moves and resolves its collisions,
    /// animations advance, then both grids run their migration pass.
    pub fn update(&mut self, dt_seconds: f32) -> FrameStats {
        let collisions = &self.collisions;
        let mut collided = 0usize;
        let render_migrations = self.render.update(&mut self.sprites, |id, sprites| {
            if move_and_collide(sprites, collisions, id, dt_seconds) {
                collided += 1;
            }
            if let Some(sprite) = sprites.get_mut(id) {
                sprite.advance_animation(dt_seconds);
            }
        });
        let collision_migrations = self.collisions.update(&self.sprites);
        self.follow_focus();

        self.stats.migrations = render_migrations + collision_migrations;
        self.stats.collisions = collided;
        self.stats
    }

    /// Tick used while gameplay is suspended: animations keep running but
    /// nothing moves.
    pub fn update_blocked(&mut self, dt_seconds: f32) {
        self.render.update_blocked(&mut self.sprites, dt_seconds);
        self.stats.migrations = 0;
        self.stats.collisions = 0;
    }

    /// Paints everything visible from the camera. Returns the sprite count.
    pub fn draw<T: DrawTarget>(&mut self, target: &mut T) -> usize {
        let center = self.camera.position;
        let drawn = self.render.draw(&self.sprites, &self.camera, center, target);
        self.stats.visible_sprites = drawn;
        drawn
    }

    /// Map change: drops every non-persistent sprite. Returns how many were
    /// removed.
    pub fn empty(&mut self) -> usize {
        let mut dropped: BTreeSet<SpriteId> = self.render.empty().into_iter().collect();
        dropped.extend(self.collisions.empty());
        self.forget(&dropped)
    }

    /// Full reset: drops every sprite, persistent ones included.
    pub fn empty_including_persistent(&mut self) -> usize {
        let mut dropped: BTreeSet<SpriteId> =
            self.render.empty_including_persistent().into_iter().collect();
        dropped.extend(self.collisions.empty_including_persistent());
        dropped.extend(self.sprites.iter().map(|sprite| sprite.id));
        self.forget(&dropped)
    }

    pub fn sprite_count(&self) -> usize {
        self.sprites.len()
    }

    pub fn frame_stats(&self) -> FrameStats {
        self.stats
    }

    fn forget(&mut self, dropped: &BTreeSet<SpriteId>) -> usize {
        let mut removed = 0usize;
        for id in dropped {
            self.render.remove(*id);
            self.collisions.remove(*id);
            if self.sprites.remove(*id).is_some() {
                removed += 1;
            }
        }
        if self.focus.is_some_and(|id| !self.sprites.contains(id)) {
            self.focus = None;
        }
        removed
    }

    fn rehome(&mut self, id: SpriteId) {
        if self.render.contains(id) {
            self.render.add(&self.sprites, id);
        }
        if self.collisions.contains(id) {
            self.collisions.add(&self.sprites, id);
        }
    }

    fn follow_focus(&mut self) {
        if let Some(sprite) = self.focus.and_then(|id| self.sprites.get(id)) {
            self.camera.follow(sprite.hitbox.center());
        }
    }
}
