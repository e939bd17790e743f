use crate::geometry::Vec2;
use crate::spatial::CollisionManager;
use crate::sprite::{SpriteId, SpriteStore};

/// Advances moving sprite `id` by one frame of its velocity.
///
/// The hitbox is displaced and resolved one axis at a time, x first, so a
/// sprite sliding along a wall keeps the component of its motion parallel to
/// it. The render rect is then centred on the resolved hitbox.
///
/// Sprites that are not in the collision grid pass through everything.
/// Returns whether any collision was resolved. Static and unknown sprites are
/// left untouched.
pub fn move_and_collide(
    sprites: &mut SpriteStore,
    collisions: &CollisionManager,
    id: SpriteId,
    dt_seconds: f32,
) -> bool {
    let Some(sprite) = sprites.get_mut(id) else {
        return false;
    };
    sprite.record_previous_hitbox();
    let Some(motion) = sprite.motion() else {
        return false;
    };
    let dx = motion.direction.x * motion.speed * dt_seconds;
    let dy = motion.direction.y * motion.speed * dt_seconds;
    let solid = collisions.contains(id);

    let mut colliding = false;
    if dx != 0.0 {
        sprite.hitbox.translate(dx, 0.0);
        if solid {
            colliding |= collisions.resolve(sprites, id);
        }
    }
    if dy != 0.0 {
        if let Some(sprite) = sprites.get_mut(id) {
            sprite.hitbox.translate(0.0, dy);
        }
        if solid {
            colliding |= collisions.resolve(sprites, id);
        }
    }

    if let Some(sprite) = sprites.get_mut(id) {
        let center = sprite.hitbox.center();
        sprite.rect.set_center(center);
        if let Some(motion) = sprite.motion_mut() {
            motion.colliding = colliding;
        }
    }
    colliding
}

/// Places the hitbox centre of `id` at `center` without collision checks.
/// The render rect keeps its offset from the hitbox, and the previous hitbox
/// is reset so the next resolve does not see the jump as motion.
pub fn teleport(sprites: &mut SpriteStore, id: SpriteId, center: Vec2) -> bool {
    let Some(sprite) = sprites.get_mut(id) else {
        return false;
    };
    let hitbox_center = sprite.hitbox.center();
    let rect_center = sprite.rect.center();
    sprite.hitbox.set_center(center);
    sprite.rect.set_center(Vec2::new(
        center.x + rect_center.x - hitbox_center.x,
        center.y + rect_center.y - hitbox_center.y,
    ));
    sprite.record_previous_hitbox();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpatialConfig;
    use crate::geometry::Rect;
    use crate::sprite::{DepthLayer, SpriteDesc};

    struct Fixture {
        store: SpriteStore,
        collisions: CollisionManager,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                store: SpriteStore::default(),
                collisions: CollisionManager::new(&SpatialConfig::default()),
            }
        }

        fn wall(&mut self, rect: Rect) -> SpriteId {
            let id = self
                .store
                .insert(&SpriteDesc::new("fence", rect, DepthLayer::Main).collidable());
            self.collisions.add(&self.store, id);
            id
        }

        fn player(&mut self, rect: Rect, direction: Vec2, speed: f32) -> SpriteId {
            let id = self.store.insert(
                &SpriteDesc::new("player", rect, DepthLayer::Main)
                    .moving(speed)
                    .collidable(),
            );
            self.store
                .get_mut(id)
                .and_then(|sprite| sprite.motion_mut())
                .expect("motion")
                .direction = direction;
            self.collisions.add(&self.store, id);
            id
        }

        fn step(&mut self, id: SpriteId, dt_seconds: f32) -> bool {
            move_and_collide(&mut self.store, &self.collisions, id, dt_seconds)
        }

        fn hitbox(&self, id: SpriteId) -> Rect {
            self.store.get(id).expect("sprite").hitbox
        }
    }

    #[test]
    fn free_movement_moves_hitbox_and_rect_together() {
        let mut fixture = Fixture::new();
        let player = fixture.player(Rect::new(0.0, 0.0, 32.0, 32.0), Vec2::new(1.0, 0.0), 100.0);

        assert!(!fixture.step(player, 0.5));
        let sprite = fixture.store.get(player).expect("player");
        assert_eq!(sprite.hitbox, Rect::new(50.0, 0.0, 32.0, 32.0));
        assert_eq!(sprite.rect.center(), sprite.hitbox.center());
        assert_eq!(sprite.previous_hitbox(), Rect::new(0.0, 0.0, 32.0, 32.0));
        assert!(!sprite.is_colliding());
    }

    #[test]
    fn walking_into_a_wall_stops_flush() {
        let mut fixture = Fixture::new();
        fixture.wall(Rect::new(40.0, 0.0, 32.0, 32.0));
        let player = fixture.player(Rect::new(0.0, 0.0, 32.0, 32.0), Vec2::new(1.0, 0.0), 24.0);

        assert!(fixture.step(player, 1.0));
        assert_eq!(fixture.hitbox(player).right(), 40.0);
        assert!(fixture.store.get(player).expect("player").is_colliding());

        // Pushing on: still blocked, still flush.
        assert!(fixture.step(player, 1.0));
        assert_eq!(fixture.hitbox(player).right(), 40.0);
    }

    #[test]
    fn diagonal_motion_slides_along_l_shaped_obstacles() {
        let mut fixture = Fixture::new();
        // A wall to the right and a floor below, meeting at a corner.
        fixture.wall(Rect::new(64.0, 0.0, 32.0, 96.0));
        fixture.wall(Rect::new(0.0, 64.0, 64.0, 32.0));
        let player = fixture.player(Rect::new(24.0, 24.0, 32.0, 32.0), Vec2::new(1.0, 1.0), 16.0);

        assert!(fixture.step(player, 1.0));
        let hitbox = fixture.hitbox(player);
        assert_eq!(hitbox.right(), 64.0);
        assert_eq!(hitbox.bottom(), 64.0);

        // Each axis was resolved on its own; no overlap is left behind.
        assert!(!fixture.collisions.check_collision(&fixture.store, hitbox, Some(player)));
    }

    #[test]
    fn blocked_axis_keeps_free_axis_motion() {
        let mut fixture = Fixture::new();
        fixture.wall(Rect::new(40.0, -60.0, 32.0, 120.0));
        let player = fixture.player(Rect::new(0.0, 0.0, 32.0, 32.0), Vec2::new(1.0, 1.0), 20.0);

        assert!(fixture.step(player, 1.0));
        let hitbox = fixture.hitbox(player);
        assert_eq!(hitbox.right(), 40.0);
        assert_eq!(hitbox.top(), 20.0);
    }

    #[test]
    fn idle_sprite_is_not_colliding() {
        let mut fixture = Fixture::new();
        fixture.wall(Rect::new(40.0, 0.0, 32.0, 32.0));
        let player = fixture.player(Rect::new(8.0, 0.0, 32.0, 32.0), Vec2::ZERO, 100.0);

        assert!(!fixture.step(player, 1.0));
        assert_eq!(fixture.hitbox(player), Rect::new(8.0, 0.0, 32.0, 32.0));
    }

    #[test]
    fn sprites_outside_the_collision_grid_pass_through_walls() {
        let mut fixture = Fixture::new();
        fixture.wall(Rect::new(40.0, 0.0, 32.0, 32.0));
        let drop = fixture.store.insert(
            &SpriteDesc::new("drop", Rect::new(0.0, 0.0, 8.0, 8.0), DepthLayer::Main).moving(50.0),
        );
        fixture
            .store
            .get_mut(drop)
            .and_then(|sprite| sprite.motion_mut())
            .expect("motion")
            .direction = Vec2::new(1.0, 0.0);

        assert!(!fixture.step(drop, 1.0));
        assert_eq!(fixture.hitbox(drop), Rect::new(50.0, 0.0, 8.0, 8.0));
    }

    #[test]
    fn static_sprites_do_not_move() {
        let mut fixture = Fixture::new();
        let fence = fixture.wall(Rect::new(0.0, 0.0, 32.0, 32.0));
        assert!(!fixture.step(fence, 1.0));
        assert_eq!(fixture.hitbox(fence), Rect::new(0.0, 0.0, 32.0, 32.0));
    }

    #[test]
    fn teleport_keeps_rect_offset_and_resets_previous_hitbox() {
        let mut store = SpriteStore::default();
        let id = store.insert(
            &SpriteDesc::new("player", Rect::new(0.0, 0.0, 48.0, 48.0), DepthLayer::Main)
                .with_hitbox(Rect::new(12.0, 30.0, 24.0, 12.0))
                .moving(100.0),
        );

        assert!(teleport(&mut store, id, Vec2::new(500.0, 300.0)));
        let sprite = store.get(id).expect("player");
        assert_eq!(sprite.hitbox.center(), Vec2::new(500.0, 300.0));
        assert_eq!(sprite.rect, Rect::new(476.0, 264.0, 48.0, 48.0));
        assert_eq!(sprite.previous_hitbox(), sprite.hitbox);
        assert!(!teleport(&mut store, SpriteId(42), Vec2::ZERO));
    }
}
