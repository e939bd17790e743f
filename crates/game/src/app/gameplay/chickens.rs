use engine::{Animation, DepthLayer, Rect, SpriteDesc, SpriteId, SpriteWorld, Vec2};

pub(crate) const CHICKEN_SPEED: f32 = 60.0;
pub(crate) const WANDER_STEP_SECONDS: f32 = 1.5;
const CHICKEN_SIZE: f32 = 32.0;
const CHICKEN_COLOR: [u8; 4] = [240, 236, 220, 255];

/// Walk/idle cycle shared by every chicken; each one starts at a different
/// offset so the flock does not move in lockstep.
const WANDER_PATTERN: [Vec2; 8] = [
    Vec2::new(1.0, 0.0),
    Vec2::ZERO,
    Vec2::new(0.0, 1.0),
    Vec2::new(-1.0, 1.0),
    Vec2::ZERO,
    Vec2::new(-1.0, 0.0),
    Vec2::new(0.0, -1.0),
    Vec2::new(1.0, -1.0),
];

#[derive(Debug, Clone)]
pub(crate) struct Chicken {
    pub(crate) sprite: SpriteId,
    step: usize,
    timer: f32,
}

impl Chicken {
    pub(crate) fn spawn(world: &mut SpriteWorld, center: Vec2, offset: usize) -> Self {
        let rect = Rect::from_center(center, CHICKEN_SIZE, CHICKEN_SIZE);
        let hitbox = rect.inflated(-12.0, -16.0).translated(0.0, 6.0);
        let sprite = world.spawn(
            &SpriteDesc::new("chicken", rect, DepthLayer::Main)
                .with_hitbox(hitbox)
                .moving(CHICKEN_SPEED)
                .collidable()
                .with_color(CHICKEN_COLOR)
                .with_animation(Animation::new(4, 6.0)),
        );
        let chicken = Self {
            sprite,
            step: offset % WANDER_PATTERN.len(),
            timer: 0.0,
        };
        world.set_direction(sprite, chicken.direction());
        chicken
    }

    pub(crate) fn direction(&self) -> Vec2 {
        WANDER_PATTERN[self.step]
    }

    /// Advances the wander timer and steers the sprite when a step ends.
    pub(crate) fn think(&mut self, world: &mut SpriteWorld, dt_seconds: f32) {
        self.timer += dt_seconds;
        while self.timer >= WANDER_STEP_SECONDS {
            self.timer -= WANDER_STEP_SECONDS;
            self.step = (self.step + 1) % WANDER_PATTERN.len();
        }
        world.set_direction(self.sprite, self.direction());
    }
}
