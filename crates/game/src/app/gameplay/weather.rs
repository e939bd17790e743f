use std::ops::RangeInclusive;

use engine::{DepthLayer, Rect, SpriteDesc, SpriteWorld, Vec2};
use fastrand::Rng;
use tracing::info;

use super::effects::Transients;

const DROP_DIRECTION: Vec2 = Vec2::new(-2.0, 4.0);
const DROP_SPEED: RangeInclusive<u32> = 200..=250;
const LIFETIME_MS: RangeInclusive<u32> = 400..=600;
/// A day is rainy when a roll of `0..=10` lands above this.
const RAIN_THRESHOLD: u32 = 7;

const SPLASH_SIZE: f32 = 12.0;
const DROP_SIZE: (f32, f32) = (4.0, 10.0);
const SPLASH_COLOR: [u8; 4] = [150, 180, 220, 255];
const DROP_COLOR: [u8; 4] = [180, 205, 240, 255];

/// Short-lived splashes on the ground and slanted drops above everything,
/// spawned at random points of the map while it rains.
#[derive(Debug)]
pub(crate) struct Rain {
    rng: Rng,
    area: Rect,
    raining: bool,
    particles: Transients,
}

impl Rain {
    pub(crate) fn new(area: Rect, seed: u64) -> Self {
        Self {
            rng: Rng::with_seed(seed),
            area,
            raining: false,
            particles: Transients::default(),
        }
    }

    pub(crate) fn is_raining(&self) -> bool {
        self.raining
    }

    pub(crate) fn set_raining(&mut self, raining: bool) {
        self.raining = raining;
    }

    /// Picks the weather for a new day.
    pub(crate) fn roll_for_day(&mut self) -> bool {
        self.raining = self.rng.u32(0..=10) > RAIN_THRESHOLD;
        info!(raining = self.raining, "weather_rolled");
        self.raining
    }

    /// Expires old particles, then spawns one splash and one drop while it
    /// rains.
    pub(crate) fn update(&mut self, world: &mut SpriteWorld, dt_seconds: f32) {
        self.particles.tick(world, dt_seconds);
        if !self.raining {
            return;
        }

        let splash = Rect::from_center(self.random_point(), SPLASH_SIZE, SPLASH_SIZE);
        let lifetime = self.lifetime();
        self.particles.spawn(
            world,
            &SpriteDesc::new("rain_floor", splash, DepthLayer::RainFloor)
                .with_color(SPLASH_COLOR),
            lifetime,
        );

        let drop = Rect::from_center(self.random_point(), DROP_SIZE.0, DROP_SIZE.1);
        let speed = self.rng.u32(DROP_SPEED) as f32 * DROP_DIRECTION.length();
        let lifetime = self.lifetime();
        let id = self.particles.spawn(
            world,
            &SpriteDesc::new("rain_drop", drop, DepthLayer::RainDrops)
                .moving(speed)
                .with_color(DROP_COLOR),
            lifetime,
        );
        world.set_direction(id, DROP_DIRECTION);
    }

    pub(crate) fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Drops particle bookkeeping after the world has been emptied.
    pub(crate) fn clear(&mut self) {
        self.particles.clear();
    }

    fn random_point(&mut self) -> Vec2 {
        Vec2::new(
            self.area.x + self.rng.f32() * self.area.w,
            self.area.y + self.rng.f32() * self.area.h,
        )
    }

    fn lifetime(&mut self) -> f32 {
        self.rng.u32(LIFETIME_MS) as f32 / 1000.0
    }
}
