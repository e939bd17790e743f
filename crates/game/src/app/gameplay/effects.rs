use engine::{SpriteDesc, SpriteId, SpriteWorld};

#[derive(Debug, Clone, Copy)]
struct Timed {
    sprite: SpriteId,
    remaining: f32,
}

/// Sprites that despawn themselves once their lifetime runs out.
#[derive(Debug, Default)]
pub(crate) struct Transients {
    live: Vec<Timed>,
}

impl Transients {
    pub(crate) fn spawn(
        &mut self,
        world: &mut SpriteWorld,
        desc: &SpriteDesc,
        lifetime_seconds: f32,
    ) -> SpriteId {
        let sprite = world.spawn(desc);
        self.live.push(Timed {
            sprite,
            remaining: lifetime_seconds,
        });
        sprite
    }

    /// Counts down every lifetime and despawns the expired sprites. Returns
    /// how many expired.
    pub(crate) fn tick(&mut self, world: &mut SpriteWorld, dt_seconds: f32) -> usize {
        let before = self.live.len();
        self.live.retain_mut(|timed| {
            timed.remaining -= dt_seconds;
            if timed.remaining > 0.0 {
                return true;
            }
            world.despawn(timed.sprite);
            false
        });
        before - self.live.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.live.len()
    }

    /// Forgets every tracked sprite without touching the world, for when the
    /// world has already dropped them.
    pub(crate) fn clear(&mut self) {
        self.live.clear();
    }
}
