use std::collections::HashMap;

use crate::geometry::{Rect, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpriteId(pub u64);

/// Coarse draw order. Layers are drawn in ascending ordinal order; within a
/// layer sprites are depth-sorted by the bottom edge of their hitbox.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DepthLayer {
    Water,
    Border,
    Ground,
    Soil,
    SoilWater,
    RainFloor,
    Plant,
    #[default]
    Main,
    Upper,
    RainDrops,
    Emotes,
}

impl DepthLayer {
    pub const COUNT: usize = 11;

    pub const ALL: [DepthLayer; DepthLayer::COUNT] = [
        DepthLayer::Water,
        DepthLayer::Border,
        DepthLayer::Ground,
        DepthLayer::Soil,
        DepthLayer::SoilWater,
        DepthLayer::RainFloor,
        DepthLayer::Plant,
        DepthLayer::Main,
        DepthLayer::Upper,
        DepthLayer::RainDrops,
        DepthLayer::Emotes,
    ];

    pub const fn ordinal(self) -> usize {
        match self {
            DepthLayer::Water => 0,
            DepthLayer::Border => 1,
            DepthLayer::Ground => 2,
            DepthLayer::Soil => 3,
            DepthLayer::SoilWater => 4,
            DepthLayer::RainFloor => 5,
            DepthLayer::Plant => 6,
            DepthLayer::Main => 7,
            DepthLayer::Upper => 8,
            DepthLayer::RainDrops => 9,
            DepthLayer::Emotes => 10,
        }
    }
}

/// Movement state carried by sprites that can change position after placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    /// Hitbox at the start of the current frame; the last known
    /// non-overlapping state used to tell which side a collision came from.
    pub previous_hitbox: Rect,
    pub direction: Vec2,
    pub speed: f32,
    pub colliding: bool,
}

impl Motion {
    pub fn new(hitbox: Rect, speed: f32) -> Self {
        Self {
            previous_hitbox: hitbox,
            direction: Vec2::ZERO,
            speed,
            colliding: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpriteKind {
    Static,
    Moving(Motion),
}

impl SpriteKind {
    pub fn is_moving(&self) -> bool {
        matches!(self, SpriteKind::Moving(_))
    }

    pub fn motion(&self) -> Option<&Motion> {
        match self {
            SpriteKind::Moving(motion) => Some(motion),
            SpriteKind::Static => None,
        }
    }

    pub fn motion_mut(&mut self) -> Option<&mut Motion> {
        match self {
            SpriteKind::Moving(motion) => Some(motion),
            SpriteKind::Static => None,
        }
    }
}

/// Looping frame counter. Always has at least one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animation {
    frame_count: u16,
    frames_per_second: f32,
    frame_index: f32,
}

impl Animation {
    pub fn new(frame_count: u16, frames_per_second: f32) -> Self {
        Self {
            frame_count: frame_count.max(1),
            frames_per_second,
            frame_index: 0.0,
        }
    }

    pub fn frame_count(&self) -> u16 {
        self.frame_count
    }

    pub fn frames_per_second(&self) -> f32 {
        self.frames_per_second
    }

    pub fn set_frames_per_second(&mut self, frames_per_second: f32) {
        self.frames_per_second = frames_per_second;
    }

    /// Restarts the cycle from frame zero.
    pub fn restart(&mut self) {
        self.frame_index = 0.0;
    }

    pub fn advance(&mut self, dt_seconds: f32) {
        let next = self.frame_index + self.frames_per_second * dt_seconds;
        if next.is_finite() {
            self.frame_index = next.rem_euclid(f32::from(self.frame_count));
        }
    }

    pub fn current_frame(&self) -> u16 {
        (self.frame_index as u16).min(self.frame_count.saturating_sub(1))
    }
}

#[derive(Debug, Clone)]
pub struct Sprite {
    pub id: SpriteId,
    pub name: &'static str,
    pub rect: Rect,
    pub hitbox: Rect,
    pub(crate) kind: SpriteKind,
    pub color: [u8; 4],
    pub animation: Option<Animation>,
    pub(crate) layer: DepthLayer,
}

impl Sprite {
    pub fn layer(&self) -> DepthLayer {
        self.layer
    }

    pub fn kind(&self) -> &SpriteKind {
        &self.kind
    }

    pub fn is_moving(&self) -> bool {
        self.kind.is_moving()
    }

    /// Hitbox to compare against when another sprite collides with this one.
    /// Moving sprites report last frame's hitbox so that two sprites moving in
    /// the same frame do not push each other into inconsistent positions.
    pub fn previous_hitbox(&self) -> Rect {
        match &self.kind {
            SpriteKind::Moving(motion) => motion.previous_hitbox,
            SpriteKind::Static => self.hitbox,
        }
    }

    pub fn motion(&self) -> Option<&Motion> {
        self.kind.motion()
    }

    pub fn motion_mut(&mut self) -> Option<&mut Motion> {
        self.kind.motion_mut()
    }

    pub fn is_colliding(&self) -> bool {
        self.motion().is_some_and(|motion| motion.colliding)
    }

    pub(crate) fn record_previous_hitbox(&mut self) {
        let hitbox = self.hitbox;
        if let Some(motion) = self.kind.motion_mut() {
            motion.previous_hitbox = hitbox;
        }
    }

    pub(crate) fn advance_animation(&mut self, dt_seconds: f32) {
        if let Some(animation) = self.animation.as_mut() {
            animation.advance(dt_seconds);
        }
    }

    /// Per-frame bookkeeping for a frame in which the sprite does not move.
    pub(crate) fn begin_frame(&mut self, dt_seconds: f32) {
        self.record_previous_hitbox();
        self.advance_animation(dt_seconds);
    }
}

pub const DEFAULT_SPRITE_COLOR: [u8; 4] = [220, 220, 240, 255];

/// Everything needed to place a sprite into the world.
#[derive(Debug, Clone)]
pub struct SpriteDesc {
    pub name: &'static str,
    pub rect: Rect,
    pub hitbox: Option<Rect>,
    pub layer: DepthLayer,
    pub speed: Option<f32>,
    pub collidable: bool,
    pub persistent: bool,
    pub color: [u8; 4],
    pub animation: Option<Animation>,
}

impl SpriteDesc {
    pub fn new(name: &'static str, rect: Rect, layer: DepthLayer) -> Self {
        Self {
            name,
            rect,
            hitbox: None,
            layer,
            speed: None,
            collidable: false,
            persistent: false,
            color: DEFAULT_SPRITE_COLOR,
            animation: None,
        }
    }

    pub fn with_hitbox(mut self, hitbox: Rect) -> Self {
        self.hitbox = Some(hitbox);
        self
    }

    pub fn moving(mut self, speed: f32) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn collidable(mut self) -> Self {
        self.collidable = true;
        self
    }

    pub fn persistent(mut self) -> Self {
        self.persistent = true;
        self
    }

    pub fn with_color(mut self, color: [u8; 4]) -> Self {
        self.color = color;
        self
    }

    pub fn with_animation(mut self, animation: Animation) -> Self {
        self.animation = Some(animation);
        self
    }
}

#[derive(Debug, Default)]
pub struct SpriteIdAllocator {
    next: u64,
}

impl SpriteIdAllocator {
    pub fn allocate(&mut self) -> SpriteId {
        let id = SpriteId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

/// Arena owning every live sprite. Grids only ever hold [`SpriteId`]s.
#[derive(Debug, Default)]
pub struct SpriteStore {
    allocator: SpriteIdAllocator,
    sprites: HashMap<SpriteId, Sprite>,
}

impl SpriteStore {
    pub fn insert(&mut self, desc: &SpriteDesc) -> SpriteId {
        let id = self.allocator.allocate();
        let hitbox = desc.hitbox.unwrap_or(desc.rect);
        let kind = match desc.speed {
            Some(speed) => SpriteKind::Moving(Motion::new(hitbox, speed)),
            None => SpriteKind::Static,
        };
        self.sprites.insert(
            id,
            Sprite {
                id,
                name: desc.name,
                rect: desc.rect,
                hitbox,
                kind,
                color: desc.color,
                animation: desc.animation,
                layer: desc.layer,
            },
        );
        id
    }

    pub fn get(&self, id: SpriteId) -> Option<&Sprite> {
        self.sprites.get(&id)
    }

    pub fn get_mut(&mut self, id: SpriteId) -> Option<&mut Sprite> {
        self.sprites.get_mut(&id)
    }

    pub fn remove(&mut self, id: SpriteId) -> Option<Sprite> {
        self.sprites.remove(&id)
    }

    pub fn contains(&self, id: SpriteId) -> bool {
        self.sprites.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sprite> {
        self.sprites.values()
    }
}
