use engine::{DepthLayer, Rect, SpriteDesc, SpriteId, SpriteWorld};

/// Age gained per watered day.
pub(crate) const GROW_SPEED: f32 = 1.4;
/// Growth stages, seed included. A crop is ripe at `CROP_STAGES - 1`.
pub(crate) const CROP_STAGES: u16 = 4;

const CROP_WIDTH: f32 = 40.0;
const SEED_HEIGHT: f32 = 16.0;
const STAGE_HEIGHT_STEP: f32 = 14.0;
/// The plant's base overhangs the bottom of its plot slightly.
const PLOT_BOTTOM_OFFSET: f32 = 2.0;
const HITBOX_WIDTH_INSET: f32 = -26.0;
const HITBOX_HEIGHT_FRACTION: f32 = -0.4;

const SEED_COLOR: [u8; 4] = [120, 92, 60, 255];
const STAGE_COLORS: [[u8; 4]; CROP_STAGES as usize] = [
    SEED_COLOR,
    [110, 170, 80, 255],
    [80, 150, 60, 255],
    [230, 170, 40, 255],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GrowthEvent {
    Dry,
    Grew,
    Sprouted,
    Ripened,
    AlreadyRipe,
}

#[derive(Debug, Clone)]
pub(crate) struct Crop {
    pub(crate) sprite: SpriteId,
    pub(crate) plot: Rect,
    pub(crate) age: f32,
    pub(crate) harvestable: bool,
}

impl Crop {
    /// Seeds `plot`. Seeds sit on the plant layer with no hitbox of their own.
    pub(crate) fn plant(world: &mut SpriteWorld, plot: Rect) -> Self {
        let rect = stage_rect(plot, 0);
        let sprite = world.spawn(
            &SpriteDesc::new("crop", rect, DepthLayer::Plant).with_color(SEED_COLOR),
        );
        Self {
            sprite,
            plot,
            age: 0.0,
            harvestable: false,
        }
    }

    pub(crate) fn stage(&self) -> u16 {
        (self.age as u16).min(CROP_STAGES - 1)
    }

    /// Advances one day. Only crops on watered soil age.
    pub(crate) fn grow(&mut self, world: &mut SpriteWorld, watered: bool) -> GrowthEvent {
        if self.harvestable {
            return GrowthEvent::AlreadyRipe;
        }
        if !watered {
            return GrowthEvent::Dry;
        }

        let was_seed = self.stage() == 0;
        let max_age = f32::from(CROP_STAGES - 1);
        self.age = (self.age + GROW_SPEED).min(max_age);
        let stage = self.stage();

        let rect = stage_rect(self.plot, stage);
        let hitbox = if stage > 0 {
            rect.inflated(HITBOX_WIDTH_INSET, rect.h * HITBOX_HEIGHT_FRACTION)
        } else {
            rect
        };
        world.reshape(self.sprite, rect, hitbox);
        world.set_color(self.sprite, STAGE_COLORS[stage as usize]);

        let sprouted = was_seed && stage > 0;
        if sprouted {
            world.change_layer(self.sprite, DepthLayer::Main);
        }
        if self.age >= max_age {
            self.harvestable = true;
            return GrowthEvent::Ripened;
        }
        if sprouted {
            GrowthEvent::Sprouted
        } else {
            GrowthEvent::Grew
        }
    }
}

/// Render rect for `stage`, anchored to the bottom centre of the plot.
fn stage_rect(plot: Rect, stage: u16) -> Rect {
    let h = SEED_HEIGHT + STAGE_HEIGHT_STEP * f32::from(stage);
    let bottom = plot.bottom() + PLOT_BOTTOM_OFFSET;
    Rect::new(plot.center().x - CROP_WIDTH * 0.5, bottom - h, CROP_WIDTH, h)
}
