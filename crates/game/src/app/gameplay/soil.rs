use engine::{DepthLayer, Rect, SpriteDesc, SpriteId, SpriteWorld, Vec2};
use tracing::{debug, info};

use super::crops::{Crop, GrowthEvent};

const UNTILLED_COLOR: [u8; 4] = [92, 110, 58, 255];
const TILLED_COLOR: [u8; 4] = [104, 72, 48, 255];
const WET_COLOR: [u8; 4] = [68, 48, 40, 255];

/// One farmable tile. A plot must be tilled before it can be watered or
/// planted, and a puddle sprite marks it as watered until the day ends.
#[derive(Debug, Clone)]
pub(crate) struct Plot {
    pub(crate) rect: Rect,
    pub(crate) sprite: SpriteId,
    pub(crate) tilled: bool,
    pub(crate) puddle: Option<SpriteId>,
    pub(crate) crop: Option<Crop>,
}

impl Plot {
    pub(crate) fn is_watered(&self) -> bool {
        self.puddle.is_some()
    }

    fn water(&mut self, world: &mut SpriteWorld) -> bool {
        if !self.tilled || self.is_watered() {
            return false;
        }
        let puddle = SpriteDesc::new("puddle", self.rect, DepthLayer::SoilWater)
            .with_color(WET_COLOR);
        self.puddle = Some(world.spawn(&puddle));
        true
    }

    fn dry(&mut self, world: &mut SpriteWorld) {
        if let Some(puddle) = self.puddle.take() {
            world.despawn(puddle);
        }
    }
}

/// Every farmable plot on the current map.
#[derive(Debug, Default)]
pub(crate) struct SoilField {
    plots: Vec<Plot>,
}

impl SoilField {
    pub(crate) fn lay_out(world: &mut SpriteWorld, plots: &[Rect]) -> Self {
        let plots = plots
            .iter()
            .map(|rect| Plot {
                rect: *rect,
                sprite: world.spawn(
                    &SpriteDesc::new("soil", *rect, DepthLayer::Soil).with_color(UNTILLED_COLOR),
                ),
                tilled: false,
                puddle: None,
                crop: None,
            })
            .collect::<Vec<_>>();
        debug!(count = plots.len(), "soil_laid_out");
        Self { plots }
    }

    pub(crate) fn plots(&self) -> &[Plot] {
        &self.plots
    }

    fn plot_at(&mut self, point: Vec2) -> Option<&mut Plot> {
        self.plots.iter_mut().find(|plot| plot.rect.contains_point(point))
    }

    pub(crate) fn till(&mut self, world: &mut SpriteWorld, point: Vec2) -> bool {
        let Some(plot) = self.plot_at(point).filter(|plot| !plot.tilled) else {
            return false;
        };
        plot.tilled = true;
        world.set_color(plot.sprite, TILLED_COLOR);
        true
    }

    pub(crate) fn water(&mut self, world: &mut SpriteWorld, point: Vec2) -> bool {
        self.plot_at(point).is_some_and(|plot| plot.water(world))
    }

    /// Waters every tilled plot. Returns how many were dry.
    pub(crate) fn water_all(&mut self, world: &mut SpriteWorld) -> usize {
        let mut watered = 0usize;
        for plot in &mut self.plots {
            if plot.water(world) {
                watered += 1;
            }
        }
        watered
    }

    /// Sows a seed on the tilled, empty plot under `point`.
    pub(crate) fn plant(&mut self, world: &mut SpriteWorld, point: Vec2) -> bool {
        let Some(plot) = self
            .plot_at(point)
            .filter(|plot| plot.tilled && plot.crop.is_none())
        else {
            return false;
        };
        plot.crop = Some(Crop::plant(world, plot.rect));
        true
    }

    /// Removes every ripe crop whose plot overlaps `reach`. Returns the count.
    pub(crate) fn harvest(&mut self, world: &mut SpriteWorld, reach: Rect) -> usize {
        let mut harvested = 0usize;
        for plot in self.plots.iter_mut().filter(|plot| plot.rect.overlaps(&reach)) {
            if !plot.crop.as_ref().is_some_and(|crop| crop.harvestable) {
                continue;
            }
            if let Some(crop) = plot.crop.take() {
                world.despawn(crop.sprite);
                harvested += 1;
            }
        }
        if harvested > 0 {
            info!(harvested, "crops_harvested");
        }
        harvested
    }

    /// Daily step: crops on watered plots grow, then every puddle dries up.
    /// Returns how many crops changed.
    pub(crate) fn new_day(&mut self, world: &mut SpriteWorld) -> usize {
        let mut changed = 0usize;
        for plot in &mut self.plots {
            let watered = plot.is_watered();
            if let Some(crop) = plot.crop.as_mut() {
                match crop.grow(world, watered) {
                    GrowthEvent::Dry | GrowthEvent::AlreadyRipe => {}
                    event => {
                        changed += 1;
                        debug!(sprite = crop.sprite.0, ?event, age = crop.age, "crop_grew");
                    }
                }
            }
            plot.dry(world);
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::SpatialConfig;

    const PLOT: Rect = Rect::new(128.0, 128.0, 64.0, 64.0);

    fn field(world: &mut SpriteWorld) -> SoilField {
        SoilField::lay_out(world, &[PLOT, PLOT.translated(640.0, 0.0)])
    }

    #[test]
    fn untilled_soil_cannot_be_watered_or_planted() {
        let mut world = SpriteWorld::new(&SpatialConfig::default());
        let mut soil = field(&mut world);
        let center = PLOT.center();

        assert!(!soil.water(&mut world, center));
        assert!(!soil.plant(&mut world, center));
        assert!(!soil.till(&mut world, Vec2::new(0.0, 0.0)));

        assert!(soil.till(&mut world, center));
        assert!(!soil.till(&mut world, center));
        let plot = &soil.plots()[0];
        assert_eq!(world.get(plot.sprite).expect("soil").color, TILLED_COLOR);
    }

    #[test]
    fn watering_adds_a_puddle_until_the_day_ends() {
        let mut world = SpriteWorld::new(&SpatialConfig::default());
        let mut soil = field(&mut world);
        let center = PLOT.center();
        soil.till(&mut world, center);

        assert!(soil.water(&mut world, center));
        assert!(!soil.water(&mut world, center));
        let puddle = soil.plots()[0].puddle.expect("puddle");
        let sprite = world.get(puddle).expect("puddle sprite");
        assert_eq!(sprite.layer(), DepthLayer::SoilWater);
        assert_eq!(sprite.rect, PLOT);

        soil.new_day(&mut world);
        assert!(!soil.plots()[0].is_watered());
        assert!(world.get(puddle).is_none());
    }

    #[test]
    fn water_all_only_reaches_tilled_plots() {
        let mut world = SpriteWorld::new(&SpatialConfig::default());
        let mut soil = field(&mut world);
        soil.till(&mut world, PLOT.center());

        assert_eq!(soil.water_all(&mut world), 1);
        assert_eq!(soil.water_all(&mut world), 0);
        assert!(!soil.plots()[1].is_watered());
    }

    #[test]
    fn planted_crop_grows_on_watered_days_and_is_harvested() {
        let mut world = SpriteWorld::new(&SpatialConfig::default());
        let mut soil = field(&mut world);
        let center = PLOT.center();
        soil.till(&mut world, center);
        assert!(soil.plant(&mut world, center));
        assert!(!soil.plant(&mut world, center));

        assert_eq!(soil.new_day(&mut world), 0, "dry soil");
        for _ in 0..3 {
            soil.water(&mut world, center);
            assert_eq!(soil.new_day(&mut world), 1);
        }
        let sprite = soil.plots()[0].crop.as_ref().expect("crop").sprite;
        assert!(soil.plots()[0].crop.as_ref().expect("crop").harvestable);

        let far = Rect::from_center(Vec2::new(2000.0, 2000.0), 16.0, 16.0);
        assert_eq!(soil.harvest(&mut world, far), 0);
        assert_eq!(soil.harvest(&mut world, PLOT.inflated(16.0, 16.0)), 1);
        assert!(soil.plots()[0].crop.is_none());
        assert!(world.get(sprite).is_none());
        assert!(soil.plant(&mut world, center), "plot can be replanted");
    }
}
