mod chickens;
mod crops;
mod effects;
mod layout;
mod soil;
mod trees;
mod weather;

use std::cell::RefCell;
use std::rc::Rc;

use engine::{
    DepthLayer, InputSnapshot, Rect, Scene, SceneCommand, SceneKey, SpriteDesc, SpriteId,
    SpriteWorld, Vec2,
};
use tracing::{debug, info};

use chickens::Chicken;
use effects::Transients;
use layout::{MapKind, MapLayout};
use soil::SoilField;
use trees::{Orchard, WOOD_PER_TREE};
use weather::Rain;

pub(crate) const PLAYER_SPEED: f32 = 200.0;
pub(crate) const DAY_LENGTH_SECONDS: f32 = 20.0;
const PLAYER_SIZE: f32 = 48.0;
const PLAYER_COLOR: [u8; 4] = [230, 120, 70, 255];
/// How far past its hitbox the player can reach when harvesting.
const INTERACT_REACH: f32 = 48.0;
/// Distance from the hitbox centre to the point a tool or seed lands on.
const TOOL_REACH: f32 = 40.0;
const TOOL_TARGET_SIZE: f32 = 24.0;
const STARTING_SEEDS: u32 = 10;

const EMOTE_SIZE: f32 = 16.0;
const EMOTE_SECONDS: f32 = 0.8;
const HAPPY_EMOTE: [u8; 4] = [250, 220, 60, 255];
const FAIL_EMOTE: [u8; 4] = [160, 160, 170, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tool {
    Axe,
    Hoe,
    Water,
}

impl Tool {
    pub(crate) fn next(self) -> Self {
        match self {
            Tool::Axe => Tool::Hoe,
            Tool::Hoe => Tool::Water,
            Tool::Water => Tool::Axe,
        }
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            Tool::Axe => "axe",
            Tool::Hoe => "hoe",
            Tool::Water => "water",
        }
    }
}

/// What the player carries. Shared by both maps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Inventory {
    pub(crate) seeds: u32,
    pub(crate) crops: u32,
    pub(crate) wood: u32,
    pub(crate) apples: u32,
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            seeds: STARTING_SEEDS,
            crops: 0,
            wood: 0,
            apples: 0,
        }
    }
}

type SharedInventory = Rc<RefCell<Inventory>>;

/// One map of the farm. The player is spawned once as a persistent sprite and
/// carried from map to map; everything else is rebuilt on every load.
struct MapScene {
    kind: MapKind,
    switch_target: SceneKey,
    layout: MapLayout,
    inventory: SharedInventory,
    soil: SoilField,
    orchard: Orchard,
    chickens: Vec<Chicken>,
    rain: Rain,
    emotes: Transients,
    tool: Tool,
    facing: Vec2,
    paused: bool,
    day: u32,
    day_clock: f32,
}

impl MapScene {
    fn new(kind: MapKind, switch_target: SceneKey, inventory: SharedInventory) -> Self {
        let layout = MapLayout::build(kind);
        let seed = kind.seed();
        Self {
            kind,
            switch_target,
            rain: Rain::new(layout.area, seed),
            layout,
            inventory,
            soil: SoilField::default(),
            orchard: Orchard::empty(seed),
            chickens: Vec::new(),
            emotes: Transients::default(),
            tool: Tool::Axe,
            facing: Vec2::new(0.0, 1.0),
            paused: false,
            day: 1,
            day_clock: 0.0,
        }
    }

    /// Spawns the player on first load; later loads move it to this map's
    /// spawn point.
    fn place_player(&self, world: &mut SpriteWorld) -> SpriteId {
        match world.focus() {
            Some(player) => {
                world.teleport(player, self.layout.player_spawn);
                player
            }
            None => {
                let rect = Rect::from_center(self.layout.player_spawn, PLAYER_SIZE, PLAYER_SIZE);
                let hitbox = rect.inflated(-20.0, -28.0).translated(0.0, 10.0);
                let player = world.spawn(
                    &SpriteDesc::new("player", rect, DepthLayer::Main)
                        .with_hitbox(hitbox)
                        .moving(PLAYER_SPEED)
                        .collidable()
                        .persistent()
                        .with_color(PLAYER_COLOR),
                );
                world.teleport(player, self.layout.player_spawn);
                world.set_focus(Some(player));
                info!(sprite = player.0, "player_spawned");
                player
            }
        }
    }

    /// Faces the last walking direction; vertical input wins on diagonals.
    fn update_facing(&mut self, direction: Vec2) {
        if direction.x != 0.0 {
            self.facing = Vec2::new(direction.x.signum(), 0.0);
        }
        if direction.y != 0.0 {
            self.facing = Vec2::new(0.0, direction.y.signum());
        }
    }

    fn target_point(&self, world: &SpriteWorld, player: SpriteId) -> Option<Vec2> {
        let center = world.get(player)?.hitbox.center();
        Some(Vec2::new(
            center.x + self.facing.x * TOOL_REACH,
            center.y + self.facing.y * TOOL_REACH,
        ))
    }

    fn use_tool(&mut self, world: &mut SpriteWorld, player: SpriteId) {
        let Some(point) = self.target_point(world, player) else {
            return;
        };
        let applied = match self.tool {
            Tool::Axe => {
                let target = Rect::from_center(point, TOOL_TARGET_SIZE, TOOL_TARGET_SIZE);
                let chop = self.orchard.chop(world, target);
                let mut inventory = self.inventory.borrow_mut();
                if chop.apple {
                    inventory.apples = inventory.apples.saturating_add(1);
                }
                if chop.felled {
                    inventory.wood = inventory.wood.saturating_add(WOOD_PER_TREE);
                    drop(inventory);
                    self.emote(world, player, HAPPY_EMOTE);
                }
                chop != trees::Chop::default()
            }
            Tool::Hoe => self.soil.till(world, point),
            Tool::Water => self.soil.water(world, point),
        };
        debug!(tool = self.tool.name(), applied, "tool_used");
    }

    fn plant(&mut self, world: &mut SpriteWorld, player: SpriteId) {
        let Some(point) = self.target_point(world, player) else {
            return;
        };
        if self.inventory.borrow().seeds == 0 {
            self.emote(world, player, FAIL_EMOTE);
            return;
        }
        if self.soil.plant(world, point) {
            let mut inventory = self.inventory.borrow_mut();
            inventory.seeds -= 1;
            debug!(seeds = inventory.seeds, "seed_planted");
        }
    }

    fn interact(&mut self, world: &mut SpriteWorld, player: SpriteId) {
        let Some(reach) = world
            .get(player)
            .map(|sprite| sprite.hitbox.inflated(INTERACT_REACH, INTERACT_REACH))
        else {
            return;
        };
        let harvested = self.soil.harvest(world, reach);
        if harvested > 0 {
            let mut inventory = self.inventory.borrow_mut();
            inventory.crops = inventory.crops.saturating_add(harvested as u32);
            drop(inventory);
            self.emote(world, player, HAPPY_EMOTE);
        }
    }

    /// Short-lived bubble above the player.
    fn emote(&mut self, world: &mut SpriteWorld, player: SpriteId, color: [u8; 4]) {
        let Some(rect) = world.get(player).map(|sprite| sprite.rect) else {
            return;
        };
        let bubble = Rect::new(
            rect.center().x - EMOTE_SIZE * 0.5,
            rect.top() - EMOTE_SIZE,
            EMOTE_SIZE,
            EMOTE_SIZE,
        );
        self.emotes.spawn(
            world,
            &SpriteDesc::new("emote", bubble, DepthLayer::Emotes).with_color(color),
            EMOTE_SECONDS,
        );
    }

    fn advance_day_clock(&mut self, world: &mut SpriteWorld, dt_seconds: f32) {
        self.day_clock += dt_seconds;
        if self.day_clock < DAY_LENGTH_SECONDS {
            return;
        }
        self.day_clock -= DAY_LENGTH_SECONDS;
        self.day = self.day.saturating_add(1);
        let grown = self.soil.new_day(world);
        if self.rain.roll_for_day() {
            self.soil.water_all(world);
        }
        info!(
            day = self.day,
            map = self.kind.name(),
            grown,
            raining = self.rain.is_raining(),
            "new_day"
        );
    }
}

impl Scene for MapScene {
    fn load(&mut self, world: &mut SpriteWorld) {
        for desc in &self.layout.scenery {
            world.spawn(desc);
        }
        self.soil = SoilField::lay_out(world, &self.layout.crop_plots);
        self.orchard = Orchard::plant_all(world, &self.layout.trees, self.kind.seed());
        self.chickens = self
            .layout
            .chicken_spawns
            .iter()
            .enumerate()
            .map(|(index, spawn)| Chicken::spawn(world, *spawn, index * 3))
            .collect();
        self.place_player(world);
        self.paused = false;
        if self.rain.is_raining() {
            self.soil.water_all(world);
        }
        info!(
            map = self.kind.name(),
            sprite_count = world.sprite_count(),
            chickens = self.chickens.len(),
            trees = self.orchard.trees().len(),
            plots = self.soil.plots().len(),
            "map_loaded"
        );
    }

    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SpriteWorld,
    ) -> SceneCommand {
        let pressed = input.pressed();
        if pressed.reset {
            *self.inventory.borrow_mut() = Inventory::default();
            return SceneCommand::HardResetTo(SceneKey::A);
        }
        if pressed.switch_map {
            return SceneCommand::SwitchTo(self.switch_target);
        }
        if pressed.pause {
            self.paused = !self.paused;
            info!(paused = self.paused, "pause_toggled");
        }
        world.camera_mut().apply_zoom_steps(input.zoom_delta_steps());

        if self.paused {
            world.update_blocked(fixed_dt_seconds);
            return SceneCommand::None;
        }

        if pressed.next_tool {
            self.tool = self.tool.next();
            debug!(tool = self.tool.name(), "tool_selected");
        }
        if let Some(player) = world.focus() {
            let (x, y) = input.movement_direction();
            let direction = Vec2::new(x, y);
            self.update_facing(direction);
            world.set_direction(player, direction);
            if pressed.use_tool {
                self.use_tool(world, player);
            }
            if pressed.plant {
                self.plant(world, player);
            }
            if pressed.interact {
                self.interact(world, player);
            }
        }
        for chicken in &mut self.chickens {
            chicken.think(world, fixed_dt_seconds);
        }
        self.rain.update(world, fixed_dt_seconds);
        self.emotes.tick(world, fixed_dt_seconds);
        self.advance_day_clock(world, fixed_dt_seconds);

        world.update(fixed_dt_seconds);
        SceneCommand::None
    }

    fn unload(&mut self, _world: &mut SpriteWorld) {
        self.soil = SoilField::default();
        self.orchard = Orchard::empty(self.kind.seed());
        self.chickens.clear();
        self.rain.clear();
        self.emotes.clear();
    }

    fn debug_title(&self, world: &SpriteWorld) -> Option<String> {
        let inventory = self.inventory.borrow();
        let weather = if self.rain.is_raining() { " | rain" } else { "" };
        let paused = if self.paused { " | paused" } else { "" };
        Some(format!(
            "Farmstead | {} | day {} | {} | seeds {} crops {} wood {} apples {} | sprites {}{}{}",
            self.kind.name(),
            self.day,
            self.tool.name(),
            inventory.seeds,
            inventory.crops,
            inventory.wood,
            inventory.apples,
            world.sprite_count(),
            weather,
            paused
        ))
    }
}

pub(crate) fn build_scene_pair() -> (Box<dyn Scene>, Box<dyn Scene>) {
    let inventory = SharedInventory::default();
    let farm = MapScene::new(MapKind::Farm, SceneKey::B, Rc::clone(&inventory));
    let forest = MapScene::new(MapKind::Forest, SceneKey::A, inventory);
    (Box::new(farm), Box::new(forest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::{InputAction, PressedEdges, SpatialConfig};

    const DT: f32 = 1.0 / 60.0;

    fn scene(kind: MapKind) -> MapScene {
        MapScene::new(kind, SceneKey::B, SharedInventory::default())
    }

    fn loaded(kind: MapKind, world: &mut SpriteWorld) -> MapScene {
        let mut scene = scene(kind);
        scene.load(world);
        scene
    }

    fn pressed(edges: PressedEdges) -> InputSnapshot {
        InputSnapshot::empty().with_pressed(edges)
    }

    fn use_tool() -> InputSnapshot {
        pressed(PressedEdges {
            use_tool: true,
            ..PressedEdges::default()
        })
    }

    /// Stands the player so that its tool lands on the centre of `target`,
    /// facing down.
    fn stand_above(world: &mut SpriteWorld, scene: &mut MapScene, target: Vec2) {
        let player = world.focus().expect("player");
        world.teleport(player, Vec2::new(target.x, target.y - TOOL_REACH));
        scene.facing = Vec2::new(0.0, 1.0);
    }

    #[test]
    fn load_spawns_focused_persistent_player() {
        let mut world = SpriteWorld::new(&SpatialConfig::default());
        let scene = loaded(MapKind::Farm, &mut world);

        let player = world.focus().expect("player");
        assert!(world.render().is_persistent(player));
        assert_eq!(
            world.get(player).expect("player").hitbox.center(),
            scene.layout.player_spawn
        );
        assert_eq!(world.camera().position, scene.layout.player_spawn);
    }

    #[test]
    fn map_change_keeps_player_and_moves_it_to_the_new_spawn() {
        let mut world = SpriteWorld::new(&SpatialConfig::default());
        let mut farm = loaded(MapKind::Farm, &mut world);
        let player = world.focus().expect("player");

        farm.unload(&mut world);
        world.empty();
        let forest = loaded(MapKind::Forest, &mut world);

        assert_eq!(world.focus(), Some(player));
        let hitbox = world.get(player).expect("player").hitbox;
        assert_eq!(hitbox.center(), forest.layout.player_spawn);
        assert!(!world.check_collision(hitbox, Some(player)));
        let apples: usize = forest.orchard.trees().iter().map(|tree| tree.apples.len()).sum();
        assert_eq!(
            world.sprite_count(),
            forest.layout.scenery.len() + forest.layout.trees.len() + apples + 1,
            "only forest content and the player remain"
        );
    }

    #[test]
    fn walking_input_moves_the_player_and_turns_it() {
        let mut world = SpriteWorld::new(&SpatialConfig::default());
        let mut scene = loaded(MapKind::Forest, &mut world);
        let player = world.focus().expect("player");
        let start = world.get(player).expect("player").hitbox;

        let input = InputSnapshot::empty().with_action_down(InputAction::MoveRight, true);
        for _ in 0..30 {
            assert_eq!(scene.update(DT, &input, &mut world), SceneCommand::None);
        }

        let end = world.get(player).expect("player").hitbox;
        assert!((end.x - (start.x + PLAYER_SPEED * 0.5)).abs() < 0.01);
        assert_eq!(end.y, start.y);
        assert_eq!(scene.facing, Vec2::new(1.0, 0.0));

        scene.update_facing(Vec2::new(-1.0, -1.0));
        assert_eq!(scene.facing, Vec2::new(0.0, -1.0));
    }

    #[test]
    fn pause_freezes_movement() {
        let mut world = SpriteWorld::new(&SpatialConfig::default());
        let mut scene = loaded(MapKind::Forest, &mut world);
        let player = world.focus().expect("player");
        let start = world.get(player).expect("player").hitbox;

        let pause = pressed(PressedEdges {
            pause: true,
            ..PressedEdges::default()
        })
        .with_action_down(InputAction::MoveDown, true);
        scene.update(DT, &pause, &mut world);
        assert!(scene.paused);

        let walk = InputSnapshot::empty().with_action_down(InputAction::MoveDown, true);
        scene.update(DT, &walk, &mut world);
        assert_eq!(world.get(player).expect("player").hitbox, start);
    }

    #[test]
    fn edges_map_to_scene_commands_and_reset_clears_the_inventory() {
        let mut world = SpriteWorld::new(&SpatialConfig::default());
        let mut scene = loaded(MapKind::Farm, &mut world);
        scene.inventory.borrow_mut().wood = 12;

        let switch = pressed(PressedEdges {
            switch_map: true,
            ..PressedEdges::default()
        });
        assert_eq!(
            scene.update(DT, &switch, &mut world),
            SceneCommand::SwitchTo(SceneKey::B)
        );
        let reset = pressed(PressedEdges {
            reset: true,
            ..PressedEdges::default()
        });
        assert_eq!(
            scene.update(DT, &reset, &mut world),
            SceneCommand::HardResetTo(SceneKey::A)
        );
        assert_eq!(*scene.inventory.borrow(), Inventory::default());
    }

    #[test]
    fn hoe_water_and_seed_grow_a_crop_to_harvest() {
        let mut world = SpriteWorld::new(&SpatialConfig::default());
        let mut scene = loaded(MapKind::Farm, &mut world);
        let plot = scene.layout.crop_plots[0];
        stand_above(&mut world, &mut scene, plot.center());

        let next_tool = pressed(PressedEdges {
            next_tool: true,
            ..PressedEdges::default()
        });
        scene.update(DT, &next_tool, &mut world);
        assert_eq!(scene.tool, Tool::Hoe);
        scene.update(DT, &use_tool(), &mut world);
        assert!(scene.soil.plots()[0].tilled);

        let plant = pressed(PressedEdges {
            plant: true,
            ..PressedEdges::default()
        });
        scene.update(DT, &plant, &mut world);
        assert!(scene.soil.plots()[0].crop.is_some());
        assert_eq!(scene.inventory.borrow().seeds, STARTING_SEEDS - 1);

        scene.tool = Tool::Water;
        for _ in 0..3 {
            scene.update(DT, &use_tool(), &mut world);
            assert!(scene.soil.plots()[0].is_watered());
            scene.advance_day_clock(&mut world, DAY_LENGTH_SECONDS);
        }
        assert!(scene.soil.plots()[0].crop.as_ref().expect("crop").harvestable);

        let interact = pressed(PressedEdges {
            interact: true,
            ..PressedEdges::default()
        });
        scene.update(DT, &interact, &mut world);
        assert_eq!(scene.inventory.borrow().crops, 1);
        assert_eq!(scene.emotes.len(), 1);
        let emote = world
            .sprites()
            .iter()
            .find(|sprite| sprite.layer() == DepthLayer::Emotes)
            .expect("emote");
        assert_eq!(emote.color, HAPPY_EMOTE);
    }

    #[test]
    fn planting_without_seeds_only_shows_an_emote() {
        let mut world = SpriteWorld::new(&SpatialConfig::default());
        let mut scene = loaded(MapKind::Farm, &mut world);
        let plot = scene.layout.crop_plots[0];
        stand_above(&mut world, &mut scene, plot.center());
        scene.inventory.borrow_mut().seeds = 0;
        scene.tool = Tool::Hoe;
        scene.update(DT, &use_tool(), &mut world);

        let player = world.focus().expect("player");
        scene.plant(&mut world, player);
        assert!(scene.soil.plots()[0].crop.is_none());
        assert_eq!(scene.emotes.len(), 1);

        scene.update(EMOTE_SECONDS, &InputSnapshot::empty(), &mut world);
        assert_eq!(scene.emotes.len(), 0);
    }

    #[test]
    fn axe_fells_a_tree_into_wood() {
        let mut world = SpriteWorld::new(&SpatialConfig::default());
        let mut scene = loaded(MapKind::Farm, &mut world);
        let tree = scene.orchard.trees()[0].sprite;
        let trunk = world.get(tree).expect("tree").hitbox.center();
        stand_above(&mut world, &mut scene, trunk);
        let apples = scene.orchard.trees()[0].apples.len() as u32;

        for _ in 0..trees::TREE_HEALTH {
            scene.update(DT, &use_tool(), &mut world);
        }

        assert!(!scene.orchard.trees()[0].standing);
        let inventory = scene.inventory.borrow();
        assert_eq!(inventory.wood, WOOD_PER_TREE);
        assert_eq!(inventory.apples, apples.min(u32::from(trees::TREE_HEALTH)));
    }

    #[test]
    fn rainy_day_waters_tilled_soil_and_spawns_rain() {
        let mut world = SpriteWorld::new(&SpatialConfig::default());
        let mut scene = loaded(MapKind::Farm, &mut world);
        let plot = scene.layout.crop_plots[0];
        stand_above(&mut world, &mut scene, plot.center());
        scene.tool = Tool::Hoe;
        scene.update(DT, &use_tool(), &mut world);

        scene.rain.set_raining(true);
        scene.soil.water_all(&mut world);
        scene.update(DT, &InputSnapshot::empty(), &mut world);
        assert!(scene.soil.plots()[0].is_watered());
        assert_eq!(scene.rain.particle_count(), 2);
        assert!(scene.debug_title(&world).expect("title").contains("rain"));
    }

    #[test]
    fn inventory_is_shared_between_maps() {
        let inventory = SharedInventory::default();
        let farm = MapScene::new(MapKind::Farm, SceneKey::B, Rc::clone(&inventory));
        let forest = MapScene::new(MapKind::Forest, SceneKey::A, inventory);

        farm.inventory.borrow_mut().wood = 7;
        assert_eq!(forest.inventory.borrow().wood, 7);
    }

    #[test]
    fn zoom_input_changes_camera_zoom() {
        let mut world = SpriteWorld::new(&SpatialConfig::default());
        let mut scene = loaded(MapKind::Forest, &mut world);

        scene.update(DT, &InputSnapshot::empty().with_zoom_delta_steps(2), &mut world);
        assert!((world.camera().zoom - 1.2).abs() < 1e-5);
    }

    #[test]
    fn debug_title_reports_map_tool_and_pause() {
        let mut world = SpriteWorld::new(&SpatialConfig::default());
        let mut scene = loaded(MapKind::Farm, &mut world);
        scene.paused = true;

        let title = scene.debug_title(&world).expect("title");
        assert!(title.contains("farm"));
        assert!(title.contains("axe"));
        assert!(title.ends_with("paused"));
    }
}
