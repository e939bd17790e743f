use tracing::info;

use crate::config::SpatialConfig;
use crate::world::SpriteWorld;

use super::input::InputSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneKey {
    A,
    B,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    /// Map change: persistent sprites carry over into the next scene.
    SwitchTo(SceneKey),
    /// Full reset: every sprite is dropped before the next scene loads.
    HardResetTo(SceneKey),
}

/// One map of the game. All scenes share a single [`SpriteWorld`]; a scene
/// populates it on `load` and drives it from `update`.
pub trait Scene {
    fn load(&mut self, world: &mut SpriteWorld);
    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SpriteWorld,
    ) -> SceneCommand;
    fn unload(&mut self, _world: &mut SpriteWorld) {}
    fn debug_title(&self, _world: &SpriteWorld) -> Option<String> {
        None
    }
}

pub(crate) struct SceneMachine {
    scene_a: Box<dyn Scene>,
    scene_b: Box<dyn Scene>,
    world: SpriteWorld,
    active_scene: SceneKey,
    is_loaded: bool,
}

impl SceneMachine {
    pub(crate) fn new(
        scene_a: Box<dyn Scene>,
        scene_b: Box<dyn Scene>,
        active_scene: SceneKey,
        spatial: &SpatialConfig,
    ) -> Self {
        Self {
            scene_a,
            scene_b,
            world: SpriteWorld::new(spatial),
            active_scene,
            is_loaded: false,
        }
    }

    pub(crate) fn active_scene(&self) -> SceneKey {
        self.active_scene
    }

    pub(crate) fn world(&self) -> &SpriteWorld {
        &self.world
    }

    pub(crate) fn world_mut(&mut self) -> &mut SpriteWorld {
        &mut self.world
    }

    pub(crate) fn load_active(&mut self) {
        if self.is_loaded {
            return;
        }
        let key = self.active_scene;
        let (scene, world) = self.scene_and_world(key);
        scene.load(world);
        self.is_loaded = true;
    }

    pub(crate) fn update_active(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
    ) -> SceneCommand {
        let key = self.active_scene;
        let (scene, world) = self.scene_and_world(key);
        scene.update(fixed_dt_seconds, input, world)
    }

    pub(crate) fn apply_command(&mut self, command: SceneCommand) -> bool {
        match command {
            SceneCommand::SwitchTo(next_scene) => self.switch_to(next_scene),
            SceneCommand::HardResetTo(next_scene) => self.hard_reset_to(next_scene),
            SceneCommand::None => false,
        }
    }

    pub(crate) fn debug_title_active(&self) -> Option<String> {
        let scene = match self.active_scene {
            SceneKey::A => &self.scene_a,
            SceneKey::B => &self.scene_b,
        };
        scene.debug_title(&self.world)
    }

    /// Leaves the active map for `next_scene`. Non-persistent sprites are
    /// dropped; persistent ones (the player) stay in the world.
    pub(crate) fn switch_to(&mut self, next_scene: SceneKey) -> bool {
        if self.active_scene == next_scene {
            return false;
        }
        self.unload_active();
        let dropped = self.world.empty();
        self.active_scene = next_scene;
        self.load_active();
        info!(
            scene = ?next_scene,
            dropped,
            sprite_count = self.world.sprite_count(),
            "map_changed"
        );
        true
    }

    pub(crate) fn hard_reset_to(&mut self, next_scene: SceneKey) -> bool {
        self.unload_active();
        let dropped = self.world.empty_including_persistent();
        let changed = self.active_scene != next_scene;
        self.active_scene = next_scene;
        self.load_active();
        info!(
            scene = ?next_scene,
            dropped,
            sprite_count = self.world.sprite_count(),
            "world_reset"
        );
        changed
    }

    pub(crate) fn shutdown(&mut self) {
        self.unload_active();
        self.world.empty_including_persistent();
    }

    fn unload_active(&mut self) {
        if !self.is_loaded {
            return;
        }
        let key = self.active_scene;
        let (scene, world) = self.scene_and_world(key);
        scene.unload(world);
        self.is_loaded = false;
    }

    fn scene_and_world(&mut self, key: SceneKey) -> (&mut Box<dyn Scene>, &mut SpriteWorld) {
        let scene = match key {
            SceneKey::A => &mut self.scene_a,
            SceneKey::B => &mut self.scene_b,
        };
        (scene, &mut self.world)
    }
}
