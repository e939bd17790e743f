use engine::{DepthLayer, Rect, SpriteDesc, SpriteId, SpriteWorld};
use fastrand::Rng;
use tracing::{debug, info};

pub(crate) const TREE_HEALTH: u8 = 5;
pub(crate) const WOOD_PER_TREE: u32 = 5;

/// Apple spots relative to the top-left of a tree's rect.
const APPLE_SPOTS: [(f32, f32); 6] = [
    (12.0, 12.0),
    (46.0, 10.0),
    (40.0, 34.0),
    (3.0, 42.0),
    (65.0, 55.0),
    (32.0, 59.0),
];
/// An apple grows on a spot when a roll of `0..=10` lands below this.
const APPLE_THRESHOLD: u32 = 6;
const APPLE_SIZE: f32 = 12.0;
const APPLE_COLOR: [u8; 4] = [200, 40, 40, 255];

const STUMP_SIZE: (f32, f32) = (64.0, 40.0);
const STUMP_COLOR: [u8; 4] = [112, 80, 52, 255];

/// What one axe swing did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Chop {
    pub(crate) apple: bool,
    pub(crate) felled: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct Tree {
    pub(crate) sprite: SpriteId,
    pub(crate) apples: Vec<SpriteId>,
    pub(crate) health: u8,
    pub(crate) standing: bool,
}

impl Tree {
    fn spawn(world: &mut SpriteWorld, desc: &SpriteDesc, rng: &mut Rng) -> Self {
        let sprite = world.spawn(desc);
        let apples = APPLE_SPOTS
            .iter()
            .filter(|_| rng.u32(0..=10) < APPLE_THRESHOLD)
            .map(|(x, y)| {
                let rect = Rect::new(desc.rect.x + x, desc.rect.y + y, APPLE_SIZE, APPLE_SIZE);
                world.spawn(
                    &SpriteDesc::new("apple", rect, DepthLayer::Upper).with_color(APPLE_COLOR),
                )
            })
            .collect();
        Self {
            sprite,
            apples,
            health: TREE_HEALTH,
            standing: true,
        }
    }

    /// One axe hit: knocks a random apple off and fells the tree when its
    /// health runs out. Stumps ignore further hits.
    fn hit(&mut self, world: &mut SpriteWorld, rng: &mut Rng) -> Chop {
        if !self.standing {
            return Chop::default();
        }
        let mut chop = Chop::default();
        self.health = self.health.saturating_sub(1);
        if !self.apples.is_empty() {
            let apple = self.apples.swap_remove(rng.usize(..self.apples.len()));
            world.despawn(apple);
            chop.apple = true;
        }
        if self.health == 0 {
            self.fell(world);
            chop.felled = true;
        }
        chop
    }

    /// Swaps the tree for a stump standing on the same base.
    fn fell(&mut self, world: &mut SpriteWorld) {
        self.standing = false;
        let Some(tree) = world.get(self.sprite).map(|sprite| sprite.rect) else {
            return;
        };
        let (w, h) = STUMP_SIZE;
        let stump = Rect::new(tree.center().x - w * 0.5, tree.bottom() - h, w, h);
        world.reshape(self.sprite, stump, stump.inflated(-10.0, -h * 0.6));
        world.set_color(self.sprite, STUMP_COLOR);
    }
}

/// Every tree on the current map plus the dice that decide its apples.
#[derive(Debug)]
pub(crate) struct Orchard {
    trees: Vec<Tree>,
    rng: Rng,
}

impl Orchard {
    pub(crate) fn plant_all(world: &mut SpriteWorld, trees: &[SpriteDesc], seed: u64) -> Self {
        let mut rng = Rng::with_seed(seed);
        let trees = trees
            .iter()
            .map(|desc| Tree::spawn(world, desc, &mut rng))
            .collect::<Vec<_>>();
        debug!(count = trees.len(), "trees_planted");
        Self { trees, rng }
    }

    pub(crate) fn empty(seed: u64) -> Self {
        Self {
            trees: Vec::new(),
            rng: Rng::with_seed(seed),
        }
    }

    pub(crate) fn trees(&self) -> &[Tree] {
        &self.trees
    }

    /// Hits the first standing tree whose hitbox overlaps `target`.
    pub(crate) fn chop(&mut self, world: &mut SpriteWorld, target: Rect) -> Chop {
        let Some(tree) = self.trees.iter_mut().find(|tree| {
            tree.standing
                && world
                    .get(tree.sprite)
                    .is_some_and(|sprite| sprite.hitbox.overlaps(&target))
        }) else {
            return Chop::default();
        };
        let chop = tree.hit(world, &mut self.rng);
        if chop.felled {
            info!(sprite = tree.sprite.0, "tree_felled");
        }
        chop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::{CellCoord, SpatialConfig, Vec2};

    fn tree_desc() -> SpriteDesc {
        let rect = Rect::new(0.0, 0.0, 96.0, 160.0);
        SpriteDesc::new("tree", rect, DepthLayer::Main)
            .with_hitbox(Rect::new(28.0, 136.0, 40.0, 32.0))
            .collidable()
    }

    fn orchard(world: &mut SpriteWorld) -> Orchard {
        Orchard::plant_all(world, &[tree_desc()], 42)
    }

    fn trunk() -> Rect {
        Rect::from_center(Vec2::new(48.0, 150.0), 16.0, 16.0)
    }

    #[test]
    fn apples_grow_on_the_upper_layer_inside_the_canopy() {
        let mut world = SpriteWorld::new(&SpatialConfig::default());
        let orchard = Orchard::plant_all(&mut world, &[(); 8].map(|_| tree_desc()), 5);

        let apples: Vec<_> = orchard
            .trees()
            .iter()
            .flat_map(|tree| tree.apples.iter())
            .collect();
        assert!(!apples.is_empty());
        assert!(apples.len() < 8 * APPLE_SPOTS.len());
        for apple in apples {
            let sprite = world.get(*apple).expect("apple");
            assert_eq!(sprite.layer(), DepthLayer::Upper);
            assert!(tree_desc().rect.contains_point(sprite.rect.top_left()));
            assert!(!world.collisions().contains(*apple));
        }
    }

    #[test]
    fn each_hit_knocks_off_an_apple_until_none_are_left() {
        let mut world = SpriteWorld::new(&SpatialConfig::default());
        let mut orchard = orchard(&mut world);
        let apples = orchard.trees()[0].apples.clone();

        for hit in 0..TREE_HEALTH as usize - 1 {
            let chop = orchard.chop(&mut world, trunk());
            assert_eq!(chop.apple, hit < apples.len());
            assert!(!chop.felled);
        }
        let remaining = orchard.trees()[0].apples.len();
        assert_eq!(remaining, apples.len().saturating_sub(TREE_HEALTH as usize - 1));
        let gone = apples.iter().filter(|apple| world.get(**apple).is_none()).count();
        assert_eq!(gone, apples.len() - remaining);
    }

    #[test]
    fn felled_tree_becomes_a_stump_on_the_same_base() {
        let mut world = SpriteWorld::new(&SpatialConfig::default());
        let mut orchard = orchard(&mut world);
        let sprite = orchard.trees()[0].sprite;

        let chops: Vec<_> = (0..TREE_HEALTH)
            .map(|_| orchard.chop(&mut world, trunk()))
            .collect();
        assert!(chops.last().expect("chop").felled);
        assert!(!orchard.trees()[0].standing);

        let stump = world.get(sprite).expect("stump");
        assert_eq!(stump.rect, Rect::new(16.0, 120.0, 64.0, 40.0));
        assert_eq!(stump.hitbox, Rect::new(21.0, 132.0, 54.0, 16.0));
        assert_eq!(stump.color, STUMP_COLOR);
        assert_eq!(world.collisions().location(sprite), Some(CellCoord::new(0, 1)));
        assert!(world.check_collision(stump.hitbox, None));

        assert_eq!(orchard.chop(&mut world, trunk()), Chop::default());
    }

    #[test]
    fn swings_that_miss_every_trunk_do_nothing() {
        let mut world = SpriteWorld::new(&SpatialConfig::default());
        let mut orchard = orchard(&mut world);

        let canopy = Rect::new(10.0, 10.0, 16.0, 16.0);
        assert_eq!(orchard.chop(&mut world, canopy), Chop::default());
        assert_eq!(orchard.trees()[0].health, TREE_HEALTH);
    }
}
