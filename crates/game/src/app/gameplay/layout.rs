use engine::{DepthLayer, Rect, SpriteDesc, Vec2};

pub(crate) const TILE_SIZE: f32 = 128.0;
const FENCE_LENGTH: f32 = 64.0;
const FENCE_THICKNESS: f32 = 32.0;

const GRASS_COLOR: [u8; 4] = [70, 120, 60, 255];
const FOREST_FLOOR_COLOR: [u8; 4] = [50, 84, 48, 255];
const SHORE_COLOR: [u8; 4] = [196, 180, 132, 255];
const FENCE_COLOR: [u8; 4] = [150, 110, 70, 255];
const TREE_COLOR: [u8; 4] = [36, 96, 44, 255];
const ROCK_COLOR: [u8; 4] = [128, 128, 136, 255];
const WATER_COLOR: [u8; 4] = [50, 90, 170, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MapKind {
    Farm,
    Forest,
}

impl MapKind {
    pub(crate) fn name(self) -> &'static str {
        match self {
            MapKind::Farm => "farm",
            MapKind::Forest => "forest",
        }
    }

    /// Fixed seed for the map's weather and apple dice.
    pub(crate) fn seed(self) -> u64 {
        match self {
            MapKind::Farm => 0x5eed_fa12,
            MapKind::Forest => 0x5eed_f0e5,
        }
    }
}

/// Static content of one map plus the spawn points of its moving sprites.
#[derive(Debug, Clone)]
pub(crate) struct MapLayout {
    /// Map bounds; the shore ring lies just outside.
    pub(crate) area: Rect,
    pub(crate) scenery: Vec<SpriteDesc>,
    pub(crate) trees: Vec<SpriteDesc>,
    pub(crate) player_spawn: Vec2,
    pub(crate) chicken_spawns: Vec<Vec2>,
    pub(crate) crop_plots: Vec<Rect>,
}

impl MapLayout {
    pub(crate) fn build(kind: MapKind) -> Self {
        match kind {
            MapKind::Farm => farm(),
            MapKind::Forest => forest(),
        }
    }
}

fn farm() -> MapLayout {
    let (cols, rows) = (16, 12);
    let mut scenery = ground(cols, rows, GRASS_COLOR);
    scenery.extend(shore_ring(cols, rows));
    scenery.extend(fence_ring(cols, rows));

    let mut crop_plots = Vec::new();
    for row in 0..3 {
        for col in 0..6 {
            crop_plots.push(Rect::new(
                4.0 * TILE_SIZE + col as f32 * 64.0,
                3.0 * TILE_SIZE + row as f32 * 64.0,
                64.0,
                64.0,
            ));
        }
    }

    let trees = [(200.0, 220.0), (1700.0, 260.0), (1650.0, 1150.0), (260.0, 1200.0)]
        .into_iter()
        .map(|(x, y)| tree(Vec2::new(x, y)))
        .collect();
    for (x, y) in [(1200.0, 500.0), (900.0, 1100.0)] {
        scenery.push(rock(Vec2::new(x, y)));
    }
    scenery.push(
        SpriteDesc::new("pond", Rect::new(1300.0, 800.0, 192.0, 128.0), DepthLayer::Water)
            .with_color(WATER_COLOR),
    );

    MapLayout {
        area: map_area(cols, rows),
        scenery,
        trees,
        player_spawn: Vec2::new(1024.0, 900.0),
        chicken_spawns: vec![
            Vec2::new(1400.0, 400.0),
            Vec2::new(1480.0, 460.0),
            Vec2::new(1360.0, 520.0),
        ],
        crop_plots,
    }
}

fn forest() -> MapLayout {
    let (cols, rows) = (14, 14);
    let mut scenery = ground(cols, rows, FOREST_FLOOR_COLOR);
    scenery.extend(shore_ring(cols, rows));
    scenery.extend(fence_ring(cols, rows));

    let mut trees = Vec::new();
    for row in 0..5 {
        for col in 0..5 {
            // Leave a clearing around the spawn point.
            if (1..=2).contains(&row) && (1..=2).contains(&col) {
                continue;
            }
            let jitter = ((row * 7 + col * 13) % 5) as f32 * 12.0;
            let center = Vec2::new(
                220.0 + col as f32 * 300.0 + jitter,
                240.0 + row as f32 * 300.0 - jitter,
            );
            trees.push(tree(center));
        }
    }
    for (x, y) in [(520.0, 900.0), (1100.0, 380.0), (1400.0, 1300.0)] {
        scenery.push(rock(Vec2::new(x, y)));
    }

    MapLayout {
        area: map_area(cols, rows),
        scenery,
        trees,
        player_spawn: Vec2::new(660.0, 680.0),
        chicken_spawns: Vec::new(),
        crop_plots: Vec::new(),
    }
}

fn map_area(cols: u32, rows: u32) -> Rect {
    Rect::new(0.0, 0.0, cols as f32 * TILE_SIZE, rows as f32 * TILE_SIZE)
}

/// One ring of sand tiles just outside the map edge.
fn shore_ring(cols: u32, rows: u32) -> Vec<SpriteDesc> {
    let (cols, rows) = (cols as i32, rows as i32);
    (-1..=rows)
        .flat_map(|row| (-1..=cols).map(move |col| (col, row)))
        .filter(|(col, row)| *col < 0 || *row < 0 || *col == cols || *row == rows)
        .map(|(col, row)| {
            let rect = Rect::new(
                col as f32 * TILE_SIZE,
                row as f32 * TILE_SIZE,
                TILE_SIZE,
                TILE_SIZE,
            );
            SpriteDesc::new("shore", rect, DepthLayer::Border).with_color(SHORE_COLOR)
        })
        .collect()
}

fn ground(cols: u32, rows: u32, color: [u8; 4]) -> Vec<SpriteDesc> {
    (0..rows)
        .flat_map(|row| (0..cols).map(move |col| (col, row)))
        .map(|(col, row)| {
            let rect = Rect::new(
                col as f32 * TILE_SIZE,
                row as f32 * TILE_SIZE,
                TILE_SIZE,
                TILE_SIZE,
            );
            let shade = if (col + row) % 2 == 0 { 0 } else { 6 };
            let tint = [
                color[0].saturating_add(shade),
                color[1].saturating_add(shade),
                color[2].saturating_add(shade),
                color[3],
            ];
            SpriteDesc::new("ground", rect, DepthLayer::Ground).with_color(tint)
        })
        .collect()
}

/// Collidable fence segments just inside the edge of a `cols` x `rows` map.
fn fence_ring(cols: u32, rows: u32) -> Vec<SpriteDesc> {
    let width = cols as f32 * TILE_SIZE;
    let height = rows as f32 * TILE_SIZE;
    let mut fences = Vec::new();

    let horizontal = (width / FENCE_LENGTH) as u32;
    for index in 0..horizontal {
        let x = index as f32 * FENCE_LENGTH;
        fences.push(fence(Rect::new(x, 0.0, FENCE_LENGTH, FENCE_THICKNESS)));
        fences.push(fence(Rect::new(
            x,
            height - FENCE_THICKNESS,
            FENCE_LENGTH,
            FENCE_THICKNESS,
        )));
    }
    let vertical = ((height - 2.0 * FENCE_THICKNESS) / FENCE_LENGTH).ceil() as u32;
    for index in 0..vertical {
        let y = FENCE_THICKNESS + index as f32 * FENCE_LENGTH;
        let length = FENCE_LENGTH.min(height - FENCE_THICKNESS - y);
        fences.push(fence(Rect::new(0.0, y, FENCE_THICKNESS, length)));
        fences.push(fence(Rect::new(
            width - FENCE_THICKNESS,
            y,
            FENCE_THICKNESS,
            length,
        )));
    }
    fences
}

fn fence(rect: Rect) -> SpriteDesc {
    SpriteDesc::new("fence", rect, DepthLayer::Main)
        .collidable()
        .with_color(FENCE_COLOR)
}

/// Trees are tall; only the trunk at the base blocks movement.
pub(crate) fn tree(base_center: Vec2) -> SpriteDesc {
    let rect = Rect::new(base_center.x - 48.0, base_center.y - 144.0, 96.0, 160.0);
    let hitbox = Rect::new(base_center.x - 20.0, base_center.y - 24.0, 40.0, 32.0);
    SpriteDesc::new("tree", rect, DepthLayer::Main)
        .with_hitbox(hitbox)
        .collidable()
        .with_color(TREE_COLOR)
}

fn rock(center: Vec2) -> SpriteDesc {
    let rect = Rect::from_center(center, 48.0, 40.0);
    SpriteDesc::new("rock", rect, DepthLayer::Main)
        .with_hitbox(rect.inflated(-8.0, -12.0).translated(0.0, 6.0))
        .collidable()
        .with_color(ROCK_COLOR)
}
