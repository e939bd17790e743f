use crate::geometry::CellCoord;
use crate::sprite::SpriteId;

/// Fixed-size bucket of sprite ids at one grid coordinate.
///
/// Alongside the full member list a cell tracks the persistent subset (kept by
/// [`Cell::clear`]) and the moving subset, which is the only part scanned by
/// the migration check. Static scenery never leaves its cell, so the per-frame
/// scan stays proportional to the number of moving sprites.
#[derive(Debug, Clone)]
pub struct Cell {
    coord: CellCoord,
    members: Vec<SpriteId>,
    persistent: Vec<SpriteId>,
    moving: Vec<SpriteId>,
}

impl Cell {
    pub fn new(coord: CellCoord) -> Self {
        Self {
            coord,
            members: Vec::new(),
            persistent: Vec::new(),
            moving: Vec::new(),
        }
    }

    pub fn coord(&self) -> CellCoord {
        self.coord
    }

    pub fn add(&mut self, id: SpriteId, movable: bool) {
        if self.members.contains(&id) {
            return;
        }
        if movable {
            self.moving.push(id);
        }
        self.members.push(id);
    }

    pub fn add_persistent(&mut self, id: SpriteId, movable: bool) {
        self.add(id, movable);
        if !self.persistent.contains(&id) {
            self.persistent.push(id);
        }
    }

    /// Returns whether the removed sprite was persistent, so the owning grid
    /// can re-home it as persistent instead of dropping the flag.
    pub fn remove(&mut self, id: SpriteId) -> bool {
        remove_id(&mut self.members, id);
        remove_id(&mut self.moving, id);
        remove_id(&mut self.persistent, id)
    }

    pub fn contains(&self, id: SpriteId) -> bool {
        self.members.contains(&id)
    }

    pub fn is_persistent(&self, id: SpriteId) -> bool {
        self.persistent.contains(&id)
    }

    pub fn is_moving(&self, id: SpriteId) -> bool {
        self.moving.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = SpriteId> + '_ {
        self.members.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Migration check. Reports every moving member whose current coordinate
    /// (as computed by `coord_of`) is no longer this cell's; a `None`
    /// coordinate means the sprite no longer exists and is reported as well.
    pub fn update<C, E>(&self, mut coord_of: C, mut on_exit: E)
    where
        C: FnMut(SpriteId) -> Option<CellCoord>,
        E: FnMut(SpriteId),
    {
        for &id in &self.moving {
            if coord_of(id) != Some(self.coord) {
                on_exit(id);
            }
        }
    }

    /// Drops every non-persistent member; returns the dropped ids.
    pub fn clear(&mut self) -> Vec<SpriteId> {
        let persistent = &self.persistent;
        let (kept, dropped): (Vec<_>, Vec<_>) =
            self.members.iter().copied().partition(|id| persistent.contains(id));
        self.moving.retain(|id| persistent.contains(id));
        self.members = kept;
        dropped
    }

    /// Drops every member, persistent ones included; returns the dropped ids.
    pub fn clear_including_persistent(&mut self) -> Vec<SpriteId> {
        self.persistent.clear();
        self.moving.clear();
        std::mem::take(&mut self.members)
    }
}

fn remove_id(list: &mut Vec<SpriteId>, id: SpriteId) -> bool {
    match list.iter().position(|member| *member == id) {
        Some(index) => {
            list.remove(index);
            true
        }
        None => false,
    }
}
