use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit vector in the same direction, or zero for a zero-length input.
    pub fn normalized_or_zero(self) -> Self {
        let length = self.length();
        if length <= f32::EPSILON || !length.is_finite() {
            return Self::ZERO;
        }
        Self {
            x: self.x / length,
            y: self.y / length,
        }
    }

    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

/// Axis-aligned rectangle in screen space: `y` grows downward, `(x, y)` is
/// the top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_center(center: Vec2, w: f32, h: f32) -> Self {
        Self {
            x: center.x - w * 0.5,
            y: center.y - h * 0.5,
            w,
            h,
        }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn top_left(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    pub fn set_left(&mut self, left: f32) {
        self.x = left;
    }

    pub fn set_right(&mut self, right: f32) {
        self.x = right - self.w;
    }

    pub fn set_top(&mut self, top: f32) {
        self.y = top;
    }

    pub fn set_bottom(&mut self, bottom: f32) {
        self.y = bottom - self.h;
    }

    pub fn set_center(&mut self, center: Vec2) {
        self.x = center.x - self.w * 0.5;
        self.y = center.y - self.h * 0.5;
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }

    pub fn translated(mut self, dx: f32, dy: f32) -> Self {
        self.translate(dx, dy);
        self
    }

    /// Grows (or shrinks, for negative values) the rectangle around its centre.
    pub fn inflated(&self, dw: f32, dh: f32) -> Self {
        let w = (self.w + dw).max(0.0);
        let h = (self.h + dh).max(0.0);
        Self::from_center(self.center(), w, h)
    }

    pub fn has_area(&self) -> bool {
        self.w > 0.0 && self.h > 0.0
    }

    /// Interior intersection; rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.has_area()
            && other.has_area()
            && self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Half-open containment: the left and top edges are inside, the right
    /// and bottom edges are not.
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.left()
            && point.x < self.right()
            && point.y >= self.top()
            && point.y < self.bottom()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    pub x: i32,
    pub y: i32,
}

impl CellCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Cell holding `point` for cells of `cell_size`; floors so that points
    /// left of or above the origin land in negative cells.
    pub fn containing(point: Vec2, cell_size: Vec2) -> Self {
        Self {
            x: (point.x / cell_size.x).floor() as i32,
            y: (point.y / cell_size.y).floor() as i32,
        }
    }

    /// The 3x3 block around this cell, rows top to bottom, columns left to right.
    pub fn neighborhood(self) -> impl Iterator<Item = CellCoord> {
        (-1..=1).flat_map(move |dy| {
            (-1..=1).map(move |dx| CellCoord::new(self.x + dx, self.y + dy))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_setters_move_without_resizing() {
        let mut rect = Rect::new(10.0, 20.0, 32.0, 16.0);
        rect.set_right(40.0);
        assert_eq!(rect.x, 8.0);
        rect.set_bottom(100.0);
        assert_eq!(rect.y, 84.0);
        rect.set_left(-4.0);
        rect.set_top(2.0);
        assert_eq!(rect, Rect::new(-4.0, 2.0, 32.0, 16.0));
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 32.0, 32.0);
        let b = Rect::new(32.0, 0.0, 32.0, 32.0);
        let c = Rect::new(31.5, 31.5, 4.0, 4.0);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&a));
    }

    #[test]
    fn zero_area_rect_never_overlaps() {
        let a = Rect::new(0.0, 0.0, 32.0, 32.0);
        let flat = Rect::new(4.0, 4.0, 0.0, 10.0);
        assert!(!a.overlaps(&flat));
        assert!(!flat.overlaps(&a));
    }

    #[test]
    fn contains_point_is_half_open() {
        let rect = Rect::new(0.0, 0.0, 64.0, 64.0);
        assert!(rect.contains_point(Vec2::new(0.0, 0.0)));
        assert!(rect.contains_point(Vec2::new(63.5, 10.0)));
        assert!(!rect.contains_point(Vec2::new(64.0, 10.0)));
        assert!(!rect.contains_point(Vec2::new(10.0, 64.0)));
    }

    #[test]
    fn inflate_keeps_center() {
        let rect = Rect::new(0.0, 0.0, 64.0, 40.0);
        let inset = rect.inflated(-26.0, -16.0);
        assert_eq!(inset.center(), rect.center());
        assert_eq!(inset.w, 38.0);
        assert_eq!(inset.h, 24.0);
    }

    #[test]
    fn cell_coord_floors_negative_positions() {
        let size = Vec2::new(192.0, 192.0);
        let cases = [
            (Vec2::new(190.0, 190.0), CellCoord::new(0, 0)),
            (Vec2::new(200.0, 190.0), CellCoord::new(1, 0)),
            (Vec2::new(-0.5, -192.0), CellCoord::new(-1, -1)),
            (Vec2::new(-192.5, 0.0), CellCoord::new(-2, 0)),
        ];
        for (point, expected) in cases {
            assert_eq!(CellCoord::containing(point, size), expected, "point={point:?}");
        }
    }

    #[test]
    fn neighborhood_is_row_major_three_by_three() {
        let cells: Vec<_> = CellCoord::new(4, -2).neighborhood().collect();
        assert_eq!(cells.len(), 9);
        assert_eq!(cells[0], CellCoord::new(3, -3));
        assert_eq!(cells[1], CellCoord::new(4, -3));
        assert_eq!(cells[4], CellCoord::new(4, -2));
        assert_eq!(cells[8], CellCoord::new(5, -1));
    }
}
