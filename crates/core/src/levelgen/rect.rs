//! Axis-aligned integer rectangles for rooms and the spawn area.

use serde::{Deserialize, Serialize};

use crate::types::Pos;

/// Half-open on both axes: covers `x..x + width` and `y..y + height`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle of the given size whose centre cell (rounded toward the min corner) is `centre`.
    pub fn centered_on(centre: Pos, width: i32, height: i32) -> Self {
        Self::new(centre.x - width / 2, centre.y - height / 2, width, height)
    }

    pub fn x_max(self) -> i32 {
        self.x + self.width
    }

    pub fn y_max(self) -> i32 {
        self.y + self.height
    }

    pub fn min_corner(self) -> Pos {
        Pos::new(self.x, self.y)
    }

    pub fn max_corner(self) -> Pos {
        Pos::new(self.x_max() - 1, self.y_max() - 1)
    }

    pub fn center(self) -> Pos {
        Pos::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn area(self) -> usize {
        (self.width.max(0) as usize) * (self.height.max(0) as usize)
    }

    pub fn contains(self, pos: Pos) -> bool {
        pos.x >= self.x && pos.x < self.x_max() && pos.y >= self.y && pos.y < self.y_max()
    }

    pub fn is_on_edge(self, pos: Pos) -> bool {
        self.contains(pos)
            && (pos.x == self.x
                || pos.x == self.x_max() - 1
                || pos.y == self.y
                || pos.y == self.y_max() - 1)
    }

    pub fn expanded(self, margin: i32) -> Self {
        Self::new(
            self.x - margin,
            self.y - margin,
            self.width + 2 * margin,
            self.height + 2 * margin,
        )
    }

    pub fn intersects(self, other: &Self) -> bool {
        self.x < other.x_max()
            && other.x < self.x_max()
            && self.y < other.y_max()
            && other.y < self.y_max()
    }

    pub fn clamp(self, pos: Pos) -> Pos {
        Pos::new(pos.x.clamp(self.x, self.x_max() - 1), pos.y.clamp(self.y, self.y_max() - 1))
    }

    /// Every cell, column by column.
    pub fn cells(self) -> impl Iterator<Item = Pos> {
        (self.x..self.x_max())
            .flat_map(move |x| (self.y..self.y_max()).map(move |y| Pos::new(x, y)))
    }

    pub fn perimeter(self) -> impl Iterator<Item = Pos> {
        self.cells().filter(move |&pos| self.is_on_edge(pos))
    }
}
