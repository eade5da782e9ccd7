//! Cell storage, carving bounds, and reachability over the level grid.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::rect::Rect;
use crate::types::{Cell, Pos};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: i32,
    height: i32,
    margin: i32,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(width: i32, height: i32, margin: i32) -> Self {
        let len = (width.max(0) as usize) * (height.max(0) as usize);
        Self { width, height, margin, cells: vec![Cell::Empty; len] }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn margin(&self) -> i32 {
        self.margin
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Inside the backing array.
    pub fn contains(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    /// Inside the carvable interior (at least `margin` away from every edge).
    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= self.margin
            && pos.x < self.width - self.margin
            && pos.y >= self.margin
            && pos.y < self.height - self.margin
    }

    pub fn rect_in_bounds(&self, rect: Rect) -> bool {
        self.in_bounds(rect.min_corner()) && self.in_bounds(rect.max_corner())
    }

    /// Cells outside the array read as `Empty`.
    pub fn get(&self, pos: Pos) -> Cell {
        if self.contains(pos) { self.cells[self.index(pos)] } else { Cell::Empty }
    }

    pub fn is(&self, pos: Pos, cell: Cell) -> bool {
        self.get(pos) == cell
    }

    /// Ignored outside the array.
    pub(crate) fn set(&mut self, pos: Pos, cell: Cell) {
        if self.contains(pos) {
            let index = self.index(pos);
            self.cells[index] = cell;
        }
    }

    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().filter(|&&candidate| candidate == cell).count()
    }

    /// Every array position, column by column.
    pub fn positions(&self) -> impl Iterator<Item = Pos> + use<> {
        Rect::new(0, 0, self.width, self.height).cells()
    }

    /// Every carvable position, column by column.
    pub fn interior_positions(&self) -> impl Iterator<Item = Pos> + use<> {
        Rect::new(
            self.margin,
            self.margin,
            self.width - 2 * self.margin,
            self.height - 2 * self.margin,
        )
        .cells()
    }

    /// True when every array cell of `rect` grown by `buffer` is `Empty`, except `allowed`.
    pub(crate) fn rect_area_clear(&self, rect: Rect, buffer: i32, allowed: Pos) -> bool {
        rect.expanded(buffer)
            .cells()
            .filter(|&pos| pos != allowed && self.contains(pos))
            .all(|pos| self.get(pos) == Cell::Empty)
    }

    /// Steps from `from` toward `to`, x first, turning `Empty` interior cells into `Hall`.
    pub(crate) fn carve_connector(&mut self, from: Pos, to: Pos) {
        let mut current = from;
        while current != to {
            if current.x != to.x {
                current.x += (to.x - current.x).signum();
            } else {
                current.y += (to.y - current.y).signum();
            }
            if self.in_bounds(current) && self.get(current) == Cell::Empty {
                self.set(current, Cell::Hall);
            }
        }
    }

    pub(crate) fn fill(&mut self, rect: Rect, cell: Cell) {
        for pos in rect.cells() {
            self.set(pos, cell);
        }
    }

    /// Flags every live cell 4-connected to `start` through live cells not in `blocked`.
    pub(crate) fn reachable_from(&self, start: Pos, blocked: &[Pos]) -> Vec<bool> {
        let mut seen = vec![false; self.cells.len()];
        let passable = |pos: Pos| {
            self.contains(pos) && self.get(pos).is_live() && !blocked.contains(&pos)
        };
        if !passable(start) {
            return seen;
        }

        seen[self.index(start)] = true;
        let mut open = VecDeque::from([start]);
        while let Some(pos) = open.pop_front() {
            for next in pos.neighbors() {
                if !passable(next) || seen[self.index(next)] {
                    continue;
                }
                seen[self.index(next)] = true;
                open.push_back(next);
            }
        }
        seen
    }

    /// Live cells that `start` cannot reach once `blocked` is walled off.
    pub(crate) fn cut_off_cells(&self, start: Pos, blocked: &[Pos]) -> Vec<Pos> {
        let seen = self.reachable_from(start, blocked);
        self.positions()
            .filter(|&pos| {
                self.get(pos).is_live() && !blocked.contains(&pos) && !seen[self.index(pos)]
            })
            .collect()
    }

    pub fn render_ascii(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() + self.height.max(0) as usize);
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                out.push(self.get(Pos::new(x, y)).glyph());
            }
            out.push('\n');
        }
        out
    }

    fn index(&self, pos: Pos) -> usize {
        (pos.y as usize) * (self.width as usize) + (pos.x as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn margin_cells_are_out_of_bounds_but_readable() {
        let grid = Grid::new(20, 10, 2);
        assert!(grid.contains(Pos::new(0, 0)));
        assert!(!grid.in_bounds(Pos::new(1, 5)));
        assert!(grid.in_bounds(Pos::new(2, 2)));
        assert!(!grid.in_bounds(Pos::new(18, 5)));
        assert_eq!(grid.get(Pos::new(-3, 40)), Cell::Empty);
        assert_eq!(grid.interior_positions().count(), 16 * 6);
    }

    #[test]
    fn connector_walks_x_then_y_without_overwriting() {
        let mut grid = Grid::new(20, 20, 1);
        grid.set(Pos::new(5, 5), Cell::GenStart);
        grid.set(Pos::new(8, 5), Cell::Room);
        grid.carve_connector(Pos::new(5, 5), Pos::new(10, 8));

        assert_eq!(grid.get(Pos::new(7, 5)), Cell::Hall);
        assert_eq!(grid.get(Pos::new(8, 5)), Cell::Room);
        assert_eq!(grid.get(Pos::new(10, 5)), Cell::Hall);
        assert_eq!(grid.get(Pos::new(10, 8)), Cell::Hall);
        assert_eq!(grid.get(Pos::new(5, 6)), Cell::Empty);
    }

    #[test]
    fn area_clear_check_exempts_the_allowed_cell() {
        let mut grid = Grid::new(30, 30, 2);
        grid.set(Pos::new(9, 12), Cell::Hall);
        let rect = Rect::new(10, 10, 4, 4);
        assert!(grid.rect_area_clear(rect, 1, Pos::new(9, 12)));
        assert!(!grid.rect_area_clear(rect, 1, Pos::new(0, 0)));
        assert!(grid.rect_area_clear(rect, 0, Pos::new(0, 0)));
    }

    #[test]
    fn blocking_a_bridge_cuts_off_the_far_side() {
        let mut grid = Grid::new(12, 5, 0);
        for x in 0..10 {
            grid.set(Pos::new(x, 2), Cell::Hall);
        }
        grid.set(Pos::new(0, 2), Cell::GenStart);

        let cut = grid.cut_off_cells(Pos::new(0, 2), &[Pos::new(4, 2)]);
        assert_eq!(cut.len(), 5);
        assert!(cut.contains(&Pos::new(9, 2)));
        assert!(grid.cut_off_cells(Pos::new(0, 2), &[]).is_empty());
    }

    #[test]
    fn ascii_rendering_has_one_line_per_row() {
        let mut grid = Grid::new(3, 2, 0);
        grid.set(Pos::new(1, 1), Cell::GenStart);
        assert_eq!(grid.render_ascii(), " G \n   \n");
    }
}
