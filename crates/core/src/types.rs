use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    pub struct RoomId;
    pub struct StorageRoomId;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { y, x }
    }

    pub fn step(self, dir: Dir) -> Self {
        self.offset(dir, 1)
    }

    pub fn offset(self, dir: Dir, distance: i32) -> Self {
        let (dx, dy) = dir.delta();
        Self { y: self.y + dy * distance, x: self.x + dx * distance }
    }

    pub fn distance(self, other: Pos) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        (dx * dx + dy * dy).sqrt()
    }

    pub fn manhattan(self, other: Pos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub fn neighbors(self) -> [Pos; 4] {
        Dir::ALL.map(|dir| self.step(dir))
    }
}

/// Cardinal direction on the grid. `North` points toward increasing `y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Dir {
    East,
    West,
    North,
    South,
}

impl Dir {
    /// Fixed probe order used by every neighbour scan.
    pub const ALL: [Dir; 4] = [Dir::East, Dir::West, Dir::North, Dir::South];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Dir::East => (1, 0),
            Dir::West => (-1, 0),
            Dir::North => (0, 1),
            Dir::South => (0, -1),
        }
    }

    fn from_delta(dx: i32, dy: i32) -> Self {
        match (dx.signum(), dy.signum()) {
            (1, _) => Dir::East,
            (-1, _) => Dir::West,
            (_, 1) => Dir::North,
            _ => Dir::South,
        }
    }

    pub fn turn_left(self) -> Self {
        let (dx, dy) = self.delta();
        Self::from_delta(dy, -dx)
    }

    pub fn turn_right(self) -> Self {
        let (dx, dy) = self.delta();
        Self::from_delta(-dy, dx)
    }

    pub fn reverse(self) -> Self {
        let (dx, dy) = self.delta();
        Self::from_delta(-dx, -dy)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Hall,
    Room,
    PlayerStart,
    Exit,
    GenStart,
    Wall,
    StorageRoom,
}

impl Cell {
    /// Walkable, carved content: anything except `Empty` and `Wall`.
    pub fn is_live(self) -> bool {
        !matches!(self, Cell::Empty | Cell::Wall)
    }

    pub fn is_room_like(self) -> bool {
        matches!(self, Cell::Room | Cell::PlayerStart)
    }

    pub fn glyph(self) -> char {
        match self {
            Cell::Empty => ' ',
            Cell::Hall => '.',
            Cell::Room => 'o',
            Cell::PlayerStart => 'P',
            Cell::Exit => 'E',
            Cell::GenStart => 'G',
            Cell::Wall => '#',
            Cell::StorageRoom => 's',
        }
    }

    pub(crate) fn code(self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Hall => 1,
            Cell::Room => 2,
            Cell::PlayerStart => 3,
            Cell::Exit => 4,
            Cell::GenStart => 5,
            Cell::Wall => 6,
            Cell::StorageRoom => 7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turning_twice_in_the_same_direction_reverses() {
        for dir in Dir::ALL {
            assert_eq!(dir.turn_left().turn_left(), dir.reverse());
            assert_eq!(dir.turn_right().turn_right(), dir.reverse());
            assert_eq!(dir.turn_left().turn_right(), dir);
        }
    }

    #[test]
    fn turn_left_rotates_east_toward_negative_y() {
        assert_eq!(Dir::East.turn_left(), Dir::South);
        assert_eq!(Dir::East.turn_right(), Dir::North);
    }

    #[test]
    fn offset_scales_with_distance() {
        let origin = Pos::new(10, 10);
        assert_eq!(origin.offset(Dir::West, 3), Pos::new(7, 10));
        assert_eq!(origin.offset(Dir::North, 2), Pos::new(10, 12));
        assert_eq!(origin.manhattan(Pos::new(7, 12)), 5);
    }

    #[test]
    fn only_empty_and_wall_are_not_live() {
        assert!(!Cell::Empty.is_live());
        assert!(!Cell::Wall.is_live());
        assert!(Cell::StorageRoom.is_live());
        assert!(Cell::GenStart.is_live());
    }
}
