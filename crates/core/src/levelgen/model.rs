//! Public data models for generated levels and their metadata.

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use super::grid::Grid;
use super::rect::Rect;
use crate::types::{Cell, Dir, Pos};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: u32,
    pub code: String,
    pub rect: Rect,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageRoom {
    pub id: u32,
    pub code: String,
    pub cell: Pos,
    /// The single adjacent cell this storage room opens onto.
    pub doorway: Pos,
    pub connects_to_hallway: bool,
}

/// A room or spawn-room opening and the live cells outside it that it connects to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doorway {
    pub cell: Pos,
    pub connections: Vec<Pos>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: Pos,
    pub to: Pos,
}

/// Edge where a cell of room `code` meets a cell of room `other_code`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSeparator {
    pub code: String,
    pub other_code: String,
    pub edge: Edge,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropPoint {
    pub code: String,
    pub cell: Pos,
    /// Side wall the drop point is mounted on.
    pub wall_dir: Dir,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Per-stage counters for one successful attempt.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub steps_used: usize,
    pub dead_ends: usize,
    pub organic_rooms: usize,
    pub top_up_rooms: usize,
    pub storage_created: usize,
    pub storage_converted: usize,
    pub storage_pruned: usize,
    pub clusters_walled: usize,
    pub orphans_cleared: usize,
    pub edges_sealed: usize,
    pub drop_points: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Level {
    /// Seed of the attempt that produced this level; regenerating it reproduces the level.
    pub seed: u64,
    pub grid: Grid,
    pub cell_size: f32,
    pub gen_start: Pos,
    pub player_start: Rect,
    pub exit: Pos,
    pub rooms: Vec<Room>,
    pub storage_rooms: Vec<StorageRoom>,
    pub dead_ends: Vec<Pos>,
    /// Sorted by opening cell.
    pub doorways: Vec<Doorway>,
    pub sealed_edges: Vec<Edge>,
    pub room_separators: Vec<RoomSeparator>,
    pub drop_points: Vec<DropPoint>,
}

impl Level {
    pub fn width(&self) -> i32 {
        self.grid.width()
    }

    pub fn height(&self) -> i32 {
        self.grid.height()
    }

    pub fn cell(&self, pos: Pos) -> Cell {
        self.grid.get(pos)
    }

    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend(self.seed.to_le_bytes());
        bytes.extend((self.width() as u32).to_le_bytes());
        bytes.extend((self.height() as u32).to_le_bytes());
        bytes.extend((self.grid.margin() as u32).to_le_bytes());
        bytes.extend(self.grid.cells().iter().map(|cell| cell.code()));

        push_pos(&mut bytes, self.gen_start);
        push_rect(&mut bytes, self.player_start);
        push_pos(&mut bytes, self.exit);

        bytes.extend((self.rooms.len() as u32).to_le_bytes());
        for room in &self.rooms {
            bytes.extend(room.id.to_le_bytes());
            bytes.extend(room.code.as_bytes());
            push_rect(&mut bytes, room.rect);
        }

        bytes.extend((self.storage_rooms.len() as u32).to_le_bytes());
        for storage in &self.storage_rooms {
            bytes.extend(storage.id.to_le_bytes());
            bytes.extend(storage.code.as_bytes());
            push_pos(&mut bytes, storage.cell);
            push_pos(&mut bytes, storage.doorway);
            bytes.push(u8::from(storage.connects_to_hallway));
        }

        bytes.extend((self.dead_ends.len() as u32).to_le_bytes());
        for &cell in &self.dead_ends {
            push_pos(&mut bytes, cell);
        }

        bytes.extend((self.doorways.len() as u32).to_le_bytes());
        for doorway in &self.doorways {
            push_pos(&mut bytes, doorway.cell);
            bytes.extend((doorway.connections.len() as u32).to_le_bytes());
            for &cell in &doorway.connections {
                push_pos(&mut bytes, cell);
            }
        }

        bytes.extend((self.sealed_edges.len() as u32).to_le_bytes());
        for edge in &self.sealed_edges {
            push_edge(&mut bytes, *edge);
        }

        bytes.extend((self.room_separators.len() as u32).to_le_bytes());
        for separator in &self.room_separators {
            bytes.extend(separator.code.as_bytes());
            bytes.extend(separator.other_code.as_bytes());
            push_edge(&mut bytes, separator.edge);
        }

        bytes.extend((self.drop_points.len() as u32).to_le_bytes());
        for drop in &self.drop_points {
            bytes.extend(drop.code.as_bytes());
            push_pos(&mut bytes, drop.cell);
            bytes.push(match drop.wall_dir {
                Dir::East => 0,
                Dir::West => 1,
                Dir::North => 2,
                Dir::South => 3,
            });
        }

        bytes
    }

    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }

    /// One character per cell, top row (highest `y`) first.
    pub fn render_ascii(&self) -> String {
        self.grid.render_ascii()
    }

    /// Centre of `pos` in world space, with the grid centred on the origin and `y` up.
    pub fn cell_to_world(&self, pos: Pos) -> WorldPos {
        let half_width = self.width() as f32 / 2.0;
        let half_height = self.height() as f32 / 2.0;
        WorldPos {
            x: (pos.x as f32 - half_width) * self.cell_size,
            y: 0.0,
            z: (pos.y as f32 - half_height) * self.cell_size,
        }
    }

    /// Mean world position of the spawn room's four centre cells.
    pub fn player_start_world_position(&self) -> WorldPos {
        let rect = self.player_start;
        let (x_hi, y_hi) = (rect.x + rect.width / 2, rect.y + rect.height / 2);
        let corners = [
            Pos::new(x_hi - 1, y_hi - 1),
            Pos::new(x_hi, y_hi - 1),
            Pos::new(x_hi - 1, y_hi),
            Pos::new(x_hi, y_hi),
        ];
        let sum = corners.iter().map(|&cell| self.cell_to_world(cell)).fold(
            WorldPos { x: 0.0, y: 0.0, z: 0.0 },
            |acc, world| WorldPos { x: acc.x + world.x, y: 0.0, z: acc.z + world.z },
        );
        WorldPos { x: sum.x / 4.0, y: 0.0, z: sum.z / 4.0 }
    }

    /// First direction from the spawn-room centre that reaches a hall or room, else north.
    pub fn player_start_door_direction(&self) -> Dir {
        let rect = self.player_start;
        let centre = rect.center();
        let reach = rect.width / 2 + 2;
        Dir::ALL
            .into_iter()
            .find(|&dir| {
                (1..=reach).any(|distance| {
                    let cell = centre.offset(dir, distance);
                    self.grid.in_bounds(cell)
                        && matches!(self.grid.get(cell), Cell::Hall | Cell::Room)
                })
            })
            .unwrap_or(Dir::North)
    }

    /// Live cells outside the room that the opening at `cell` connects to.
    pub fn doorway_connections(&self, cell: Pos) -> Option<&[Pos]> {
        self.doorways
            .binary_search_by_key(&cell, |doorway| doorway.cell)
            .ok()
            .map(|index| self.doorways[index].connections.as_slice())
    }

    pub fn room_by_code(&self, code: &str) -> Option<&Room> {
        self.rooms.iter().find(|room| room.code == code)
    }
}

fn push_pos(bytes: &mut Vec<u8>, pos: Pos) {
    bytes.extend(pos.y.to_le_bytes());
    bytes.extend(pos.x.to_le_bytes());
}

fn push_rect(bytes: &mut Vec<u8>, rect: Rect) {
    bytes.extend(rect.x.to_le_bytes());
    bytes.extend(rect.y.to_le_bytes());
    bytes.extend(rect.width.to_le_bytes());
    bytes.extend(rect.height.to_le_bytes());
}

fn push_edge(bytes: &mut Vec<u8>, edge: Edge) {
    push_pos(bytes, edge.from);
    push_pos(bytes, edge.to);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_level() -> Level {
        let mut grid = Grid::new(20, 20, 2);
        let player_start = Rect::new(4, 4, 4, 4);
        grid.fill(player_start, Cell::PlayerStart);
        for y in 8..12 {
            grid.set(Pos::new(6, y), Cell::Hall);
        }
        grid.set(Pos::new(6, 12), Cell::Exit);
        Level {
            seed: 1,
            grid,
            cell_size: 5.0,
            gen_start: Pos::new(10, 10),
            player_start,
            exit: Pos::new(6, 12),
            rooms: Vec::new(),
            storage_rooms: Vec::new(),
            dead_ends: vec![Pos::new(6, 12)],
            doorways: vec![Doorway { cell: Pos::new(6, 7), connections: vec![Pos::new(6, 8)] }],
            sealed_edges: Vec::new(),
            room_separators: Vec::new(),
            drop_points: Vec::new(),
        }
    }

    #[test]
    fn cell_to_world_centres_the_grid() {
        let level = tiny_level();
        assert_eq!(level.cell_to_world(Pos::new(10, 10)), WorldPos { x: 0.0, y: 0.0, z: 0.0 });
        assert_eq!(level.cell_to_world(Pos::new(0, 12)), WorldPos { x: -50.0, y: 0.0, z: 10.0 });
    }

    #[test]
    fn spawn_world_position_averages_the_centre_cells() {
        let level = tiny_level();
        // Centre cells (5,5)..(6,6) average to (5.5, 5.5) in grid space.
        assert_eq!(level.player_start_world_position(), WorldPos { x: -22.5, y: 0.0, z: -22.5 });
    }

    #[test]
    fn door_direction_points_at_the_corridor() {
        let level = tiny_level();
        assert_eq!(level.player_start_door_direction(), Dir::North);

        let mut sideways = tiny_level();
        for y in 8..13 {
            sideways.grid.set(Pos::new(6, y), Cell::Empty);
        }
        sideways.grid.set(Pos::new(8, 6), Cell::Hall);
        assert_eq!(sideways.player_start_door_direction(), Dir::East);
    }

    #[test]
    fn doorway_lookup_finds_sorted_entries() {
        let level = tiny_level();
        assert_eq!(level.doorway_connections(Pos::new(6, 7)), Some(&[Pos::new(6, 8)][..]));
        assert_eq!(level.doorway_connections(Pos::new(5, 7)), None);
    }

    #[test]
    fn fingerprint_tracks_grid_changes() {
        let level = tiny_level();
        let mut changed = tiny_level();
        changed.grid.set(Pos::new(15, 15), Cell::Wall);
        assert_eq!(level.fingerprint(), tiny_level().fingerprint());
        assert_ne!(level.fingerprint(), changed.fingerprint());
    }

    #[test]
    fn json_round_trip_preserves_the_level() {
        let level = tiny_level();
        let json = serde_json::to_string(&level).expect("serialize");
        let back: Level = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, level);
    }
}
