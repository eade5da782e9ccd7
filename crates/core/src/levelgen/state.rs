//! Mutable per-attempt generation state threaded through every stage.

use std::collections::{BTreeMap, BTreeSet};

use slotmap::SlotMap;

use super::grid::Grid;
use super::model::GenerationStats;
use super::rect::Rect;
use super::rng::LevelRng;
use crate::config::GenConfig;
use crate::types::{Cell, Dir, Pos, RoomId, StorageRoomId};

/// Minimum distance kept between storage rooms and the player-start origin.
pub(crate) const START_CLEARANCE: f64 = 3.0;

/// One growth tip of the corridor network.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Endpoint {
    pub cell: Pos,
    pub dir: Dir,
    pub straight: u32,
}

impl Endpoint {
    pub(crate) fn new(cell: Pos, dir: Dir) -> Self {
        Self { cell, dir, straight: 0 }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct RoomRecord {
    pub code: String,
    pub rect: Rect,
}

#[derive(Clone, Debug)]
pub(crate) struct StorageRecord {
    pub code: String,
    pub cell: Pos,
    pub doorway: Pos,
    pub connects_to_hallway: bool,
}

pub(crate) struct GenerationState<'a> {
    pub config: &'a GenConfig,
    pub rng: LevelRng,
    pub grid: Grid,
    pub gen_start: Pos,
    pub frontier: Vec<Endpoint>,
    pub dead_ends: Vec<Pos>,
    pub rooms: SlotMap<RoomId, RoomRecord>,
    pub room_at: BTreeMap<Pos, RoomId>,
    pub storage_rooms: SlotMap<StorageRoomId, StorageRecord>,
    pub storage_at: BTreeMap<Pos, StorageRoomId>,
    pub player_start: Option<Rect>,
    pub exit: Option<Pos>,
    pub stats: GenerationStats,
    used_codes: BTreeSet<String>,
}

impl<'a> GenerationState<'a> {
    pub(crate) fn new(config: &'a GenConfig, seed: u64) -> Self {
        Self {
            config,
            rng: LevelRng::from_seed(seed),
            grid: Grid::new(config.width, config.height, config.margin),
            gen_start: config.gen_start(),
            frontier: Vec::new(),
            dead_ends: Vec::new(),
            rooms: SlotMap::with_key(),
            room_at: BTreeMap::new(),
            storage_rooms: SlotMap::with_key(),
            storage_at: BTreeMap::new(),
            player_start: None,
            exit: None,
            stats: GenerationStats::default(),
            used_codes: BTreeSet::new(),
        }
    }

    /// A code no other room, storage room, or drop point in this attempt carries.
    pub(crate) fn fresh_code(&mut self) -> String {
        loop {
            let code = self.rng.code();
            if self.used_codes.insert(code.clone()) {
                return code;
            }
        }
    }

    pub(crate) fn record_dead_end(&mut self, cell: Pos) {
        if !self.dead_ends.contains(&cell) {
            self.dead_ends.push(cell);
        }
    }

    pub(crate) fn add_room(&mut self, rect: Rect) -> RoomId {
        let code = self.fresh_code();
        let id = self.rooms.insert(RoomRecord { code, rect });
        for cell in rect.cells() {
            self.room_at.insert(cell, id);
        }
        id
    }

    pub(crate) fn remove_room(&mut self, id: RoomId) -> Option<RoomRecord> {
        let record = self.rooms.remove(id)?;
        for cell in record.rect.cells() {
            if self.room_at.get(&cell) == Some(&id) {
                self.room_at.remove(&cell);
            }
        }
        Some(record)
    }

    pub(crate) fn add_storage_room(
        &mut self,
        cell: Pos,
        doorway: Pos,
        connects_to_hallway: bool,
        code: String,
    ) -> StorageRoomId {
        self.grid.set(cell, Cell::StorageRoom);
        let record = StorageRecord { code, cell, doorway, connects_to_hallway };
        let id = self.storage_rooms.insert(record);
        self.storage_at.insert(cell, id);
        id
    }

    pub(crate) fn remove_storage_room(&mut self, id: StorageRoomId) -> Option<StorageRecord> {
        let record = self.storage_rooms.remove(id)?;
        self.storage_at.remove(&record.cell);
        Some(record)
    }

    /// Where start-clearance distances are measured from: the spawn rectangle's min corner.
    pub(crate) fn player_start_origin(&self) -> Option<Pos> {
        self.player_start.map(Rect::min_corner)
    }

    pub(crate) fn clear_of_player_start(&self, pos: Pos) -> bool {
        self.player_start_origin().is_none_or(|origin| pos.distance(origin) >= START_CLEARANCE)
    }

    pub(crate) fn in_hard_block_zone(&self, pos: Pos) -> bool {
        let radius = self.config.hard_block_radius;
        pos.distance(self.gen_start) < radius
            || self.player_start.is_some_and(|rect| pos.distance(rect.center()) < radius)
    }

    /// Empties live cells that can no longer reach the origin and drops the records living there.
    pub(crate) fn clear_orphans(&mut self) -> usize {
        let orphans = self.grid.cut_off_cells(self.gen_start, &[]);
        for &cell in &orphans {
            self.grid.set(cell, Cell::Empty);
        }

        let dead_rooms: Vec<RoomId> = self
            .rooms
            .iter()
            .filter(|(_, room)| !room.rect.cells().any(|cell| self.grid.is(cell, Cell::Room)))
            .map(|(id, _)| id)
            .collect();
        for id in dead_rooms {
            self.remove_room(id);
        }

        let dead_storage: Vec<StorageRoomId> = self
            .storage_rooms
            .iter()
            .filter(|(_, storage)| !self.grid.is(storage.cell, Cell::StorageRoom))
            .map(|(id, _)| id)
            .collect();
        for id in dead_storage {
            self.remove_storage_room(id);
        }

        if let Some(rect) = self.player_start
            && !rect.cells().any(|cell| self.grid.is(cell, Cell::PlayerStart))
        {
            self.player_start = None;
        }
        orphans.len()
    }

    /// In-bounds neighbours of `pos`, in probe order.
    pub(crate) fn interior_neighbors(
        &self,
        pos: Pos,
    ) -> impl Iterator<Item = (Dir, Pos, Cell)> + '_ {
        Dir::ALL.into_iter().filter_map(move |dir| {
            let next = pos.step(dir);
            self.grid.in_bounds(next).then(|| (dir, next, self.grid.get(next)))
        })
    }
}
