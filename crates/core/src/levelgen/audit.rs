//! Structural checks a finished level must pass; used by tests and the sweep tool.

use thiserror::Error;

use super::doorways::{
    PLAYER_START_CODE, PLAYER_START_DOOR_CAP, group_clusters, perimeter_openings,
};
use super::model::Level;
use super::player_start::PLAYER_START_SIZE;
use crate::config::GenConfig;
use crate::types::{Cell, Pos};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuditFinding {
    #[error("expected exactly one {kind:?} cell, found {count}")]
    LandmarkCount { kind: Cell, count: usize },

    #[error("{field} is recorded at {recorded:?} but that cell is {found:?}")]
    LandmarkMismatch { field: &'static str, recorded: Pos, found: Cell },

    #[error("spawn room is {width}x{height}")]
    PlayerStartSize { width: i32, height: i32 },

    #[error("spawn room holds {inside} spawn cells, {outside} more lie outside its rectangle")]
    PlayerStartCells { inside: usize, outside: usize },

    #[error("{count} live cells cannot reach the origin, first at {first:?}")]
    Disconnected { count: usize, first: Pos },

    #[error("carved cell {0:?} lies inside the margin")]
    CarvedInMargin(Pos),

    #[error("room [{code}] has {clusters} doorway clusters, cap {cap}")]
    DoorCapExceeded { code: String, clusters: usize, cap: usize },

    #[error("rooms [{first}] and [{second}] overlap")]
    RoomsOverlap { first: String, second: String },

    #[error("storage room [{code}] at {cell:?} is {found:?}")]
    StorageCellMismatch { code: String, cell: Pos, found: Cell },

    #[error("storage room [{code}] opens onto {doorway:?}, which is not a live neighbour")]
    StorageDoorway { code: String, doorway: Pos },

    #[error("storage room [{code}] at {cell:?} sits inside the hard-block zone")]
    StorageInHardBlockZone { code: String, cell: Pos },

    #[error("{0} storage rooms present although storage is disabled")]
    StorageDisabled(usize),

    #[error("exit at {0:?} is not a recorded dead end")]
    ExitNotAtDeadEnd(Pos),
}

/// Every structural problem in `level`; empty when the level is sound.
pub fn audit_level(level: &Level, config: &GenConfig) -> Vec<AuditFinding> {
    let mut findings = Vec::new();
    check_landmarks(level, &mut findings);
    check_player_start(level, &mut findings);
    check_connectivity(level, &mut findings);
    check_door_caps(level, config, &mut findings);
    check_rooms(level, &mut findings);
    check_storage(level, config, &mut findings);
    findings
}

fn check_landmarks(level: &Level, findings: &mut Vec<AuditFinding>) {
    for kind in [Cell::GenStart, Cell::Exit] {
        let count = level.grid.count(kind);
        if count != 1 {
            findings.push(AuditFinding::LandmarkCount { kind, count });
        }
    }
    for (field, recorded, expected) in
        [("gen_start", level.gen_start, Cell::GenStart), ("exit", level.exit, Cell::Exit)]
    {
        let found = level.cell(recorded);
        if found != expected {
            findings.push(AuditFinding::LandmarkMismatch { field, recorded, found });
        }
    }
    if !level.dead_ends.contains(&level.exit) {
        findings.push(AuditFinding::ExitNotAtDeadEnd(level.exit));
    }
}

fn check_player_start(level: &Level, findings: &mut Vec<AuditFinding>) {
    let rect = level.player_start;
    if rect.width != PLAYER_START_SIZE || rect.height != PLAYER_START_SIZE {
        findings.push(AuditFinding::PlayerStartSize { width: rect.width, height: rect.height });
    }

    let (inside, outside) = level
        .grid
        .positions()
        .filter(|&pos| level.cell(pos) == Cell::PlayerStart)
        .fold((0, 0), |(inside, outside), pos| {
            if rect.contains(pos) { (inside + 1, outside) } else { (inside, outside + 1) }
        });
    if inside != rect.area() || outside != 0 {
        findings.push(AuditFinding::PlayerStartCells { inside, outside });
    }
}

fn check_connectivity(level: &Level, findings: &mut Vec<AuditFinding>) {
    let cut_off = level.grid.cut_off_cells(level.gen_start, &[]);
    if let Some(&first) = cut_off.first() {
        findings.push(AuditFinding::Disconnected { count: cut_off.len(), first });
    }

    if let Some(pos) = level
        .grid
        .positions()
        .find(|&pos| level.cell(pos) != Cell::Empty && !level.grid.in_bounds(pos))
    {
        findings.push(AuditFinding::CarvedInMargin(pos));
    }
}

fn check_door_caps(level: &Level, config: &GenConfig, findings: &mut Vec<AuditFinding>) {
    let rooms = level
        .rooms
        .iter()
        .map(|room| (room.code.as_str(), room.rect, config.max_room_doors))
        .chain([(PLAYER_START_CODE, level.player_start, PLAYER_START_DOOR_CAP)]);
    for (code, rect, cap) in rooms {
        let clusters = group_clusters(&perimeter_openings(&level.grid, rect)).len();
        if clusters > cap {
            findings.push(AuditFinding::DoorCapExceeded { code: code.to_owned(), clusters, cap });
        }
    }
}

fn check_rooms(level: &Level, findings: &mut Vec<AuditFinding>) {
    for (index, first) in level.rooms.iter().enumerate() {
        for second in &level.rooms[index + 1..] {
            if first.rect.intersects(&second.rect) {
                findings.push(AuditFinding::RoomsOverlap {
                    first: first.code.clone(),
                    second: second.code.clone(),
                });
            }
        }
    }
}

fn check_storage(level: &Level, config: &GenConfig, findings: &mut Vec<AuditFinding>) {
    if config.storage_room_count == 0 && !level.storage_rooms.is_empty() {
        findings.push(AuditFinding::StorageDisabled(level.storage_rooms.len()));
    }

    let spawn_centre = level.player_start.center();
    for storage in &level.storage_rooms {
        let found = level.cell(storage.cell);
        if found != Cell::StorageRoom {
            findings.push(AuditFinding::StorageCellMismatch {
                code: storage.code.clone(),
                cell: storage.cell,
                found,
            });
        }
        if storage.cell.manhattan(storage.doorway) != 1 || !level.cell(storage.doorway).is_live() {
            findings.push(AuditFinding::StorageDoorway {
                code: storage.code.clone(),
                doorway: storage.doorway,
            });
        }
        if storage.cell.distance(level.gen_start) < config.hard_block_radius
            || storage.cell.distance(spawn_centre) < config.hard_block_radius
        {
            findings.push(AuditFinding::StorageInHardBlockZone {
                code: storage.code.clone(),
                cell: storage.cell,
            });
        }
    }
}
