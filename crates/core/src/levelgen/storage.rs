//! Storage-room allocation, degenerate-room conversion, and pruning near the start areas.

use log::debug;

use super::state::GenerationState;
use crate::types::{Cell, Pos, RoomId};

/// Runs all three storage passes; a configured count of zero disables storage rooms entirely.
pub(crate) fn allocate_storage_rooms(state: &mut GenerationState<'_>) {
    if state.config.storage_room_count == 0 {
        debug!("storage rooms disabled");
        return;
    }

    let created = create_storage_rooms(state);
    let converted = convert_degenerate_rooms(state);
    let pruned = prune_storage_near_start(state);
    state.stats.storage_created = created;
    state.stats.storage_converted = converted;
    state.stats.storage_pruned = pruned;
    debug!(
        "storage rooms: created={created} converted={converted} pruned={pruned} total={}",
        state.storage_rooms.len()
    );
}

/// Attaches fresh single-cell storage rooms to connection cells on the network.
fn create_storage_rooms(state: &mut GenerationState<'_>) -> usize {
    let mut candidates: Vec<(Pos, bool)> = state
        .grid
        .interior_positions()
        .filter(|&pos| {
            matches!(state.grid.get(pos), Cell::Hall | Cell::Room | Cell::PlayerStart)
                && state.clear_of_player_start(pos)
                && is_connection_candidate(state, pos)
        })
        .map(|pos| (pos, state.grid.get(pos) == Cell::Hall))
        .collect();
    state.rng.shuffle(&mut candidates);

    let mut created = 0;
    for (connection, is_hallway) in candidates {
        if created >= state.config.storage_room_count {
            break;
        }
        if state.config.storage_rooms_only_in_hallways && !is_hallway {
            continue;
        }

        let slot = state.interior_neighbors(connection).find_map(|(_, cell, kind)| {
            (kind == Cell::Empty && is_valid_storage_slot(state, cell, connection)).then_some(cell)
        });
        if let Some(cell) = slot {
            let code = state.fresh_code();
            state.add_storage_room(cell, connection, is_hallway, code);
            created += 1;
        }
    }
    created
}

fn is_connection_candidate(state: &GenerationState<'_>, pos: Pos) -> bool {
    let mut carved = 0;
    let mut open = false;
    for (_, _, kind) in state.interior_neighbors(pos) {
        match kind {
            Cell::Hall | Cell::Room | Cell::PlayerStart => carved += 1,
            Cell::Empty => open = true,
            _ => {}
        }
    }
    carved >= 1 && open
}

fn is_valid_storage_slot(state: &GenerationState<'_>, cell: Pos, connection: Pos) -> bool {
    !state.in_hard_block_zone(cell)
        && state.clear_of_player_start(cell)
        && state.interior_neighbors(cell).all(|(_, neighbor, kind)| {
            neighbor == connection
                || !matches!(kind, Cell::Room | Cell::PlayerStart | Cell::StorageRoom)
        })
}

/// Reclassifies 1x1 rooms and corridor stubs that only lead into a single room.
fn convert_degenerate_rooms(state: &mut GenerationState<'_>) -> usize {
    let single_cell_rooms: Vec<(RoomId, Pos)> = state
        .rooms
        .iter()
        .filter(|(_, room)| room.rect.width == 1 && room.rect.height == 1)
        .map(|(id, room)| (id, room.rect.min_corner()))
        .collect();

    let mut converted = 0;
    for (id, cell) in single_cell_rooms {
        if state.in_hard_block_zone(cell) || !state.clear_of_player_start(cell) {
            continue;
        }
        let Some(doorway) = single_room_neighbor(state, cell) else {
            continue;
        };
        if let Some(room) = state.remove_room(id) {
            state.add_storage_room(cell, doorway, false, room.code);
            converted += 1;
        }
    }

    let stubs: Vec<Pos> = state.grid.interior_positions().collect();
    for cell in stubs {
        if state.grid.get(cell) != Cell::Hall
            || state.in_hard_block_zone(cell)
            || !state.clear_of_player_start(cell)
        {
            continue;
        }
        let halls =
            state.interior_neighbors(cell).filter(|&(_, _, kind)| kind == Cell::Hall).count();
        if halls > 0 {
            continue;
        }
        if let Some(doorway) = single_room_neighbor(state, cell) {
            let code = state.fresh_code();
            state.add_storage_room(cell, doorway, false, code);
            converted += 1;
        }
    }
    converted
}

/// The neighbouring room cell when exactly one in-bounds neighbour is `Room` or `PlayerStart`.
fn single_room_neighbor(state: &GenerationState<'_>, cell: Pos) -> Option<Pos> {
    let mut rooms = state
        .interior_neighbors(cell)
        .filter(|&(_, _, kind)| kind.is_room_like())
        .map(|(_, neighbor, _)| neighbor);
    let first = rooms.next()?;
    rooms.next().is_none().then_some(first)
}

/// Deletes storage rooms inside the hard-block zone or opening onto a start cell.
fn prune_storage_near_start(state: &mut GenerationState<'_>) -> usize {
    let doomed: Vec<_> = state
        .storage_rooms
        .iter()
        .filter(|(_, storage)| {
            state.in_hard_block_zone(storage.cell)
                || matches!(state.grid.get(storage.doorway), Cell::PlayerStart | Cell::GenStart)
        })
        .map(|(id, _)| id)
        .collect();

    for &id in &doomed {
        if let Some(storage) = state.remove_storage_room(id) {
            state.grid.set(storage.cell, Cell::Empty);
        }
    }
    if !doomed.is_empty() {
        let orphans = state.clear_orphans();
        state.stats.orphans_cleared += orphans;
    }
    doomed.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenConfig;
    use crate::levelgen::rect::Rect;
    use crate::types::Dir;

    /// Origin with a long corridor heading east and a spawn room far to the west.
    fn network(config: &GenConfig) -> GenerationState<'_> {
        let mut state = GenerationState::new(config, 17);
        let origin = state.gen_start;
        state.grid.set(origin, Cell::GenStart);
        for x in origin.x + 1..origin.x + 30 {
            state.grid.set(Pos::new(x, origin.y), Cell::Hall);
        }
        for x in origin.x - 20..origin.x {
            state.grid.set(Pos::new(x, origin.y), Cell::Hall);
        }
        let spawn = Rect::new(origin.x - 24, origin.y - 1, 4, 4);
        state.grid.fill(spawn, Cell::PlayerStart);
        state.player_start = Some(spawn);
        state
    }

    #[test]
    fn fresh_storage_rooms_attach_to_hallways_outside_the_zone() {
        let config = GenConfig { storage_room_count: 3, ..GenConfig::default() };
        let mut state = network(&config);
        allocate_storage_rooms(&mut state);

        assert_eq!(state.storage_rooms.len(), 3);
        for (_, storage) in &state.storage_rooms {
            assert_eq!(state.grid.get(storage.cell), Cell::StorageRoom);
            assert_eq!(state.grid.get(storage.doorway), Cell::Hall);
            assert!(storage.connects_to_hallway);
            assert_eq!(storage.cell.manhattan(storage.doorway), 1);
            assert!(!state.in_hard_block_zone(storage.cell));
        }
    }

    #[test]
    fn zero_count_leaves_the_grid_untouched() {
        let config = GenConfig { storage_room_count: 0, ..GenConfig::default() };
        let mut state = network(&config);
        let before = state.grid.clone();
        allocate_storage_rooms(&mut state);
        assert_eq!(state.grid, before);
        assert!(state.storage_rooms.is_empty());
    }

    #[test]
    fn huge_hard_block_radius_rejects_every_slot() {
        let config = GenConfig { hard_block_radius: 100.0, ..GenConfig::default() };
        let mut state = network(&config);
        allocate_storage_rooms(&mut state);
        assert!(state.storage_rooms.is_empty());
        assert_eq!(state.grid.count(Cell::StorageRoom), 0);
    }

    #[test]
    fn corridor_stub_into_one_room_becomes_storage() {
        let config = GenConfig { storage_room_count: 1, ..GenConfig::default() };
        let mut state = GenerationState::new(&config, 2);
        let origin = state.gen_start;
        state.grid.set(origin, Cell::GenStart);
        let room = Rect::new(origin.x + 15, origin.y - 2, 5, 5);
        for x in origin.x + 1..room.x {
            state.grid.set(Pos::new(x, origin.y), Cell::Hall);
        }
        state.grid.fill(room, Cell::Room);
        state.add_room(room);
        let stub = Pos::new(room.x + 2, room.y_max());
        state.grid.set(stub, Cell::Hall);
        state.player_start = Some(Rect::new(origin.x - 10, origin.y - 10, 4, 4));

        assert_eq!(convert_degenerate_rooms(&mut state), 1);
        assert_eq!(state.grid.get(stub), Cell::StorageRoom);
        let (_, storage) = state.storage_rooms.iter().next().expect("converted stub");
        assert_eq!(storage.doorway, stub.step(Dir::South));
        assert!(!storage.connects_to_hallway);
    }

    #[test]
    fn single_cell_room_keeps_its_code_when_converted() {
        let config = GenConfig::default();
        let mut state = GenerationState::new(&config, 6);
        let origin = state.gen_start;
        let big = Rect::new(origin.x + 15, origin.y, 4, 4);
        let tiny = Rect::new(big.x_max(), origin.y + 1, 1, 1);
        state.grid.fill(big, Cell::Room);
        state.grid.fill(tiny, Cell::Room);
        state.add_room(big);
        let tiny_id = state.add_room(tiny);
        let code = state.rooms[tiny_id].code.clone();

        assert_eq!(convert_degenerate_rooms(&mut state), 1);
        assert!(!state.rooms.contains_key(tiny_id));
        let (_, storage) = state.storage_rooms.iter().next().expect("converted room");
        assert_eq!(storage.code, code);
        assert_eq!(storage.cell, tiny.min_corner());
        assert_eq!(storage.doorway, Pos::new(big.x_max() - 1, origin.y + 1));
    }

    #[test]
    fn storage_opening_onto_the_origin_is_pruned() {
        let config = GenConfig { hard_block_radius: 0.0, ..GenConfig::default() };
        let mut state = GenerationState::new(&config, 6);
        let origin = state.gen_start;
        state.grid.set(origin, Cell::GenStart);
        let code = state.fresh_code();
        state.add_storage_room(origin.step(Dir::North), origin, true, code);

        assert_eq!(prune_storage_near_start(&mut state), 1);
        assert!(state.storage_rooms.is_empty());
        assert_eq!(state.grid.get(origin.step(Dir::North)), Cell::Empty);
    }
}
