//! Single-attempt pipeline: every stage runs against one fresh `GenerationState`.

use log::debug;

use super::super::doorways::{
    build_doorway_map, enforce_door_limits, room_separators, seal_excess_doorways,
};
use super::super::frontier::{grow_corridors, seed_frontier};
use super::super::landmarks::{place_drop_points, place_exit};
use super::super::model::{Doorway, GenerationStats, Level, Room, StorageRoom};
use super::super::player_start::place_player_start;
use super::super::rooms::add_rooms_to_reach_target;
use super::super::state::GenerationState;
use super::super::storage::allocate_storage_rooms;
use crate::config::GenConfig;
use crate::error::AttemptFailure;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Init,
    Growing,
    RoomTopUp,
    PlayerStartPlacement,
    StorageAllocation,
    DoorEnforcement,
    ExitPlacement,
    Finalize,
}

/// Runs one attempt to completion; any failure discards the whole state.
pub(super) fn run_attempt(
    config: &GenConfig,
    seed: u64,
) -> Result<(Level, GenerationStats), AttemptFailure> {
    let mut state = GenerationState::new(config, seed);
    let mut stage = Stage::Init;
    loop {
        debug!("stage {stage:?}");
        stage = match stage {
            Stage::Init => {
                seed_frontier(&mut state);
                Stage::Growing
            }
            Stage::Growing => {
                state.stats.steps_used = grow_corridors(&mut state);
                Stage::RoomTopUp
            }
            Stage::RoomTopUp => {
                add_rooms_to_reach_target(&mut state);
                Stage::PlayerStartPlacement
            }
            Stage::PlayerStartPlacement => {
                place_player_start(&mut state)?;
                Stage::StorageAllocation
            }
            Stage::StorageAllocation => {
                allocate_storage_rooms(&mut state);
                Stage::DoorEnforcement
            }
            Stage::DoorEnforcement => {
                enforce_door_limits(&mut state)?;
                Stage::ExitPlacement
            }
            Stage::ExitPlacement => {
                place_exit(&mut state)?;
                Stage::Finalize
            }
            Stage::Finalize => return finalize(state, seed),
        };
    }
}

fn finalize(
    mut state: GenerationState<'_>,
    seed: u64,
) -> Result<(Level, GenerationStats), AttemptFailure> {
    let player_start = state.player_start.ok_or(AttemptFailure::NoPlayerStart)?;
    let exit = state.exit.ok_or(AttemptFailure::NoExit)?;

    let mut doorway_map = build_doorway_map(&state);
    let sealed_edges = seal_excess_doorways(&state, &mut doorway_map);
    let room_separators = room_separators(&state);
    let drop_points = place_drop_points(&mut state);

    let rooms: Vec<Room> = state
        .rooms
        .values()
        .zip(1..)
        .map(|(room, id)| Room { id, code: room.code.clone(), rect: room.rect })
        .collect();
    let storage_rooms: Vec<StorageRoom> = state
        .storage_rooms
        .values()
        .zip(1..)
        .map(|(storage, id)| StorageRoom {
            id,
            code: storage.code.clone(),
            cell: storage.cell,
            doorway: storage.doorway,
            connects_to_hallway: storage.connects_to_hallway,
        })
        .collect();
    let dead_ends: Vec<_> =
        state.dead_ends.iter().copied().filter(|&cell| state.grid.get(cell).is_live()).collect();
    let doorways: Vec<Doorway> = doorway_map
        .into_iter()
        .map(|(cell, connections)| Doorway {
            cell,
            connections: connections.into_iter().collect(),
        })
        .collect();

    let mut stats = state.stats;
    stats.dead_ends = dead_ends.len();
    stats.edges_sealed = sealed_edges.len();
    stats.drop_points = drop_points.len();

    let level = Level {
        seed,
        grid: state.grid,
        cell_size: state.config.cell_size,
        gen_start: state.gen_start,
        player_start,
        exit,
        rooms,
        storage_rooms,
        dead_ends,
        doorways,
        sealed_edges,
        room_separators,
        drop_points,
    };
    Ok((level, stats))
}
