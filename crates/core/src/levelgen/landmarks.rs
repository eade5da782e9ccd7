//! Exit placement and drop points at far hallway dead ends.

use std::collections::VecDeque;

use log::{debug, warn};

use super::model::DropPoint;
use super::rect::Rect;
use super::state::GenerationState;
use crate::error::AttemptFailure;
use crate::types::{Cell, Dir, Pos};

const EXIT_AREA_SIZE: i32 = 4;
const DROP_POINT_COUNT: usize = 3;
const DROP_POINT_MIN_DISTANCE: f64 = 5.0;

/// Turns a shuffled dead end into the exit and opens a small area of hall around it.
pub(crate) fn place_exit(state: &mut GenerationState<'_>) -> Result<Pos, AttemptFailure> {
    let mut candidates = state.dead_ends.clone();
    state.rng.shuffle(&mut candidates);

    for dead_end in candidates {
        if state.grid.get(dead_end) != Cell::Hall {
            continue;
        }
        let area = Rect::new(dead_end.x - 2, dead_end.y - 2, EXIT_AREA_SIZE, EXIT_AREA_SIZE);
        if !state.grid.rect_in_bounds(area)
            || area
                .cells()
                .any(|cell| matches!(state.grid.get(cell), Cell::Exit | Cell::PlayerStart))
        {
            continue;
        }

        let opened = open_exit_area(state, area, dead_end);
        state.grid.set(dead_end, Cell::Exit);
        state.exit = Some(dead_end);
        debug!("exit placed at {dead_end:?}, opened {opened} cells around it");
        return Ok(dead_end);
    }
    Err(AttemptFailure::NoExit)
}

/// Floods from `from` through empty area cells that keep clear of rooms and storage.
fn open_exit_area(state: &mut GenerationState<'_>, area: Rect, from: Pos) -> usize {
    let mut opened = 0;
    let mut open = VecDeque::from([from]);
    while let Some(cell) = open.pop_front() {
        for next in cell.neighbors() {
            if area.contains(next)
                && state.grid.get(next) == Cell::Empty
                && !touches_enclosed_space(state, next)
            {
                state.grid.set(next, Cell::Hall);
                opened += 1;
                open.push_back(next);
            }
        }
    }
    opened
}

fn touches_enclosed_space(state: &GenerationState<'_>, cell: Pos) -> bool {
    cell.neighbors().into_iter().any(|next| {
        matches!(state.grid.get(next), Cell::Room | Cell::PlayerStart | Cell::StorageRoom)
    })
}

/// Picks up to three far hallway dead ends, each facing the wall beside its single opening.
pub(crate) fn place_drop_points(state: &mut GenerationState<'_>) -> Vec<DropPoint> {
    let Some(origin) = state.player_start_origin() else {
        return Vec::new();
    };

    let mut candidates: Vec<(Pos, Dir)> = state
        .grid
        .interior_positions()
        .filter(|&cell| {
            state.grid.get(cell) == Cell::Hall && cell.distance(origin) >= DROP_POINT_MIN_DISTANCE
        })
        .filter_map(|cell| {
            let mut halls =
                state.interior_neighbors(cell).filter(|&(_, _, kind)| kind == Cell::Hall);
            let (open_dir, _, _) = halls.next()?;
            halls.next().is_none().then_some((cell, open_dir))
        })
        .collect();

    if candidates.len() < DROP_POINT_COUNT {
        warn!("only {} far dead ends for {DROP_POINT_COUNT} drop points", candidates.len());
    }
    state.rng.shuffle(&mut candidates);
    candidates.truncate(DROP_POINT_COUNT);

    candidates
        .into_iter()
        .map(|(cell, open_dir)| DropPoint {
            code: state.fresh_code(),
            cell,
            wall_dir: open_dir.turn_right(),
        })
        .collect()
}
