//! Spawn-room placement: dead-end candidates first, then a dedicated path from an edge hallway.

use log::{debug, warn};

use super::rect::Rect;
use super::state::GenerationState;
use crate::error::AttemptFailure;
use crate::types::{Cell, Dir, Pos};

pub(crate) const PLAYER_START_SIZE: i32 = 4;
const PLAYER_START_BUFFER: i32 = 3;
const PLAYER_START_OFFSET: i32 = 3;
const EDGE_BAND: i32 = 10;
const MIN_PATH_LENGTH: i32 = 10;
const MAX_PATH_LENGTH: i32 = 30;

pub(crate) fn place_player_start(state: &mut GenerationState<'_>) -> Result<Rect, AttemptFailure> {
    if let Some(rect) = place_at_dead_end(state) {
        debug!("player start placed at dead end: {rect:?}");
        return Ok(rect);
    }

    warn!(
        "no dead end of {} could host the player start; cutting a dedicated path",
        state.dead_ends.len()
    );
    place_with_dedicated_path(state).ok_or(AttemptFailure::NoPlayerStart)
}

fn place_at_dead_end(state: &mut GenerationState<'_>) -> Option<Rect> {
    let mut candidates = state.dead_ends.clone();
    state.rng.shuffle(&mut candidates);

    for endpoint in candidates {
        if state.grid.get(endpoint).is_room_like() {
            continue;
        }
        let Some(back) = Dir::ALL.into_iter().find(|&dir| {
            let neighbor = endpoint.step(dir);
            state.grid.in_bounds(neighbor)
                && matches!(state.grid.get(neighbor), Cell::Hall | Cell::GenStart)
        }) else {
            continue;
        };

        let dir = back.reverse();
        let rect = spawn_rect_beyond(endpoint, dir);
        if !state.grid.rect_in_bounds(rect)
            || !state.grid.rect_area_clear(rect, PLAYER_START_BUFFER, endpoint)
        {
            continue;
        }

        carve_player_start(state, rect, endpoint, dir);
        return Some(rect);
    }
    None
}

fn place_with_dedicated_path(state: &mut GenerationState<'_>) -> Option<Rect> {
    let (width, height) = (state.grid.width(), state.grid.height());
    let mut edge_halls: Vec<Pos> = state
        .grid
        .positions()
        .filter(|&pos| matches!(state.grid.get(pos), Cell::Hall | Cell::GenStart))
        .filter(|pos| {
            pos.x < EDGE_BAND
                || pos.x > width - EDGE_BAND
                || pos.y < EDGE_BAND
                || pos.y > height - EDGE_BAND
        })
        .collect();
    if edge_halls.is_empty() {
        warn!("no hallway lies within {EDGE_BAND} cells of the grid edge");
        return None;
    }
    state.rng.shuffle(&mut edge_halls);

    for origin in edge_halls {
        for dir in Dir::ALL {
            if let Some(rect) = try_path_in_direction(state, origin, dir) {
                debug!("player start reached by dedicated path from {origin:?} heading {dir:?}");
                return Some(rect);
            }
        }
    }
    None
}

fn try_path_in_direction(state: &mut GenerationState<'_>, origin: Pos, dir: Dir) -> Option<Rect> {
    for length in MIN_PATH_LENGTH..=MAX_PATH_LENGTH {
        let path: Vec<Pos> = (1..=length).map(|step| origin.offset(dir, step)).collect();
        if !path.iter().all(|&cell| state.grid.in_bounds(cell)) {
            return None;
        }

        let end = origin.offset(dir, length);
        let rect = spawn_rect_beyond(end, dir);
        if !state.grid.rect_in_bounds(rect) {
            continue;
        }
        if !path.iter().all(|&cell| matches!(state.grid.get(cell), Cell::Empty | Cell::Hall)) {
            continue;
        }
        if !state.grid.rect_area_clear(rect, PLAYER_START_BUFFER, end) {
            continue;
        }

        for &cell in &path {
            if state.grid.get(cell) == Cell::Empty {
                state.grid.set(cell, Cell::Hall);
            }
        }
        carve_player_start(state, rect, end, dir);
        return Some(rect);
    }
    None
}

/// The 4x4 spawn rectangle centred `PLAYER_START_OFFSET` cells beyond `from` along `dir`.
fn spawn_rect_beyond(from: Pos, dir: Dir) -> Rect {
    Rect::centered_on(from.offset(dir, PLAYER_START_OFFSET), PLAYER_START_SIZE, PLAYER_START_SIZE)
}

fn carve_player_start(state: &mut GenerationState<'_>, rect: Rect, from: Pos, dir: Dir) {
    state.grid.fill(rect, Cell::PlayerStart);
    let entry = rect.clamp(from.step(dir));
    state.grid.carve_connector(from, entry);
    state.player_start = Some(rect);
}
