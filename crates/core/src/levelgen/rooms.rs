//! Room carving at corridor dead ends and the top-up pass toward the room target.

use log::{debug, warn};

use super::rect::Rect;
use super::state::{Endpoint, GenerationState};
use crate::types::{Cell, Dir, Pos};

/// Extra doors are never cut within this distance of the primary entry.
const MIN_DOOR_SPACING: f64 = 3.0;

/// Tries to carve a room ahead of `endpoint` along `outward` with `buffer` clear cells around it.
pub(crate) fn try_make_room_at_endpoint(
    state: &mut GenerationState<'_>,
    endpoint: Pos,
    outward: Dir,
    buffer: i32,
) -> bool {
    let size = state.config.room_size;
    let width = state.rng.range_inclusive(size.min, size.max);
    let height = state.rng.range_inclusive(size.min, size.max);

    let centre = endpoint.offset(outward, (width + height) / 4 + 2);
    let rect = Rect::centered_on(centre, width, height);
    if !state.grid.rect_in_bounds(rect) || !state.grid.rect_area_clear(rect, buffer, endpoint) {
        return false;
    }

    state.grid.fill(rect, Cell::Room);
    state.add_room(rect);

    let entry = rect.clamp(endpoint.step(outward));
    state.grid.carve_connector(endpoint, entry);

    let mut slots = door_slots(state, rect);
    let door_limit =
        state.rng.range_usize_inclusive(state.config.min_room_doors, state.config.max_room_doors);
    state.rng.shuffle(&mut slots);

    let mut doors = 1;
    for (inside, outside, dir) in slots {
        if doors >= door_limit {
            break;
        }
        if inside.distance(entry) < MIN_DOOR_SPACING {
            continue;
        }
        state.grid.set(outside, Cell::Hall);
        state.frontier.push(Endpoint::new(outside, dir));
        doors += 1;
    }

    debug!("room carved at {rect:?} with {doors} of {door_limit} doors");
    true
}

/// Edge cells paired with the empty interior cell just outside them.
fn door_slots(state: &GenerationState<'_>, rect: Rect) -> Vec<(Pos, Pos, Dir)> {
    let mut slots = Vec::new();
    for dir in Dir::ALL {
        for inside in rect.perimeter() {
            let outside = inside.step(dir);
            if !rect.contains(outside)
                && state.grid.in_bounds(outside)
                && state.grid.get(outside) == Cell::Empty
            {
                slots.push((inside, outside, dir));
            }
        }
    }
    slots
}

/// Packs extra rooms (with no buffer) onto hallway dead ends until the target count is met.
///
/// True dead ends are tried first, then the tips where growth stalled against another corridor.
pub(crate) fn add_rooms_to_reach_target(state: &mut GenerationState<'_>) {
    let target = state.config.target_room_count;
    if state.rooms.len() >= target {
        return;
    }

    let mut hall_ends: Vec<Pos> = state
        .grid
        .interior_positions()
        .filter(|&pos| is_expandable_dead_end(state, pos))
        .collect();
    state.rng.shuffle(&mut hall_ends);

    let mut stalled_tips: Vec<Pos> = state
        .dead_ends
        .iter()
        .copied()
        .filter(|pos| !hall_ends.contains(pos) && is_open_stalled_tip(state, *pos))
        .collect();
    state.rng.shuffle(&mut stalled_tips);
    hall_ends.extend(stalled_tips);

    'candidates: for end in hall_ends {
        for dir in Dir::ALL {
            if state.rooms.len() >= target {
                break 'candidates;
            }
            let next = end.step(dir);
            if state.grid.in_bounds(next)
                && state.grid.get(next) == Cell::Empty
                && try_make_room_at_endpoint(state, end, dir, 0)
            {
                state.stats.top_up_rooms += 1;
                break;
            }
        }
    }

    if state.rooms.len() < target {
        warn!("room target missed: placed {} of {target} rooms", state.rooms.len());
    }
}

fn is_expandable_dead_end(state: &GenerationState<'_>, pos: Pos) -> bool {
    if state.grid.get(pos) != Cell::Hall {
        return false;
    }
    let mut occupied = 0;
    let mut open = false;
    for (_, _, cell) in state.interior_neighbors(pos) {
        if cell == Cell::Empty {
            open = true;
        } else {
            occupied += 1;
        }
    }
    occupied == 1 && open
}

fn is_open_stalled_tip(state: &GenerationState<'_>, pos: Pos) -> bool {
    state.grid.get(pos) == Cell::Hall
        && state.interior_neighbors(pos).any(|(_, _, cell)| cell == Cell::Empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GenConfig, SizeRange};

    fn corridor_state(config: &GenConfig) -> GenerationState<'_> {
        let mut state = GenerationState::new(config, 21);
        let origin = state.gen_start;
        state.grid.set(origin, Cell::GenStart);
        for step in 1..=3 {
            state.grid.set(origin.offset(Dir::East, step), Cell::Hall);
        }
        state
    }

    #[test]
    fn room_is_carved_ahead_of_the_endpoint_and_connected() {
        let config = GenConfig {
            room_size: SizeRange { min: 5, max: 5 },
            min_room_doors: 1,
            max_room_doors: 1,
            ..GenConfig::default()
        };
        let mut state = corridor_state(&config);
        let endpoint = state.gen_start.offset(Dir::East, 3);

        assert!(try_make_room_at_endpoint(&mut state, endpoint, Dir::East, 0));
        let (_, room) = state.rooms.iter().next().expect("one room");
        // (5 + 5) / 4 + 2 = 4 cells ahead, centred.
        assert_eq!(room.rect, Rect::centered_on(endpoint.offset(Dir::East, 4), 5, 5));
        assert_eq!(state.grid.count(Cell::Room), 25);
        assert_eq!(state.grid.get(endpoint.step(Dir::East)), Cell::Hall);
        assert!(state.frontier.is_empty(), "door limit of one leaves no extra doors");
        assert!(state.grid.cut_off_cells(state.gen_start, &[]).is_empty());
    }

    #[test]
    fn extra_doors_spawn_endpoints_away_from_the_entry() {
        let config = GenConfig {
            room_size: SizeRange { min: 6, max: 6 },
            min_room_doors: 3,
            max_room_doors: 3,
            ..GenConfig::default()
        };
        let mut state = corridor_state(&config);
        let endpoint = state.gen_start.offset(Dir::East, 3);

        assert!(try_make_room_at_endpoint(&mut state, endpoint, Dir::East, 0));
        let (_, room) = state.rooms.iter().next().expect("one room");
        let rect = room.rect;
        let entry = rect.clamp(endpoint.step(Dir::East));

        assert_eq!(state.frontier.len(), 2);
        for door in &state.frontier {
            assert_eq!(state.grid.get(door.cell), Cell::Hall);
            let inside = door.cell.step(door.dir.reverse());
            assert!(rect.is_on_edge(inside));
            assert!(inside.distance(entry) >= MIN_DOOR_SPACING);
        }
    }

    #[test]
    fn occupied_footprint_rejects_the_room() {
        let config = GenConfig::default();
        let mut state = corridor_state(&config);
        let endpoint = state.gen_start.offset(Dir::East, 3);
        state.grid.set(endpoint.offset(Dir::East, 5), Cell::Hall);

        let rooms_before = state.rooms.len();
        assert!(!try_make_room_at_endpoint(&mut state, endpoint, Dir::East, 0));
        assert_eq!(state.rooms.len(), rooms_before);
        assert_eq!(state.grid.count(Cell::Room), 0);
    }

    #[test]
    fn buffer_reaches_back_over_the_approach_corridor() {
        let config = GenConfig::default();
        let mut state = corridor_state(&config);
        let endpoint = state.gen_start.offset(Dir::East, 3);
        assert!(!try_make_room_at_endpoint(&mut state, endpoint, Dir::East, 3));
        assert!(state.rooms.is_empty());
    }

    #[test]
    fn top_up_stops_at_the_target() {
        let config = GenConfig {
            target_room_count: 1,
            room_size: SizeRange { min: 4, max: 4 },
            ..GenConfig::default()
        };
        let mut state = corridor_state(&config);
        add_rooms_to_reach_target(&mut state);
        assert_eq!(state.rooms.len(), 1);
        assert_eq!(state.stats.top_up_rooms, 1);

        add_rooms_to_reach_target(&mut state);
        assert_eq!(state.rooms.len(), 1);
    }

    #[test]
    fn top_up_reaches_a_tip_that_stalled_against_another_cell() {
        let config = GenConfig {
            target_room_count: 1,
            room_size: SizeRange { min: 4, max: 4 },
            ..GenConfig::default()
        };
        let mut state = corridor_state(&config);
        let tip = state.gen_start.offset(Dir::East, 3);
        state.grid.set(tip.step(Dir::East), Cell::Room);
        state.record_dead_end(tip);
        assert!(!is_expandable_dead_end(&state, tip));

        add_rooms_to_reach_target(&mut state);

        assert_eq!(state.stats.top_up_rooms, 1);
        let (_, room) = state.rooms.iter().next().expect("one room");
        assert_eq!(room.rect, Rect::centered_on(tip.offset(Dir::North, 4), 4, 4));
        assert_eq!(state.grid.get(tip.step(Dir::North)), Cell::Hall);
    }
}
