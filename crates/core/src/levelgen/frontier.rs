//! Corridor frontier growth: the random walk that carves the hallway tree.

use log::debug;

use super::rooms::try_make_room_at_endpoint;
use super::state::{Endpoint, GenerationState};
use crate::types::{Cell, Dir};

/// Marks the origin and pushes one endpoint per cardinal direction.
pub(crate) fn seed_frontier(state: &mut GenerationState<'_>) {
    let origin = state.gen_start;
    state.grid.set(origin, Cell::GenStart);
    state.frontier.extend(Dir::ALL.map(|dir| Endpoint::new(origin, dir)));
}

/// Runs up to `total_steps` growth steps; returns how many were taken.
pub(crate) fn grow_corridors(state: &mut GenerationState<'_>) -> usize {
    let buffer = state.config.room_buffer;
    let mut steps = 0;
    while steps < state.config.total_steps && !state.frontier.is_empty() {
        steps += 1;
        let index = pick_endpoint_index(state);
        if try_extend(state, index) {
            continue;
        }

        let stalled = state.frontier[index];
        state.record_dead_end(stalled.cell);
        if state.rng.chance(state.config.room_chance_at_endpoint)
            && try_make_room_at_endpoint(state, stalled.cell, stalled.dir, buffer)
        {
            state.stats.organic_rooms += 1;
        }
        state.frontier.remove(index);
    }

    debug!(
        "corridor growth finished: steps={steps} dead_ends={} rooms={} frontier_left={}",
        state.dead_ends.len(),
        state.rooms.len(),
        state.frontier.len()
    );
    steps
}

/// Highest `distance_from_centre * explore_drive + jitter` wins; the first maximum is kept.
fn pick_endpoint_index(state: &mut GenerationState<'_>) -> usize {
    if state.frontier.len() <= 1 {
        return 0;
    }

    let centre_x = f64::from(state.config.width / 2);
    let centre_y = f64::from(state.config.height / 2);
    let mut best_index = 0;
    let mut best_score = -1.0;
    for index in 0..state.frontier.len() {
        let cell = state.frontier[index].cell;
        let dx = f64::from(cell.x) - centre_x;
        let dy = f64::from(cell.y) - centre_y;
        let score = (dx * dx + dy * dy).sqrt() * state.config.explore_drive
            + state.rng.next_f64() * 10.0;
        if score > best_score {
            best_score = score;
            best_index = index;
        }
    }
    best_index
}

fn try_extend(state: &mut GenerationState<'_>, index: usize) -> bool {
    let endpoint = state.frontier[index];
    let next = endpoint.cell.step(endpoint.dir);
    if !state.grid.in_bounds(next) || state.grid.get(next) != Cell::Empty {
        return false;
    }

    state.grid.set(next, Cell::Hall);
    let min_straight = state.config.min_straight_before_turn;
    let mut advanced = Endpoint { cell: next, dir: endpoint.dir, straight: endpoint.straight + 1 };

    if advanced.straight >= min_straight && state.rng.chance(state.config.turn_chance) {
        advanced.dir = turn_either_way(state, advanced.dir);
        advanced.straight = 0;
    }
    state.frontier[index] = advanced;

    if state.rng.chance(state.config.branch_chance) && advanced.straight >= min_straight {
        let branch_dir = turn_either_way(state, advanced.dir);
        state.frontier.push(Endpoint::new(next, branch_dir));
    }
    true
}

fn turn_either_way(state: &mut GenerationState<'_>, dir: Dir) -> Dir {
    if state.rng.chance(0.5) { dir.turn_left() } else { dir.turn_right() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenConfig;
    use crate::types::Pos;

    fn hall_network_is_connected(state: &GenerationState<'_>) -> bool {
        let seen = state.grid.reachable_from(state.gen_start, &[]);
        state
            .grid
            .positions()
            .filter(|&pos| state.grid.get(pos).is_live())
            .all(|pos| seen[(pos.y * state.grid.width() + pos.x) as usize])
    }

    #[test]
    fn seeding_places_four_endpoints_at_the_origin() {
        let config = GenConfig::default();
        let mut state = GenerationState::new(&config, 1);
        seed_frontier(&mut state);

        assert_eq!(state.frontier.len(), 4);
        assert!(state.frontier.iter().all(|endpoint| endpoint.cell == state.gen_start));
        assert_eq!(state.grid.count(Cell::GenStart), 1);
    }

    #[test]
    fn growth_without_rooms_carves_a_connected_hall_tree() {
        let config = GenConfig { room_chance_at_endpoint: 0.0, ..GenConfig::default() };
        let mut state = GenerationState::new(&config, 77);
        seed_frontier(&mut state);
        let steps = grow_corridors(&mut state);

        assert!(steps <= config.total_steps);
        assert!(state.grid.count(Cell::Hall) > 0);
        assert_eq!(state.grid.count(Cell::Room), 0);
        assert!(hall_network_is_connected(&state));
        assert!(
            state
                .grid
                .positions()
                .filter(|&pos| state.grid.get(pos) == Cell::Hall)
                .all(|pos| state.grid.in_bounds(pos))
        );
    }

    #[test]
    fn straight_corridor_never_turns_when_turning_is_disabled() {
        let config = GenConfig {
            turn_chance: 0.0,
            branch_chance: 0.0,
            room_chance_at_endpoint: 0.0,
            ..GenConfig::default()
        };
        let mut state = GenerationState::new(&config, 5);
        seed_frontier(&mut state);
        grow_corridors(&mut state);

        let origin = state.gen_start;
        let hall_cells: Vec<Pos> = state
            .grid
            .positions()
            .filter(|&pos| state.grid.get(pos) == Cell::Hall)
            .collect();
        assert!(hall_cells.iter().all(|pos| pos.x == origin.x || pos.y == origin.y));
        assert!(state.frontier.is_empty(), "four straight arms stall well within the budget");
        assert_eq!(state.dead_ends.len(), 4);
    }

    #[test]
    fn single_endpoint_is_chosen_without_drawing() {
        let config = GenConfig::default();
        let mut state = GenerationState::new(&config, 8);
        state.frontier.push(Endpoint::new(Pos::new(20, 20), Dir::East));
        let mut reference = GenerationState::new(&config, 8);

        assert_eq!(pick_endpoint_index(&mut state), 0);
        assert_eq!(state.rng.next_f64().to_bits(), reference.rng.next_f64().to_bits());
    }
}
