//! Doorway detection and the two door-cap passes.
//!
//! The first pass works on the grid: each room's perimeter openings are grouped
//! into 4-connected clusters and excess clusters are walled off, pruning any
//! cells that lose their route back to the origin. The second pass works on
//! per-edge door markers and only records sealed edges for the geometry layer.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use log::debug;

use super::grid::Grid;
use super::model::{Edge, RoomSeparator};
use super::rect::Rect;
use super::state::GenerationState;
use crate::error::AttemptFailure;
use crate::types::{Cell, Dir, Pos};

pub const PLAYER_START_CODE: &str = "PlayerStart";
pub(crate) const PLAYER_START_DOOR_CAP: usize = 1;
/// Door markers whose edge midpoints are closer than this count as neighbours.
const ADJACENT_MARKER_DISTANCE: f64 = 1.5;

pub(crate) type DoorwayMap = BTreeMap<Pos, BTreeSet<Pos>>;

/// Perimeter cells of `rect` that are live and face a live cell outside it.
pub(crate) fn perimeter_openings(grid: &Grid, rect: Rect) -> Vec<Pos> {
    rect.perimeter()
        .filter(|&cell| {
            grid.get(cell).is_live() && !outside_connections(grid, rect, cell).is_empty()
        })
        .collect()
}

fn outside_connections(grid: &Grid, rect: Rect, cell: Pos) -> Vec<Pos> {
    cell.neighbors()
        .into_iter()
        .filter(|&next| !rect.contains(next) && grid.in_bounds(next) && grid.get(next).is_live())
        .collect()
}

/// Groups openings into 4-connected clusters, in discovery order.
pub(crate) fn group_clusters(openings: &[Pos]) -> Vec<Vec<Pos>> {
    let members: BTreeSet<Pos> = openings.iter().copied().collect();
    let mut visited = BTreeSet::new();
    let mut clusters = Vec::new();

    for &start in openings {
        if !visited.insert(start) {
            continue;
        }
        let mut cluster = Vec::new();
        let mut open = VecDeque::from([start]);
        while let Some(cell) = open.pop_front() {
            cluster.push(cell);
            for next in cell.neighbors() {
                if members.contains(&next) && visited.insert(next) {
                    open.push_back(next);
                }
            }
        }
        clusters.push(cluster);
    }
    clusters
}

/// Walls excess doorway clusters on every room and the spawn room until all caps hold.
pub(crate) fn enforce_door_limits(state: &mut GenerationState<'_>) -> Result<(), AttemptFailure> {
    let room_cap = state.config.max_room_doors;
    let mut passes = 0;
    loop {
        passes += 1;
        let mut changed = false;

        let room_ids: Vec<_> = state.rooms.keys().collect();
        for id in room_ids {
            if let Some(rect) = state.rooms.get(id).map(|room| room.rect) {
                changed |= cap_openings(state, rect, room_cap);
            }
        }

        let Some(spawn) = state.player_start else {
            return Err(AttemptFailure::NoPlayerStart);
        };
        changed |= cap_openings(state, spawn, PLAYER_START_DOOR_CAP);
        if state.player_start.is_none() {
            return Err(AttemptFailure::NoPlayerStart);
        }

        if !changed {
            break;
        }
    }

    debug!(
        "door caps settled after {passes} passes: walled={} orphans={}",
        state.stats.clusters_walled, state.stats.orphans_cleared
    );
    Ok(())
}

/// Walls clusters of `rect` one at a time until at most `cap` remain; true if anything changed.
fn cap_openings(state: &mut GenerationState<'_>, rect: Rect, cap: usize) -> bool {
    let mut changed = false;
    loop {
        let openings = perimeter_openings(&state.grid, rect);
        let clusters = group_clusters(&openings);
        if clusters.len() <= cap {
            return changed;
        }

        let Some(doomed) = clusters
            .iter()
            .enumerate()
            .map(|(index, cluster)| {
                let orphaned = state.grid.cut_off_cells(state.gen_start, cluster).len();
                (orphaned, cluster.len(), index)
            })
            .min()
            .map(|(_, _, index)| &clusters[index])
        else {
            return changed;
        };

        for &cell in doomed {
            state.grid.set(cell, Cell::Wall);
        }
        state.stats.clusters_walled += 1;
        state.stats.orphans_cleared += state.clear_orphans();
        repoint_storage_doorways(state);
        changed = true;
        debug!(
            "walled a {}-cell doorway of {rect:?} ({} clusters, cap {cap})",
            doomed.len(),
            clusters.len()
        );
    }
}

/// Storage rooms whose doorway was walled open onto another live neighbour instead.
fn repoint_storage_doorways(state: &mut GenerationState<'_>) {
    let grid = &state.grid;
    for (_, storage) in &mut state.storage_rooms {
        if grid.get(storage.doorway).is_live() {
            continue;
        }
        let open = storage
            .cell
            .neighbors()
            .into_iter()
            .find(|&next| grid.in_bounds(next) && grid.get(next).is_live());
        if let Some(next) = open {
            storage.doorway = next;
            storage.connects_to_hallway = grid.get(next) == Cell::Hall;
        }
    }
}

/// Opening cell of every room and the spawn room mapped to the live cells it connects to outside.
pub(crate) fn build_doorway_map(state: &GenerationState<'_>) -> DoorwayMap {
    let mut map = DoorwayMap::new();
    let rects = state.rooms.values().map(|room| room.rect).chain(state.player_start);
    for rect in rects {
        for cell in perimeter_openings(&state.grid, rect) {
            map.entry(cell).or_default().extend(outside_connections(&state.grid, rect, cell));
        }
    }
    map
}

/// One doorway edge owned by a room: `cell` is inside, `neighbor` is the live cell it opens onto.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct DoorMarker {
    pub cell: Pos,
    pub neighbor: Pos,
}

impl DoorMarker {
    fn midpoint(self) -> (f64, f64) {
        (
            f64::from(self.cell.x + self.neighbor.x) / 2.0,
            f64::from(self.cell.y + self.neighbor.y) / 2.0,
        )
    }

    fn distance(self, other: Self) -> f64 {
        let (ax, ay) = self.midpoint();
        let (bx, by) = other.midpoint();
        ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
    }
}

/// Door markers grouped by owning room code; the spawn room uses [`PLAYER_START_CODE`].
pub(crate) fn collect_door_markers(
    state: &GenerationState<'_>,
) -> BTreeMap<String, Vec<DoorMarker>> {
    let mut markers: BTreeMap<String, Vec<DoorMarker>> = BTreeMap::new();
    for cell in state.grid.positions() {
        let owner = match state.grid.get(cell) {
            Cell::Room => match state.room_at.get(&cell).and_then(|&id| state.rooms.get(id)) {
                Some(room) => room.code.as_str(),
                None => continue,
            },
            Cell::PlayerStart => PLAYER_START_CODE,
            _ => continue,
        };
        let is_spawn = owner == PLAYER_START_CODE;

        for dir in Dir::ALL {
            let neighbor = cell.step(dir);
            if !state.grid.in_bounds(neighbor) {
                continue;
            }
            let kind = state.grid.get(neighbor);
            let opens = if is_spawn {
                kind.is_live() && kind != Cell::PlayerStart
            } else {
                kind.is_live() && !kind.is_room_like()
            };
            if opens {
                markers.entry(owner.to_owned()).or_default().push(DoorMarker { cell, neighbor });
            }
        }
    }
    markers
}

/// Seals excess door markers per room, most crowded first, and returns the sealed edges.
pub(crate) fn seal_excess_doorways(
    state: &GenerationState<'_>,
    doorways: &mut DoorwayMap,
) -> Vec<Edge> {
    let mut sealed = Vec::new();
    for (code, markers) in collect_door_markers(state) {
        let cap = if code == PLAYER_START_CODE {
            PLAYER_START_DOOR_CAP
        } else {
            state.config.max_room_doors
        };
        if markers.len() <= cap {
            continue;
        }

        let excess = markers.len() - cap;
        for marker in select_markers_to_seal(markers, excess, doorways) {
            if let Some(connections) = doorways.get_mut(&marker.cell) {
                connections.remove(&marker.neighbor);
                if connections.is_empty() {
                    doorways.remove(&marker.cell);
                }
            }
            sealed.push(Edge { from: marker.cell, to: marker.neighbor });
        }
        debug!("room [{code}]: sealed {excess} excess door edges (cap {cap})");
    }
    sealed
}

fn select_markers_to_seal(
    mut remaining: Vec<DoorMarker>,
    count: usize,
    doorways: &DoorwayMap,
) -> Vec<DoorMarker> {
    let footprint = |marker: DoorMarker| doorways.get(&marker.cell).map_or(0, BTreeSet::len);
    let mut chosen = Vec::with_capacity(count);

    while chosen.len() < count && !remaining.is_empty() {
        let mut best_index = 0;
        let mut best_adjacent = None;
        for (index, &marker) in remaining.iter().enumerate() {
            let adjacent = remaining
                .iter()
                .filter(|&&other| {
                    other != marker && marker.distance(other) < ADJACENT_MARKER_DISTANCE
                })
                .count();
            let better = match best_adjacent {
                None => true,
                Some(best) if adjacent > best => true,
                Some(best) => {
                    adjacent == best && footprint(marker) < footprint(remaining[best_index])
                }
            };
            if better {
                best_index = index;
                best_adjacent = Some(adjacent);
            }
        }
        chosen.push(remaining.remove(best_index));
    }
    chosen
}

/// Edges between cells of rooms that were packed against each other.
pub(crate) fn room_separators(state: &GenerationState<'_>) -> Vec<RoomSeparator> {
    let rooms: Vec<_> = state.rooms.values().collect();
    let mut separators = Vec::new();
    for (index, first) in rooms.iter().enumerate() {
        for second in &rooms[index + 1..] {
            if !first.rect.expanded(1).intersects(&second.rect) {
                continue;
            }
            for cell in first.rect.cells() {
                for next in cell.neighbors() {
                    if second.rect.contains(next) && state.grid.in_bounds(next) {
                        separators.push(RoomSeparator {
                            code: first.code.clone(),
                            other_code: second.code.clone(),
                            edge: Edge { from: cell, to: next },
                        });
                    }
                }
            }
        }
    }
    if !separators.is_empty() {
        debug!("{} separator edges between touching rooms", separators.len());
    }
    separators
}
