//! A* pathfinding on the square grid and stepwise path following.
//!
//! Searches ignore unit occupancy; blockers are discovered while a unit
//! walks its stored path and stop it there.

use crate::coord::GridCoord;
use crate::map::Map;
use crate::terrain::Terrain;
use crate::types::{UnitId, MAX_PATH_EXPANSIONS};
use crate::unit::{UnitDomain, UnitType};
use crate::world::WorldState;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

/// Can a unit of this type stand on this terrain?
///
/// Land units use land and cities, sea units ocean only, air units anything.
pub fn can_enter(unit_type: UnitType, terrain: Terrain) -> bool {
    match unit_type.domain() {
        UnitDomain::Land => terrain.is_ground(),
        UnitDomain::Sea => terrain.is_water(),
        UnitDomain::Air => true,
    }
}

/// Node in the A* priority queue.
#[derive(Clone, Eq, PartialEq)]
struct PathNode {
    coord: GridCoord,
    f_cost: u32,
    // Discovery order, breaks f-cost ties in favor of the earlier node
    seq: u64,
}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (lowest f_cost first)
        other
            .f_cost
            .cmp(&self.f_cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Find the shortest path between two tiles using A*.
///
/// Steps cost 1 and only orthogonal moves are allowed. The returned path
/// includes both `start` and `goal`. Returns `None` if the goal terrain is
/// not enterable by `unit_type`, if no path exists, or if the search expands
/// more than [`MAX_PATH_EXPANSIONS`] nodes; on large open maps a long but
/// valid route can therefore be reported as missing.
pub fn find_path(
    unit_type: UnitType,
    start: GridCoord,
    goal: GridCoord,
    map: &Map,
) -> Option<Vec<GridCoord>> {
    if start == goal {
        return Some(vec![start]);
    }
    if !map.in_bounds(&goal) || !can_enter(unit_type, map.terrain_at(&goal)) {
        return None;
    }

    let mut open_set = BinaryHeap::new();
    let mut came_from: HashMap<GridCoord, GridCoord> = HashMap::new();
    let mut g_scores: HashMap<GridCoord, u32> = HashMap::new();
    let mut closed: HashSet<GridCoord> = HashSet::new();
    let mut seq = 0u64;

    g_scores.insert(start, 0);
    open_set.push(PathNode {
        coord: start,
        f_cost: start.distance(&goal),
        seq,
    });

    while let Some(current) = open_set.pop() {
        if current.coord == goal {
            return Some(reconstruct_path(&came_from, goal, start));
        }
        if !closed.insert(current.coord) {
            continue;
        }
        if closed.len() > MAX_PATH_EXPANSIONS {
            return None;
        }

        let current_g = *g_scores.get(&current.coord).unwrap_or(&u32::MAX);

        for neighbor in map.neighbors(&current.coord) {
            if closed.contains(&neighbor) || !can_enter(unit_type, map.terrain_at(&neighbor)) {
                continue;
            }

            let tentative_g = current_g.saturating_add(1);
            if tentative_g >= *g_scores.get(&neighbor).unwrap_or(&u32::MAX) {
                continue;
            }

            came_from.insert(neighbor, current.coord);
            g_scores.insert(neighbor, tentative_g);
            seq += 1;
            open_set.push(PathNode {
                coord: neighbor,
                f_cost: tentative_g + neighbor.distance(&goal),
                seq,
            });
        }
    }

    None
}

/// Reconstruct the path from came_from map.
fn reconstruct_path(
    came_from: &HashMap<GridCoord, GridCoord>,
    goal: GridCoord,
    start: GridCoord,
) -> Vec<GridCoord> {
    let mut path = vec![goal];
    let mut current = goal;

    while current != start {
        if let Some(&prev) = came_from.get(&current) {
            path.push(prev);
            current = prev;
        } else {
            break;
        }
    }

    path.reverse();
    path
}

/// How a unit's stored path stands after a turn of following it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathStatus {
    /// More steps remain for later turns.
    InProgress,
    /// The destination was reached.
    Completed,
    /// The next step was unusable; the path was dropped.
    Blocked,
}

/// Outcome of [`follow_path`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathProgress {
    pub from: GridCoord,
    pub to: GridCoord,
    pub steps: u32,
    pub status: PathStatus,
}

/// Walk a unit along its stored path, one tile per remaining move point.
///
/// Stops before a tile that is off the map, not enterable, occupied by
/// another unit, or holds a city its owner does not own. Reaching the end or
/// getting blocked clears the path and flags the unit for attention.
/// Returns `None` if the unit is unknown or has no path to follow.
pub fn follow_path(world: &mut WorldState, unit_id: UnitId) -> Option<PathProgress> {
    let unit = world.unit(unit_id)?;
    if !unit.is_following_path() {
        return None;
    }

    let from = unit.position;
    let mut position = from;
    let mut moves = unit.moves_remaining;
    let mut remaining = unit.movement_path.clone();
    remaining.reverse();
    let mut steps = 0u32;
    let mut blocked = false;

    while moves > 0 {
        let Some(&next) = remaining.last() else {
            break;
        };
        let usable = next.is_adjacent(&position)
            && world.in_bounds(&next)
            && can_enter(unit.unit_type, world.terrain_at(&next))
            && world.unit_at(&next).map_or(true, |u| u.id == unit_id)
            && world
                .city_at(&next)
                .map_or(true, |c| c.is_owned_by(unit.owner));
        if !usable {
            blocked = true;
            break;
        }
        position = next;
        remaining.pop();
        moves -= 1;
        steps += 1;
    }

    let status = if blocked {
        PathStatus::Blocked
    } else if remaining.is_empty() {
        PathStatus::Completed
    } else {
        PathStatus::InProgress
    };

    let unit = world.unit_mut(unit_id)?;
    unit.position = position;
    unit.use_moves(steps);
    match status {
        PathStatus::InProgress => {
            remaining.reverse();
            unit.movement_path = remaining;
        }
        PathStatus::Completed | PathStatus::Blocked => {
            unit.clear_movement_path();
            unit.needs_attention = true;
        }
    }

    Some(PathProgress {
        from,
        to: position,
        steps,
        status,
    })
}
