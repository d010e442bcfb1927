use super::{construct_path, LowLevelOpenNode};
use crate::common::{manhattan_distance, Path, Position};
use crate::map::Map;
use crate::schedule::{AgentSchedule, MAX_CYCLE_LENGTH};
use crate::stat::Stats;

use std::collections::{BinaryHeap, HashMap, HashSet};
use tracing::{debug, instrument, trace};

/// Time-indexed A* over `(cell, time)`. Every step takes one tick and must
/// land on a cell that is free at the arrival time; there is no wait move.
///
/// Returns the cell sequence from `start` to `goal` inclusive together with
/// the absolute arrival time, or `None` once the frontier is exhausted or the
/// optional expansion budget runs out.
///
/// States that share a cell and a phase of the combined agent schedule have
/// identical futures, so only the earliest one is expanded. This keeps the
/// search finite on unreachable goals without changing the arrival time.
/// When the combined cycle is too long to track, states are keyed on exact
/// time instead and, unless a budget was given, the search stops after
/// `MAX_CYCLE_LENGTH` expansions per grid cell.
#[instrument(skip_all, name = "a_star", fields(start = ?start, goal = ?goal, start_time = start_time), level = "debug")]
pub fn a_star_search(
    map: &Map,
    schedule: &AgentSchedule,
    start: Position,
    goal: Position,
    start_time: usize,
    max_expansions: Option<usize>,
    stats: &mut Stats,
) -> Option<(Path, usize)> {
    stats.searches += 1;

    let cycle_length = schedule.cycle_length();
    let phase = |time: usize| cycle_length.map_or(time, |cycle| time % cycle);
    let expansion_limit = max_expansions.or_else(|| {
        cycle_length.is_none().then(|| {
            map.height
                .saturating_mul(map.width)
                .saturating_mul(MAX_CYCLE_LENGTH)
                .max(1)
        })
    });

    let mut open_list = BinaryHeap::new();
    let mut closed_list = HashSet::new();
    let mut trace = HashMap::new();
    let mut order = 0;
    let mut expanded = 0;

    open_list.push(LowLevelOpenNode {
        position: start,
        f_open_cost: manhattan_distance(start, goal),
        g_cost: 0,
        time_step: start_time,
        order,
    });

    while let Some(current) = open_list.pop() {
        if !closed_list.insert((current.position, phase(current.time_step))) {
            continue;
        }
        trace!("expand node: {current:?}");

        stats.low_level_expand_nodes += 1;
        expanded += 1;

        if current.position == goal {
            let path = construct_path(&trace, (current.position, current.time_step));
            debug!("found path {path:?} arriving at {}", current.time_step);
            return Some((path, current.time_step));
        }

        if expansion_limit.is_some_and(|limit| expanded >= limit) {
            debug!("expansion budget of {expanded} nodes exhausted");
            return None;
        }

        // Uniform cost: one tick per step.
        let tentative_g_cost = current.g_cost + 1;
        let tentative_time_step = current.time_step + 1;

        for neighbor in map.get_neighbors(current.position) {
            if !schedule.is_free(map, neighbor, tentative_time_step) {
                continue;
            }

            if closed_list.contains(&(neighbor, phase(tentative_time_step))) {
                continue;
            }

            // Same cell and time always means the same g cost; the first
            // parent recorded wins.
            let state = (neighbor, tentative_time_step);
            if trace.contains_key(&state) {
                continue;
            }
            trace.insert(state, (current.position, current.time_step));

            order += 1;
            open_list.push(LowLevelOpenNode {
                position: neighbor,
                f_open_cost: tentative_g_cost + manhattan_distance(neighbor, goal),
                g_cost: tentative_g_cost,
                time_step: tentative_time_step,
                order,
            });
        }
    }

    debug!("cannot find solution");
    None
}
