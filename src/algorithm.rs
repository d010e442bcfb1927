mod astar;

pub use astar::a_star_search;

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::common::{Path, Position};

type Trace = HashMap<(Position, usize), (Position, usize)>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LowLevelOpenNode {
    pub(crate) position: Position,
    pub(crate) f_open_cost: usize,
    pub(crate) g_cost: usize,
    pub(crate) time_step: usize,
    // Push counter; equal f costs pop in insertion order.
    pub(crate) order: usize,
}

// Reversed so `BinaryHeap` pops the smallest f first.
impl Ord for LowLevelOpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f_open_cost
            .cmp(&self.f_open_cost)
            .then_with(|| other.order.cmp(&self.order))
    }
}

impl PartialOrd for LowLevelOpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn construct_path(trace: &Trace, mut current: (Position, usize)) -> Path {
    let mut path = vec![current.0];
    while let Some(&previous) = trace.get(&current) {
        path.push(previous.0);
        current = previous;
    }
    path.reverse();
    path
}
