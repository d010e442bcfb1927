use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Grid cell as (row, col). Signed, since a collision nudge may push a robot
/// outside the grid.
pub type Position = (i32, i32);

pub type Path = Vec<Position>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Right,
    Down,
    Left,
    Up,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Down,
        Direction::Left,
        Direction::Up,
    ];

    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Right => (0, 1),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Up => (-1, 0),
        }
    }

    pub fn apply(self, position: Position) -> Position {
        let (dr, dc) = self.offset();
        (position.0 + dr, position.1 + dc)
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Direction {
        *Self::ALL.choose(rng).unwrap_or(&Direction::Right)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotSpec {
    pub id: usize,
    pub start: Position,
    pub goal: Position,
}

/// A non-reactive mover with a cyclic occupancy pattern: at time `t` it
/// holds `path[i]` for every `i` with `times[i] == t % times.len()`. Markers
/// that are negative or not below the period never match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledAgent {
    pub id: usize,
    pub path: Path,
    pub times: Vec<i64>,
}

impl ScheduledAgent {
    pub fn period(&self) -> usize {
        self.times.len()
    }

    /// Cells held at `time`, scanning the raw schedule.
    pub fn occupied_at(&self, time: usize) -> impl Iterator<Item = Position> + '_ {
        let phase = if self.times.is_empty() {
            None
        } else {
            Some((time % self.times.len()) as i64)
        };
        self.times
            .iter()
            .zip(&self.path)
            .filter(move |(t, _)| Some(**t) == phase)
            .map(|(_, position)| *position)
    }
}

pub fn manhattan_distance(a: Position, b: Position) -> usize {
    ((a.0 - b.0).unsigned_abs() + (a.1 - b.1).unsigned_abs()) as usize
}
