use rand::Rng;
use serde::Serialize;
use std::collections::VecDeque;
use tracing::{debug, info, warn};

use crate::algorithm::a_star_search;
use crate::common::{Direction, Path, Position, RobotSpec};
use crate::error::SimulationError;
use crate::map::Map;
use crate::report::{RobotOutcome, RobotReport};
use crate::schedule::AgentSchedule;
use crate::stat::Stats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RobotState {
    Spawning,
    Planning,
    Moving,
    Collided,
    Done,
}

/// An actively planned robot. Once `current == goal` or `no_path` is set it
/// stops moving but stays around for collision checks and reporting.
#[derive(Debug, Clone)]
pub struct Robot {
    pub id: usize,
    pub start: Position,
    pub goal: Position,
    pub current: Position,
    pending: VecDeque<Position>,
    save_path: Path,
    collision_count: usize,
    no_path: bool,
    total_time: usize,
    state: RobotState,
}

impl Robot {
    /// Places the robot at its configured start, or at a uniformly drawn cell
    /// if that start is occupied at time 0. Gives up after `max_attempts`
    /// draws.
    pub fn spawn<R: Rng + ?Sized>(
        spec: &RobotSpec,
        map: &Map,
        schedule: &AgentSchedule,
        rng: &mut R,
        max_attempts: usize,
    ) -> Result<Self, SimulationError> {
        let mut robot = Robot {
            id: spec.id,
            start: spec.start,
            goal: spec.goal,
            current: spec.start,
            pending: VecDeque::new(),
            save_path: Vec::new(),
            collision_count: 0,
            no_path: false,
            total_time: 0,
            state: RobotState::Spawning,
        };

        let mut start = spec.start;
        let mut attempts = 0;
        while !schedule.is_free(map, start, 0) {
            if attempts == max_attempts || map.height == 0 || map.width == 0 {
                return Err(SimulationError::SpawnUnsatisfiable {
                    robot: spec.id,
                    start: spec.start,
                    attempts,
                });
            }
            attempts += 1;
            start = (
                rng.gen_range(0..map.height) as i32,
                rng.gen_range(0..map.width) as i32,
            );
            info!("Robot {} new start {start:?}", spec.id);
        }

        robot.start = start;
        robot.current = start;
        robot.save_path.push(start);
        robot.state = RobotState::Planning;
        Ok(robot)
    }

    /// Plans from the current cell at `time`. A goal on a static obstacle
    /// fails without searching. On failure the robot is permanently done.
    pub fn plan_path(
        &mut self,
        map: &Map,
        schedule: &AgentSchedule,
        time: usize,
        max_expansions: Option<usize>,
        stats: &mut Stats,
    ) -> bool {
        self.pending.clear();

        if map.is_obstacle(self.goal) {
            debug!("Robot {} goal {:?} is an obstacle", self.id, self.goal);
            self.no_path = true;
            self.state = RobotState::Done;
            return false;
        }

        match a_star_search(
            map,
            schedule,
            self.current,
            self.goal,
            time,
            max_expansions,
            stats,
        ) {
            Some((path, arrival_time)) => {
                debug!("Robot {} planned {path:?} arriving at {arrival_time}", self.id);
                // The first cell is where the robot already stands.
                self.pending = path.into_iter().skip(1).collect();
                self.total_time = arrival_time;
                // A collided robot stays `Collided` until its next move.
                if self.state != RobotState::Collided {
                    self.state = RobotState::Moving;
                }
                true
            }
            None => {
                warn!("Robot {} can't find path from {:?}", self.id, self.current);
                self.no_path = true;
                self.state = RobotState::Done;
                false
            }
        }
    }

    /// Consumes one pending cell. No-op once done or with nothing queued.
    pub fn advance(&mut self) -> bool {
        if self.is_done() {
            return false;
        }
        let Some(next) = self.pending.pop_front() else {
            return false;
        };

        self.current = next;
        self.save_path.push(next);
        self.state = if self.is_done() {
            RobotState::Done
        } else {
            RobotState::Moving
        };
        true
    }

    /// Nudges the robot one cell in `direction` and replans from there. The
    /// nudged cell is not checked against bounds or obstacles; planning from
    /// such a cell either steps back onto free floor or fails.
    pub fn handle_collision(
        &mut self,
        map: &Map,
        schedule: &AgentSchedule,
        time: usize,
        direction: Direction,
        max_expansions: Option<usize>,
        stats: &mut Stats,
    ) -> bool {
        self.collision_count += 1;
        self.state = RobotState::Collided;
        self.current = direction.apply(self.current);
        info!(
            "Robot {} collided, nudged {direction:?} to {:?}",
            self.id, self.current
        );

        let success = self.plan_path(map, schedule, time, max_expansions, stats);
        if !success {
            warn!(
                "Robot {} at {:?} failed to find new path after collision",
                self.id, self.current
            );
        }
        success
    }

    pub fn is_done(&self) -> bool {
        self.current == self.goal || self.no_path
    }

    pub fn state(&self) -> RobotState {
        if self.is_done() {
            RobotState::Done
        } else {
            self.state
        }
    }

    pub fn pending(&self) -> impl Iterator<Item = &Position> {
        self.pending.iter()
    }

    pub fn save_path(&self) -> &[Position] {
        &self.save_path
    }

    pub fn collision_count(&self) -> usize {
        self.collision_count
    }

    pub fn no_path(&self) -> bool {
        self.no_path
    }

    pub fn total_time(&self) -> usize {
        self.total_time
    }

    pub fn spec(&self) -> RobotSpec {
        RobotSpec {
            id: self.id,
            start: self.start,
            goal: self.goal,
        }
    }

    pub fn report(&self) -> RobotReport {
        let outcome = if self.no_path {
            RobotOutcome::NoPath
        } else if self.current == self.goal {
            RobotOutcome::Reached
        } else {
            RobotOutcome::EnRoute
        };
        RobotReport {
            id: self.id,
            start: self.start,
            goal: self.goal,
            outcome,
            path: self.save_path.clone(),
            total_time: self.total_time,
            collisions: self.collision_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ScheduledAgent;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn spec(start: Position, goal: Position) -> RobotSpec {
        RobotSpec { id: 1, start, goal }
    }

    #[test]
    fn test_spawn_keeps_free_start() {
        let map = Map::new(3, 3, &[]);
        let mut rng = StdRng::seed_from_u64(0);
        let robot =
            Robot::spawn(&spec((1, 1), (2, 2)), &map, &AgentSchedule::default(), &mut rng, 10)
                .unwrap();

        assert_eq!(robot.current, (1, 1));
        assert_eq!(robot.save_path(), &[(1, 1)]);
        assert_eq!(robot.state(), RobotState::Planning);
    }

    #[test]
    fn test_spawn_relocates_occupied_start() {
        let map = Map::new(4, 6, &[(0, 0)]);
        let schedule = AgentSchedule::new(vec![ScheduledAgent {
            id: 1,
            path: vec![(1, 1)],
            times: vec![0],
        }]);
        let mut rng = StdRng::seed_from_u64(3);

        for start in [(0, 0), (1, 1)] {
            let robot = Robot::spawn(&spec(start, (3, 5)), &map, &schedule, &mut rng, 1000).unwrap();
            assert_ne!(robot.current, start);
            assert!(map.in_bounds(robot.current));
            assert!(schedule.is_free(&map, robot.current, 0));
            assert_eq!(robot.start, robot.current);
        }
    }

    #[test]
    fn test_spawn_unsatisfiable() {
        let map = Map::new(2, 2, &[(0, 0), (0, 1), (1, 0), (1, 1)]);
        let mut rng = StdRng::seed_from_u64(0);

        let err = Robot::spawn(&spec((0, 0), (1, 1)), &map, &AgentSchedule::default(), &mut rng, 25)
            .unwrap_err();
        assert_eq!(
            err,
            SimulationError::SpawnUnsatisfiable {
                robot: 1,
                start: (0, 0),
                attempts: 25,
            }
        );
    }

    #[test]
    fn test_goal_is_obstacle_skips_search() {
        let map = Map::new(3, 3, &[(2, 2)]);
        let schedule = AgentSchedule::default();
        let mut rng = StdRng::seed_from_u64(0);
        let stats = &mut Stats::default();
        let mut robot = Robot::spawn(&spec((0, 0), (2, 2)), &map, &schedule, &mut rng, 10).unwrap();

        assert!(!robot.plan_path(&map, &schedule, 0, None, stats));
        assert!(robot.no_path());
        assert!(robot.is_done());
        assert_eq!(robot.state(), RobotState::Done);
        assert_eq!(stats.searches, 0);
        assert_eq!(stats.low_level_expand_nodes, 0);
    }

    #[test]
    fn test_move_semantics() {
        let map = Map::new(3, 3, &[]);
        let schedule = AgentSchedule::default();
        let mut rng = StdRng::seed_from_u64(0);
        let stats = &mut Stats::default();
        let mut robot = Robot::spawn(&spec((0, 0), (0, 2)), &map, &schedule, &mut rng, 10).unwrap();

        // Nothing queued yet.
        assert!(!robot.advance());
        assert_eq!(robot.current, (0, 0));
        assert_eq!(robot.save_path().len(), 1);

        assert!(robot.plan_path(&map, &schedule, 0, None, stats));
        assert_eq!(robot.pending().count(), 2);
        assert_eq!(robot.total_time(), 2);
        assert_eq!(robot.state(), RobotState::Moving);

        assert!(robot.advance());
        assert_eq!(robot.current, (0, 1));
        assert_eq!(robot.save_path(), &[(0, 0), (0, 1)]);

        assert!(robot.advance());
        assert_eq!(robot.current, (0, 2));
        assert_eq!(robot.state(), RobotState::Done);

        // At goal: no-op.
        assert!(!robot.advance());
        assert_eq!(robot.save_path().len(), 3);
    }

    #[test]
    fn test_handle_collision_nudges_and_replans() {
        let map = Map::new(5, 5, &[]);
        let schedule = AgentSchedule::default();
        let mut rng = StdRng::seed_from_u64(0);
        let stats = &mut Stats::default();
        let mut robot = Robot::spawn(&spec((2, 0), (2, 4)), &map, &schedule, &mut rng, 10).unwrap();
        robot.plan_path(&map, &schedule, 0, None, stats);
        robot.advance();
        assert_eq!(robot.current, (2, 1));

        assert!(robot.handle_collision(&map, &schedule, 1, Direction::Down, None, stats));
        assert_eq!(robot.collision_count(), 1);
        assert_eq!(robot.current, (3, 1));
        // Nudge is not a recorded move.
        assert_eq!(robot.save_path(), &[(2, 0), (2, 1)]);
        assert_eq!(robot.pending().count(), 4);
        assert_eq!(robot.pending().last(), Some(&(2, 4)));
        assert_eq!(robot.total_time(), 5);
        assert_eq!(robot.state(), RobotState::Collided);

        // The replanned route resumes on the next move.
        assert!(robot.advance());
        assert_eq!(robot.state(), RobotState::Moving);
        assert_eq!(robot.save_path().last(), Some(&robot.current));
    }

    #[test]
    fn test_handle_collision_off_grid_replans() {
        let map = Map::new(3, 3, &[]);
        let schedule = AgentSchedule::default();
        let mut rng = StdRng::seed_from_u64(0);
        let stats = &mut Stats::default();
        let mut robot = Robot::spawn(&spec((0, 0), (2, 0)), &map, &schedule, &mut rng, 10).unwrap();

        assert!(robot.handle_collision(&map, &schedule, 0, Direction::Up, None, stats));
        assert_eq!(robot.current, (-1, 0));
        assert_eq!(robot.pending().copied().collect::<Vec<_>>(), vec![(0, 0), (1, 0), (2, 0)]);
    }

    #[test]
    fn test_handle_collision_into_dead_end_fails() {
        // Nudged into a pocket sealed by obstacles and the grid edge.
        let map = Map::new(3, 3, &[(0, 1), (1, 0)]);
        let schedule = AgentSchedule::default();
        let mut rng = StdRng::seed_from_u64(0);
        let stats = &mut Stats::default();
        let mut robot = Robot::spawn(&spec((1, 1), (2, 2)), &map, &schedule, &mut rng, 10).unwrap();
        robot.current = (0, 0);

        assert!(!robot.handle_collision(&map, &schedule, 0, Direction::Left, None, stats));
        assert_eq!(robot.current, (0, -1));
        assert!(robot.no_path());
        assert_eq!(robot.state(), RobotState::Done);
        assert_eq!(robot.report().outcome, RobotOutcome::NoPath);
    }
}
