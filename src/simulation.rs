use rand::Rng;
use std::time::Instant;
use tracing::info;

use crate::collision::{detect_robot_collisions, get_random_direction};
use crate::common::RobotSpec;
use crate::config::Config;
use crate::error::SimulationError;
use crate::map::Map;
use crate::report::SimulationReport;
use crate::robot::Robot;
use crate::scenario::Scenario;
use crate::schedule::AgentSchedule;
use crate::stat::Stats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationLimits {
    pub max_ticks: usize,
    pub max_replans: usize,
    pub spawn_attempts: usize,
    pub max_expansions: Option<usize>,
}

impl Default for SimulationLimits {
    fn default() -> Self {
        SimulationLimits::from(&Config::default())
    }
}

impl From<&Config> for SimulationLimits {
    fn from(config: &Config) -> Self {
        SimulationLimits {
            max_ticks: config.max_ticks,
            max_replans: config.max_replans,
            spawn_attempts: config.spawn_attempts,
            max_expansions: config.max_expansions,
        }
    }
}

/// Discrete-time driver. Each tick moves every robot one cell, then resolves
/// same-cell collisions by nudging and replanning every robot involved.
pub struct Simulation<R: Rng> {
    map: Map,
    schedule: AgentSchedule,
    robots: Vec<Robot>,
    time: usize,
    rng: R,
    limits: SimulationLimits,
    stats: Stats,
}

impl<R: Rng> Simulation<R> {
    pub fn new(
        scenario: Scenario,
        limits: SimulationLimits,
        mut rng: R,
    ) -> Result<Self, SimulationError> {
        let Scenario {
            map,
            schedule,
            robots,
        } = scenario;

        let robots = robots
            .iter()
            .map(|spec| Robot::spawn(spec, &map, &schedule, &mut rng, limits.spawn_attempts))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Simulation {
            map,
            schedule,
            robots,
            time: 0,
            rng,
            limits,
            stats: Stats::default(),
        })
    }

    pub fn robots(&self) -> &[Robot] {
        &self.robots
    }

    pub fn robot_specs(&self) -> Vec<RobotSpec> {
        self.robots.iter().map(Robot::spec).collect()
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Plans every robot from its spawn cell at the current time.
    pub fn plan_all(&mut self) {
        for robot in &mut self.robots {
            robot.plan_path(
                &self.map,
                &self.schedule,
                self.time,
                self.limits.max_expansions,
                &mut self.stats,
            );
        }
    }

    /// Runs one tick. Returns `Ok(true)` once every robot is done.
    pub fn step(&mut self) -> Result<bool, SimulationError> {
        self.stats.ticks += 1;

        for robot in &mut self.robots {
            info!("Robot {} @ {:?}", robot.id, robot.current);
            robot.advance();
        }

        // Positions now belong to the next time step; replanning starts there.
        let replan_time = self.time + 1;
        for group in detect_robot_collisions(&self.robots) {
            info!(
                "Collision detected between robots {:?} at position {:?}",
                group.iter().map(|&index| self.robots[index].id).collect::<Vec<_>>(),
                self.robots[group[0]].current
            );
            self.stats.collisions += 1;

            for index in group {
                let direction = get_random_direction(&mut self.rng);
                let robot = &mut self.robots[index];
                robot.handle_collision(
                    &self.map,
                    &self.schedule,
                    replan_time,
                    direction,
                    self.limits.max_expansions,
                    &mut self.stats,
                );
                self.stats.replans += 1;

                if robot.collision_count() > self.limits.max_replans {
                    return Err(SimulationError::ReplanBudgetExhausted {
                        robot: robot.id,
                        replans: robot.collision_count(),
                    });
                }
            }
        }

        if self.robots.iter().all(Robot::is_done) {
            return Ok(true);
        }

        self.time += 1;
        if self.stats.ticks >= self.limits.max_ticks {
            return Err(SimulationError::DidNotConverge {
                ticks: self.stats.ticks,
            });
        }
        Ok(false)
    }

    pub fn run(mut self) -> Result<SimulationReport, SimulationError> {
        let total_start_time = Instant::now();

        self.plan_all();
        while !self.step()? {}

        self.stats.time_ms = total_start_time.elapsed().as_micros() as usize;
        info!("All robots done after {} ticks", self.stats.ticks);

        Ok(SimulationReport {
            ticks: self.stats.ticks,
            robots: self.robots.iter().map(Robot::report).collect(),
            stats: self.stats,
        })
    }
}
