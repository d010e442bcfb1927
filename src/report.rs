use anyhow::Result;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;

use crate::common::{Path, Position};
use crate::stat::Stats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotOutcome {
    Reached,
    NoPath,
    EnRoute,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RobotReport {
    pub id: usize,
    pub start: Position,
    pub goal: Position,
    pub outcome: RobotOutcome,
    pub path: Path,
    pub total_time: usize,
    pub collisions: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub ticks: usize,
    pub robots: Vec<RobotReport>,
    pub stats: Stats,
}

impl SimulationReport {
    pub fn print(&self) {
        for robot in &self.robots {
            println!("Robot {} {:?} -> {:?}", robot.id, robot.start, robot.goal);
            if robot.outcome == RobotOutcome::NoPath {
                println!("Robot path: No Path");
            } else {
                println!("Robot path: {:?}", robot.path);
                println!("Total time taken: {}", robot.total_time);
                println!("Number of collisions: {}", robot.collisions);
            }
        }
    }

    pub fn write_json(&self, path: &str) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}
