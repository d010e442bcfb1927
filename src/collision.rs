use rand::Rng;
use std::collections::HashMap;

use crate::common::{Direction, Position};
use crate::robot::Robot;

/// Groups robots sharing a cell after everyone has moved. Returns indices
/// into `robots`, groups ordered by the first robot seen on each cell.
pub fn detect_robot_collisions(robots: &[Robot]) -> Vec<Vec<usize>> {
    let mut cells: HashMap<Position, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for (index, robot) in robots.iter().enumerate() {
        match cells.get(&robot.current) {
            Some(&group) => groups[group].push(index),
            None => {
                cells.insert(robot.current, groups.len());
                groups.push(vec![index]);
            }
        }
    }

    groups.retain(|group| group.len() > 1);
    groups
}

pub fn get_random_direction<R: Rng + ?Sized>(rng: &mut R) -> Direction {
    Direction::random(rng)
}
