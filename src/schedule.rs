use std::collections::{HashMap, HashSet};

use crate::common::{Position, ScheduledAgent};
use crate::map::Map;

/// Upper bound on the combined schedule cycle used for phase pruning in the
/// search; beyond it the cycle is treated as unknown.
pub(crate) const MAX_CYCLE_LENGTH: usize = 1 << 16;

/// Read-only registry of scheduled agents with a precomputed reservation
/// table, keyed per distinct period by `(cell, time % period)`.
#[derive(Debug, Clone, Default)]
pub struct AgentSchedule {
    agents: Vec<ScheduledAgent>,
    reserved: HashMap<usize, HashSet<(Position, usize)>>,
}

impl AgentSchedule {
    pub fn new(agents: Vec<ScheduledAgent>) -> Self {
        let mut reserved: HashMap<usize, HashSet<(Position, usize)>> = HashMap::new();
        for agent in &agents {
            let period = agent.period();
            if period == 0 {
                continue;
            }
            let slots = reserved.entry(period).or_default();
            for (&position, &time) in agent.path.iter().zip(&agent.times) {
                // Negative markers, or ones at or past the period, can never
                // equal `t % period`.
                if let Ok(time) = usize::try_from(time) {
                    if time < period {
                        slots.insert((position, time));
                    }
                }
            }
        }
        AgentSchedule { agents, reserved }
    }

    pub fn agents(&self) -> &[ScheduledAgent] {
        &self.agents
    }

    pub fn is_reserved(&self, position: Position, time: usize) -> bool {
        self.reserved
            .iter()
            .any(|(period, slots)| slots.contains(&(position, time % period)))
    }

    /// Occupancy predicate used by the pathfinder. Never looks at robots.
    pub fn is_free(&self, map: &Map, position: Position, time: usize) -> bool {
        !map.is_obstacle(position) && !self.is_reserved(position, time)
    }

    /// Least common multiple of all schedule periods: the reservation state
    /// at `t` equals the one at `t + cycle_length`. `None` when it exceeds
    /// `MAX_CYCLE_LENGTH`.
    pub fn cycle_length(&self) -> Option<usize> {
        self.reserved.keys().try_fold(1usize, |acc, &period| {
            let lcm = acc / gcd(acc, period) * period;
            (lcm <= MAX_CYCLE_LENGTH).then_some(lcm)
        })
    }
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}
