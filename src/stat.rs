use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub ticks: usize,
    pub collisions: usize,
    pub replans: usize,
    pub searches: usize,
    pub low_level_expand_nodes: usize,
    pub time_ms: usize,
}

impl Stats {
    pub fn print(&self) {
        info!(
            "Ticks {:?} Time(microseconds) {:?} Collisions {:?} Replans {:?} Searches {:?} Low level expand nodes number {:?}",
            self.ticks, self.time_ms, self.collisions, self.replans, self.searches, self.low_level_expand_nodes
        );
    }
}
