use anyhow::anyhow;
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[command(
    name = "Warehouse MAPF",
    about = "Warehouse robots planning with time-indexed A* around scheduled agents.",
    version = "1.0"
)]
pub struct Cli {
    #[arg(long, help = "Path to a YAML config file")]
    pub config: Option<String>,

    #[arg(long, help = "Path to the grid file")]
    pub map_path: Option<String>,

    #[arg(long, help = "Path to the scheduled agent file")]
    pub agents_path: Option<String>,

    #[arg(long, help = "Path to the robot file (text or YAML)")]
    pub robots_path: Option<String>,

    #[arg(long, help = "Seed for the random number generator")]
    pub seed: Option<u64>,

    #[arg(long, help = "Stop with an error after this many ticks")]
    pub max_ticks: Option<usize>,

    #[arg(long, help = "Collision replans allowed per robot")]
    pub max_replans: Option<usize>,

    #[arg(long, help = "Random draws allowed when a start cell is occupied")]
    pub spawn_attempts: Option<usize>,

    #[arg(long, help = "Node expansion budget for a single search")]
    pub max_expansions: Option<usize>,

    #[arg(long, help = "Write the final report as JSON to this path")]
    pub report_path: Option<String>,

    #[arg(long, help = "Default log filter when RUST_LOG is unset")]
    pub log_level: Option<String>,

    #[arg(
        long,
        help = "Dump resolved robots to debug.yaml",
        default_value_t = false
    )]
    pub debug_yaml: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub map_path: String,
    pub agents_path: String,
    pub robots_path: String,
    pub seed: u64,
    pub max_ticks: usize,
    pub max_replans: usize,
    pub spawn_attempts: usize,
    pub max_expansions: Option<usize>,
    pub report_path: Option<String>,
    pub log_level: String,
    pub debug_yaml: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            map_path: "map_file/data0.txt".to_string(),
            agents_path: "map_file/agent0.txt".to_string(),
            robots_path: "map_file/robots0.txt".to_string(),
            seed: 0,
            max_ticks: 10_000,
            max_replans: 64,
            spawn_attempts: 1_000,
            max_expansions: None,
            report_path: None,
            log_level: "info".to_string(),
            debug_yaml: false,
        }
    }
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn override_from_command_line(mut self, cli: &Cli) -> anyhow::Result<Self> {
        if let Some(map_path) = &cli.map_path {
            self.map_path = map_path.clone();
        }
        if let Some(agents_path) = &cli.agents_path {
            self.agents_path = agents_path.clone();
        }
        if let Some(robots_path) = &cli.robots_path {
            self.robots_path = robots_path.clone();
        }
        if let Some(seed) = cli.seed {
            self.seed = seed;
        }
        if let Some(max_ticks) = cli.max_ticks {
            self.max_ticks = max_ticks;
        }
        if let Some(max_replans) = cli.max_replans {
            self.max_replans = max_replans;
        }
        if let Some(spawn_attempts) = cli.spawn_attempts {
            self.spawn_attempts = spawn_attempts;
        }
        if cli.max_expansions.is_some() {
            self.max_expansions = cli.max_expansions;
        }
        if cli.report_path.is_some() {
            self.report_path = cli.report_path.clone();
        }
        if let Some(log_level) = &cli.log_level {
            self.log_level = log_level.clone();
        }
        self.debug_yaml |= cli.debug_yaml;

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_ticks == 0 {
            return Err(anyhow!("max_ticks must be greater than 0"));
        }
        if self.spawn_attempts == 0 {
            return Err(anyhow!("spawn_attempts must be greater than 0"));
        }
        if self.max_expansions == Some(0) {
            return Err(anyhow!("max_expansions must be greater than 0 when set"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml_str("seed: 7\nmax_ticks: 50\n").unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.max_ticks, 50);
        assert_eq!(config.map_path, Config::default().map_path);
        assert_eq!(config.max_expansions, None);
    }

    #[test]
    fn test_command_line_overrides_file() {
        let cli = Cli::parse_from([
            "warehouse_mapf",
            "--seed",
            "3",
            "--robots-path",
            "robots.yaml",
            "--max-expansions",
            "500",
        ]);
        let config = Config::from_yaml_str("seed: 7\nmax_replans: 2\n")
            .unwrap()
            .override_from_command_line(&cli)
            .unwrap();

        assert_eq!(config.seed, 3);
        assert_eq!(config.max_replans, 2);
        assert_eq!(config.robots_path, "robots.yaml");
        assert_eq!(config.max_expansions, Some(500));
    }

    #[test]
    fn test_validate_rejects_zero_budgets() {
        let cli = Cli::parse_from(["warehouse_mapf", "--max-ticks", "0"]);
        assert!(Config::default().override_from_command_line(&cli).is_err());

        let config = Config {
            spawn_attempts: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
