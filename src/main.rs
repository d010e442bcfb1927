use warehouse_mapf::config::{Cli, Config};
use warehouse_mapf::scenario::{write_robots_to_yaml, Scenario};
use warehouse_mapf::simulation::{Simulation, SimulationLimits};

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = if let Some(config_file) = cli.config.as_ref() {
        let config_str = std::fs::read_to_string(config_file)
            .with_context(|| format!("error reading config file: {config_file}"))?;
        Config::from_yaml_str(&config_str)
            .with_context(|| format!("error with config file: {config_file}"))?
    } else {
        Config::default()
    }
    .override_from_command_line(&cli)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();
    if cli.config.is_none() {
        info!("No config file specified, using default config");
    }

    let scenario = Scenario::load(&config.map_path, &config.agents_path, &config.robots_path)?;
    let rng = StdRng::seed_from_u64(config.seed);
    let simulation = Simulation::new(scenario, SimulationLimits::from(&config), rng)?;

    if config.debug_yaml {
        write_robots_to_yaml("debug.yaml", &simulation.robot_specs())
            .context("error writing debug.yaml")?;
    }

    let report = simulation.run()?;
    report.print();
    report.stats.print();

    if let Some(report_path) = &config.report_path {
        report
            .write_json(report_path)
            .with_context(|| format!("error writing report: {report_path}"))?;
        info!("Report written to {report_path}");
    }

    Ok(())
}
