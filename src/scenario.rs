use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::Path as FsPath;
use tracing::info;

use crate::common::{Position, RobotSpec, ScheduledAgent};
use crate::error::{InputKind, ParseError};
use crate::map::Map;
use crate::schedule::AgentSchedule;

/// Everything a simulation run reads from disk.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub map: Map,
    pub schedule: AgentSchedule,
    pub robots: Vec<RobotSpec>,
}

impl Scenario {
    pub fn load(map_path: &str, agents_path: &str, robots_path: &str) -> Result<Self> {
        let map = Map::from_file(map_path)
            .with_context(|| format!("error loading grid: {map_path}"))?;
        let agents = load_agents_from_file(agents_path)
            .with_context(|| format!("error loading agents: {agents_path}"))?;
        let robots = load_robots(robots_path)
            .with_context(|| format!("error loading robots: {robots_path}"))?;

        info!(
            "Loaded {}x{} grid with {} obstacles, {} scheduled agents, {} robots",
            map.height,
            map.width,
            map.obstacles().count(),
            agents.len(),
            robots.len()
        );

        Ok(Scenario {
            map,
            schedule: AgentSchedule::new(agents),
            robots,
        })
    }
}

pub fn load_agents_from_file(path: &str) -> Result<Vec<ScheduledAgent>, ParseError> {
    let content = read(path, InputKind::Agent)?;
    parse_agents(&content)
}

/// One agent per line: `path: [(r,c), (r,c), ...] at times [t0, t1, ...]`.
/// Ids are assigned sequentially from 1.
pub fn parse_agents(content: &str) -> Result<Vec<ScheduledAgent>, ParseError> {
    let mut agents = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line_no = index + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (path_part, times_part) = line.split_once(" at times ").ok_or_else(|| {
            ParseError::malformed(InputKind::Agent, line_no, "expected ' at times ' separator")
        })?;
        let (_, cells) = path_part.split_once(':').ok_or_else(|| {
            ParseError::malformed(InputKind::Agent, line_no, "expected 'path:' prefix")
        })?;

        let path = parse_position_list(cells, InputKind::Agent, line_no)?;
        let times = times_part
            .trim()
            .trim_start_matches('[')
            .trim_end_matches(']')
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| {
                token.parse::<i64>().map_err(|err| {
                    ParseError::malformed(
                        InputKind::Agent,
                        line_no,
                        format!("invalid time marker {token:?}: {err}"),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if path.is_empty() {
            return Err(ParseError::malformed(InputKind::Agent, line_no, "empty path"));
        }
        if path.len() != times.len() {
            return Err(ParseError::malformed(
                InputKind::Agent,
                line_no,
                format!("{} cells but {} time markers", path.len(), times.len()),
            ));
        }

        agents.push(ScheduledAgent {
            id: agents.len() + 1,
            path,
            times,
        });
    }

    Ok(agents)
}

/// Robots come either as the text format or, for `.yaml`/`.yml` files, as a
/// YAML list of `RobotSpec`.
pub fn load_robots(path: &str) -> Result<Vec<RobotSpec>> {
    let is_yaml = FsPath::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == "yaml" || ext == "yml");

    if is_yaml {
        load_robots_from_yaml(path)
    } else {
        Ok(load_robots_from_file(path)?)
    }
}

pub fn load_robots_from_file(path: &str) -> Result<Vec<RobotSpec>, ParseError> {
    let content = read(path, InputKind::Robot)?;
    parse_robots(&content)
}

/// One robot per line: `Start (r,c) End (r,c)`.
pub fn parse_robots(content: &str) -> Result<Vec<RobotSpec>, ParseError> {
    let mut robots = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line_no = index + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (start, goal) = line.split_once(" End ").ok_or_else(|| {
            ParseError::malformed(InputKind::Robot, line_no, "expected ' End ' separator")
        })?;
        let start = start.trim().strip_prefix("Start").ok_or_else(|| {
            ParseError::malformed(InputKind::Robot, line_no, "expected 'Start' prefix")
        })?;

        robots.push(RobotSpec {
            id: robots.len() + 1,
            start: parse_position(start, InputKind::Robot, line_no)?,
            goal: parse_position(goal, InputKind::Robot, line_no)?,
        });
    }

    Ok(robots)
}

pub fn load_robots_from_yaml(path: &str) -> Result<Vec<RobotSpec>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let robots = serde_yaml::from_reader(reader)?;
    Ok(robots)
}

pub fn write_robots_to_yaml(path: &str, robots: &[RobotSpec]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = io::BufWriter::new(file);
    let yaml_data = serde_yaml::to_string(&robots)?;
    writer.write_all(yaml_data.as_bytes())?;

    Ok(())
}

fn read(path: &str, kind: InputKind) -> Result<String, ParseError> {
    fs::read_to_string(path).map_err(|source| ParseError::Io { kind, source })
}

fn parse_position(text: &str, kind: InputKind, line: usize) -> Result<Position, ParseError> {
    let inner = text
        .trim()
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| ParseError::malformed(kind, line, format!("expected (r,c), got {text:?}")))?;
    let (row, col) = inner
        .split_once(',')
        .ok_or_else(|| ParseError::malformed(kind, line, format!("expected (r,c), got {text:?}")))?;

    let coordinate = |value: &str| {
        value.trim().parse::<i32>().map_err(|err| {
            ParseError::malformed(kind, line, format!("invalid coordinate {value:?}: {err}"))
        })
    };
    Ok((coordinate(row)?, coordinate(col)?))
}

fn parse_position_list(text: &str, kind: InputKind, line: usize) -> Result<Vec<Position>, ParseError> {
    let inner = text
        .trim()
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| ParseError::malformed(kind, line, "expected [...] around path"))?;

    let mut positions = Vec::new();
    let mut rest = inner.trim();
    while !rest.is_empty() {
        let close = rest
            .find(')')
            .ok_or_else(|| ParseError::malformed(kind, line, "unclosed '(' in path"))?;
        positions.push(parse_position(&rest[..=close], kind, line)?);
        rest = rest[close + 1..].trim_start().trim_start_matches(',').trim_start();
    }
    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_agents() {
        let content = "path: [(0,1), (1, 1), (2,1)] at times [0, 1, 2]\n\
                       \n\
                       path: [(4,4)] at times [0]\n";
        let agents = parse_agents(content).unwrap();

        assert_eq!(agents.len(), 2);
        assert_eq!(agents[0].id, 1);
        assert_eq!(agents[0].path, vec![(0, 1), (1, 1), (2, 1)]);
        assert_eq!(agents[0].times, vec![0, 1, 2]);
        assert_eq!(agents[1].id, 2);
        assert_eq!(agents[1].path, vec![(4, 4)]);
    }

    #[test]
    fn test_parse_agents_accepts_negative_markers() {
        let agents = parse_agents("path: [(0,1), (1,1)] at times [-1, 1]\n").unwrap();
        assert_eq!(agents[0].times, vec![-1, 1]);

        let schedule = AgentSchedule::new(agents);
        assert!(!schedule.is_reserved((0, 1), 0));
        assert!(!schedule.is_reserved((0, 1), 1));
        assert!(schedule.is_reserved((1, 1), 1));
        assert!(!schedule.is_reserved((1, 1), 2));
    }

    #[test]
    fn test_parse_agents_rejects_length_mismatch() {
        let err = parse_agents("path: [(0,1), (1,1)] at times [0]\n").unwrap_err();
        assert_eq!(err.line(), Some(1));
        assert!(err.to_string().contains("2 cells but 1 time markers"));
    }

    #[test]
    fn test_parse_agents_reports_offending_line() {
        let content = "path: [(0,1)] at times [0]\npath: [(0,x)] at times [0]\n";
        let err = parse_agents(content).unwrap_err();
        assert_eq!(err.line(), Some(2));
        assert!(err.to_string().contains("agent"));
    }

    #[test]
    fn test_parse_robots() {
        let robots = parse_robots("Start (0,0) End (4,4)\nStart (2, 3) End (0,1)\n").unwrap();
        assert_eq!(
            robots,
            vec![
                RobotSpec {
                    id: 1,
                    start: (0, 0),
                    goal: (4, 4),
                },
                RobotSpec {
                    id: 2,
                    start: (2, 3),
                    goal: (0, 1),
                },
            ]
        );
    }

    #[test]
    fn test_parse_robots_malformed() {
        let err = parse_robots("Start (0,0) End (4,4)\nStart (0,0) to (1,1)\n").unwrap_err();
        assert_eq!(err.line(), Some(2));

        let err = parse_robots("Start (a,0) End (4,4)\n").unwrap_err();
        assert_eq!(err.line(), Some(1));
    }

    #[test]
    fn test_load_scenario_files() {
        let scenario = Scenario::load(
            "map_file/test/test.map",
            "map_file/test/test_agents.txt",
            "map_file/test/test_robots.txt",
        )
        .unwrap();

        assert_eq!(scenario.map.height, 5);
        assert_eq!(scenario.schedule.agents().len(), 1);
        assert_eq!(scenario.robots.len(), 2);
    }

    #[test]
    fn test_robots_yaml_round_trip() {
        let robots = parse_robots("Start (0,0) End (4,4)\n").unwrap();
        let path = std::env::temp_dir().join("warehouse_mapf_robots_test.yaml");
        let path = path.to_str().unwrap();

        write_robots_to_yaml(path, &robots).unwrap();
        assert_eq!(load_robots(path).unwrap(), robots);
        let _ = fs::remove_file(path);
    }
}
