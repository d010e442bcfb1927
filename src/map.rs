use std::fs;

use crate::common::Position;
use crate::error::{InputKind, ParseError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    passable: bool,
}

impl Tile {
    pub fn is_passable(&self) -> bool {
        self.passable
    }
}

/// Static warehouse floor: bounds plus obstacle cells. Rows shorter than the
/// widest row are padded with free tiles.
#[derive(Debug, Clone)]
pub struct Map {
    pub height: usize,
    pub width: usize,
    pub grid: Vec<Vec<Tile>>,
}

impl Map {
    pub fn new(height: usize, width: usize, obstacles: &[Position]) -> Self {
        let mut map = Map {
            height,
            width,
            grid: vec![vec![Tile { passable: true }; width]; height],
        };
        for &position in obstacles {
            if map.in_bounds(position) {
                map.grid[position.0 as usize][position.1 as usize].passable = false;
            }
        }
        map
    }

    pub fn from_file(path: &str) -> Result<Self, ParseError> {
        let content = fs::read_to_string(path).map_err(|source| ParseError::Io {
            kind: InputKind::Grid,
            source,
        })?;
        Self::parse(&content)
    }

    /// First line is the height, followed by `height` rows where `X` marks an
    /// obstacle and any other character is floor.
    pub fn parse(content: &str) -> Result<Self, ParseError> {
        let mut lines = content.lines();

        let header = lines
            .next()
            .ok_or_else(|| ParseError::malformed(InputKind::Grid, 1, "missing height line"))?;
        let height = header.trim().parse::<usize>().map_err(|err| {
            ParseError::malformed(
                InputKind::Grid,
                1,
                format!("invalid height {:?}: {err}", header.trim()),
            )
        })?;
        if height == 0 {
            return Err(ParseError::malformed(
                InputKind::Grid,
                1,
                "height must be positive",
            ));
        }

        let rows: Vec<Vec<char>> = lines
            .take(height)
            .map(|line| line.trim_end_matches('\r').chars().collect())
            .collect();
        if rows.len() < height {
            return Err(ParseError::malformed(
                InputKind::Grid,
                rows.len() + 2,
                format!("expected {height} rows, found {}", rows.len()),
            ));
        }

        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        if width == 0 {
            return Err(ParseError::malformed(InputKind::Grid, 2, "grid has no columns"));
        }

        let grid = rows
            .iter()
            .map(|row| {
                (0..width)
                    .map(|col| Tile {
                        passable: row.get(col) != Some(&'X'),
                    })
                    .collect()
            })
            .collect();

        Ok(Map {
            height,
            width,
            grid,
        })
    }

    pub fn in_bounds(&self, position: Position) -> bool {
        position.0 >= 0
            && position.1 >= 0
            && (position.0 as usize) < self.height
            && (position.1 as usize) < self.width
    }

    /// Cells outside the grid are not static obstacles; bounds are enforced
    /// by the neighbourhood instead.
    pub fn is_obstacle(&self, position: Position) -> bool {
        self.in_bounds(position) && !self.grid[position.0 as usize][position.1 as usize].passable
    }

    pub fn obstacles(&self) -> impl Iterator<Item = Position> + '_ {
        self.grid.iter().enumerate().flat_map(|(row, tiles)| {
            tiles
                .iter()
                .enumerate()
                .filter(|(_, tile)| !tile.is_passable())
                .map(move |(col, _)| (row as i32, col as i32))
        })
    }

    /// In-bounds 4-neighbourhood (right, down, left, up). No wait move.
    pub fn get_neighbors(&self, position: Position) -> Vec<Position> {
        let directions = [(0, 1), (1, 0), (0, -1), (-1, 0)];
        let mut neighbors = Vec::with_capacity(4);

        for &(dr, dc) in &directions {
            let next = (position.0 + dr, position.1 + dc);
            if self.in_bounds(next) {
                neighbors.push(next);
            }
        }

        neighbors
    }
}
