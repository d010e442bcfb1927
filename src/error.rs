//! Error types for loading inputs and running the simulation.

use std::fmt;

use thiserror::Error;

use crate::common::Position;

/// Which input file a [`ParseError`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Grid,
    Agent,
    Robot,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputKind::Grid => write!(f, "grid"),
            InputKind::Agent => write!(f, "agent"),
            InputKind::Robot => write!(f, "robot"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read {kind} file: {source}")]
    Io {
        kind: InputKind,
        #[source]
        source: std::io::Error,
    },

    /// `line` is 1-based.
    #[error("malformed {kind} file, line {line}: {message}")]
    Malformed {
        kind: InputKind,
        line: usize,
        message: String,
    },
}

impl ParseError {
    pub(crate) fn malformed(kind: InputKind, line: usize, message: impl Into<String>) -> Self {
        ParseError::Malformed {
            kind,
            line,
            message: message.into(),
        }
    }

    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::Malformed { line, .. } => Some(*line),
            ParseError::Io { .. } => None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimulationError {
    #[error("unsatisfiable spawn for robot {robot}: start {start:?} occupied and no free cell found in {attempts} attempts")]
    SpawnUnsatisfiable {
        robot: usize,
        start: Position,
        attempts: usize,
    },

    #[error("simulation did not converge within {ticks} ticks")]
    DidNotConverge { ticks: usize },

    #[error("simulation did not converge: robot {robot} replanned {replans} times after collisions")]
    ReplanBudgetExhausted { robot: usize, replans: usize },
}
