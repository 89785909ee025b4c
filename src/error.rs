//! Error types. Play itself never fails; only setup and persistence can.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::{Coord, Point};

/// Rejected game configuration or level table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("grid size {size} is too small (minimum {min})")]
    GridTooSmall { size: Coord, min: Coord },

    #[error("grid size {size} is too large (maximum {max})")]
    GridTooLarge { size: Coord, max: Coord },

    #[error("minimum step interval must be non-zero")]
    ZeroInterval,

    #[error("initial interval {initial:?} is below the floor {floor:?}")]
    IntervalBelowFloor { initial: Duration, floor: Duration },

    #[error("input queue capacity must be at least 1")]
    ZeroQueueCapacity,

    #[error("food per level must be at least 1")]
    ZeroFoodPerLevel,

    #[error("speed-up cadence must be at least 1")]
    ZeroSpeedUpCadence,

    #[error("level {level} has obstacle {cell:?} outside the grid")]
    ObstacleOutOfBounds { level: u32, cell: Point },

    #[error("level 1 obstacle {0:?} overlaps the starting worm")]
    StartBlocked(Point),
}

/// High-score persistence failure.
#[derive(Debug, Error)]
pub enum HighScoreError {
    #[error("could not determine a data directory")]
    NoDataDir,

    #[error("high score file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("high score file {path} holds {content:?}, not a number")]
    Malformed { path: PathBuf, content: String },
}

/// Top-level error for the terminal front end.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    HighScore(#[from] HighScoreError),

    #[error("logger: {0}")]
    Logger(#[from] log::SetLoggerError),

    #[error("terminal: {0}")]
    Io(#[from] io::Error),
}
