//! Grid worm game: a UI-agnostic simulation core.
//!
//! The library owns the game rules (movement, buffered input, collisions,
//! food, levels and speed) and a frame scheduler with an injectable clock.
//! Drawing and key capture live with the caller; see the `worm` binary for a
//! terminal front end.

pub mod config;
pub mod error;
pub mod high_score;
pub mod input;
pub mod levels;
pub mod render;
pub mod scheduler;
pub mod session;
pub mod state;

pub use config::GameConfig;
pub use error::{ConfigError, Error, HighScoreError};
pub use high_score::{FileStore, HighScoreStore, MemoryStore};
pub use input::{Command, Enqueue, InputBuffer};
pub use levels::LevelTable;
pub use render::{Raster2D, Tile, rasterize};
pub use scheduler::{Clock, LoopControl, ManualClock, MonotonicClock, Renderer, Scheduler};
pub use session::{Session, StepResult};
pub use state::{Cause, GameState, Phase, Snapshot};

/// Integer coordinate type for grid cells (not pixels)
pub type Coord = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub x: Coord,
    pub y: Coord,
}

impl Point {
    #[inline]
    pub const fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }

    /// The neighbouring cell one step in `dir`.
    #[inline]
    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.dx_dy();
        Self::new(self.x + dx, self.y + dy)
    }

    #[inline]
    pub fn in_grid(self, size: Coord) -> bool {
        self.x >= 0 && self.x < size && self.y >= 0 && self.y < size
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    #[inline]
    pub fn dx_dy(self) -> (Coord, Coord) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    #[inline]
    pub fn is_opposite(self, other: Self) -> bool {
        self.opposite() == other
    }
}
