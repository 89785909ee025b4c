//! The mutable record every component works on, and its read-only view.

use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use rand::Rng;

use crate::config::GameConfig;
use crate::input::InputBuffer;
use crate::levels::LevelTable;
use crate::{Coord, Direction, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Ready,
    Running,
    Paused,
    GameOver,
}

/// Why a game ended. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cause {
    Boundary,
    Obstacle,
    SelfCollision,
}

impl std::fmt::Display for Cause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Boundary => "hit the edge",
            Self::Obstacle => "hit a wall",
            Self::SelfCollision => "bit itself",
        })
    }
}

#[derive(Debug, Clone)]
pub struct GameState {
    /// Head first, tail last.
    pub(crate) worm: VecDeque<Point>,
    pub(crate) direction: Direction,
    pub(crate) queue: InputBuffer,
    pub(crate) food: Point,
    pub(crate) obstacles: HashSet<Point>,
    pub(crate) level: u32,
    pub(crate) level_food: u32,
    pub(crate) score: u32,
    pub(crate) interval: Duration,
    pub(crate) phase: Phase,
    pub(crate) cause: Option<Cause>,
}

impl GameState {
    /// A level-1 state in `Ready` with food placed.
    pub(crate) fn fresh<R: Rng>(cfg: &GameConfig, levels: &LevelTable, rng: &mut R) -> Self {
        let mut state = Self {
            worm: cfg.initial_worm().collect(),
            direction: Direction::Right,
            queue: InputBuffer::new(cfg.queue_capacity),
            food: Point::new(0, 0),
            obstacles: HashSet::new(),
            level: 1,
            level_food: 0,
            score: 0,
            interval: cfg.initial_interval,
            phase: Phase::Ready,
            cause: None,
        };
        state.load_level(levels);
        state.spawn_food(cfg.grid_size, rng);
        state
    }

    /// Load the current level's obstacles. Cells the worm occupies right now
    /// are left open for this level, so walls never sit under the worm.
    pub(crate) fn load_level(&mut self, levels: &LevelTable) {
        self.obstacles = levels
            .obstacles(self.level)
            .iter()
            .filter(|p| !self.worm.contains(*p))
            .copied()
            .collect();
    }

    /// Rejection-sample a free cell for the food. The board must have at
    /// least one cell free of worm and obstacles.
    pub(crate) fn spawn_food<R: Rng>(&mut self, grid: Coord, rng: &mut R) {
        debug_assert!(
            {
                let cells = (grid as usize).saturating_mul(grid as usize);
                let worm_only = self.worm.iter().filter(|p| !self.obstacles.contains(*p)).count();
                worm_only + self.obstacles.len() < cells
            },
            "no free cell for food"
        );
        loop {
            let p = Point::new(rng.random_range(0..grid), rng.random_range(0..grid));
            if !self.obstacles.contains(&p) && !self.worm.contains(&p) {
                self.food = p;
                return;
            }
        }
    }

    pub fn head(&self) -> Point {
        // Worm is never empty: built with INITIAL_LEN segments and only
        // shortened after a head is pushed.
        self.worm[0]
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn food(&self) -> Point {
        self.food
    }

    pub fn worm(&self) -> impl Iterator<Item = &Point> {
        self.worm.iter()
    }

    pub fn obstacles(&self) -> impl Iterator<Item = &Point> {
        self.obstacles.iter()
    }

    pub fn pending(&self) -> &InputBuffer {
        &self.queue
    }
}

/// Everything a renderer needs for one frame. Grid units only.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub grid_size: Coord,
    pub worm: &'a VecDeque<Point>,
    pub food: Point,
    pub obstacles: &'a HashSet<Point>,
    pub score: u32,
    pub high_score: u32,
    pub level: u32,
    pub phase: Phase,
    pub cause: Option<Cause>,
}
