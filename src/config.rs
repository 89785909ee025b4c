use std::time::Duration;

use crate::{Coord, Point};
use crate::error::ConfigError;

/// Side length of the default square grid.
pub const GRID_SIZE: Coord = 20;
/// Smallest grid the built-in level layouts fit on.
pub const MIN_GRID_SIZE: Coord = 8;
pub const MAX_GRID_SIZE: Coord = 256;
/// Segments in a freshly spawned worm.
pub const INITIAL_LEN: usize = 3;
pub const QUEUE_CAPACITY: usize = 3;
pub const FOOD_PER_LEVEL: u32 = 10;
pub const SPEED_UP_EVERY: u32 = 5;
pub const INITIAL_INTERVAL: Duration = Duration::from_millis(150);
pub const SPEED_STEP: Duration = Duration::from_millis(10);
pub const MIN_INTERVAL: Duration = Duration::from_millis(60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub grid_size: Coord,
    /// Step interval at level 1 with score 0.
    pub initial_interval: Duration,
    /// Amount the interval shrinks every `speed_up_every` points.
    pub speed_step: Duration,
    /// The interval never drops below this.
    pub min_interval: Duration,
    pub food_per_level: u32,
    pub speed_up_every: u32,
    pub queue_capacity: usize,
    /// Keep accepting direction keys while paused.
    pub queue_while_paused: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            initial_interval: INITIAL_INTERVAL,
            speed_step: SPEED_STEP,
            min_interval: MIN_INTERVAL,
            food_per_level: FOOD_PER_LEVEL,
            speed_up_every: SPEED_UP_EVERY,
            queue_capacity: QUEUE_CAPACITY,
            queue_while_paused: true,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size < MIN_GRID_SIZE {
            return Err(ConfigError::GridTooSmall {
                size: self.grid_size,
                min: MIN_GRID_SIZE,
            });
        }
        if self.grid_size > MAX_GRID_SIZE {
            return Err(ConfigError::GridTooLarge {
                size: self.grid_size,
                max: MAX_GRID_SIZE,
            });
        }
        if self.min_interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        if self.initial_interval < self.min_interval {
            return Err(ConfigError::IntervalBelowFloor {
                initial: self.initial_interval,
                floor: self.min_interval,
            });
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        if self.food_per_level == 0 {
            return Err(ConfigError::ZeroFoodPerLevel);
        }
        if self.speed_up_every == 0 {
            return Err(ConfigError::ZeroSpeedUpCadence);
        }
        Ok(())
    }

    /// Start-of-game worm layout: centred, head first, heading right.
    pub fn initial_worm(&self) -> impl Iterator<Item = Point> + '_ {
        let c = self.grid_size / 2;
        (0..INITIAL_LEN as Coord).map(move |i| Point::new(c - i, c))
    }
}
