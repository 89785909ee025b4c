//! Per-level obstacle layouts.

use crate::error::ConfigError;
use crate::{Coord, Point};

/// Ordered obstacle sets, indexed from level 1. Levels past the end reuse the
/// last entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelTable {
    layouts: Vec<Vec<Point>>,
}

impl LevelTable {
    pub fn new(layouts: Vec<Vec<Point>>) -> Self {
        let layouts = layouts
            .into_iter()
            .map(|mut cells| {
                cells.sort_unstable();
                cells.dedup();
                cells
            })
            .collect();
        Self { layouts }
    }

    /// Built-in layouts scaled to a `grid`-sized board: open field, two bars,
    /// a gated box, and the gated box flanked by pillars.
    pub fn classic(grid: Coord) -> Self {
        let q = grid / 4;
        let far = grid - 1 - q;
        let mid = grid / 2;

        let bars: Vec<Point> = hline(q, q, far).chain(hline(far, q, far)).collect();

        // Gates are two cells wide at the middle of each side.
        let gate = |v: Coord| v == mid || v == mid - 1;
        let gated_box: Vec<Point> = hline(q, q, far)
            .chain(hline(far, q, far))
            .filter(|p| !gate(p.x))
            .chain(
                vline(q, q, far)
                    .chain(vline(far, q, far))
                    .filter(|p| !gate(p.y)),
            )
            .collect();

        let mut pillars = gated_box.clone();
        pillars.extend(vline(2, q, far));
        pillars.extend(vline(grid - 3, q, far));

        Self::new(vec![Vec::new(), bars, gated_box, pillars])
    }

    /// Obstacles for a 1-based `level`.
    pub fn obstacles(&self, level: u32) -> &[Point] {
        let idx = (level.max(1) as usize - 1).min(self.layouts.len().saturating_sub(1));
        self.layouts
            .get(idx)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    pub(crate) fn validate(&self, grid: Coord, start: &[Point]) -> Result<(), ConfigError> {
        for (i, cells) in self.layouts.iter().enumerate() {
            let level = i as u32 + 1;
            if let Some(&cell) = cells.iter().find(|p| !p.in_grid(grid)) {
                return Err(ConfigError::ObstacleOutOfBounds { level, cell });
            }
        }
        if let Some(&cell) = self.obstacles(1).iter().find(|p| start.contains(p)) {
            return Err(ConfigError::StartBlocked(cell));
        }
        Ok(())
    }
}

fn hline(y: Coord, x0: Coord, x1: Coord) -> impl Iterator<Item = Point> {
    (x0..=x1).map(move |x| Point::new(x, y))
}

fn vline(x: Coord, y0: Coord, y1: Coord) -> impl Iterator<Item = Point> {
    (y0..=y1).map(move |y| Point::new(x, y))
}
