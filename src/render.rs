//! Renderer-side helpers: turn a [`Snapshot`] into a grid of tiles.
//!
//! Not used by the simulation; front ends map tiles to pixels or glyphs.

use crate::Coord;
use crate::state::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tile {
    #[default]
    Empty,
    Head,
    Body,
    Food,
    Obstacle,
}

impl Tile {
    pub fn glyph(self) -> char {
        match self {
            Self::Empty => '.',
            Self::Head => '@',
            Self::Body => 'o',
            Self::Food => '*',
            Self::Obstacle => '#',
        }
    }
}

#[derive(Debug, Clone)]
pub struct Raster2D {
    pub width: Coord,
    pub height: Coord,
    pub cells: Vec<Tile>,
}

impl Raster2D {
    pub fn new(width: Coord, height: Coord) -> Self {
        let size = (width.max(0) as usize).saturating_mul(height.max(0) as usize);
        Self {
            width,
            height,
            cells: vec![Tile::Empty; size],
        }
    }

    #[inline]
    fn idx(&self, x: Coord, y: Coord) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            None
        } else {
            Some((y * self.width + x) as usize)
        }
    }

    pub fn set(&mut self, x: Coord, y: Coord, tile: Tile) {
        if let Some(i) = self.idx(x, y) {
            self.cells[i] = tile;
        }
    }

    pub fn get(&self, x: Coord, y: Coord) -> Option<Tile> {
        self.idx(x, y).map(|i| self.cells[i])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> {
        self.cells.chunks(self.width.max(1) as usize)
    }
}

impl std::fmt::Display for Raster2D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", raster_to_str(self))
    }
}

/// Paint obstacles, then food, then the worm with its head last on top.
pub fn rasterize(frame: &Snapshot<'_>) -> Raster2D {
    let mut r = Raster2D::new(frame.grid_size, frame.grid_size);
    for p in frame.obstacles {
        r.set(p.x, p.y, Tile::Obstacle);
    }
    r.set(frame.food.x, frame.food.y, Tile::Food);
    for p in frame.worm.iter().skip(1) {
        r.set(p.x, p.y, Tile::Body);
    }
    if let Some(head) = frame.worm.front() {
        r.set(head.x, head.y, Tile::Head);
    }
    r
}

/// Print raster in simple ascii
pub fn raster_to_str(raster: &Raster2D) -> String {
    raster
        .rows()
        .map(|row| row.iter().map(|t| t.glyph()).collect::<String>())
        .collect::<Vec<String>>()
        .join("\n")
}
