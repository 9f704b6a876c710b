//! Axis-aligned neighbor identities (non-periodic).

use crate::decomposition::process_grid::{ProcessCoord, ProcessGrid};
use crate::halo_error::Axis;

/// One of the four faces of a local block.
///
/// `Left`/`Right` run along x, `Down`/`Up` along y.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Exchange order used by the halo engine.
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    pub fn opposite(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            Direction::Left | Direction::Right => Axis::X,
            Direction::Up | Direction::Down => Axis::Y,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

/// Rank of the neighbor on each face, `None` on a physical domain edge.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Neighbors {
    pub left: Option<usize>,
    pub right: Option<usize>,
    pub up: Option<usize>,
    pub down: Option<usize>,
}

impl Neighbors {
    /// Neighbors of `rank` at `coord` in `grid`.
    pub fn of(grid: ProcessGrid, coord: ProcessCoord, rank: usize) -> Self {
        Self {
            left: (coord.px > 0).then(|| rank - 1),
            right: (coord.px + 1 < grid.px).then(|| rank + 1),
            down: (coord.py > 0).then(|| rank - grid.px),
            up: (coord.py + 1 < grid.py).then(|| rank + grid.px),
        }
    }

    #[inline]
    pub fn get(&self, dir: Direction) -> Option<usize> {
        match dir {
            Direction::Left => self.left,
            Direction::Right => self.right,
            Direction::Up => self.up,
            Direction::Down => self.down,
        }
    }

    /// Existing neighbors, in [`Direction::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Direction, usize)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(|d| self.get(d).map(|r| (d, r)))
    }

    pub fn count(&self) -> usize {
        self.iter().count()
    }
}
