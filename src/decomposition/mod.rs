//! Block decomposition of a global `Nx × Ny` grid over a `Px × Py` process grid.
//!
//! A [`GridDecomposition`] is pure, immutable state: this rank's process
//! coordinate, its half-open index range `[i0, i1) × [j0, j1)` and its four
//! neighbors. Ranges of all ranks tile the global grid exactly; the first
//! `Nx mod Px` process columns (and `Ny mod Py` process rows) own one extra
//! cell.

pub mod axis;
pub mod config;
pub mod neighbors;
pub mod process_grid;

pub use axis::{AxisBlock, owner_along, split_axis};
pub use config::DecompositionConfig;
pub use neighbors::{Direction, Neighbors};
pub use process_grid::{ProcessCoord, ProcessGrid};

use crate::algs::communicator::Communicator;
use crate::halo::layout::PaddedLayout;
use crate::halo_error::{Axis, HaloError};

/// Consistency checks of a decomposition: ranges inside the global grid and
/// neighbors matching the process-grid arithmetic.
pub trait DebugInvariants {
    /// Panic on a violated invariant. Compiled out of release builds unless
    /// the `check-invariants` feature is on.
    fn debug_assert_invariants(&self);
    /// Return the first violated invariant.
    fn validate_invariants(&self) -> Result<(), HaloError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridDecomposition {
    config: DecompositionConfig,
    rank: usize,
    size: usize,
    coord: ProcessCoord,
    x: AxisBlock,
    y: AxisBlock,
    neighbors: Neighbors,
}

impl GridDecomposition {
    /// Decompose for the calling member of `comm`.
    ///
    /// Performs one rank/size query; no communication.
    pub fn new<C: Communicator>(comm: &C, config: DecompositionConfig) -> Result<Self, HaloError> {
        Self::for_rank(config, comm.rank(), comm.size())
    }

    /// Decompose for `rank` of a group of `size` processes.
    pub fn for_rank(
        config: DecompositionConfig,
        rank: usize,
        size: usize,
    ) -> Result<Self, HaloError> {
        let expected = config.validate()?;
        if expected != size {
            return Err(HaloError::ProcessCountMismatch {
                expected,
                actual: size,
            });
        }
        if rank >= size {
            return Err(HaloError::RankOutOfRange { rank, size });
        }

        let grid = config.process_grid();
        let coord = grid.coords_of(rank);
        let decomp = Self {
            config,
            rank,
            size,
            coord,
            x: split_axis(config.nx, config.px, coord.px),
            y: split_axis(config.ny, config.py, coord.py),
            neighbors: Neighbors::of(grid, coord, rank),
        };
        decomp.debug_assert_invariants();

        log::debug!(
            "[rank {rank}] block ({}, {}) of {}x{}: i in {:?}, j in {:?}, neighbors {:?}",
            coord.px,
            coord.py,
            config.px,
            config.py,
            decomp.x.range(),
            decomp.y.range(),
            decomp.neighbors
        );
        Ok(decomp)
    }

    /// The decomposition of every rank, in rank order.
    pub fn all(config: DecompositionConfig) -> Result<Vec<Self>, HaloError> {
        let size = config.validate()?;
        (0..size).map(|r| Self::for_rank(config, r, size)).collect()
    }

    pub fn config(&self) -> &DecompositionConfig {
        &self.config
    }
    pub fn rank(&self) -> usize {
        self.rank
    }
    pub fn size(&self) -> usize {
        self.size
    }
    pub fn process_grid(&self) -> ProcessGrid {
        self.config.process_grid()
    }
    pub fn coord(&self) -> ProcessCoord {
        self.coord
    }
    pub fn px(&self) -> usize {
        self.coord.px
    }
    pub fn py(&self) -> usize {
        self.coord.py
    }

    pub fn global_nx(&self) -> usize {
        self.config.nx
    }
    pub fn global_ny(&self) -> usize {
        self.config.ny
    }
    /// Local cells along x (without ghosts).
    pub fn nx(&self) -> usize {
        self.x.len
    }
    /// Local cells along y (without ghosts).
    pub fn ny(&self) -> usize {
        self.y.len
    }
    pub fn nghost(&self) -> usize {
        self.config.nghost
    }

    pub fn i0(&self) -> usize {
        self.x.start
    }
    pub fn i1(&self) -> usize {
        self.x.end()
    }
    pub fn j0(&self) -> usize {
        self.y.start
    }
    pub fn j1(&self) -> usize {
        self.y.end()
    }
    pub fn x_block(&self) -> AxisBlock {
        self.x
    }
    pub fn y_block(&self) -> AxisBlock {
        self.y
    }

    pub fn neighbors(&self) -> Neighbors {
        self.neighbors
    }
    pub fn left(&self) -> Option<usize> {
        self.neighbors.left
    }
    pub fn right(&self) -> Option<usize> {
        self.neighbors.right
    }
    pub fn up(&self) -> Option<usize> {
        self.neighbors.up
    }
    pub fn down(&self) -> Option<usize> {
        self.neighbors.down
    }

    /// Layout of this rank's padded buffer.
    pub fn padded_layout(&self) -> PaddedLayout {
        PaddedLayout::new(self.nx(), self.ny(), self.nghost())
    }

    /// Global index of local interior cell `(i, j)`.
    #[inline]
    pub fn global_index(&self, i: usize, j: usize) -> (usize, usize) {
        (self.x.start + i, self.y.start + j)
    }

    pub fn contains_global(&self, gi: usize, gj: usize) -> bool {
        self.x.contains(gi) && self.y.contains(gj)
    }

    /// Local interior index of global cell `(gi, gj)`, if this rank owns it.
    pub fn to_local(&self, gi: usize, gj: usize) -> Option<(usize, usize)> {
        self.contains_global(gi, gj)
            .then(|| (gi - self.x.start, gj - self.y.start))
    }

    /// Rank owning global cell `(gi, gj)`; `None` outside the global grid.
    pub fn owner_of(&self, gi: usize, gj: usize) -> Option<usize> {
        let c = &self.config;
        if gi >= c.nx || gj >= c.ny {
            return None;
        }
        let coord = ProcessCoord {
            px: owner_along(c.nx, c.px, gi),
            py: owner_along(c.ny, c.py, gj),
        };
        Some(self.process_grid().rank_of(coord))
    }
}

impl DebugInvariants for GridDecomposition {
    fn debug_assert_invariants(&self) {
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        if let Err(e) = self.validate_invariants() {
            panic!("[invariants] rank {}: {e}", self.rank);
        }
    }

    fn validate_invariants(&self) -> Result<(), HaloError> {
        for (axis, block, global) in [(Axis::X, self.x, self.config.nx), (Axis::Y, self.y, self.config.ny)] {
            if block.end() > global {
                return Err(HaloError::InvalidLocalRange {
                    rank: self.rank,
                    axis,
                    start: block.start,
                    end: block.end(),
                    global,
                });
            }
        }

        let grid = self.process_grid();
        let expected = Neighbors::of(grid, grid.coords_of(self.rank), self.rank);
        for dir in Direction::ALL {
            let Some(nbr) = self.neighbors.get(dir) else {
                if expected.get(dir).is_some() {
                    return Err(HaloError::InvalidNeighbor {
                        rank: self.rank,
                        direction: dir.name(),
                        neighbor: self.rank,
                        size: self.size,
                    });
                }
                continue;
            };
            if nbr >= self.size || nbr == self.rank || expected.get(dir) != Some(nbr) {
                return Err(HaloError::InvalidNeighbor {
                    rank: self.rank,
                    direction: dir.name(),
                    neighbor: nbr,
                    size: self.size,
                });
            }
        }
        Ok(())
    }
}
