//! Group-wide decomposition parameters.

use serde::{Deserialize, Serialize};

use crate::decomposition::process_grid::ProcessGrid;
use crate::halo_error::HaloError;

/// Global grid, process grid and ghost width. Every rank of the group must
/// be constructed from the same value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecompositionConfig {
    /// Global cells along x.
    pub nx: usize,
    /// Global cells along y.
    pub ny: usize,
    /// Processes along x.
    pub px: usize,
    /// Processes along y.
    pub py: usize,
    /// Ghost layers around each local block.
    #[serde(default)]
    pub nghost: usize,
}

impl DecompositionConfig {
    /// Config with no ghost margin.
    pub const fn new(nx: usize, ny: usize, px: usize, py: usize) -> Self {
        Self {
            nx,
            ny,
            px,
            py,
            nghost: 0,
        }
    }

    /// Config whose process grid is [`ProcessGrid::balanced`] for `size` ranks.
    pub fn balanced(nx: usize, ny: usize, size: usize) -> Self {
        let grid = ProcessGrid::balanced(size);
        Self::new(nx, ny, grid.px, grid.py)
    }

    pub const fn with_ghost(mut self, nghost: usize) -> Self {
        self.nghost = nghost;
        self
    }

    pub const fn process_grid(&self) -> ProcessGrid {
        ProcessGrid::new(self.px, self.py)
    }

    /// Check the group-independent parameters and return `Px * Py`.
    pub fn validate(&self) -> Result<usize, HaloError> {
        for (what, v) in [("Nx", self.nx), ("Ny", self.ny), ("Px", self.px), ("Py", self.py)] {
            if v == 0 {
                return Err(HaloError::ZeroExtent { what });
            }
        }
        self.process_grid().size()
    }
}
