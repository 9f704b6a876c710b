//! Row-major `Px × Py` arrangement of ranks.

use serde::{Deserialize, Serialize};

use crate::halo_error::HaloError;

/// Position of a rank in the process grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProcessCoord {
    pub px: usize,
    pub py: usize,
}

/// Shape of the process grid. Rank `r` sits at `(r mod Px, r div Px)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessGrid {
    pub px: usize,
    pub py: usize,
}

impl ProcessGrid {
    pub const fn new(px: usize, py: usize) -> Self {
        Self { px, py }
    }

    /// Most nearly square factorization of `size`, with `px >= py`
    /// (the shape `MPI_Dims_create` picks for two dimensions).
    pub fn balanced(size: usize) -> Self {
        if size == 0 {
            return Self::new(0, 0);
        }
        let mut root = 1;
        while (root + 1) * (root + 1) <= size {
            root += 1;
        }
        let py = (1..=root).rev().find(|d| size % d == 0).unwrap_or(1);
        Self::new(size / py, py)
    }

    /// Number of ranks, `Px * Py`.
    pub fn size(&self) -> Result<usize, HaloError> {
        self.px
            .checked_mul(self.py)
            .ok_or(HaloError::ProcessGridTooLarge {
                px: self.px,
                py: self.py,
            })
    }

    #[inline]
    pub fn coords_of(&self, rank: usize) -> ProcessCoord {
        ProcessCoord {
            px: rank % self.px,
            py: rank / self.px,
        }
    }

    #[inline]
    pub fn rank_of(&self, coord: ProcessCoord) -> usize {
        coord.py * self.px + coord.px
    }
}
