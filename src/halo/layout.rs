//! Memory layout of a padded local block.
//!
//! The buffer is row-major with x as the slow index:
//! `index(i, j) = i * (ny + 2g) + j` over padded coordinates
//! `0 <= i < nx + 2g`, `0 <= j < ny + 2g`. Interior cell `(i, j)` lives at
//! padded `(i + g, j + g)`.

use itertools::iproduct;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PaddedLayout {
    pub nx: usize,
    pub ny: usize,
    pub nghost: usize,
}

impl PaddedLayout {
    pub const fn new(nx: usize, ny: usize, nghost: usize) -> Self {
        Self { nx, ny, nghost }
    }

    #[inline]
    pub const fn padded_nx(&self) -> usize {
        self.nx + 2 * self.nghost
    }

    #[inline]
    pub const fn padded_ny(&self) -> usize {
        self.ny + 2 * self.nghost
    }

    /// Distance between consecutive `i` rows.
    #[inline]
    pub const fn stride(&self) -> usize {
        self.padded_ny()
    }

    /// Element count of the padded buffer.
    #[inline]
    pub const fn len(&self) -> usize {
        self.padded_nx() * self.padded_ny()
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat offset of padded cell `(i, j)`.
    #[inline]
    pub const fn index(&self, i: usize, j: usize) -> usize {
        i * self.stride() + j
    }

    /// Flat offset of interior cell `(i, j)`.
    #[inline]
    pub const fn interior_index(&self, i: usize, j: usize) -> usize {
        self.index(i + self.nghost, j + self.nghost)
    }

    /// `true` for padded cells outside the interior block.
    pub const fn is_ghost(&self, i: usize, j: usize) -> bool {
        let g = self.nghost;
        i < g || j < g || i >= g + self.nx || j >= g + self.ny
    }

    /// Interior cells `(i, j)`, x-major.
    pub fn interior_cells(&self) -> impl Iterator<Item = (usize, usize)> + use<> {
        iproduct!(0..self.nx, 0..self.ny)
    }

    /// Padded ghost cells `(i, j)`, x-major. Corners included.
    pub fn ghost_cells(&self) -> impl Iterator<Item = (usize, usize)> + use<> {
        let layout = *self;
        iproduct!(0..self.padded_nx(), 0..self.padded_ny()).filter(move |&(i, j)| layout.is_ghost(i, j))
    }

    /// A padded buffer with every cell set to `value`.
    pub fn allocate<T: Clone>(&self, value: T) -> Vec<T> {
        vec![value; self.len()]
    }

    /// Overwrite every interior cell with `f(i, j)`; ghosts are untouched.
    pub fn fill_interior<T>(&self, buf: &mut [T], mut f: impl FnMut(usize, usize) -> T) {
        assert_eq!(buf.len(), self.len(), "padded buffer size");
        for (i, j) in self.interior_cells() {
            buf[self.interior_index(i, j)] = f(i, j);
        }
    }

    /// Interior x-row `i` (all `ny` cells of it) as a contiguous slice.
    pub fn interior_row<'a, T>(&self, buf: &'a [T], i: usize) -> &'a [T] {
        let start = self.interior_index(i, 0);
        &buf[start..start + self.ny]
    }
}
