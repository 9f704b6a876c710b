//! Closed-form block split of one global axis over `p` processes.
//!
//! With `base = n / p` and `rem = n % p`, the first `rem` coordinates own
//! `base + 1` cells and the rest own `base`. Starts are prefix sums of those
//! lengths, written out in closed form, so the blocks tile `[0, n)` exactly.

use std::ops::Range;

/// Half-open block `[start, start + len)` of one axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct AxisBlock {
    pub start: usize,
    pub len: usize,
}

impl AxisBlock {
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }

    #[inline]
    pub fn contains(&self, g: usize) -> bool {
        self.range().contains(&g)
    }
}

/// Block owned by coordinate `c` when `n` cells are split over `p` coordinates.
///
/// Requires `p > 0` and `c < p`.
pub fn split_axis(n: usize, p: usize, c: usize) -> AxisBlock {
    debug_assert!(p > 0 && c < p, "coordinate {c} outside process axis of {p}");
    let base = n / p;
    let rem = n % p;
    if c < rem {
        AxisBlock {
            start: c * (base + 1),
            len: base + 1,
        }
    } else {
        AxisBlock {
            start: rem * (base + 1) + (c - rem) * base,
            len: base,
        }
    }
}

/// Coordinate owning global index `g` (inverse of [`split_axis`]).
///
/// Requires `g < n`.
pub fn owner_along(n: usize, p: usize, g: usize) -> usize {
    debug_assert!(g < n, "global index {g} outside axis of {n}");
    let base = n / p;
    let rem = n % p;
    let wide = rem * (base + 1);
    if g < wide {
        g / (base + 1)
    } else {
        // g >= wide implies base > 0 here
        rem + (g - wide) / base
    }
}
