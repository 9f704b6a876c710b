//! Fixed-size send/receive strips and the pack/unpack kernels.
//!
//! Strip layout is `[layer][cell]`: left/right strips hold `nghost` layers
//! of `ny` cells, down/up strips hold `nghost` layers of `nx` cells. Layer
//! `g` of a send strip is the interior line at depth `g` counted from the
//! low side of the block, so a partner's layer `g` lands in its mirrored
//! ghost layer `g` without any reordering.

use bytemuck::Zeroable;

use crate::decomposition::{Direction, Neighbors};
use crate::halo::layout::PaddedLayout;

#[derive(Clone, Debug, PartialEq)]
pub struct Strip<T> {
    pub send: Vec<T>,
    pub recv: Vec<T>,
}

impl<T: Zeroable + Clone> Strip<T> {
    fn zeroed(len: usize) -> Self {
        Self {
            send: vec![T::zeroed(); len],
            recv: vec![T::zeroed(); len],
        }
    }
}

/// The eight packing buffers of one halo exchanger.
#[derive(Clone, Debug, PartialEq)]
pub struct StripBuffers<T> {
    pub left: Strip<T>,
    pub right: Strip<T>,
    pub up: Strip<T>,
    pub down: Strip<T>,
}

impl<T: Copy + Zeroable> StripBuffers<T> {
    pub fn new(layout: &PaddedLayout) -> Self {
        let column = layout.nghost * layout.ny;
        let row = layout.nghost * layout.nx;
        Self {
            left: Strip::zeroed(column),
            right: Strip::zeroed(column),
            up: Strip::zeroed(row),
            down: Strip::zeroed(row),
        }
    }

    pub fn strip(&self, dir: Direction) -> &Strip<T> {
        match dir {
            Direction::Left => &self.left,
            Direction::Right => &self.right,
            Direction::Up => &self.up,
            Direction::Down => &self.down,
        }
    }

    pub fn strip_mut(&mut self, dir: Direction) -> &mut Strip<T> {
        match dir {
            Direction::Left => &mut self.left,
            Direction::Right => &mut self.right,
            Direction::Up => &mut self.up,
            Direction::Down => &mut self.down,
        }
    }

    /// Copy the interior boundary lines of `buf` into the send strips of the
    /// faces that have a neighbor.
    ///
    /// Requires `nghost <= nx` when a left or right neighbor exists and
    /// `nghost <= ny` when an up or down neighbor exists.
    pub fn pack(&mut self, layout: &PaddedLayout, neighbors: &Neighbors, buf: &[T]) {
        let PaddedLayout { nx, ny, nghost } = *layout;
        for g in 0..nghost {
            // x-rows are contiguous: interior rows g and nx - nghost + g
            let layer = g * ny..(g + 1) * ny;
            if neighbors.left.is_some() {
                self.left.send[layer.clone()].copy_from_slice(layout.interior_row(buf, g));
            }
            if neighbors.right.is_some() {
                self.right.send[layer]
                    .copy_from_slice(layout.interior_row(buf, nx - nghost + g));
            }

            for i in 0..nx {
                if neighbors.down.is_some() {
                    self.down.send[g * nx + i] = buf[layout.interior_index(i, g)];
                }
                if neighbors.up.is_some() {
                    self.up.send[g * nx + i] = buf[layout.interior_index(i, ny - nghost + g)];
                }
            }
        }
    }

    /// Copy received strips into the ghost margin of `buf`, only on faces
    /// that have a neighbor. Corner ghosts are never written.
    pub fn unpack(&self, layout: &PaddedLayout, neighbors: &Neighbors, buf: &mut [T]) {
        let PaddedLayout { nx, ny, nghost } = *layout;
        for g in 0..nghost {
            let layer = g * ny..(g + 1) * ny;
            if neighbors.left.is_some() {
                let at = layout.index(g, nghost);
                buf[at..at + ny].copy_from_slice(&self.left.recv[layer.clone()]);
            }
            if neighbors.right.is_some() {
                let at = layout.index(nghost + nx + g, nghost);
                buf[at..at + ny].copy_from_slice(&self.right.recv[layer]);
            }

            for i in 0..nx {
                if neighbors.up.is_some() {
                    buf[layout.index(nghost + i, nghost + ny + g)] = self.up.recv[g * nx + i];
                }
                if neighbors.down.is_some() {
                    buf[layout.index(nghost + i, g)] = self.down.recv[g * nx + i];
                }
            }
        }
    }
}
