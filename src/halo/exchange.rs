//! Ghost-margin synchronization with the four face neighbors.

use bytemuck::Pod;

use crate::algs::communicator::Communicator;
use crate::algs::wire::{cast_slice, cast_slice_mut};
use crate::decomposition::{DebugInvariants, Direction, GridDecomposition, Neighbors};
use crate::halo::buffers::{Strip, StripBuffers};
use crate::halo::layout::PaddedLayout;
use crate::halo::tags::HaloCommTags;
use crate::halo_error::{Axis, HaloError};

/// Packs, exchanges and unpacks the ghost margin of one rank's padded block.
///
/// The eight strip buffers are allocated once here and reused by every
/// [`exchange`](Self::exchange).
pub struct HaloExchange<'a, C: Communicator, T = f64> {
    comm: &'a C,
    rank: usize,
    neighbors: Neighbors,
    layout: PaddedLayout,
    tags: HaloCommTags,
    strips: StripBuffers<T>,
}

impl<'a, C, T> HaloExchange<'a, C, T>
where
    C: Communicator,
    T: Pod,
{
    pub fn new(decomp: &GridDecomposition, comm: &'a C) -> Result<Self, HaloError> {
        Self::with_tags(decomp, comm, HaloCommTags::default())
    }

    pub fn with_tags(
        decomp: &GridDecomposition,
        comm: &'a C,
        tags: HaloCommTags,
    ) -> Result<Self, HaloError> {
        decomp.validate_invariants()?;
        let layout = decomp.padded_layout();
        // only faces that are exchanged must supply nghost interior lines
        for (dir, _) in decomp.neighbors().iter() {
            let axis = dir.axis();
            let extent = match axis {
                Axis::X => layout.nx,
                Axis::Y => layout.ny,
            };
            if layout.nghost > extent {
                return Err(HaloError::GhostWiderThanBlock {
                    rank: decomp.rank(),
                    axis,
                    nghost: layout.nghost,
                    extent,
                });
            }
        }
        Ok(Self {
            comm,
            rank: decomp.rank(),
            neighbors: decomp.neighbors(),
            layout,
            tags,
            strips: StripBuffers::new(&layout),
        })
    }

    pub fn layout(&self) -> PaddedLayout {
        self.layout
    }

    pub fn neighbors(&self) -> Neighbors {
        self.neighbors
    }

    pub fn tags(&self) -> HaloCommTags {
        self.tags
    }

    /// Fill the ghost cells of `buf` that face a neighbor with that
    /// neighbor's current interior values.
    ///
    /// `buf` must follow [`PaddedLayout`]. Ghost cells on physical domain
    /// edges are left untouched. Blocks until every paired exchange of this
    /// rank has completed.
    pub fn exchange(&mut self, buf: &mut [T]) -> Result<(), HaloError> {
        let expected = self.layout.len();
        if buf.len() != expected {
            return Err(HaloError::BufferSizeMismatch {
                expected,
                actual: buf.len(),
            });
        }
        if self.layout.nghost == 0 {
            return Ok(());
        }

        self.strips.pack(&self.layout, &self.neighbors, buf);

        let neighbors = self.neighbors;
        for (dir, peer) in neighbors.iter() {
            self.exchange_face(dir, peer)?;
        }

        self.strips.unpack(&self.layout, &self.neighbors, buf);
        Ok(())
    }

    fn exchange_face(&mut self, dir: Direction, peer: usize) -> Result<(), HaloError> {
        let (send_tag, recv_tag) = self.tags.pair(dir);
        let Strip { send, recv } = self.strips.strip_mut(dir);
        log::trace!(
            "[rank {}] {} exchange with {peer}: {} cells",
            self.rank,
            dir.name(),
            send.len()
        );
        self.comm.sendrecv(
            peer,
            send_tag.as_u16(),
            cast_slice(send.as_slice()),
            recv_tag.as_u16(),
            cast_slice_mut(recv.as_mut_slice()),
        )
    }
}
