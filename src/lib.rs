#![cfg_attr(docsrs, feature(doc_cfg))]
//! # grid-halo
//!
//! grid-halo partitions a 2D structured grid across a rectangular arrangement
//! of cooperating processes and keeps each process's ghost cells synchronized
//! with its neighbors. It is the layer beneath stencil-based PDE solvers
//! (Jacobi, SOR, ...): the solver only needs correct local data plus
//! up-to-date ghost layers to compute a local update.
//!
//! ## Features
//! - [`GridDecomposition`]: closed-form block split of an `Nx × Ny` grid over a
//!   `Px × Py` process grid, with exact tiling and non-periodic neighbors
//! - [`HaloExchange`]: pack → paired send/receive → unpack of ghost strips of
//!   any width, with reusable buffers and per-direction message tags
//! - Pluggable communication backends (serial, in-process threads, MPI)
//! - Fatal configuration errors as [`HaloError`], turned into a group abort
//!   by drivers through [`OrAbort`]
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! grid-halo = "0.3"
//! # Optional features:
//! # features = ["mpi-support"]
//! ```
//!
//! ```
//! use grid_halo::prelude::*;
//!
//! let comm = NoComm;
//! let cfg = DecompositionConfig::new(8, 8, 1, 1).with_ghost(1);
//! let decomp = GridDecomposition::new(&comm, cfg).or_abort(&comm);
//! let mut halo = HaloExchange::new(&decomp, &comm).or_abort(&comm);
//! let layout = decomp.padded_layout();
//! let mut u = layout.allocate(0.0f64);
//! halo.exchange(&mut u).or_abort(&comm);
//! ```

pub mod algs;
pub mod decomposition;
pub mod halo;
pub mod halo_error;

pub use decomposition::{DebugInvariants, DecompositionConfig, GridDecomposition};
pub use halo::HaloExchange;
pub use halo_error::{HaloError, OrAbort};

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::communicator::{CommTag, Communicator, LocalComm, NoComm};
    #[cfg(feature = "mpi-support")]
    pub use crate::algs::communicator::MpiComm;
    pub use crate::algs::reduction::ReduceOp;
    pub use crate::decomposition::{
        DebugInvariants, DecompositionConfig, Direction, GridDecomposition, Neighbors, ProcessGrid,
    };
    pub use crate::halo::{HaloCommTags, HaloExchange, PaddedLayout};
    pub use crate::halo_error::{HaloError, OrAbort};
}
