//! Halo (ghost-cell) exchange over a [`GridDecomposition`](crate::decomposition::GridDecomposition).
//!
//! One round of [`HaloExchange::exchange`] is pack → paired send/receive with
//! each existing neighbor → unpack. There is no state between rounds besides
//! the reusable strip buffers.

pub mod buffers;
pub mod exchange;
pub mod layout;
pub mod tags;

pub use exchange::HaloExchange;
pub use layout::PaddedLayout;
pub use tags::HaloCommTags;
