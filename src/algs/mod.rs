//! Message-passing plumbing consumed by the halo exchange.

pub mod communicator;
pub mod reduction;
pub mod wire;

pub use communicator::{CommTag, Communicator, LocalComm, NoComm, Wait};
pub use reduction::ReduceOp;
