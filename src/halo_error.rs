//! HaloError: unified error type for grid-halo public APIs
//!
//! Every variant describes a group-wide invariant violation. None of them is
//! recoverable on the local process alone: the driver is expected to turn
//! them into a process-group abort (see [`OrAbort`]).

use crate::algs::communicator::Communicator;
use thiserror::Error;

/// Axis of the global grid or the process grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => f.write_str("x"),
            Axis::Y => f.write_str("y"),
        }
    }
}

/// Unified error type for decomposition and halo-exchange operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HaloError {
    /// The process group does not have exactly `Px * Py` members.
    #[error("process count mismatch: decomposition needs {expected} processes (Px * Py), group has {actual}")]
    ProcessCountMismatch { expected: usize, actual: usize },
    /// The process identity is not a member of the group.
    #[error("rank {rank} is outside a group of {size} processes")]
    RankOutOfRange { rank: usize, size: usize },
    /// `Px * Py` overflows `usize`.
    #[error("process grid {px} x {py} is too large")]
    ProcessGridTooLarge { px: usize, py: usize },
    /// A global or process-grid extent was zero.
    #[error("{what} must be greater than 0")]
    ZeroExtent { what: &'static str },
    /// The closed-form split produced a range outside `[0, n)`.
    #[error("invalid local range on rank {rank} along {axis}: [{start}, {end}) is not within [0, {global})")]
    InvalidLocalRange {
        rank: usize,
        axis: Axis,
        start: usize,
        end: usize,
        global: usize,
    },
    /// The ghost margin is wider than the interior block it is packed from.
    #[error("ghost width {nghost} exceeds local extent {extent} along {axis} on rank {rank}")]
    GhostWiderThanBlock {
        rank: usize,
        axis: Axis,
        nghost: usize,
        extent: usize,
    },
    /// A neighbor identity does not name another member of the group.
    #[error("rank {rank} has invalid {direction} neighbor {neighbor} (group size {size})")]
    InvalidNeighbor {
        rank: usize,
        direction: &'static str,
        neighbor: usize,
        size: usize,
    },
    /// Caller-supplied padded buffer has the wrong number of elements.
    #[error("padded buffer has incorrect size: expected {expected} elements, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },
    /// Transport-level failure while talking to `neighbor`.
    #[error("communication with rank {neighbor} failed: {reason}")]
    CommError { neighbor: usize, reason: String },
}

impl HaloError {
    /// Exit code handed to [`Communicator::abort`].
    pub fn abort_code(&self) -> i32 {
        match self {
            HaloError::ProcessCountMismatch { .. }
            | HaloError::RankOutOfRange { .. }
            | HaloError::ProcessGridTooLarge { .. }
            | HaloError::ZeroExtent { .. }
            | HaloError::InvalidLocalRange { .. }
            | HaloError::GhostWiderThanBlock { .. }
            | HaloError::InvalidNeighbor { .. } => 1,
            HaloError::BufferSizeMismatch { .. } => 2,
            HaloError::CommError { .. } => 3,
        }
    }
}

/// Converts a fatal [`HaloError`] into a process-group abort.
///
/// Drivers call `.or_abort(&comm)` on every fallible construction or exchange;
/// the diagnostic is logged before the whole group is terminated.
pub trait OrAbort<T> {
    fn or_abort<C: Communicator>(self, comm: &C) -> T;
}

impl<T> OrAbort<T> for Result<T, HaloError> {
    fn or_abort<C: Communicator>(self, comm: &C) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                log::error!("[rank {}] fatal: {e}", comm.rank());
                comm.abort(e.abort_code())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_carry_expected_and_actual() {
        let e = HaloError::BufferSizeMismatch {
            expected: 36,
            actual: 35,
        };
        let msg = e.to_string();
        assert!(msg.contains("36"));
        assert!(msg.contains("35"));
        assert_eq!(e.abort_code(), 2);
    }

    #[test]
    fn ok_passes_through_or_abort() {
        use crate::algs::communicator::NoComm;
        let r: Result<u8, HaloError> = Ok(7);
        assert_eq!(r.or_abort(&NoComm), 7);
    }

    #[test]
    #[should_panic(expected = "aborted with code 1")]
    fn err_aborts_the_group() {
        use crate::algs::communicator::NoComm;
        let r: Result<u8, HaloError> = Err(HaloError::ZeroExtent { what: "Nx" });
        r.or_abort(&NoComm);
    }
}
