//! Scalar all-reduce used by solver drivers for convergence checks.

use serde::{Deserialize, Serialize};

use crate::algs::communicator::{Communicator, REDUCE_TAG, Wait};
use crate::halo_error::HaloError;

/// Reduction operator for [`Communicator::all_reduce`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReduceOp {
    Max,
    Sum,
}

impl ReduceOp {
    #[inline]
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            ReduceOp::Max => a.max(b),
            ReduceOp::Sum => a + b,
        }
    }
}

/// All-reduce built from point-to-point messages: every rank sends its value
/// to every peer, then folds all contributions in rank order so that each
/// rank computes a bit-identical result.
pub fn all_reduce_pairwise<C>(comm: &C, value: f64, op: ReduceOp) -> Result<f64, HaloError>
where
    C: Communicator + ?Sized,
{
    let me = comm.rank();
    let size = comm.size();
    let bytes = value.to_le_bytes();

    let pending: Vec<_> = (0..size)
        .filter(|&p| p != me)
        .map(|p| comm.isend(p, REDUCE_TAG, &bytes))
        .collect();

    let mut acc: Option<f64> = None;
    let mut maybe_err = None;
    for peer in 0..size {
        let contribution = if peer == me {
            value
        } else {
            let mut buf = [0u8; 8];
            let got = comm.irecv(peer, REDUCE_TAG, &mut buf).wait();
            match got.as_deref().map(<[u8; 8]>::try_from) {
                Some(Ok(raw)) => f64::from_le_bytes(raw),
                other => {
                    if maybe_err.is_none() {
                        let reason = match other {
                            Some(_) => "malformed reduction contribution",
                            None => "missing reduction contribution",
                        };
                        maybe_err = Some(HaloError::CommError {
                            neighbor: peer,
                            reason: reason.into(),
                        });
                    }
                    // keep draining the remaining peers
                    continue;
                }
            }
        };
        acc = Some(acc.map_or(contribution, |a| op.apply(a, contribution)));
    }

    for send in pending {
        let _ = send.wait();
    }

    match maybe_err {
        Some(err) => Err(err),
        None => Ok(acc.unwrap_or(value)),
    }
}
