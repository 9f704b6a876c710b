//! Thin façade over in-process (threads) or inter-process (MPI) message passing.
//!
//! Messages are *contiguous byte slices* (no zero-copy guarantees).
//! `isend`/`irecv` hand back **waitable** handles; the paired
//! [`Communicator::sendrecv`] is what the halo exchange uses, and it does not
//! return until both directions of the pair have completed.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use dashmap::DashMap;

use crate::algs::reduction::{self, ReduceOp};
use crate::algs::wire::expect_exact_len;
use crate::halo_error::HaloError;

/// Tag reserved for the pairwise fallback of [`Communicator::all_reduce`].
pub const REDUCE_TAG: u16 = 0xFFF0;
/// Tag reserved for the message-based barrier of [`LocalComm`].
pub const BARRIER_TAG: u16 = 0xFFF1;

/// Typed message tag.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommTag(pub u16);

impl CommTag {
    pub const fn new(tag: u16) -> Self {
        Self(tag)
    }
    pub const fn as_u16(self) -> u16 {
        self.0
    }
    /// Tag `k` slots above this one.
    pub const fn offset(self, k: u16) -> Self {
        Self(self.0.wrapping_add(k))
    }
}

/// Point-to-point and collective interface used by the halo layer.
pub trait Communicator {
    /// Handle returned by `isend`.
    type SendHandle: Wait;
    /// Handle returned by `irecv`.
    type RecvHandle: Wait;

    /// This process's identity within the group (0-based).
    fn rank(&self) -> usize;
    /// Number of processes in the group.
    fn size(&self) -> usize;

    fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> Self::SendHandle;
    fn irecv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> Self::RecvHandle;

    /// Send `send` to `peer` under `send_tag` while receiving exactly
    /// `recv.len()` bytes from the same peer under `recv_tag`.
    ///
    /// Blocks until the send is accepted and the receive has completed.
    fn sendrecv(
        &self,
        peer: usize,
        send_tag: u16,
        send: &[u8],
        recv_tag: u16,
        recv: &mut [u8],
    ) -> Result<(), HaloError> {
        let rx = self.irecv(peer, recv_tag, recv);
        let tx = self.isend(peer, send_tag, send);
        let got = rx.wait();
        // drain the send even when the receive failed
        let _ = tx.wait();
        match got {
            Some(data) => {
                expect_exact_len(data.len(), recv.len())
                    .map_err(|reason| HaloError::CommError { neighbor: peer, reason })?;
                recv.copy_from_slice(&data);
                Ok(())
            }
            None => Err(HaloError::CommError {
                neighbor: peer,
                reason: format!("no message received under tag {recv_tag}"),
            }),
        }
    }

    /// Block until every member of the group has entered the barrier.
    fn barrier(&self);

    /// Group-wide reduction of one scalar; every rank gets the same result.
    fn all_reduce(&self, value: f64, op: ReduceOp) -> Result<f64, HaloError> {
        reduction::all_reduce_pairwise(self, value, op)
    }

    /// Terminate every process of the group. Never returns.
    fn abort(&self, code: i32) -> !;
}

/// Anything that can be waited on.
pub trait Wait {
    /// Wait for completion and return the received data (if any).
    fn wait(self) -> Option<Vec<u8>>;
}

impl Wait for () {
    fn wait(self) -> Option<Vec<u8>> {
        None
    }
}

/// Compile-time no-op comm for single-process runs and serial unit tests.
#[derive(Clone, Debug, Default)]
pub struct NoComm;

impl Communicator for NoComm {
    type SendHandle = ();
    type RecvHandle = ();

    fn rank(&self) -> usize {
        0
    }
    fn size(&self) -> usize {
        1
    }
    fn isend(&self, _peer: usize, _tag: u16, _buf: &[u8]) {}
    fn irecv(&self, _peer: usize, _tag: u16, _buf: &mut [u8]) {}
    fn barrier(&self) {}
    fn all_reduce(&self, value: f64, _op: ReduceOp) -> Result<f64, HaloError> {
        Ok(value)
    }
    fn abort(&self, code: i32) -> ! {
        panic!("rank 0 aborted with code {code}");
    }
}

// --- LocalComm: in-process / one thread per rank ---
type Key = (usize, usize, u16); // (src, dst, tag)

struct World {
    size: usize,
    mailbox: DashMap<Key, VecDeque<Bytes>>,
    aborted: AtomicBool,
}

impl World {
    fn check_alive(&self) {
        if self.aborted.load(Ordering::Acquire) {
            panic!("a peer rank aborted the local world");
        }
    }
}

/// In-process process group: `size` ranks sharing one mailbox.
///
/// Messages between a given `(src, dst, tag)` triple are delivered in FIFO
/// order. Sends never block; receives spin (yielding) until a matching
/// message arrives or another rank aborts.
#[derive(Clone)]
pub struct LocalComm {
    rank: usize,
    world: Arc<World>,
}

impl std::fmt::Debug for LocalComm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalComm")
            .field("rank", &self.rank)
            .field("size", &self.world.size)
            .finish()
    }
}

impl LocalComm {
    /// One handle per rank of a fresh world of `size` processes.
    pub fn world(size: usize) -> Vec<LocalComm> {
        let world = Arc::new(World {
            size,
            mailbox: DashMap::new(),
            aborted: AtomicBool::new(false),
        });
        (0..size)
            .map(|rank| LocalComm {
                rank,
                world: world.clone(),
            })
            .collect()
    }

    /// Run `f` once per rank, each on its own thread, and collect the results
    /// in rank order. A panic on any rank is re-raised here.
    pub fn run<F, R>(size: usize, f: F) -> Vec<R>
    where
        F: Fn(LocalComm) -> R + Sync,
        R: Send,
    {
        let comms = LocalComm::world(size);
        std::thread::scope(|s| {
            let handles: Vec<_> = comms
                .into_iter()
                .map(|comm| {
                    let f = &f;
                    s.spawn(move || {
                        let _guard = PoisonOnPanic(comm.world.clone());
                        f(comm)
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|p| std::panic::resume_unwind(p)))
                .collect()
        })
    }
}

/// Marks the world aborted if its rank unwinds, so peers blocked in a
/// receive fail instead of spinning forever.
struct PoisonOnPanic(Arc<World>);

impl Drop for PoisonOnPanic {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.aborted.store(true, Ordering::Release);
        }
    }
}

pub struct LocalHandle {
    key: Key,
    world: Arc<World>,
}

impl Wait for LocalHandle {
    fn wait(self) -> Option<Vec<u8>> {
        loop {
            let msg = self
                .world
                .mailbox
                .get_mut(&self.key)
                .and_then(|mut queue| queue.pop_front());
            if let Some(bytes) = msg {
                return Some(bytes.to_vec());
            }
            self.world.check_alive();
            std::thread::yield_now();
        }
    }
}

impl Communicator for LocalComm {
    type SendHandle = ();
    type RecvHandle = LocalHandle;

    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.world.size
    }

    fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> Self::SendHandle {
        let key = (self.rank, peer, tag);
        self.world
            .mailbox
            .entry(key)
            .or_default()
            .push_back(Bytes::copy_from_slice(buf));
    }

    fn irecv(&self, peer: usize, tag: u16, _buf: &mut [u8]) -> Self::RecvHandle {
        LocalHandle {
            key: (peer, self.rank, tag),
            world: self.world.clone(),
        }
    }

    fn barrier(&self) {
        for peer in (0..self.world.size).filter(|&p| p != self.rank) {
            self.isend(peer, BARRIER_TAG, &[]);
        }
        for peer in (0..self.world.size).filter(|&p| p != self.rank) {
            let _ = self.irecv(peer, BARRIER_TAG, &mut []).wait();
        }
    }

    fn abort(&self, code: i32) -> ! {
        self.world.aborted.store(true, Ordering::Release);
        panic!("rank {} aborted with code {code}", self.rank);
    }
}

// --- MPI backend (feature = "mpi-support") ---
#[cfg(feature = "mpi-support")]
mod mpi_backend {
    use super::*;
    use mpi::collective::SystemOperation;
    use mpi::environment::Universe;
    use mpi::point_to_point::send_receive_into_with_tags;
    use mpi::request::{Request, StaticScope};
    use mpi::topology::SimpleCommunicator;
    use mpi::traits::*;

    /// MPI world communicator. Keeps the [`Universe`] alive so MPI is
    /// finalized only when the comm is dropped.
    pub struct MpiComm {
        pub world: SimpleCommunicator,
        rank: usize,
        size: usize,
        _universe: Universe,
    }

    impl MpiComm {
        pub fn new() -> Result<Self, HaloError> {
            let universe = mpi::initialize().ok_or_else(|| HaloError::CommError {
                neighbor: 0,
                reason: "MPI was already initialized".into(),
            })?;
            let world = universe.world();
            let rank = world.rank() as usize;
            let size = world.size() as usize;
            Ok(Self {
                world,
                rank,
                size,
                _universe: universe,
            })
        }
    }

    /// Non-blocking request over a buffer leaked for the duration of the
    /// transfer and reclaimed in [`Wait::wait`].
    pub struct MpiHandle {
        req: Request<'static, [u8], StaticScope>,
        buf: *mut [u8],
        keep: bool,
    }

    impl Wait for MpiHandle {
        fn wait(self) -> Option<Vec<u8>> {
            self.req.wait();
            // SAFETY: `buf` came from `Box::into_raw` and the request that
            // borrowed it has completed.
            let owned = unsafe { Box::from_raw(self.buf) };
            self.keep.then(|| owned.into_vec())
        }
    }

    fn leak(data: Box<[u8]>) -> (&'static mut [u8], *mut [u8]) {
        let raw = Box::into_raw(data);
        // SAFETY: `raw` is a fresh, uniquely owned allocation.
        (unsafe { &mut *raw }, raw)
    }

    impl Communicator for MpiComm {
        type SendHandle = MpiHandle;
        type RecvHandle = MpiHandle;

        fn rank(&self) -> usize {
            self.rank
        }

        fn size(&self) -> usize {
            self.size
        }

        fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> MpiHandle {
            let (data, raw) = leak(buf.to_vec().into_boxed_slice());
            let data: &'static [u8] = data;
            let req = self
                .world
                .process_at_rank(peer as i32)
                .immediate_send_with_tag(StaticScope, data, tag as i32);
            MpiHandle {
                req,
                buf: raw,
                keep: false,
            }
        }

        fn irecv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> MpiHandle {
            let (data, raw) = leak(vec![0u8; buf.len()].into_boxed_slice());
            let req = self
                .world
                .process_at_rank(peer as i32)
                .immediate_receive_into_with_tag(StaticScope, data, tag as i32);
            MpiHandle {
                req,
                buf: raw,
                keep: true,
            }
        }

        fn sendrecv(
            &self,
            peer: usize,
            send_tag: u16,
            send: &[u8],
            recv_tag: u16,
            recv: &mut [u8],
        ) -> Result<(), HaloError> {
            let partner = self.world.process_at_rank(peer as i32);
            let status = send_receive_into_with_tags(
                send,
                &partner,
                send_tag as i32,
                recv,
                &partner,
                recv_tag as i32,
            );
            let got = status.count(u8::equivalent_datatype()) as usize;
            expect_exact_len(got, recv.len())
                .map_err(|reason| HaloError::CommError { neighbor: peer, reason })
        }

        fn barrier(&self) {
            self.world.barrier();
        }

        fn all_reduce(&self, value: f64, op: ReduceOp) -> Result<f64, HaloError> {
            let mut out = value;
            match op {
                ReduceOp::Max => self.world.all_reduce_into(&value, &mut out, SystemOperation::max()),
                ReduceOp::Sum => self.world.all_reduce_into(&value, &mut out, SystemOperation::sum()),
            }
            Ok(out)
        }

        fn abort(&self, code: i32) -> ! {
            self.world.abort(code)
        }
    }
}

#[cfg(feature = "mpi-support")]
pub use mpi_backend::MpiComm;
