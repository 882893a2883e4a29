//! Thin façade over in-process (threads) or inter-process (MPI) message passing.
//!
//! Messages are *contiguous byte slices* (no zero-copy guarantees).
//! All handles are **waitable** but non-blocking: posting a send or receive
//! never blocks, and callers must `.wait()` a receive handle before they
//! trust its data. Messages between one `(src, dst, tag)` triple are
//! delivered in the order they were sent.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use bytes::Bytes;
use hashbrown::HashMap;
use parking_lot::{Condvar, Mutex};

/// Typed message tag.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CommTag(pub u16);

impl CommTag {
    pub const fn new(tag: u16) -> Self {
        Self(tag)
    }

    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Derived tag `k` slots above this one.
    pub const fn offset(self, k: u16) -> Self {
        Self(self.0.wrapping_add(k))
    }
}

/// Non-blocking point-to-point messaging between ranks.
pub trait Communicator {
    /// Handle returned by `isend`.
    type SendHandle: Wait;
    /// Handle returned by `irecv`.
    type RecvHandle: Wait;

    /// This process's rank.
    fn rank(&self) -> usize;
    /// Number of ranks in the world.
    fn size(&self) -> usize;

    fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> Self::SendHandle;
    /// Post a receive sized by `buf.len()`. The data is returned by
    /// [`Wait::wait`]. A longer message is never cut down to fit: the
    /// in-process backend returns it whole and MPI reports truncation, so
    /// callers must check the length they get.
    fn irecv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> Self::RecvHandle;

    /// True for the serial no-op backend.
    fn is_no_comm(&self) -> bool {
        false
    }

    /// Give up on the whole world: every receive still waiting, or posted
    /// later, on any rank completes with no data. No-op by default.
    fn abort(&self) {}
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

/// Single-rank no-op comm for serial runs and unit tests.
#[derive(Clone, Copy, Debug, Default)]
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
    fn is_no_comm(&self) -> bool {
        true
    }
}

// --- ThreadComm: in-process ranks, one per OS thread ---
type Key = (usize, usize, u16); // (src, dst, tag)

#[derive(Debug, Default)]
struct Mailbox {
    slots: Mutex<HashMap<Key, VecDeque<Bytes>>>,
    arrived: Condvar,
    // Only written while `slots` is locked, so waiters cannot miss it.
    aborted: AtomicBool,
}

/// In-memory communicator connecting the ranks of one [`ThreadComm::world`].
///
/// Each world owns a private mailbox, so independent worlds (e.g. parallel
/// tests) never see each other's traffic.
#[derive(Clone, Debug)]
pub struct ThreadComm {
    rank: usize,
    size: usize,
    mailbox: Arc<Mailbox>,
    timeout: Option<Duration>,
}

impl ThreadComm {
    /// Create `size` connected ranks, index `i` being rank `i`.
    pub fn world(size: usize) -> Vec<ThreadComm> {
        let mailbox = Arc::new(Mailbox::default());
        (0..size)
            .map(|rank| ThreadComm {
                rank,
                size,
                mailbox: Arc::clone(&mailbox),
                timeout: None,
            })
            .collect()
    }

    /// Give up on a receive after `timeout`; the handle then yields `None`.
    /// Without a timeout a silent peer blocks forever.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

pub struct LocalHandle {
    mailbox: Arc<Mailbox>,
    key: Key,
    deadline: Option<Instant>,
}

impl Wait for LocalHandle {
    fn wait(self) -> Option<Vec<u8>> {
        let (src, _, tag) = self.key;
        let mut slots = self.mailbox.slots.lock();
        loop {
            if let Some(bytes) = slots.get_mut(&self.key).and_then(VecDeque::pop_front) {
                return Some(bytes.to_vec());
            }
            if self.mailbox.aborted.load(Ordering::Acquire) {
                log::debug!("receive from rank {src} (tag {tag:#x}) abandoned: world aborted");
                return None;
            }
            match self.deadline {
                Some(deadline) => {
                    if self
                        .mailbox
                        .arrived
                        .wait_until(&mut slots, deadline)
                        .timed_out()
                    {
                        log::debug!("receive from rank {src} (tag {tag:#x}) timed out");
                        return slots
                            .get_mut(&self.key)
                            .and_then(VecDeque::pop_front)
                            .map(|bytes| bytes.to_vec());
                    }
                }
                None => self.mailbox.arrived.wait(&mut slots),
            }
        }
    }
}

impl Communicator for ThreadComm {
    type SendHandle = ();
    type RecvHandle = LocalHandle;

    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> Self::SendHandle {
        let key = (self.rank, peer, tag);
        self.mailbox
            .slots
            .lock()
            .entry(key)
            .or_default()
            .push_back(Bytes::copy_from_slice(buf));
        self.mailbox.arrived.notify_all();
    }

    fn irecv(&self, peer: usize, tag: u16, _buf: &mut [u8]) -> Self::RecvHandle {
        LocalHandle {
            mailbox: Arc::clone(&self.mailbox),
            key: (peer, self.rank, tag),
            deadline: self.timeout.map(|t| Instant::now() + t),
        }
    }

    fn abort(&self) {
        {
            let _slots = self.mailbox.slots.lock();
            self.mailbox.aborted.store(true, Ordering::Release);
        }
        log::warn!("rank {}: aborting in-process world", self.rank);
        self.mailbox.arrived.notify_all();
    }
}

// --- MPI backend (feature = "mpi-support") ---
#[cfg(feature = "mpi-support")]
mod mpi_backend {
    use super::{Communicator, Wait};
    use crate::heat_error::HeatError;
    use mpi::Tag;
    use mpi::environment::Universe;
    use mpi::point_to_point::{Destination, Source};
    use mpi::request::{Request, StaticScope};
    use mpi::topology::{Communicator as _, SimpleCommunicator};

    pub struct MpiComm {
        pub world: SimpleCommunicator,
        rank: usize,
        size: usize,
        // Dropped last: finalizes MPI.
        _universe: Universe,
    }

    impl MpiComm {
        pub fn new() -> Result<Self, HeatError> {
            let universe = mpi::initialize().ok_or(HeatError::MpiInit)?;
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

    /// Pending request plus the heap buffer MPI reads from or writes into.
    /// The buffer is leaked while the request is in flight and reclaimed in
    /// `wait`.
    pub struct MpiHandle {
        req: Request<'static, [u8], StaticScope>,
        buf: *mut [u8],
        deliver: bool,
    }

    impl Wait for MpiHandle {
        fn wait(self) -> Option<Vec<u8>> {
            self.req.wait();
            // SAFETY: `buf` came from `Box::leak` in `isend`/`irecv` and the
            // only other reference to it was owned by the request, which has
            // completed and been consumed above.
            let data = unsafe { Box::from_raw(self.buf) };
            self.deliver.then(|| data.into_vec())
        }
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
            let payload: &'static mut [u8] = Box::leak(buf.to_vec().into_boxed_slice());
            let ptr: *mut [u8] = payload;
            // SAFETY: `ptr` points at the leaked allocation above, which stays
            // alive until `MpiHandle::wait` reclaims it.
            let shared: &'static [u8] = unsafe { &*ptr };
            let req = self.world.process_at_rank(peer as i32).immediate_send_with_tag(
                StaticScope,
                shared,
                Tag::from(tag),
            );
            MpiHandle {
                req,
                buf: ptr,
                deliver: false,
            }
        }

        fn irecv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> MpiHandle {
            let landing: &'static mut [u8] = Box::leak(vec![0u8; buf.len()].into_boxed_slice());
            let ptr: *mut [u8] = landing;
            // SAFETY: as in `isend`; MPI is the only writer until `wait`.
            let target: &'static mut [u8] = unsafe { &mut *ptr };
            let req = self
                .world
                .process_at_rank(peer as i32)
                .immediate_receive_into_with_tag(StaticScope, target, Tag::from(tag));
            MpiHandle {
                req,
                buf: ptr,
                deliver: true,
            }
        }
    }
}

#[cfg(feature = "mpi-support")]
pub use mpi_backend::MpiComm;
