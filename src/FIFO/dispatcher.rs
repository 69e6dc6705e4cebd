// Per-shard bounded FIFO and the dedicated dispatch loop that drains it

use std::fmt;
use std::sync::Arc;

use crossbeam_utils::CachePadded;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::Core::link::LinkWriter;
use crate::Core::wake::WakeSet;
use crate::FIFO::error::SubmitError;
use crate::FIFO::Queue::PacketQueue;
use crate::FIFO::Structs::PacketBuf;

/// Maximum number of packets handed to the link writer in one call.
///
/// Bounding the batch caps the latency batching can add and the size of any
/// single transmit; draining to empty before flushing a partial batch keeps
/// low-traffic shards from waiting on a fill that never comes.
pub const BATCH_SIZE: usize = 32;

/// Wake source: the discipline is shutting this shard down. Registered on
/// the lower bit, so a close that races pending work wins the next fetch
/// and the backlog is dropped instead of transmitted.
const WAKE_CLOSE: u32 = 1 << 0;

/// Wake source: a producer appended a packet to the shard queue.
const WAKE_NEW_PACKET: u32 = 1 << 1;

/// Mutable shard state guarded by the shard's exclusive lock.
///
/// Invariant, checked under the lock: `used == queue.len()` and
/// `used <= limit` at every observable instant.
struct ShardState {
    queue: PacketQueue,
    used: usize,
}

/// One shard of the discipline: a bounded FIFO plus the sequential worker
/// that drains it.
///
/// Producers only ever run the brief locked `enqueue` step; a single
/// dedicated thread runs `dispatch_loop` from construction until the close
/// wake fires. The shard state is cache-padded so adjacent shards in the
/// discipline's array never share a line.
pub(crate) struct QueueDispatcher {
    link: Arc<dyn LinkWriter>,
    limit: usize,
    shard: CachePadded<Mutex<ShardState>>,
    wake: WakeSet,
}

impl QueueDispatcher {
    pub(crate) fn new(link: Arc<dyn LinkWriter>, limit: usize) -> Self {
        Self {
            link,
            limit,
            shard: CachePadded::new(Mutex::new(ShardState {
                queue: PacketQueue::with_capacity(limit),
                used: 0,
            })),
            wake: WakeSet::new(),
        }
    }

    /// Locked admission step, run on the producer's thread.
    ///
    /// Takes one reference to the packet and appends it to the tail, or
    /// rejects without touching shard state when the queue is at capacity.
    /// Never blocks beyond the enqueue's own lock hold.
    pub(crate) fn enqueue(&self, pkt: &PacketBuf) -> Result<(), SubmitError> {
        let mut state = self.shard.lock();
        debug_assert_eq!(state.used, state.queue.len());
        if state.used >= self.limit {
            return Err(SubmitError::NoBufferSpace);
        }
        state.queue.push_back(pkt.clone());
        state.used += 1;
        drop(state);
        self.wake.assert(WAKE_NEW_PACKET);
        Ok(())
    }

    /// Signals the dispatch loop to discard its backlog and terminate.
    pub(crate) fn signal_close(&self) {
        self.wake.assert(WAKE_CLOSE);
    }

    /// Sequential worker for this shard.
    ///
    /// Parks until a wake source fires: new work drains the queue into
    /// bounded batches forwarded to the link writer in arrival order; close
    /// discards whatever is still buffered and terminates the loop. A wake
    /// from any other source means the signaling bookkeeping is corrupt and
    /// aborts rather than continuing degraded.
    pub(crate) fn dispatch_loop(&self) {
        let mut batch = PacketQueue::with_capacity(BATCH_SIZE);
        loop {
            match self.wake.fetch() {
                WAKE_NEW_PACKET => self.drain(&mut batch),
                WAKE_CLOSE => {
                    self.discard_backlog();
                    return;
                }
                other => panic!("unknown wake source {other:#x}"),
            }
        }
    }

    /// Moves packets from the queue into the batch under the lock and
    /// flushes each full (or final partial) batch with the lock released.
    fn drain(&self, batch: &mut PacketQueue) {
        let mut state = self.shard.lock();
        while let Some(pkt) = state.queue.pop_front() {
            state.used -= 1;
            batch.push_back(pkt);
            if batch.len() < BATCH_SIZE && state.used != 0 {
                continue;
            }
            drop(state);
            self.flush(batch);
            state = self.shard.lock();
        }
        debug_assert_eq!(state.used, 0);
    }

    /// Hands the batch to the link writer, then releases every packet in it
    /// whatever the write reported. Transmission failures are absorbed
    /// here: admission already succeeded and there is no error channel back
    /// to the producer.
    fn flush(&self, batch: &mut PacketQueue) {
        trace!(packets = batch.len(), "flushing batch to link");
        if let Err(e) = self.link.write_packets(batch) {
            debug!(error = %e, "link write failed, dropping batch");
        }
        batch.clear();
    }

    /// Shutdown path: pop and release every buffered packet without
    /// transmitting it.
    fn discard_backlog(&self) {
        let mut state = self.shard.lock();
        let dropped = state.used;
        while let Some(pkt) = state.queue.pop_front() {
            state.used -= 1;
            drop(pkt);
        }
        if dropped > 0 {
            debug!(dropped, "discarded shard backlog on shutdown");
        }
    }

    pub(crate) fn limit(&self) -> usize {
        self.limit
    }

    /// Snapshot of the queue depth; `None` while the shard lock is held
    /// elsewhere.
    pub(crate) fn try_used(&self) -> Option<usize> {
        self.shard.try_lock().map(|state| state.used)
    }
}

impl fmt::Debug for QueueDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::Debug::StructDebug::debug_queue_dispatcher(self, f)
    }
}
