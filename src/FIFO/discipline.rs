// Discipline entry point: shard routing, admission control, lifecycle

use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::Core::link::LinkWriter;
use crate::FIFO::dispatcher::QueueDispatcher;
use crate::FIFO::error::SubmitError;
use crate::FIFO::Structs::PacketBuf;

/// Shard index that receives traffic without a usable flow hash. Pinning
/// unhashed packets to one shard keeps their relative order instead of
/// scattering them across queues.
const UNHASHED_SHARD: usize = 0;

/// A FIFO queueing discipline over a fixed set of independently locked
/// shards.
///
/// Every outbound packet is routed to exactly one shard by its flow hash
/// and drained by that shard's dedicated dispatch thread in submission
/// order. Shards share nothing but the link writer, so producers targeting
/// different shards never contend. Within one shard, transmit order equals
/// enqueue order for every packet that is transmitted; across shards there
/// is no relative ordering.
pub struct Discipline {
    dispatchers: Vec<Arc<QueueDispatcher>>,
    closed: AtomicBool,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl Discipline {
    /// Creates a discipline with `shard_count` shards of `shard_capacity`
    /// packets each and starts one dispatch thread per shard. The handle is
    /// usable by concurrent callers the moment this returns.
    ///
    /// `shard_count` must be at least 1.
    pub fn new(
        link: Arc<dyn LinkWriter>,
        shard_count: usize,
        shard_capacity: usize,
    ) -> io::Result<Self> {
        assert!(shard_count >= 1, "discipline needs at least one shard");

        let mut dispatchers: Vec<Arc<QueueDispatcher>> = Vec::with_capacity(shard_count);
        let mut workers = Vec::with_capacity(shard_count);
        for shard_id in 0..shard_count {
            let qd = Arc::new(QueueDispatcher::new(Arc::clone(&link), shard_capacity));
            let spawn = {
                let qd = Arc::clone(&qd);
                thread::Builder::new()
                    .name(format!("pktq-shard-{shard_id}"))
                    .spawn(move || qd.dispatch_loop())
            };
            let worker = match spawn {
                Ok(worker) => worker,
                Err(e) => {
                    // Unwind the shards that already have a running loop.
                    for started in &dispatchers {
                        started.signal_close();
                    }
                    return Err(e);
                }
            };
            dispatchers.push(qd);
            workers.push(worker);
        }

        info!(
            shards = shard_count,
            capacity = shard_capacity,
            "fifo discipline started"
        );

        Ok(Self {
            dispatchers,
            closed: AtomicBool::new(false),
            workers: Mutex::new(workers),
        })
    }

    /// Admits `pkt` for asynchronous transmission.
    ///
    /// Takes one reference on success; the caller keeps its own handle
    /// either way. Fails fast instead of blocking: `ClosedForSend` once
    /// [`close`](Self::close) has begun, `NoBufferSpace` while the target
    /// shard is at capacity. Whatever metadata the link transmitter needs
    /// (route, offload options, protocol) must already be populated; this
    /// layer neither validates nor fills it.
    pub fn submit(&self, pkt: &PacketBuf) -> Result<(), SubmitError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(SubmitError::ClosedForSend);
        }
        let shard = match pkt.flow_hash() {
            Some(hash) => hash as usize % self.dispatchers.len(),
            None => UNHASHED_SHARD,
        };
        self.dispatchers[shard].enqueue(pkt)
    }

    /// Closes the discipline: future `submit` calls fail with
    /// `ClosedForSend`, every shard discards its remaining backlog instead
    /// of transmitting it, and the call returns once all dispatch threads
    /// have terminated.
    ///
    /// Safe to call repeatedly and from multiple threads; every call blocks
    /// until the loops are gone.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        for qd in &self.dispatchers {
            qd.signal_close();
        }

        // Joining under the lock makes late and concurrent closers block
        // until the first closer has seen every loop exit.
        let mut workers = self.workers.lock();
        if workers.is_empty() {
            return;
        }
        for worker in workers.drain(..) {
            if worker.join().is_err() {
                debug!("shard dispatch thread panicked before join");
            }
        }
        info!("fifo discipline closed");
    }

    /// Number of shards packets are routed across.
    pub fn shard_count(&self) -> usize {
        self.dispatchers.len()
    }

    /// Whether `close` has begun. Once true it never reverts.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub(crate) fn dispatchers(&self) -> &[Arc<QueueDispatcher>] {
        &self.dispatchers
    }
}

impl Drop for Discipline {
    fn drop(&mut self) {
        // Signal without joining so a drop on the hot path never blocks;
        // an explicit close() is the graceful, draining shutdown.
        self.closed.store(true, Ordering::Release);
        for qd in &self.dispatchers {
            qd.signal_close();
        }
    }
}

impl fmt::Debug for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::Debug::StructDebug::debug_discipline(self, f)
    }
}
