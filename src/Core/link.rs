// Lower link endpoint boundary consumed by the queueing discipline

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::FIFO::Queue::PacketQueue;

/// The transmit side of an underlying link endpoint.
///
/// `write_packets` must attempt to transmit the batch in order and report
/// how many packets it wrote. The discipline neither retries nor inspects
/// the count: delivery at this layer is at-most-once, and the discipline
/// releases its ownership of every packet in the batch as soon as the call
/// returns, whatever the outcome.
///
/// Implementations are shared across shard dispatch threads and must be
/// safe to call concurrently.
pub trait LinkWriter: Send + Sync {
    fn write_packets(&self, batch: &mut PacketQueue) -> io::Result<usize>;
}

/// A link endpoint that counts and discards everything handed to it.
///
/// Stands in for a real device writer in demos and tests, and serves as a
/// sink when only admission/queueing behavior matters.
#[derive(Debug, Default)]
pub struct BlackholeLink {
    written: AtomicU64,
}

impl BlackholeLink {
    pub fn new() -> Self {
        Self {
            written: AtomicU64::new(0),
        }
    }

    /// Total number of packets discarded so far.
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }
}

impl LinkWriter for BlackholeLink {
    fn write_packets(&self, batch: &mut PacketQueue) -> io::Result<usize> {
        let n = batch.len();
        self.written.fetch_add(n as u64, Ordering::Relaxed);
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FIFO::Structs::{PacketBuf, PacketMeta};

    #[test]
    fn blackhole_counts_batches() {
        let link = BlackholeLink::new();
        let mut batch = PacketQueue::new();
        for _ in 0..5 {
            batch.push_back(PacketBuf::new(PacketMeta::default(), vec![0u8; 8]));
        }

        assert_eq!(link.write_packets(&mut batch).unwrap(), 5);
        assert_eq!(link.written(), 5);
    }
}
