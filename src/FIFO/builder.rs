use std::io;
use std::sync::Arc;

use crate::Core::link::LinkWriter;
use crate::FIFO::discipline::Discipline;

/// Builder for a [`Discipline`].
pub struct DisciplineBuilder {
    shard_count: usize,
    shard_capacity: usize,
}

impl Default for DisciplineBuilder {
    fn default() -> Self {
        Self {
            shard_count: 1,       // a single shard preserves global FIFO order
            shard_capacity: 1024, // packets per shard before backpressure
        }
    }
}

impl DisciplineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of independent shards. More shards means more producer
    /// parallelism and no ordering across flows that hash apart. Must be at
    /// least 1.
    pub fn with_shard_count(mut self, shard_count: usize) -> Self {
        self.shard_count = shard_count;
        self
    }

    /// Bounded capacity of each shard's queue, in packets. Submissions to a
    /// full shard are rejected, never blocked.
    pub fn with_shard_capacity(mut self, shard_capacity: usize) -> Self {
        self.shard_capacity = shard_capacity;
        self
    }

    /// Builds the discipline over `link` and starts its dispatch threads.
    pub fn build(self, link: Arc<dyn LinkWriter>) -> io::Result<Discipline> {
        Discipline::new(link, self.shard_count, self.shard_capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Core::link::BlackholeLink;

    #[test]
    fn defaults_are_single_shard() {
        let builder = DisciplineBuilder::new();
        assert_eq!(builder.shard_count, 1);
        assert_eq!(builder.shard_capacity, 1024);
    }

    #[test]
    fn builds_with_configured_shards() {
        let qdisc = DisciplineBuilder::new()
            .with_shard_count(4)
            .with_shard_capacity(64)
            .build(Arc::new(BlackholeLink::new()))
            .unwrap();
        assert_eq!(qdisc.shard_count(), 4);
        qdisc.close();
    }
}
