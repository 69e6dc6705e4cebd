// Ordered packet buffer shared by the per-shard queues and transmit batches

use std::collections::VecDeque;

use crate::FIFO::Structs::Packet_Structs::PacketBuf;

/// An ordered FIFO sequence of packet buffers.
///
/// Insertion order is the transmission-order contract: packets handed to the
/// link transmitter leave in exactly the order they were pushed. The same
/// type backs both the bounded per-shard buffer and the in-flight transmit
/// batch, so ownership moves between the two without repacking.
pub struct PacketQueue {
    pub(crate) packets: VecDeque<PacketBuf>,
}
