use std::collections::VecDeque;
use std::fmt;

use super::Queue::PacketQueue;
use crate::FIFO::Structs::Packet_Structs::PacketBuf;

impl PacketQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            packets: VecDeque::new(),
        }
    }

    /// Creates an empty queue with room for `cap` packets before the
    /// backing storage reallocates.
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            packets: VecDeque::with_capacity(cap),
        }
    }

    /// Appends a packet to the tail.
    pub fn push_back(&mut self, pkt: PacketBuf) {
        self.packets.push_back(pkt);
    }

    /// Removes and returns the head packet, or `None` when empty.
    pub fn pop_front(&mut self) -> Option<PacketBuf> {
        self.packets.pop_front()
    }

    /// Number of packets currently queued.
    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    /// Drops every queued packet, releasing one reference each.
    pub fn clear(&mut self) {
        self.packets.clear();
    }

    /// Visits the queued packets front to back without consuming them.
    pub fn iter(&self) -> impl Iterator<Item = &PacketBuf> {
        self.packets.iter()
    }
}

impl Default for PacketQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PacketQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PacketQueue")
            .field("len", &self.packets.len())
            .finish()
    }
}
