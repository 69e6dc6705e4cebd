// Caller-populated packet metadata and the shared-ownership packet handle

use std::fmt;
use std::sync::Arc;

/// Transport-only metadata carried with each outbound packet.
///
/// Every field is populated by the protocol/routing layers before the packet
/// is submitted. The queueing discipline reads only `flow_hash`; the rest is
/// opaque freight for the link transmitter.
#[derive(Copy, Clone, Debug, Default)]
pub struct PacketMeta {
    /// Pre-computed non-cryptographic flow hash used for shard routing.
    /// `None` marks unhashed traffic, which is pinned to a fixed shard so
    /// its relative order is preserved.
    pub flow_hash: Option<u32>,

    /// Network protocol number of the payload (e.g. 0x0800 for IPv4).
    pub protocol: u16,

    /// Egress device identifier resolved by the routing layer.
    pub egress_port: u32,

    /// Segment size for generic segmentation offload; 0 disables GSO.
    pub gso_segment_size: u16,
}

struct PacketInner {
    meta: PacketMeta,
    payload: Vec<u8>,
}

/// A reference-counted outbound packet buffer.
///
/// `PacketBuf` participates in a shared-ownership scheme: every `clone`
/// acquires one reference to the underlying storage and every drop releases
/// one. The queueing layer clones exactly once on enqueue and drops exactly
/// once on transmit or shutdown discard, so those transfer points are the
/// only places the count changes and the storage is freed when the last
/// holder lets go.
#[derive(Clone)]
pub struct PacketBuf {
    inner: Arc<PacketInner>,
}

impl PacketBuf {
    /// Creates a packet from caller-populated metadata and payload bytes.
    pub fn new(meta: PacketMeta, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            inner: Arc::new(PacketInner {
                meta,
                payload: payload.into(),
            }),
        }
    }

    pub fn meta(&self) -> &PacketMeta {
        &self.inner.meta
    }

    /// The flow hash used for shard routing, if the packet carries one.
    pub fn flow_hash(&self) -> Option<u32> {
        self.inner.meta.flow_hash
    }

    pub fn payload(&self) -> &[u8] {
        &self.inner.payload
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.inner.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.payload.is_empty()
    }

    /// Current number of live references to the underlying storage.
    ///
    /// Advisory while other holders are cloning or dropping concurrently;
    /// exact once the discipline has quiesced (e.g. after `close`).
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl fmt::Debug for PacketBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::Debug::StructDebug::debug_packet_buf(self, f)
    }
}
