use std::fmt;

use crate::FIFO::dispatcher::QueueDispatcher;
use crate::FIFO::Discipline;
use crate::FIFO::Structs::PacketBuf;

/// Debug function for Discipline
///
/// Provides a safe debug representation that shows:
/// - Shard count and the global closed flag
/// - Each shard's queue depth and limit
pub fn debug_discipline(qdisc: &Discipline, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Discipline")
        .field("shards", &qdisc.shard_count())
        .field("closed", &qdisc.is_closed())
        .field("dispatchers", &qdisc.dispatchers())
        .finish()
}

/// Debug function for a single shard dispatcher
///
/// Reads the queue depth through try_lock so formatting never stalls the
/// datapath; a contended shard shows as "<locked>".
pub(crate) fn debug_queue_dispatcher(
    qd: &QueueDispatcher,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    let mut s = f.debug_struct("QueueDispatcher");
    match qd.try_used() {
        Some(used) => s.field("used", &used),
        None => s.field("used", &"<locked>"),
    };
    s.field("limit", &qd.limit()).finish()
}

/// Debug function for PacketBuf
///
/// Shows routing hash, payload length, and the live reference count without
/// dumping payload bytes.
pub fn debug_packet_buf(pkt: &PacketBuf, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("PacketBuf")
        .field("flow_hash", &pkt.flow_hash())
        .field("payload_len", &pkt.len())
        .field("refs", &pkt.ref_count())
        .finish()
}
