// Close semantics: post-close rejection, idempotence, and exact reference
// accounting across the close race

use std::io;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use pktq_fifo::{
    BlackholeLink, Discipline, DisciplineBuilder, LinkWriter, PacketBuf, PacketMeta, PacketQueue,
    SubmitError,
};

/// Keeps a clone of every packet it is handed, so tests can account for
/// exactly which references the link side still holds.
#[derive(Default)]
struct CapturingLink {
    packets: Mutex<Vec<PacketBuf>>,
}

impl CapturingLink {
    fn captured_tags(&self) -> Vec<u32> {
        self.packets
            .lock()
            .iter()
            .map(|p| p.meta().egress_port)
            .collect()
    }
}

impl LinkWriter for CapturingLink {
    fn write_packets(&self, batch: &mut PacketQueue) -> io::Result<usize> {
        let mut captured = self.packets.lock();
        for pkt in batch.iter() {
            captured.push(pkt.clone());
        }
        Ok(batch.len())
    }
}

fn packet(tag: u32, flow_hash: Option<u32>) -> PacketBuf {
    let meta = PacketMeta {
        flow_hash,
        egress_port: tag,
        ..Default::default()
    };
    PacketBuf::new(meta, vec![0u8; 64])
}

#[test]
fn post_close_rejects_from_every_thread() {
    let qdisc = Arc::new(
        DisciplineBuilder::new()
            .with_shard_count(2)
            .with_shard_capacity(64)
            .build(Arc::new(BlackholeLink::new()))
            .unwrap(),
    );
    qdisc.close();
    assert!(qdisc.is_closed());

    let mut handles = vec![];
    for _ in 0..4 {
        let qdisc = Arc::clone(&qdisc);
        handles.push(thread::spawn(move || {
            for tag in 0..100 {
                let pkt = packet(tag, Some(tag));
                assert_eq!(qdisc.submit(&pkt), Err(SubmitError::ClosedForSend));
                assert_eq!(pkt.ref_count(), 1);
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn close_is_idempotent() {
    let qdisc = Discipline::new(Arc::new(BlackholeLink::new()), 2, 16).unwrap();
    qdisc.close();
    qdisc.close();
    assert_eq!(
        qdisc.submit(&packet(0, None)),
        Err(SubmitError::ClosedForSend)
    );
}

#[test]
fn concurrent_close_is_safe() {
    let qdisc = Arc::new(Discipline::new(Arc::new(BlackholeLink::new()), 4, 16).unwrap());

    let mut handles = vec![];
    for _ in 0..4 {
        let qdisc = Arc::clone(&qdisc);
        handles.push(thread::spawn(move || qdisc.close()));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    // Every closer has returned, so every loop has terminated and
    // admission is shut.
    assert_eq!(
        qdisc.submit(&packet(0, Some(1))),
        Err(SubmitError::ClosedForSend)
    );
}

#[test]
fn every_reference_is_released_exactly_once() {
    let link = Arc::new(CapturingLink::default());
    let qdisc = Arc::new(Discipline::new(link.clone(), 2, 256).unwrap());

    let producer = {
        let qdisc = Arc::clone(&qdisc);
        thread::spawn(move || {
            let mut produced: Vec<(PacketBuf, bool)> = Vec::with_capacity(500);
            for tag in 0..500 {
                let pkt = packet(tag, Some(tag));
                match qdisc.submit(&pkt) {
                    Ok(()) => produced.push((pkt, true)),
                    Err(SubmitError::NoBufferSpace) => produced.push((pkt, false)),
                    Err(SubmitError::ClosedForSend) => {
                        produced.push((pkt, false));
                        break;
                    }
                }
                if tag % 16 == 0 {
                    thread::sleep(Duration::from_micros(fastrand::u64(0..200)));
                }
            }
            produced
        })
    };

    thread::sleep(Duration::from_micros(fastrand::u64(200..1500)));
    qdisc.close();
    let produced = producer.join().unwrap();

    // close() has joined every loop: the captured set is final and every
    // queued-but-untransmitted packet has been released.
    let captured = link.captured_tags();
    for (pkt, admitted) in &produced {
        let tag = pkt.meta().egress_port;
        let times_captured = captured.iter().filter(|t| **t == tag).count();
        assert!(
            times_captured <= 1,
            "packet {tag} transmitted more than once"
        );
        if !admitted {
            assert_eq!(times_captured, 0, "rejected packet {tag} was transmitted");
        }
        assert_eq!(
            pkt.ref_count(),
            1 + times_captured,
            "reference accounting broke for packet {tag}"
        );
    }
}

#[test]
fn drop_lets_the_workers_exit() {
    let link = Arc::new(BlackholeLink::new());
    let qdisc = DisciplineBuilder::new()
        .with_shard_count(4)
        .with_shard_capacity(32)
        .build(link.clone())
        .unwrap();

    for tag in 0..8 {
        let _ = qdisc.submit(&packet(tag, Some(tag)));
    }
    drop(qdisc);

    // Each shard's worker holds a link reference through its dispatcher;
    // once the workers exit, only the test's handle remains.
    let deadline = Instant::now() + Duration::from_secs(10);
    while Arc::strong_count(&link) > 1 {
        assert!(Instant::now() < deadline, "dispatch threads never exited");
        thread::sleep(Duration::from_millis(1));
    }
}
