use std::env;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use pktq_fifo::{BlackholeLink, DisciplineBuilder, PacketBuf, PacketMeta, SubmitError};

fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let burst: u32 = if args.len() > 1 {
        args[1].parse().unwrap_or(10_000)
    } else {
        10_000
    };

    let link = Arc::new(BlackholeLink::new());
    let qdisc = DisciplineBuilder::new()
        .with_shard_count(1)
        .with_shard_capacity(256)
        .build(link.clone())?;

    // Fire the whole burst without yielding to show fail-fast backpressure:
    // whatever overruns the shard is rejected, never queued or blocked on.
    let mut admitted = 0u64;
    let mut rejected = 0u64;
    for seq in 0..burst {
        let meta = PacketMeta {
            flow_hash: Some(1),
            protocol: 0x0800,
            egress_port: seq,
            ..Default::default()
        };
        let pkt = PacketBuf::new(meta, vec![0u8; 128]);
        match qdisc.submit(&pkt) {
            Ok(()) => admitted += 1,
            Err(SubmitError::NoBufferSpace) => rejected += 1,
            Err(e) => {
                eprintln!("unexpected rejection: {e}");
                break;
            }
        }
    }

    while link.written() < admitted {
        thread::sleep(Duration::from_millis(1));
    }
    println!(
        "burst of {}: admitted {}, rejected {}, transmitted {}",
        burst,
        admitted,
        rejected,
        link.written()
    );

    qdisc.close();
    Ok(())
}
