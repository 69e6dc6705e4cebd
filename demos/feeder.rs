use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use pktq_fifo::{BlackholeLink, DisciplineBuilder, PacketBuf, PacketMeta, SubmitError};

fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let producers: u32 = if args.len() > 1 {
        args[1].parse().unwrap_or(4)
    } else {
        4
    };

    let link = Arc::new(BlackholeLink::new());
    let qdisc = Arc::new(
        DisciplineBuilder::new()
            .with_shard_count(4)
            .with_shard_capacity(512)
            .build(link.clone())?,
    );

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || {
            running.store(false, Ordering::SeqCst);
        })
        .expect("Error setting Ctrl-C handler");
    }

    println!("Feeder: {} producers, Ctrl-C to close", producers);

    let mut handles = vec![];
    for producer_id in 0..producers {
        let qdisc = qdisc.clone();
        let running = running.clone();
        handles.push(thread::spawn(move || {
            let mut sent = 0u64;
            let mut rejected = 0u64;
            while running.load(Ordering::SeqCst) {
                let meta = PacketMeta {
                    flow_hash: Some(fastrand::u32(..)),
                    protocol: 0x0800,
                    egress_port: producer_id,
                    ..Default::default()
                };
                let pkt = PacketBuf::new(meta, vec![0u8; 256]);
                match qdisc.submit(&pkt) {
                    Ok(()) => sent += 1,
                    Err(SubmitError::NoBufferSpace) => {
                        rejected += 1;
                        thread::yield_now();
                    }
                    Err(SubmitError::ClosedForSend) => break,
                }
            }
            (producer_id, sent, rejected)
        }));
    }

    while running.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_secs(1));
        println!("link wrote {} packets so far", link.written());
    }

    for handle in handles {
        let (producer_id, sent, rejected) = handle.join().unwrap();
        println!(
            "producer {}: sent {}, rejected {}",
            producer_id, sent, rejected
        );
    }

    qdisc.close();
    println!("closed; link wrote {} packets total", link.written());
    Ok(())
}
