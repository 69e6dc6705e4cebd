mod builder;
mod discipline;
mod error;

pub(crate) mod dispatcher;

pub use builder::DisciplineBuilder;
pub use discipline::Discipline;
pub use dispatcher::BATCH_SIZE;
pub use error::SubmitError;

pub mod Queue {
    pub mod Queue;
    pub mod Queue_impl;
    pub use Queue::PacketQueue; // re-export for stable path
}

pub mod Structs {
    pub mod Packet_Structs;
    pub use Packet_Structs::{PacketBuf, PacketMeta}; // re-export for stable path
}
