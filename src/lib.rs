// Module naming follows project convention (FIFO = the first-in first-out
// queueing discipline this crate implements)
#[allow(non_snake_case)]
pub mod FIFO;

#[allow(non_snake_case)]
pub mod Core;

#[allow(non_snake_case)]
pub mod Debug {
    pub mod StructDebug;
}

pub use Core::link::{BlackholeLink, LinkWriter};
pub use FIFO::Queue::PacketQueue;
pub use FIFO::Structs::{PacketBuf, PacketMeta};
pub use FIFO::{Discipline, DisciplineBuilder, SubmitError, BATCH_SIZE};
