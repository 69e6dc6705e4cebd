pub mod link;
pub mod wake;

pub use link::{BlackholeLink, LinkWriter};
pub use wake::WakeSet;
