//! UDP request transport

pub mod protocol;
mod udp;

pub use protocol::{decode_imsi, Reply, MAX_DATAGRAM_SIZE};
pub use udp::RequestServer;
