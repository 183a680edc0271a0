//! # parley-transport
//!
//! Concrete send/receive capabilities for `parley-conversation`:
//!
//! - [`in_memory`] - both participants in one process, each one's outbound
//!   handle delivering straight into the other's mailbox
//! - [`socket`] - participants in separate processes over TCP, framed with
//!   the [`codec::WireCodec`]

pub mod codec;
pub mod in_memory;
pub mod socket;

#[cfg(test)]
mod socket_tests;

pub use codec::{WireCodec, MAX_FRAME_LEN, WIRE_VERSION};
pub use socket::{SocketReceiver, SocketSender};
