//! Send/receive capabilities the conversation core is written against.
//!
//! The core never inspects what sits behind these traits: a peer's mailbox in
//! the same process, a framed TCP stream, or a scripted source in tests.

use futures::future::BoxFuture;
use std::sync::Arc;

use crate::error::TransportError;
use crate::message::Message;

/// Moves a message towards the peer. May suspend (e.g. on a full mailbox).
pub trait MessageSender: Send + Sync {
    fn send(&self, message: Message) -> BoxFuture<'_, Result<(), TransportError>>;
}

/// Yields inbound messages. `Ok(None)` means the stream ended.
pub trait MessageReceiver: Send {
    fn receive(&mut self) -> BoxFuture<'_, Result<Option<Message>, TransportError>>;
}

/// Outbound handle a participant holds towards its peer.
pub type Outbound = Arc<dyn MessageSender>;
