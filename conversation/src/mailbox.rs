//! Bounded FIFO inbox for a single participant.
//!
//! Any number of producers hold a [`MailboxSender`]: the peer's outbound
//! handle, a socket pump, and the participant itself when it self-delivers a
//! STOP. Exactly one [`MailboxReceiver`] exists and it is consumed by the
//! participant loop.

use futures::future::{BoxFuture, FutureExt as _};
use parley_rt::tasks::mpsc;

use crate::error::TransportError;
use crate::message::Message;
use crate::transport::{MessageReceiver, MessageSender};

pub const DEFAULT_MAILBOX_CAPACITY: usize = 20;

#[derive(Debug)]
enum Delivery {
    Message(Message),
    Ended,
    Failed(TransportError),
}

/// Creates a mailbox holding at most `capacity` undelivered items (minimum 1).
pub fn mailbox(capacity: usize) -> (MailboxSender, MailboxReceiver) {
    let capacity = capacity.max(1);
    let (tx, rx) = mpsc::channel(capacity);
    (
        MailboxSender { tx, capacity },
        MailboxReceiver {
            rx,
            finished: false,
        },
    )
}

#[derive(Debug, Clone)]
pub struct MailboxSender {
    tx: mpsc::Sender<Delivery>,
    capacity: usize,
}

impl MailboxSender {
    /// Enqueues `message`, waiting while the mailbox is full. Nothing is dropped.
    pub async fn deliver(&self, message: Message) -> Result<(), TransportError> {
        self.tx.send(Delivery::Message(message)).await?;
        Ok(())
    }

    /// Marks the inbound stream as ended; the receiver yields `Ok(None)` once
    /// everything queued before it has been consumed.
    pub async fn end(&self) -> Result<(), TransportError> {
        self.tx.send(Delivery::Ended).await?;
        Ok(())
    }

    /// Surfaces a transport failure to the receiver, after queued messages.
    pub async fn fail(&self, error: TransportError) -> Result<(), TransportError> {
        self.tx.send(Delivery::Failed(error)).await?;
        Ok(())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of items currently waiting in the mailbox.
    pub fn len(&self) -> usize {
        self.capacity - self.tx.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True once the receiving side has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl MessageSender for MailboxSender {
    fn send(&self, message: Message) -> BoxFuture<'_, Result<(), TransportError>> {
        self.deliver(message).boxed()
    }
}

#[derive(Debug)]
pub struct MailboxReceiver {
    rx: mpsc::Receiver<Delivery>,
    finished: bool,
}

impl MailboxReceiver {
    /// Waits for the next message. After an end marker or a failure the
    /// receiver keeps answering `Ok(None)`.
    pub async fn recv(&mut self) -> Result<Option<Message>, TransportError> {
        if self.finished {
            return Ok(None);
        }
        match self.rx.recv().await {
            Some(Delivery::Message(message)) => Ok(Some(message)),
            Some(Delivery::Failed(error)) => {
                self.finished = true;
                Err(error)
            }
            Some(Delivery::Ended) | None => {
                self.finished = true;
                Ok(None)
            }
        }
    }
}

impl MessageReceiver for MailboxReceiver {
    fn receive(&mut self) -> BoxFuture<'_, Result<Option<Message>, TransportError>> {
        self.recv().boxed()
    }
}
