//! Participant state: identity, role, quota, counters, mailbox and the
//! write-once outbound handle towards the peer.

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Mutex, OnceLock,
};

use crate::error::{ConfigError, ParticipantError, TransportError};
use crate::mailbox::{mailbox, MailboxReceiver, MailboxSender, DEFAULT_MAILBOX_CAPACITY};
use crate::message::Message;
use crate::transport::Outbound;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Opens the conversation and owns the quota-based termination condition.
    Initiator,
    /// Only replies; stops when the initiator's STOP arrives.
    Responder,
}

pub struct Participant {
    name: String,
    role: Role,
    quota: usize,
    sent_count: AtomicUsize,
    received_count: AtomicUsize,
    stopped: AtomicBool,
    mailbox: MailboxSender,
    inbox: Mutex<Option<MailboxReceiver>>,
    outbound: OnceLock<Outbound>,
}

impl std::fmt::Debug for Participant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Participant")
            .field("name", &self.name)
            .field("role", &self.role)
            .field("quota", &self.quota)
            .field("sent_count", &self.sent_count())
            .field("received_count", &self.received_count())
            .field("stopped", &self.is_stopped())
            .finish_non_exhaustive()
    }
}

impl Participant {
    pub fn new(name: impl Into<String>, role: Role, quota: usize) -> Self {
        Self::with_capacity(name, role, quota, DEFAULT_MAILBOX_CAPACITY)
    }

    pub fn with_capacity(
        name: impl Into<String>,
        role: Role,
        quota: usize,
        mailbox_capacity: usize,
    ) -> Self {
        let (mailbox, inbox) = mailbox(mailbox_capacity);
        Self {
            name: name.into(),
            role,
            quota,
            sent_count: AtomicUsize::new(0),
            received_count: AtomicUsize::new(0),
            stopped: AtomicBool::new(false),
            mailbox,
            inbox: Mutex::new(Some(inbox)),
            outbound: OnceLock::new(),
        }
    }

    pub fn initiator(name: impl Into<String>, quota: usize) -> Self {
        Self::new(name, Role::Initiator, quota)
    }

    /// Quota means nothing for a responder, so it is fixed at zero.
    pub fn responder(name: impl Into<String>) -> Self {
        Self::new(name, Role::Responder, 0)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_initiator(&self) -> bool {
        self.role == Role::Initiator
    }

    pub fn quota(&self) -> usize {
        self.quota
    }

    pub fn sent_count(&self) -> usize {
        self.sent_count.load(Ordering::SeqCst)
    }

    pub fn received_count(&self) -> usize {
        self.received_count.load(Ordering::SeqCst)
    }

    /// True once this participant has issued or acknowledged a STOP.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Delivery handle into this participant's mailbox, for a peer or a socket pump.
    pub fn mailbox(&self) -> MailboxSender {
        self.mailbox.clone()
    }

    /// Hands the receiving end of the mailbox to the loop. Succeeds once.
    pub(crate) fn take_inbox(&self) -> Option<MailboxReceiver> {
        self.inbox
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take()
    }

    pub fn is_bound(&self) -> bool {
        self.outbound.get().is_some()
    }

    /// Binds the handle used to reach the peer. Binding twice is a
    /// configuration error and leaves the first binding in place.
    pub fn bind_outbound(&self, outbound: Outbound) -> Result<(), ConfigError> {
        self.outbound
            .set(outbound)
            .map_err(|_| ConfigError::OutboundAlreadyBound(self.name.clone()))
    }

    pub(crate) fn increment_received_count(&self) -> usize {
        self.received_count.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Sends `content` to the peer, tagged with this participant's running
    /// send counter. Empty content is a request to terminate.
    pub async fn send_message(&self, content: &str) -> Result<(), ParticipantError> {
        let outbound = self
            .outbound
            .get()
            .ok_or_else(|| TransportError::Unbound(self.name.clone()))?;

        if content.is_empty() {
            tracing::info!(participant = %self.name, "Empty message requested, sending STOP instead");
            return self.send_stop_message().await;
        }

        let counter = self.sent_count.fetch_add(1, Ordering::SeqCst) + 1;
        let message = Message::normal(self.name.as_str(), format!("{content} [sent#{counter}]"));
        tracing::debug!(participant = %self.name, content = %message.content(), "Sending message");
        outbound.send(message).await?;
        tracing::info!(participant = %self.name, sent = counter, "Sent message");
        Ok(())
    }

    /// Self-delivers a STOP so the local loop terminates even if the peer
    /// never answers, then forwards it to the peer (best effort).
    ///
    /// The local copy is queued before the peer can see the STOP, so a peer
    /// acknowledgement always lands behind it. Calling it again once stopped
    /// is a no-op.
    pub async fn send_stop_message(&self) -> Result<(), ParticipantError> {
        if self.stopped.swap(true, Ordering::SeqCst) {
            tracing::debug!(participant = %self.name, "Already stopped, STOP not repeated");
            return Ok(());
        }

        let stop = Message::stop(self.name.as_str());
        let queued = self.mailbox.deliver(stop.clone()).await;
        if let Err(error) = &queued {
            tracing::warn!(participant = %self.name, %error, "Could not queue own STOP");
        }

        match self.outbound.get() {
            Some(outbound) => {
                if let Err(error) = outbound.send(stop).await {
                    tracing::warn!(participant = %self.name, %error, "Could not forward STOP to peer");
                }
            }
            None => {
                tracing::warn!(participant = %self.name, "No outbound handle bound, STOP not forwarded")
            }
        }

        queued?;
        tracing::info!(participant = %self.name, "Sent STOP message");
        Ok(())
    }
}
