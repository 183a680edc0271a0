//! # parley-conversation
//!
//! A bounded two-party request/reply exchange. An **initiator** opens the
//! conversation, a **responder** answers every message, and once the
//! initiator has both sent and received its quota of messages it issues a
//! STOP that both sides observe before their loops end.
//!
//! ## Building blocks
//!
//! - [`Message`] - immutable value, either normal or STOP
//! - [`Participant`] - name, role, quota, atomic counters, a bounded
//!   [`mailbox`] and a write-once outbound handle towards the peer
//! - [`ReplyStrategy`] - what a role does with an incoming message
//! - [`MessageDispatcher`] - counts and logs receipts, then defers to the strategy
//! - [`ParticipantLoop`] - one task per participant: receive, dispatch, stop
//!
//! The core only sees the [`MessageSender`] and [`MessageReceiver`]
//! capabilities; an in-process mailbox and a framed TCP stream both fit behind
//! them.
//!
//! ## Quick start
//!
//! ```ignore
//! use parley_conversation::{Participant, ParticipantLoop, ReplyStrategy};
//! use std::sync::Arc;
//!
//! let initiator = Arc::new(Participant::initiator("Player1", 2));
//! let responder = Arc::new(Participant::responder("Player2"));
//! initiator.bind_outbound(Arc::new(responder.mailbox()))?;
//! responder.bind_outbound(Arc::new(initiator.mailbox()))?;
//!
//! let first = ParticipantLoop::new(initiator.clone())?;
//! let second = ParticipantLoop::new(responder)?;
//! first.start();
//! second.start();
//!
//! ReplyStrategy::Initiator.open(&initiator, "Hello Player2!").await?;
//! first.join().await;
//! second.join().await;
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod mailbox;
pub mod message;
pub mod participant;
pub mod participant_loop;
pub mod strategy;
pub mod transport;


pub use config::ConversationConfig;
pub use dispatcher::MessageDispatcher;
pub use error::{ConfigError, ParticipantError, TransportError};
pub use mailbox::{mailbox, MailboxReceiver, MailboxSender, DEFAULT_MAILBOX_CAPACITY};
pub use message::{Message, MessageKind, STOP_CONTENT};
pub use participant::{Participant, Role};
pub use participant_loop::{LoopState, ParticipantLoop, StopReason};
pub use strategy::{compose_reply, quota_reached, ReplyStrategy, REPLY_MARKER};
pub use transport::{MessageReceiver, MessageSender, Outbound};
