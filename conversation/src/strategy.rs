//! Role-specific reply policies.
//!
//! A strategy decides what a participant does with an incoming normal
//! message: reply, or end the conversation. It never counts received
//! messages; the dispatcher is the only place that does.

use crate::error::ParticipantError;
use crate::message::Message;
use crate::participant::{Participant, Role};

/// Separator placed between the incoming content and the replier's name.
pub const REPLY_MARKER: &str = " | reply-from-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyStrategy {
    /// Replies until both counters reach the quota, then sends STOP.
    Initiator,
    /// Always replies; has no termination condition of its own.
    Responder,
}

impl ReplyStrategy {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Initiator => Self::Initiator,
            Role::Responder => Self::Responder,
        }
    }

    /// Reacts to one normal message: at most one message goes out.
    pub async fn handle(
        self,
        participant: &Participant,
        message: &Message,
    ) -> Result<(), ParticipantError> {
        if self == Self::Initiator && quota_reached(participant) {
            tracing::info!(
                participant = %participant.name(),
                sent = participant.sent_count(),
                received = participant.received_count(),
                "Reached max messages, sending STOP"
            );
            return participant.send_stop_message().await;
        }

        let reply = compose_reply(message.content(), participant.name());
        tracing::debug!(participant = %participant.name(), %reply, "Replying");
        participant.send_message(&reply).await
    }

    /// First turn of a conversation. An initiator whose quota is already met
    /// (quota 0) sends nothing and issues STOP straight away.
    pub async fn open(
        self,
        participant: &Participant,
        content: &str,
    ) -> Result<(), ParticipantError> {
        if self == Self::Initiator && quota_reached(participant) {
            tracing::info!(participant = %participant.name(), "Quota already met, opening with STOP");
            return participant.send_stop_message().await;
        }
        participant.send_message(content).await
    }
}

/// Initiator termination condition: sent and received both at quota.
pub fn quota_reached(participant: &Participant) -> bool {
    participant.sent_count() >= participant.quota()
        && participant.received_count() >= participant.quota()
}

pub fn compose_reply(content: &str, replier: &str) -> String {
    format!("{content}{REPLY_MARKER}{replier}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_rt::tasks::Runtime;
    use std::sync::Arc;

    #[test]
    fn strategy_follows_role() {
        assert_eq!(ReplyStrategy::for_role(Role::Initiator), ReplyStrategy::Initiator);
        assert_eq!(ReplyStrategy::for_role(Role::Responder), ReplyStrategy::Responder);
    }

    #[test]
    fn reply_appends_replier_name() {
        assert_eq!(
            compose_reply("Hello [sent#1]", "Player2"),
            "Hello [sent#1] | reply-from-Player2"
        );
    }

    #[test]
    fn initiator_replies_below_quota() {
        let runtime = Runtime::new().unwrap();
        runtime.block_on(async move {
            let initiator = Participant::initiator("Initiator", 2);
            let responder = Participant::responder("Responder");
            initiator.bind_outbound(Arc::new(responder.mailbox())).unwrap();
            let mut peer_inbox = responder.take_inbox().unwrap();

            let incoming = Message::normal("Responder", "ping");
            ReplyStrategy::Initiator
                .handle(&initiator, &incoming)
                .await
                .unwrap();

            let reply = peer_inbox.recv().await.unwrap().unwrap();
            assert_eq!(reply.content(), "ping | reply-from-Initiator [sent#1]");
            assert!(!initiator.is_stopped());
            assert_eq!(initiator.received_count(), 0);
        });
    }

    #[test]
    fn initiator_with_zero_quota_stops_instead_of_replying() {
        let runtime = Runtime::new().unwrap();
        runtime.block_on(async move {
            let initiator = Participant::initiator("Initiator", 0);
            let responder = Participant::responder("Responder");
            initiator.bind_outbound(Arc::new(responder.mailbox())).unwrap();
            let mut peer_inbox = responder.take_inbox().unwrap();

            ReplyStrategy::Initiator
                .handle(&initiator, &Message::normal("Responder", "ping"))
                .await
                .unwrap();

            assert!(peer_inbox.recv().await.unwrap().unwrap().is_stop());
            assert_eq!(initiator.sent_count(), 0);
            assert!(initiator.is_stopped());
        });
    }

    #[test]
    fn responder_always_replies() {
        let runtime = Runtime::new().unwrap();
        runtime.block_on(async move {
            let initiator = Participant::initiator("Initiator", 0);
            let responder = Participant::responder("Responder");
            responder.bind_outbound(Arc::new(initiator.mailbox())).unwrap();
            let mut inbox = initiator.take_inbox().unwrap();

            for round in 1..=3 {
                ReplyStrategy::Responder
                    .handle(&responder, &Message::normal("Initiator", "x"))
                    .await
                    .unwrap();
                let reply = inbox.recv().await.unwrap().unwrap();
                assert_eq!(reply.content(), format!("x | reply-from-Responder [sent#{round}]"));
            }
            assert!(!responder.is_stopped());
        });
    }

    #[test]
    fn opening_with_zero_quota_sends_only_stop() {
        let runtime = Runtime::new().unwrap();
        runtime.block_on(async move {
            let initiator = Participant::initiator("Initiator", 0);
            let responder = Participant::responder("Responder");
            initiator.bind_outbound(Arc::new(responder.mailbox())).unwrap();
            let mut peer_inbox = responder.take_inbox().unwrap();

            ReplyStrategy::Initiator
                .open(&initiator, "Hello Responder!")
                .await
                .unwrap();

            assert_eq!(initiator.sent_count(), 0);
            assert!(peer_inbox.recv().await.unwrap().unwrap().is_stop());
        });
    }
}
