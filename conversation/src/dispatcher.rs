use std::sync::Arc;

use crate::error::ParticipantError;
use crate::message::Message;
use crate::participant::Participant;
use crate::strategy::ReplyStrategy;

/// Receipt bookkeeping for one participant: counts and logs every normal
/// message, then hands it to the strategy picked from the participant's role.
#[derive(Debug)]
pub struct MessageDispatcher {
    participant: Arc<Participant>,
    strategy: ReplyStrategy,
}

impl MessageDispatcher {
    pub fn new(participant: Arc<Participant>) -> Self {
        let strategy = ReplyStrategy::for_role(participant.role());
        Self {
            participant,
            strategy,
        }
    }

    pub fn strategy(&self) -> ReplyStrategy {
        self.strategy
    }

    /// A missing message, an empty one, or a STOP ends the conversation
    /// without touching the received counter.
    pub async fn handle(&self, message: Option<Message>) -> Result<(), ParticipantError> {
        let message = match message {
            Some(message) if !message.content().is_empty() && !message.is_stop() => message,
            _ => {
                tracing::warn!(
                    participant = %self.participant.name(),
                    "Received no message, no content or STOP, sending STOP"
                );
                return self.participant.send_stop_message().await;
            }
        };

        let received = self.participant.increment_received_count();
        tracing::info!(
            participant = %self.participant.name(),
            sender = %message.sender(),
            content = %message.content(),
            received,
            "Received message"
        );

        self.strategy.handle(&self.participant, &message).await
    }
}
