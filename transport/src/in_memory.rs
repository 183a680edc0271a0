//! Two participants in one process: each outbound handle is simply the
//! peer's mailbox, so a full mailbox holds the sender back.

use parley_conversation::{ConfigError, ConversationConfig, Participant, Role};
use std::sync::Arc;

/// Binds each participant's outbound handle to the other's mailbox.
pub fn connect(first: &Participant, second: &Participant) -> Result<(), ConfigError> {
    first.bind_outbound(Arc::new(second.mailbox()))?;
    second.bind_outbound(Arc::new(first.mailbox()))?;
    tracing::debug!(
        first = %first.name(),
        second = %second.name(),
        "Linked in-memory mailboxes"
    );
    Ok(())
}

/// Builds an initiator and a responder from `config` and links them.
pub fn pair(
    config: &ConversationConfig,
) -> Result<(Arc<Participant>, Arc<Participant>), ConfigError> {
    let initiator = Arc::new(Participant::with_capacity(
        config.initiator_name.as_str(),
        Role::Initiator,
        config.quota,
        config.mailbox_capacity,
    ));
    let responder = Arc::new(Participant::with_capacity(
        config.responder_name.as_str(),
        Role::Responder,
        0,
        config.mailbox_capacity,
    ));
    connect(&initiator, &responder)?;
    Ok((initiator, responder))
}
