use std::io;

/// Setup mistakes. Fatal for the affected participant and never retried.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("outbound handle already bound for '{0}'")]
    OutboundAlreadyBound(String),
    #[error("mailbox of '{0}' is already attached to a loop")]
    MailboxAlreadyAttached(String),
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },
}

/// Any failure moving a message. A loop that sees one of these stops.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("outbound handle not bound for '{0}'")]
    Unbound(String),
    #[error("mailbox is closed")]
    MailboxClosed,
    #[error("connection closed")]
    Closed,
    #[error("malformed frame: {0}")]
    Malformed(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ParticipantError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl<T> From<parley_rt::tasks::mpsc::SendError<T>> for TransportError {
    fn from(_value: parley_rt::tasks::mpsc::SendError<T>) -> Self {
        Self::MailboxClosed
    }
}
