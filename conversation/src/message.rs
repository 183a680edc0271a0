use std::fmt::Display;

/// Content carried by every STOP message.
pub const STOP_CONTENT: &str = "STOP";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Normal,
    Stop,
}

/// Immutable unit of exchange between two participants.
///
/// Only [`Message::normal`] and [`Message::stop`] build messages, so a STOP
/// always carries [`STOP_CONTENT`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    sender: String,
    content: String,
    kind: MessageKind,
}

impl Message {
    pub fn normal(sender: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            content: content.into(),
            kind: MessageKind::Normal,
        }
    }

    pub fn stop(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            content: STOP_CONTENT.to_string(),
            kind: MessageKind::Stop,
        }
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn is_stop(&self) -> bool {
        self.kind == MessageKind::Stop
    }
}

impl Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Message{{sender='{}', content='{}', kind={:?}}}",
            self.sender, self.content, self.kind
        )
    }
}
