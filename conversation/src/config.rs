//! Configuration for a two-party conversation.

use std::str::FromStr;

use crate::error::ConfigError;
use crate::mailbox::DEFAULT_MAILBOX_CAPACITY;

pub const ENV_QUOTA: &str = "PARLEY_QUOTA";
pub const ENV_MAILBOX_CAPACITY: &str = "PARLEY_MAILBOX_CAPACITY";
pub const ENV_ADDR: &str = "PARLEY_ADDR";
pub const ENV_OPENING_MESSAGE: &str = "PARLEY_OPENING_MESSAGE";

/// Settings shared by every bootstrap: who talks, how much, and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationConfig {
    /// Name of the participant that opens the conversation.
    pub initiator_name: String,
    /// Name of the participant that only replies.
    pub responder_name: String,
    /// Normal messages the initiator must both send and receive before STOP.
    pub quota: usize,
    /// Capacity of each participant's mailbox.
    pub mailbox_capacity: usize,
    /// First message the initiator sends.
    pub opening_message: String,
    /// Socket address the responder listens on and the initiator dials.
    pub address: String,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            initiator_name: "Initiator".to_string(),
            responder_name: "Responder".to_string(),
            quota: 2,
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            opening_message: "Hello Responder!".to_string(),
            address: "127.0.0.1:5000".to_string(),
        }
    }
}

impl ConversationConfig {
    pub fn with_names(
        mut self,
        initiator: impl Into<String>,
        responder: impl Into<String>,
    ) -> Self {
        self.initiator_name = initiator.into();
        self.responder_name = responder.into();
        self
    }

    pub fn with_quota(mut self, quota: usize) -> Self {
        self.quota = quota;
        self
    }

    pub fn with_mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = capacity;
        self
    }

    pub fn with_opening_message(mut self, message: impl Into<String>) -> Self {
        self.opening_message = message.into();
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Defaults overridden by environment variables.
    ///
    /// Recognised variables:
    /// - `PARLEY_QUOTA`: initiator quota
    /// - `PARLEY_MAILBOX_CAPACITY`: mailbox capacity, at least 1
    /// - `PARLEY_ADDR`: socket address (e.g. `127.0.0.1:5000`)
    /// - `PARLEY_OPENING_MESSAGE`: first message sent by the initiator
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a numeric variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ConversationConfig::from_env`] with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(quota) = parse_var(&lookup, ENV_QUOTA)? {
            config.quota = quota;
        }
        if let Some(capacity) = parse_var::<usize, _>(&lookup, ENV_MAILBOX_CAPACITY)? {
            if capacity == 0 {
                return Err(ConfigError::InvalidValue {
                    key: ENV_MAILBOX_CAPACITY.to_string(),
                    value: capacity.to_string(),
                });
            }
            config.mailbox_capacity = capacity;
        }
        if let Some(address) = lookup(ENV_ADDR) {
            config.address = address;
        }
        if let Some(message) = lookup(ENV_OPENING_MESSAGE) {
            config.opening_message = message;
        }
        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw,
            }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_reference_run() {
        let config = ConversationConfig::default();
        assert_eq!(config.quota, 2);
        assert_eq!(config.mailbox_capacity, 20);
        assert_eq!(config.opening_message, "Hello Responder!");
        assert_eq!(config.address, "127.0.0.1:5000");
    }

    #[test]
    fn builder_overrides_fields() {
        let config = ConversationConfig::default()
            .with_names("Player1", "Player2")
            .with_quota(10)
            .with_mailbox_capacity(4)
            .with_address("0.0.0.0:6000");
        assert_eq!(config.initiator_name, "Player1");
        assert_eq!(config.responder_name, "Player2");
        assert_eq!(config.quota, 10);
        assert_eq!(config.mailbox_capacity, 4);
        assert_eq!(config.address, "0.0.0.0:6000");
    }

    #[test]
    fn lookup_overrides_defaults() {
        let config = ConversationConfig::from_lookup(lookup_from(&[
            (ENV_QUOTA, "7"),
            (ENV_ADDR, "127.0.0.1:7000"),
            (ENV_OPENING_MESSAGE, "hey"),
        ]))
        .unwrap();
        assert_eq!(config.quota, 7);
        assert_eq!(config.address, "127.0.0.1:7000");
        assert_eq!(config.opening_message, "hey");
        assert_eq!(config.mailbox_capacity, 20);
    }

    #[test]
    fn unparsable_quota_is_rejected() {
        let result = ConversationConfig::from_lookup(lookup_from(&[(ENV_QUOTA, "many")]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref key, ref value }) if key == ENV_QUOTA && value == "many"
        ));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let result =
            ConversationConfig::from_lookup(lookup_from(&[(ENV_MAILBOX_CAPACITY, "0")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }
}
