use serde::{Deserialize, Serialize};

use crate::error::DeliveryError;
use crate::input::Phase;

/// One key event for the receiving application. Exactly one of `key` and
/// `text` is set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPayload {
    pub phase: Phase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Held modifiers ("shift", "ctrl", "alt", "win").
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<String>,
}

impl KeyPayload {
    pub fn for_identifier(identifier: &str, phase: Phase) -> Self {
        let (key, text) = if is_symbolic(identifier) {
            (Some(identifier.to_string()), None)
        } else {
            (None, Some(identifier.to_string()))
        };
        Self {
            phase,
            key,
            text,
            modifiers: Vec::new(),
        }
    }

    pub fn with_modifier(mut self, modifier: impl Into<String>) -> Self {
        self.modifiers.push(modifier.into());
        self
    }
}

/// `{shift}`-style names. A lone brace is literal text.
pub fn is_symbolic(identifier: &str) -> bool {
    identifier.len() > 2 && identifier.starts_with('{') && identifier.ends_with('}')
}

/// Channel to the application receiving keystrokes. Fire-and-forget: the
/// session logs failures and never retries.
pub trait KeyDelivery {
    fn deliver(&mut self, payload: KeyPayload) -> Result<(), DeliveryError>;
}

impl<F> KeyDelivery for F
where
    F: FnMut(KeyPayload) -> Result<(), DeliveryError>,
{
    fn deliver(&mut self, payload: KeyPayload) -> Result<(), DeliveryError> {
        self(payload)
    }
}
