//! Messages shown in the widget.

use serde::{Deserialize, Serialize};

/// The text shown by the bot when a reply could not be generated.
pub const FALLBACK_REPLY: &str = "Oops! Something went wrong.";

/// The text of the placeholder shown while a reply is pending.
pub const PENDING_TEXT: &str = "Typing...";

/// Who wrote a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The person using the widget.
    User,
    /// The remote model.
    Bot,
}

/// A single entry in the transcript.
///
/// Messages are never edited after creation. The pending placeholder is
/// removed and replaced by a new message once the reply arrives.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Message {
    text: String,
    sender: Sender,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pending: bool,
}

impl Message {
    /// Creates a finalized message written by the user.
    #[inline]
    pub fn user<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
            pending: false,
        }
    }

    /// Creates a finalized message written by the bot.
    #[inline]
    pub fn bot<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Bot,
            pending: false,
        }
    }

    /// Creates the placeholder shown while waiting for a reply.
    #[inline]
    pub fn pending() -> Self {
        Self {
            text: PENDING_TEXT.to_owned(),
            sender: Sender::Bot,
            pending: true,
        }
    }

    /// Returns the message text.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns who wrote the message.
    #[inline]
    pub fn sender(&self) -> Sender {
        self.sender
    }

    /// Returns `true` if this is the reply placeholder.
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_serialized_shape() {
        assert_eq!(
            serde_json::to_value(Message::user("Hi")).unwrap(),
            json!({ "text": "Hi", "sender": "user" })
        );
        assert_eq!(
            serde_json::to_value(Message::pending()).unwrap(),
            json!({ "text": "Typing...", "sender": "bot", "pending": true })
        );
    }

    #[test]
    fn test_deserialize_without_pending_flag() {
        let msg: Message = serde_json::from_value(
            json!({ "text": "Hello! How can I help?", "sender": "bot" }),
        )
        .unwrap();
        assert_eq!(msg, Message::bot("Hello! How can I help?"));
        assert!(!msg.is_pending());
    }
}
