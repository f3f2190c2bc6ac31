use serde::{Deserialize, Serialize};

/// A complete reply generated by the model provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelReply {
    /// The generated text.
    pub text: String,
}

impl ModelReply {
    /// Creates a reply with the given text.
    #[inline]
    pub fn with_text<S: Into<String>>(text: S) -> Self {
        Self { text: text.into() }
    }
}
