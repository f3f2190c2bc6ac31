use serde::{Deserialize, Serialize};

/// A request to be sent to the model provider.
///
/// The widget never sends conversation context; each request carries
/// only the raw text the user submitted.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelRequest {
    /// The prompt text, exactly as the user submitted it.
    pub prompt: String,
}

impl ModelRequest {
    /// Creates a request carrying the given prompt.
    #[inline]
    pub fn with_prompt<S: Into<String>>(prompt: S) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}
