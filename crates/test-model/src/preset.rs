use serde::{Deserialize, Serialize};

/// The preset outcome for one request.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PresetReply {
    /// The request succeeds with this text.
    #[serde(rename = "text")]
    Text(String),
    /// The request fails.
    #[serde(rename = "failure")]
    Failure,
    /// The request never resolves.
    #[serde(rename = "hang")]
    Hang,
}

impl PresetReply {
    /// Creates a successful preset with the given text.
    #[inline]
    pub fn text<S: Into<String>>(text: S) -> Self {
        Self::Text(text.into())
    }
}
