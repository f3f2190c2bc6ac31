use std::fmt::{self, Display};

/// The kind of error that occurred.
///
/// Callers of a provider are not expected to branch on this; every kind
/// ends up as the same failure in the conversation. It exists so that
/// logs can tell a dropped connection from a malformed body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request could not be delivered or the connection broke.
    Network,
    /// The service answered with a non-success status.
    Status,
    /// The response body lacks the generated text.
    MalformedResponse,
    /// Any other errors.
    Other,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Network => write!(f, "Network error"),
            ErrorKind::Status => write!(f, "Unsuccessful status"),
            ErrorKind::MalformedResponse => write!(f, "Malformed response"),
            ErrorKind::Other => write!(f, "Other error"),
        }
    }
}
