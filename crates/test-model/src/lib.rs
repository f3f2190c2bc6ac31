//! A local fake model for testing purpose.

mod preset;

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::future::pending;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chat_widget_model::{
    ErrorKind, ModelProvider, ModelProviderError, ModelReply, ModelRequest,
};
use tokio::time::sleep;

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    #[allow(dead_code)]
    message: &'static str,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

#[derive(Default)]
struct Script {
    replies: VecDeque<PresetReply>,
    prompts: Vec<String>,
}

/// A local fake model for testing purpose.
///
/// Before sending requests, you need to setup the script, which is how the
/// model should respond to each request in turn. Every request consumes
/// one preset reply. If there are no enough replies in the script, an
/// error will be returned.
///
/// Clones share the same script, so a test can keep a clone around to
/// inspect the received prompts after handing the provider over.
#[derive(Clone, Default)]
pub struct TestModelProvider {
    script: Arc<Mutex<Script>>,
    delay: Option<Duration>,
}

impl TestModelProvider {
    /// Creates a provider that answers with the given replies in order.
    #[inline]
    pub fn with_replies(
        replies: impl IntoIterator<Item = PresetReply>,
    ) -> Self {
        let provider = Self::default();
        for reply in replies {
            provider.add_reply(reply);
        }
        provider
    }

    #[inline]
    pub fn add_reply(&self, reply: PresetReply) {
        self.lock().replies.push_back(reply);
    }

    /// Sets how long each reply takes, 1 ms by default.
    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    /// Returns the prompts received so far, in order.
    #[inline]
    pub fn prompts(&self) -> Vec<String> {
        self.lock().prompts.clone()
    }

    #[inline]
    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        // A panicking test thread must not hide the script from others.
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ModelProvider for TestModelProvider {
    type Error = crate::Error;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<ModelReply, Self::Error>> + Send + 'static
    {
        let preset = {
            let mut script = self.lock();
            script.prompts.push(req.prompt.clone());
            script.replies.pop_front()
        };
        let delay = self.delay.unwrap_or(Duration::from_millis(1));

        async move {
            sleep(delay).await;
            match preset {
                Some(PresetReply::Text(text)) => Ok(ModelReply { text }),
                Some(PresetReply::Failure) => Err(Error {
                    message: "preset failure",
                    kind: ErrorKind::Status,
                }),
                Some(PresetReply::Hang) => pending().await,
                None => Err(Error {
                    message: "no enough replies",
                    kind: ErrorKind::Other,
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::timeout;

    use super::*;

    #[tokio::test]
    async fn test_send_request() {
        let provider = TestModelProvider::with_replies([
            PresetReply::text("Hello, world!"),
            PresetReply::Failure,
        ]);

        let reply = provider
            .send_request(&ModelRequest::with_prompt("Hi"))
            .await
            .unwrap();
        assert_eq!(reply.text, "Hello, world!");

        let err = provider
            .send_request(&ModelRequest::with_prompt("Again"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Status);

        let err = provider
            .send_request(&ModelRequest::with_prompt("Once more"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);

        assert_eq!(provider.prompts(), ["Hi", "Again", "Once more"]);
    }

    #[tokio::test]
    async fn test_clones_share_script() {
        let provider = TestModelProvider::default();
        let observer = provider.clone();
        observer.add_reply(PresetReply::text("Shared"));

        let reply = provider
            .send_request(&ModelRequest::with_prompt("Hi"))
            .await
            .unwrap();
        assert_eq!(reply.text, "Shared");
        assert_eq!(observer.prompts(), ["Hi"]);
    }

    #[tokio::test]
    async fn test_hang() {
        let provider = TestModelProvider::with_replies([PresetReply::Hang]);
        let fut = provider.send_request(&ModelRequest::with_prompt("Hi"));
        assert!(timeout(Duration::from_millis(50), fut).await.is_err());
    }
}
