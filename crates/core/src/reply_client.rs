use std::error::Error;
use std::fmt::{self, Display};
use std::pin::Pin;
use std::sync::Arc;

use chat_widget_model::{ModelProvider, ModelProviderError, ModelRequest};
use tracing::Instrument;

type GenerateResult = Result<String, ReplyError>;
type BoxedGenerateFuture = Pin<Box<dyn Future<Output = GenerateResult> + Send>>;
type HandlerFn = Arc<dyn Fn(ModelRequest) -> BoxedGenerateFuture + Send + Sync>;

/// The single failure signal of [`ReplyClient`].
///
/// The cause has already been logged when this is returned; callers only
/// learn that the reply could not be generated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ReplyError;

impl Display for ReplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        "failed to generate a reply".fmt(f)
    }
}

impl Error for ReplyError {}

/// A wrapper around a model provider that erases its type and collapses
/// its errors, so the rest of the widget deals only with text or
/// [`ReplyError`].
#[derive(Clone)]
pub struct ReplyClient {
    handler_fn: HandlerFn,
}

impl ReplyClient {
    /// Wraps `provider`.
    #[inline]
    pub fn new<P: ModelProvider + 'static>(provider: P) -> Self {
        let handler_fn: HandlerFn = Arc::new(move |req| {
            let fut = provider.send_request(&req);
            Box::pin(
                async move {
                    trace!("got a request ({} bytes)", req.prompt.len());
                    match fut.await {
                        Ok(reply) => {
                            trace!("finished a request");
                            Ok(reply.text)
                        }
                        Err(err) => {
                            error!("got an error ({:?}): {err}", err.kind());
                            Err(ReplyError)
                        }
                    }
                }
                .instrument(trace_span!("reply client req")),
            )
        });
        Self { handler_fn }
    }

    /// Sends `prompt` and returns the generated text.
    ///
    /// Exactly one request is sent to the provider. An empty prompt fails
    /// without sending anything.
    pub async fn generate_reply(
        &self,
        prompt: &str,
    ) -> Result<String, ReplyError> {
        if prompt.trim().is_empty() {
            warn!("refusing to send an empty prompt");
            return Err(ReplyError);
        }
        (self.handler_fn)(ModelRequest::with_prompt(prompt)).await
    }
}
