//! Speech engines for hosts without a microphone.

use std::sync::Arc;

use chat_widget_core::voice::SpeechEngine;

/// What a [`LineDictation`] asks its host to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DictationRequest {
    /// Start capturing the next line as speech.
    Start {
        /// Whether to keep capturing after the first line.
        continuous: bool,
    },
    /// Stop capturing.
    Stop,
}

type OnRequestFn = Arc<dyn Fn(DictationRequest) + Send + Sync>;

/// A speech engine that stands in for a microphone by letting the user type
/// what they would say.
///
/// The engine only forwards start and stop requests. The host reads the
/// dictated line and reports it back through the widget's
/// `speech_listening` and `speech_transcript` methods, just like a real
/// recognizer would.
#[derive(Clone)]
pub struct LineDictation {
    on_request: OnRequestFn,
}

impl LineDictation {
    /// Creates an engine that passes its requests to `on_request`.
    #[inline]
    pub fn new(
        on_request: impl Fn(DictationRequest) + Send + Sync + 'static,
    ) -> Self {
        Self {
            on_request: Arc::new(on_request),
        }
    }
}

impl SpeechEngine for LineDictation {
    #[inline]
    fn is_supported(&self) -> bool {
        true
    }

    fn start(&mut self, continuous: bool) {
        trace!("dictation requested");
        (self.on_request)(DictationRequest::Start { continuous });
    }

    fn stop(&mut self) {
        (self.on_request)(DictationRequest::Stop);
    }
}
