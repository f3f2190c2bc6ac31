//! Voice input on top of an external speech-to-text engine.

/// The notice shown instead of the widget when speech recognition is not
/// available.
pub const UNSUPPORTED_NOTICE: &str =
    "Speech recognition is not supported on this device.";

/// An external speech-to-text capability.
///
/// The engine reports back through the host, which forwards its listening
/// state and transcript to [`VoiceInput::set_listening`] and
/// [`VoiceInput::set_transcript`].
pub trait SpeechEngine: Send + 'static {
    /// Whether speech recognition can be used at all.
    fn is_supported(&self) -> bool;

    /// Starts capturing audio.
    fn start(&mut self, continuous: bool);

    /// Stops capturing audio. The engine reports the final transcript and
    /// then the end of listening.
    fn stop(&mut self);
}

impl<E: SpeechEngine + ?Sized> SpeechEngine for Box<E> {
    #[inline]
    fn is_supported(&self) -> bool {
        (**self).is_supported()
    }

    #[inline]
    fn start(&mut self, continuous: bool) {
        (**self).start(continuous)
    }

    #[inline]
    fn stop(&mut self) {
        (**self).stop()
    }
}

/// A speech engine for hosts without speech recognition.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSpeechEngine;

impl SpeechEngine for NoSpeechEngine {
    #[inline]
    fn is_supported(&self) -> bool {
        false
    }

    #[inline]
    fn start(&mut self, _continuous: bool) {}

    #[inline]
    fn stop(&mut self) {}
}

/// Tracks one speech engine's state and turns finished listening sessions
/// into text input.
pub struct VoiceInput<E> {
    engine: E,
    supported: bool,
    listening: bool,
    transcript: String,
    // Set once the buffered transcript has been handed out, cleared by
    // `reset_transcript`.
    delivered: bool,
}

impl<E: SpeechEngine> VoiceInput<E> {
    /// Wraps `engine`, checking its capability once.
    pub fn new(engine: E) -> Self {
        let supported = engine.is_supported();
        if !supported {
            info!("speech recognition is not supported");
        }
        Self {
            engine,
            supported,
            listening: false,
            transcript: String::new(),
            delivered: false,
        }
    }

    /// Result of the capability check done at construction.
    #[inline]
    pub fn is_supported(&self) -> bool {
        self.supported
    }

    /// Whether the engine is capturing audio.
    #[inline]
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// The transcript buffered so far.
    #[inline]
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// Asks the engine to start listening. Does nothing if already
    /// listening or unsupported.
    pub fn start_listening(&mut self, continuous: bool) {
        if !self.supported || self.listening {
            return;
        }
        debug!("start listening (continuous: {continuous})");
        self.engine.start(continuous);
    }

    /// Asks the engine to stop listening.
    pub fn stop_listening(&mut self) {
        if self.listening {
            debug!("stop listening");
            self.engine.stop();
        }
    }

    /// Records the engine's listening state.
    ///
    /// Returns the buffered transcript when listening just ended with a
    /// non-empty transcript that has not been handed out yet. This is the
    /// only way voice text becomes input, so interim transcripts are never
    /// submitted.
    pub fn set_listening(&mut self, listening: bool) -> Option<String> {
        let was_listening = self.listening;
        self.listening = listening;
        if !was_listening || listening {
            return None;
        }
        if self.transcript.is_empty() || self.delivered {
            return None;
        }
        self.delivered = true;
        Some(self.transcript.clone())
    }

    /// Records the engine's latest transcript.
    #[inline]
    pub fn set_transcript<S: Into<String>>(&mut self, transcript: S) {
        self.transcript = transcript.into();
    }

    /// Clears the buffered transcript, so the next listening session starts
    /// fresh.
    #[inline]
    pub fn reset_transcript(&mut self) {
        self.transcript.clear();
        self.delivered = false;
    }
}
