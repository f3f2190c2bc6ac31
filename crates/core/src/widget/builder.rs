use chat_widget_model::ModelProvider;

use super::{Widget, WidgetView};
use crate::reply_client::ReplyClient;
use crate::storage::{HistoryStorage, MemoryStorage};
use crate::voice::SpeechEngine;

pub(crate) type OnChangeFn = Box<dyn Fn(&WidgetView) + Send + Sync>;

/// [`Widget`] builder.
pub struct WidgetBuilder {
    pub(crate) reply_client: ReplyClient,
    pub(crate) storage: Box<dyn HistoryStorage>,
    pub(crate) speech_engine: Box<dyn SpeechEngine>,
    pub(crate) voice_auto_send: bool,
    pub(crate) continuous_listening: bool,
    pub(crate) on_change: Option<OnChangeFn>,
}

impl WidgetBuilder {
    /// Creates a new builder with the specified model provider and speech
    /// engine.
    ///
    /// If the engine reports that speech recognition is unsupported, the
    /// built widget only shows a notice and ignores every interaction.
    /// Pass an engine that supports it to get a working widget.
    #[inline]
    pub fn new<P, E>(provider: P, speech_engine: E) -> Self
    where
        P: ModelProvider + 'static,
        E: SpeechEngine,
    {
        Self {
            reply_client: ReplyClient::new(provider),
            storage: Box::new(MemoryStorage::default()),
            speech_engine: Box::new(speech_engine),
            voice_auto_send: true,
            continuous_listening: false,
            on_change: None,
        }
    }

    /// Sets where the history is persisted.
    ///
    /// Defaults to an in-process [`MemoryStorage`], which doesn't survive
    /// restarts.
    #[inline]
    pub fn with_storage<S: HistoryStorage>(mut self, storage: S) -> Self {
        self.storage = Box::new(storage);
        self
    }

    /// Whether a finished voice session is submitted right away (the
    /// default) or only put into the input field.
    #[inline]
    pub fn voice_auto_send(mut self, auto_send: bool) -> Self {
        self.voice_auto_send = auto_send;
        self
    }

    /// Whether the speech engine keeps listening across pauses. Off by
    /// default.
    #[inline]
    pub fn continuous_listening(mut self, continuous: bool) -> Self {
        self.continuous_listening = continuous;
        self
    }

    /// Attaches a callback to be invoked whenever the view changes.
    ///
    /// The callback runs on the widget's event loop, so it should return
    /// quickly.
    #[inline]
    pub fn on_change(
        mut self,
        on_change: impl Fn(&WidgetView) + Send + Sync + 'static,
    ) -> Self {
        self.on_change = Some(Box::new(on_change));
        self
    }

    /// Builds the widget and starts its event loop.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    #[inline]
    pub fn build(self) -> Widget {
        Widget::spawn_from_builder(self)
    }
}
