use std::path::PathBuf;

use chat_widget_core::storage::{FileStorage, HistoryStorage, MemoryStorage};
use chat_widget_core::voice::SpeechEngine;
use chat_widget_core::{Widget, WidgetBuilder, WidgetClosedError, WidgetView};
use chat_widget_model::ModelProvider;

/// A session builder.
///
/// See [`Session`].
pub struct SessionBuilder {
    widget_builder: WidgetBuilder,
    history_dir: Option<PathBuf>,
}

impl SessionBuilder {
    /// Creates a session builder with a specified model provider and speech
    /// engine.
    pub fn with_model_provider<M, E>(provider: M, speech_engine: E) -> Self
    where
        M: ModelProvider + 'static,
        E: SpeechEngine,
    {
        let widget_builder = WidgetBuilder::new(provider, speech_engine);
        Self {
            widget_builder,
            history_dir: FileStorage::default_dir(),
        }
    }

    /// Sets the directory the history file is kept in.
    ///
    /// Defaults to [`FileStorage::default_dir`].
    #[inline]
    pub fn with_history_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.history_dir = Some(dir.into());
        self
    }

    /// Whether dictated text is sent right away or only put into the input
    /// field.
    #[inline]
    pub fn voice_auto_send(mut self, auto_send: bool) -> Self {
        self.widget_builder = self.widget_builder.voice_auto_send(auto_send);
        self
    }

    /// Attaches a callback to be invoked whenever the widget changes.
    #[inline]
    pub fn on_change(
        mut self,
        on_change: impl Fn(&WidgetView) + Send + Sync + 'static,
    ) -> Self {
        self.widget_builder = self.widget_builder.on_change(on_change);
        self
    }

    /// Builds a new session.
    ///
    /// Must be called within a tokio runtime.
    pub fn build(self) -> Session {
        let storage: Box<dyn HistoryStorage> = match self.history_dir {
            Some(dir) => {
                let storage = FileStorage::in_dir(dir);
                debug!("history file: {}", storage.path().display());
                Box::new(storage)
            }
            None => {
                warn!("no data directory, history won't be kept");
                Box::new(MemoryStorage::default())
            }
        };
        let widget = self.widget_builder.with_storage(storage).build();

        Session { widget }
    }
}

/// A chat session, like a widget that displays messages and has an input
/// box.
///
/// The session keeps its history on disk and is basically a wrapper around
/// [`Widget`].
pub struct Session {
    widget: Widget,
}

impl Session {
    /// Sends a message to the session.
    #[inline]
    pub fn send_message(
        &self,
        message: &str,
    ) -> Result<(), WidgetClosedError> {
        self.widget.submit(message)
    }

    /// Returns the underlying widget, for everything besides sending
    /// messages.
    #[inline]
    pub fn widget(&self) -> &Widget {
        &self.widget
    }
}
