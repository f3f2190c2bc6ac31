mod builder;
mod state;
#[cfg(test)]
mod tests;

use std::error::Error;
use std::fmt;

use tokio::sync::{mpsc, oneshot, watch};
use tracing::Instrument;

pub use builder::WidgetBuilder;
use state::{Event, WidgetState};

use crate::controller::ControllerState;
use crate::message::Message;

/// A snapshot of everything the host needs to render the widget.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum WidgetView {
    /// Speech recognition is unavailable, only this notice is shown.
    Unsupported {
        /// The text to show.
        notice: &'static str,
    },
    /// The regular widget.
    Ready(ChatView),
}

/// The regular widget, see [`WidgetView::Ready`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChatView {
    /// Whether the chat panel is shown instead of the launcher button.
    pub open: bool,
    /// Whether the history menu is shown.
    pub menu_open: bool,
    /// Whether a reply is pending.
    pub state: ControllerState,
    /// The displayed transcript, including the reply placeholder.
    pub messages: Vec<Message>,
    /// The text in the input field.
    pub draft: String,
    /// Whether the microphone is capturing.
    pub listening: bool,
}

/// A type of error which can be returned whenever events are posted to a
/// widget whose event loop has stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WidgetClosedError;

impl fmt::Display for WidgetClosedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        "the widget event loop has stopped".fmt(f)
    }
}

impl Error for WidgetClosedError {}

/// Handle to a running chat widget.
///
/// The widget's state lives in an event loop task that owns the
/// conversation, the voice input and the shell. Methods on this handle
/// only post events to that loop, in order, and return immediately. The
/// result of an event is observed through [`Widget::view`],
/// [`Widget::subscribe`] or the `on_change` callback.
///
/// The loop stops once every handle has been dropped.
#[derive(Clone)]
pub struct Widget {
    event_tx: mpsc::UnboundedSender<Event>,
    view_rx: watch::Receiver<WidgetView>,
}

impl Widget {
    /// Submits a typed message.
    #[inline]
    pub fn submit<S: Into<String>>(
        &self,
        text: S,
    ) -> Result<(), WidgetClosedError> {
        self.post(Event::Submit(text.into()))
    }

    /// Replaces the text in the input field.
    #[inline]
    pub fn set_draft<S: Into<String>>(
        &self,
        draft: S,
    ) -> Result<(), WidgetClosedError> {
        self.post(Event::SetDraft(draft.into()))
    }

    /// Submits the text in the input field.
    #[inline]
    pub fn submit_draft(&self) -> Result<(), WidgetClosedError> {
        self.post(Event::SubmitDraft)
    }

    /// Presses the microphone button.
    #[inline]
    pub fn start_listening(&self) -> Result<(), WidgetClosedError> {
        self.post(Event::StartListening)
    }

    /// Asks the speech engine to stop listening.
    #[inline]
    pub fn stop_listening(&self) -> Result<(), WidgetClosedError> {
        self.post(Event::StopListening)
    }

    /// Reports that the speech engine started or stopped listening.
    #[inline]
    pub fn speech_listening(
        &self,
        listening: bool,
    ) -> Result<(), WidgetClosedError> {
        self.post(Event::SpeechListening(listening))
    }

    /// Reports the speech engine's latest transcript.
    #[inline]
    pub fn speech_transcript<S: Into<String>>(
        &self,
        transcript: S,
    ) -> Result<(), WidgetClosedError> {
        self.post(Event::SpeechTranscript(transcript.into()))
    }

    /// Starts a new conversation, keeping the history.
    #[inline]
    pub fn new_conversation(&self) -> Result<(), WidgetClosedError> {
        self.post(Event::NewConversation)
    }

    /// Displays the whole history.
    #[inline]
    pub fn view_history(&self) -> Result<(), WidgetClosedError> {
        self.post(Event::ViewHistory)
    }

    /// Forgets the history.
    #[inline]
    pub fn clear_history(&self) -> Result<(), WidgetClosedError> {
        self.post(Event::ClearHistory)
    }

    /// Opens or closes the chat panel.
    #[inline]
    pub fn toggle_open(&self) -> Result<(), WidgetClosedError> {
        self.post(Event::ToggleOpen)
    }

    /// Opens or closes the history menu.
    #[inline]
    pub fn toggle_menu(&self) -> Result<(), WidgetClosedError> {
        self.post(Event::ToggleMenu)
    }

    /// Reports an interaction outside the widget.
    #[inline]
    pub fn dismiss(&self) -> Result<(), WidgetClosedError> {
        self.post(Event::Dismiss)
    }

    /// Returns the view after every event posted so far has been handled.
    pub async fn view(&self) -> Result<WidgetView, WidgetClosedError> {
        let (tx, rx) = oneshot::channel();
        self.post(Event::View(tx))?;
        rx.await.map_err(|_| WidgetClosedError)
    }

    /// Subscribes to view changes.
    #[inline]
    pub fn subscribe(&self) -> watch::Receiver<WidgetView> {
        self.view_rx.clone()
    }

    #[inline]
    fn post(&self, event: Event) -> Result<(), WidgetClosedError> {
        self.event_tx.send(event).map_err(|_| WidgetClosedError)
    }

    fn spawn_from_builder(builder: WidgetBuilder) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let state = WidgetState::from_builder(builder, event_tx.downgrade());
        let (view_tx, view_rx) = watch::channel(state.view());
        tokio::spawn(
            state
                .run(event_rx, view_tx)
                .instrument(trace_span!("widget")),
        );
        Self { event_tx, view_rx }
    }
}
