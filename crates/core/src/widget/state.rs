use std::fmt::{self, Debug};

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::Instrument;

use super::builder::{OnChangeFn, WidgetBuilder};
use super::{ChatView, WidgetView};
use crate::controller::{ConversationController, PendingReply, VoiceOutcome};
use crate::reply_client::{ReplyClient, ReplyError};
use crate::shell::Shell;
use crate::transcript::TranscriptStore;
use crate::voice::{SpeechEngine, UNSUPPORTED_NOTICE, VoiceInput};

pub enum Event {
    Submit(String),
    SetDraft(String),
    SubmitDraft,
    StartListening,
    StopListening,
    SpeechListening(bool),
    SpeechTranscript(String),
    NewConversation,
    ViewHistory,
    ClearHistory,
    ToggleOpen,
    ToggleMenu,
    Dismiss,
    ReplyFinished {
        id: u64,
        result: Result<String, ReplyError>,
    },
    View(oneshot::Sender<WidgetView>),
}

impl Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Message contents stay out of the logs.
        let name = match self {
            Event::Submit(_) => "Submit",
            Event::SetDraft(_) => "SetDraft",
            Event::SubmitDraft => "SubmitDraft",
            Event::StartListening => "StartListening",
            Event::StopListening => "StopListening",
            Event::SpeechListening(_) => "SpeechListening",
            Event::SpeechTranscript(_) => "SpeechTranscript",
            Event::NewConversation => "NewConversation",
            Event::ViewHistory => "ViewHistory",
            Event::ClearHistory => "ClearHistory",
            Event::ToggleOpen => "ToggleOpen",
            Event::ToggleMenu => "ToggleMenu",
            Event::Dismiss => "Dismiss",
            Event::ReplyFinished { .. } => "ReplyFinished",
            Event::View(_) => "View",
        };
        f.write_str(name)
    }
}

/// State owned by the widget's event loop.
pub struct WidgetState {
    controller: ConversationController,
    voice: VoiceInput<Box<dyn SpeechEngine>>,
    shell: Shell,
    reply_client: ReplyClient,
    voice_auto_send: bool,
    continuous_listening: bool,
    on_change: Option<OnChangeFn>,
    // Weak, so that a reply in flight doesn't keep the loop alive after
    // every handle is gone.
    event_tx: mpsc::WeakUnboundedSender<Event>,
    reply_task: Option<JoinHandle<()>>,
}

impl WidgetState {
    pub fn from_builder(
        builder: WidgetBuilder,
        event_tx: mpsc::WeakUnboundedSender<Event>,
    ) -> Self {
        let WidgetBuilder {
            reply_client,
            storage,
            speech_engine,
            voice_auto_send,
            continuous_listening,
            on_change,
        } = builder;

        Self {
            controller: ConversationController::new(TranscriptStore::open(
                storage,
            )),
            voice: VoiceInput::new(speech_engine),
            shell: Shell::default(),
            reply_client,
            voice_auto_send,
            continuous_listening,
            on_change,
            event_tx,
            reply_task: None,
        }
    }

    pub fn view(&self) -> WidgetView {
        if !self.voice.is_supported() {
            return WidgetView::Unsupported {
                notice: UNSUPPORTED_NOTICE,
            };
        }
        WidgetView::Ready(ChatView {
            open: self.shell.is_open(),
            menu_open: self.shell.is_menu_open(),
            state: self.controller.state(),
            messages: self.controller.store().transcript().to_vec(),
            draft: self.controller.draft().to_owned(),
            listening: self.voice.is_listening(),
        })
    }

    pub async fn run(
        mut self,
        mut event_rx: mpsc::UnboundedReceiver<Event>,
        view_tx: watch::Sender<WidgetView>,
    ) {
        debug!("started");
        while let Some(event) = event_rx.recv().await {
            trace!("received event: {event:?}");
            trace_span!("proc event").in_scope(|| self.handle(event));

            let view = self.view();
            let changed = view_tx.send_if_modified(|current| {
                if *current == view {
                    return false;
                }
                *current = view.clone();
                true
            });
            if changed {
                if let Some(on_change) = &self.on_change {
                    on_change(&view);
                }
            }
        }
        if let Some(task) = self.reply_task.take() {
            task.abort();
        }
        debug!("will terminate");
    }

    fn handle(&mut self, event: Event) {
        if !self.voice.is_supported() && !matches!(event, Event::View(_)) {
            // Degraded for good, nothing is interactive.
            return;
        }

        match event {
            Event::Submit(text) => {
                let result = self.controller.submit(text);
                self.after_submit(result.ok());
            }
            Event::SetDraft(draft) => self.controller.set_draft(draft),
            Event::SubmitDraft => {
                let result = self.controller.submit_draft();
                self.after_submit(result.ok());
            }
            Event::StartListening => {
                self.voice.start_listening(self.continuous_listening);
            }
            Event::StopListening => self.voice.stop_listening(),
            Event::SpeechListening(listening) => {
                let Some(text) = self.voice.set_listening(listening) else {
                    return;
                };
                let outcome =
                    self.controller.voice_ready(text, self.voice_auto_send);
                match outcome {
                    VoiceOutcome::Submitted(pending) => {
                        self.after_submit(Some(pending));
                    }
                    VoiceOutcome::Drafted | VoiceOutcome::Dropped(_) => {
                        self.voice.reset_transcript();
                    }
                }
            }
            Event::SpeechTranscript(transcript) => {
                self.voice.set_transcript(transcript);
            }
            Event::NewConversation => {
                self.controller.new_conversation().ok();
            }
            Event::ViewHistory => {
                self.controller.view_history().ok();
            }
            Event::ClearHistory => {
                self.controller.clear_history().ok();
            }
            Event::ToggleOpen => self.shell.toggle_open(),
            Event::ToggleMenu => self.shell.toggle_menu(),
            Event::Dismiss => self.shell.dismiss(),
            Event::ReplyFinished { id, result } => {
                self.reply_task = None;
                self.controller.resolve(id, result);
            }
            Event::View(reply_tx) => {
                reply_tx.send(self.view()).ok();
            }
        }
    }

    /// Starts generating the reply of an accepted submission.
    fn after_submit(&mut self, pending: Option<PendingReply>) {
        let Some(PendingReply { id, prompt }) = pending else {
            return;
        };
        self.voice.reset_transcript();

        let reply_client = self.reply_client.clone();
        let event_tx = self.event_tx.clone();
        let task = tokio::spawn(
            async move {
                let result = reply_client.generate_reply(&prompt).await;
                let Some(event_tx) = event_tx.upgrade() else {
                    return;
                };
                event_tx.send(Event::ReplyFinished { id, result }).ok();
            }
            .instrument(trace_span!("reply", id)),
        );
        self.reply_task = Some(task);
    }
}
