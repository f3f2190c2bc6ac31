//! The conversation state machine.

use std::fmt::{self, Display};

use crate::message::{FALLBACK_REPLY, Message};
use crate::reply_client::ReplyError;
use crate::transcript::TranscriptStore;

/// Whether a reply is being waited for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ControllerState {
    /// Ready for the next submission.
    #[default]
    Idle,
    /// A submission has been sent and its reply has not arrived yet.
    AwaitingReply,
}

/// Why a submission was not accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubmitError {
    /// The text is empty or whitespace only.
    Empty,
    /// Another reply is still pending.
    Busy,
}

impl Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::Empty => write!(f, "nothing to submit"),
            SubmitError::Busy => write!(f, "a reply is still pending"),
        }
    }
}

impl std::error::Error for SubmitError {}

/// Why a history action was not performed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionError {
    /// History actions are only available while idle.
    Busy,
}

impl Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionError::Busy => write!(f, "a reply is still pending"),
        }
    }
}

impl std::error::Error for ActionError {}

/// An accepted submission whose reply must be generated by the caller.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PendingReply {
    /// Identifies this exchange when resolving it.
    pub id: u64,
    /// The text to send.
    pub prompt: String,
}

/// What the controller did with a finished voice session.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum VoiceOutcome {
    /// The transcript was submitted.
    Submitted(PendingReply),
    /// The transcript was put into the input draft.
    Drafted,
    /// The transcript was dropped.
    Dropped(SubmitError),
}

/// Orchestrates user input, the transcript and the single in-flight
/// reply.
///
/// The controller never performs I/O on its own: an accepted
/// [`submit`](Self::submit) hands back a [`PendingReply`], the caller
/// generates the reply and reports the result through
/// [`resolve`](Self::resolve).
pub struct ConversationController {
    store: TranscriptStore,
    state: ControllerState,
    draft: String,
    in_flight: Option<u64>,
    next_reply_id: u64,
}

impl ConversationController {
    /// Creates an idle controller over `store`.
    pub fn new(store: TranscriptStore) -> Self {
        Self {
            store,
            state: ControllerState::Idle,
            draft: String::new(),
            in_flight: None,
            next_reply_id: 1,
        }
    }

    /// The current state.
    #[inline]
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// The underlying transcript store.
    #[inline]
    pub fn store(&self) -> &TranscriptStore {
        &self.store
    }

    /// The text in the input field.
    #[inline]
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Replaces the text in the input field.
    #[inline]
    pub fn set_draft<S: Into<String>>(&mut self, draft: S) {
        self.draft = draft.into();
    }

    /// Submits the text in the input field.
    #[inline]
    pub fn submit_draft(&mut self) -> Result<PendingReply, SubmitError> {
        let text = self.draft.clone();
        self.submit(text)
    }

    /// Submits a user message.
    ///
    /// On success the user message and the reply placeholder are
    /// displayed, the input field is cleared, and the controller waits
    /// for [`resolve`](Self::resolve).
    pub fn submit<S: Into<String>>(
        &mut self,
        text: S,
    ) -> Result<PendingReply, SubmitError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(SubmitError::Empty);
        }
        if self.state != ControllerState::Idle {
            debug!("rejecting submission while awaiting a reply");
            return Err(SubmitError::Busy);
        }

        let id = self.next_reply_id;
        self.next_reply_id += 1;

        self.store.append(Message::user(text.clone()));
        self.store.append_pending();
        self.state = ControllerState::AwaitingReply;
        self.in_flight = Some(id);
        self.draft.clear();

        debug!("submitted message, reply id: {id}");
        Ok(PendingReply { id, prompt: text })
    }

    /// Completes the exchange `id` with the generated text or the
    /// failure.
    ///
    /// Results for anything but the in-flight exchange are ignored.
    pub fn resolve(&mut self, id: u64, result: Result<String, ReplyError>) {
        if self.in_flight != Some(id) {
            warn!("ignoring result of unknown reply {id}");
            return;
        }

        self.store.remove_pending();
        let reply = match result {
            Ok(text) => Message::bot(text),
            Err(_) => Message::bot(FALLBACK_REPLY),
        };
        self.store.append(reply);
        self.state = ControllerState::Idle;
        self.in_flight = None;
        debug!("resolved reply {id}");
    }

    /// Handles the text of a finished voice session.
    ///
    /// With `auto_send` the text is submitted right away, otherwise it
    /// replaces the input field. Either way the caller should reset the
    /// voice transcript afterwards, so a rejected submission is dropped
    /// instead of coming back with the next session.
    pub fn voice_ready(
        &mut self,
        text: String,
        auto_send: bool,
    ) -> VoiceOutcome {
        if !auto_send {
            self.draft = text;
            return VoiceOutcome::Drafted;
        }
        match self.submit(text) {
            Ok(pending) => VoiceOutcome::Submitted(pending),
            Err(err) => {
                debug!("dropping voice input: {err}");
                VoiceOutcome::Dropped(err)
            }
        }
    }

    /// Starts a new conversation. The history is kept.
    pub fn new_conversation(&mut self) -> Result<(), ActionError> {
        self.ensure_idle()?;
        self.store.reset();
        Ok(())
    }

    /// Displays the whole history.
    pub fn view_history(&mut self) -> Result<(), ActionError> {
        self.ensure_idle()?;
        self.store.replace_with_history();
        Ok(())
    }

    /// Forgets the history, including its durable copy. The displayed
    /// transcript is kept.
    pub fn clear_history(&mut self) -> Result<(), ActionError> {
        self.ensure_idle()?;
        self.store.clear_history();
        Ok(())
    }

    #[inline]
    fn ensure_idle(&self) -> Result<(), ActionError> {
        match self.state {
            ControllerState::Idle => Ok(()),
            ControllerState::AwaitingReply => Err(ActionError::Busy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Sender;
    use crate::storage::{HistoryStorage, MemoryStorage};

    fn controller() -> (ConversationController, MemoryStorage) {
        let storage = MemoryStorage::default();
        let store = TranscriptStore::open(storage.clone());
        (ConversationController::new(store), storage)
    }

    fn transcript(c: &ConversationController) -> Vec<(Sender, &str)> {
        c.store()
            .transcript()
            .iter()
            .map(|m| (m.sender(), m.text()))
            .collect()
    }

    #[test]
    fn test_successful_exchange() {
        let (mut c, storage) = controller();
        let pending = c.submit("Hi").unwrap();
        assert_eq!(pending.prompt, "Hi");
        assert_eq!(c.state(), ControllerState::AwaitingReply);
        assert!(c.store().has_pending());

        c.resolve(pending.id, Ok("Hello! How can I help?".to_owned()));
        assert_eq!(c.state(), ControllerState::Idle);
        let expected = [
            Message::user("Hi"),
            Message::bot("Hello! How can I help?"),
        ];
        assert_eq!(c.store().transcript(), expected);
        assert_eq!(c.store().history(), expected);
        assert_eq!(storage.load().unwrap(), expected);
    }

    #[test]
    fn test_failed_exchange() {
        let (mut c, _) = controller();
        let pending = c.submit("Hi").unwrap();
        c.resolve(pending.id, Err(ReplyError));
        assert_eq!(
            transcript(&c),
            [(Sender::User, "Hi"), (Sender::Bot, "Oops! Something went wrong.")]
        );
        assert!(c.store().history().iter().all(|m| !m.is_pending()));
        assert_eq!(c.state(), ControllerState::Idle);
    }

    #[test]
    fn test_empty_submission() {
        let (mut c, _) = controller();
        c.set_draft("   ");
        assert_eq!(c.submit(""), Err(SubmitError::Empty));
        assert_eq!(c.submit_draft(), Err(SubmitError::Empty));
        assert!(c.store().transcript().is_empty());
        assert_eq!(c.state(), ControllerState::Idle);
        assert_eq!(c.draft(), "   ");
    }

    #[test]
    fn test_reject_while_awaiting() {
        let (mut c, _) = controller();
        c.set_draft("first");
        let pending = c.submit_draft().unwrap();
        assert_eq!(c.draft(), "");

        assert_eq!(c.submit("second"), Err(SubmitError::Busy));
        assert_eq!(c.new_conversation(), Err(ActionError::Busy));
        assert_eq!(c.view_history(), Err(ActionError::Busy));
        assert_eq!(c.clear_history(), Err(ActionError::Busy));
        assert_eq!(c.store().transcript().len(), 2);

        c.resolve(pending.id, Ok("ok".to_owned()));
        assert!(c.submit("second").is_ok());
    }

    #[test]
    fn test_stale_resolution_is_ignored() {
        let (mut c, _) = controller();
        let first = c.submit("one").unwrap();
        c.resolve(first.id, Ok("1".to_owned()));
        let second = c.submit("two").unwrap();

        c.resolve(first.id, Ok("late".to_owned()));
        assert_eq!(c.state(), ControllerState::AwaitingReply);
        assert!(c.store().has_pending());

        c.resolve(second.id, Ok("2".to_owned()));
        assert_eq!(c.store().transcript().len(), 4);
        assert_eq!(c.store().transcript()[3].text(), "2");
    }

    #[test]
    fn test_history_actions() {
        let (mut c, storage) = controller();
        let pending = c.submit("Hi").unwrap();
        c.resolve(pending.id, Ok("Hello".to_owned()));

        c.new_conversation().unwrap();
        assert!(c.store().transcript().is_empty());
        assert_eq!(c.store().history().len(), 2);

        c.view_history().unwrap();
        assert_eq!(
            transcript(&c),
            [(Sender::User, "Hi"), (Sender::Bot, "Hello")]
        );

        c.clear_history().unwrap();
        assert_eq!(c.store().transcript().len(), 2);
        assert!(!storage.is_present());
        c.view_history().unwrap();
        assert!(c.store().transcript().is_empty());
    }

    #[test]
    fn test_voice_ready() {
        let (mut c, _) = controller();
        let outcome = c.voice_ready("draft me".to_owned(), false);
        assert_eq!(outcome, VoiceOutcome::Drafted);
        assert_eq!(c.draft(), "draft me");
        assert!(c.store().transcript().is_empty());

        let outcome = c.voice_ready("hello".to_owned(), true);
        let VoiceOutcome::Submitted(pending) = outcome else {
            panic!("voice input was not submitted");
        };
        assert_eq!(pending.prompt, "hello");
        assert_eq!(c.draft(), "");

        assert_eq!(
            c.voice_ready("again".to_owned(), true),
            VoiceOutcome::Dropped(SubmitError::Busy)
        );
    }
}
